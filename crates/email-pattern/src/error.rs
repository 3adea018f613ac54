//! Error types for the email-pattern crate.
//!
//! Failures fall into two scopes. Row-scoped errors ([`ConventionError`],
//! [`RecordError`]) are captured on the annotated record they belong to and
//! never abort a batch. Batch-scoped errors ([`BatchError`]) reject a whole
//! batch before or instead of producing output.

use std::fmt;

use thiserror::Error;

use crate::convention::Convention;

/// Which part of a person's name a rule needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameComponent {
    /// The first (given) name.
    First,
    /// The last (family) name.
    Last,
}

impl fmt::Display for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first name"),
            Self::Last => f.write_str("last name"),
        }
    }
}

/// Errors raised while building a username from a convention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConventionError {
    /// The convention takes the initial of a name part that is empty.
    #[error("cannot build a {convention} username: {component} is empty")]
    EmptyNameComponent {
        /// Convention being applied.
        convention: Convention,
        /// Name part that was empty.
        component: NameComponent,
    },
}

/// Error returned when a label names no known convention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised email format label: '{label}'")]
pub struct UnknownConventionLabel {
    /// The label as supplied.
    pub label: String,
}

/// Why an email address could not be split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedEmailReason {
    /// The address contains no `@`.
    MissingSeparator,
    /// Nothing precedes the `@`.
    EmptyUsername,
    /// Nothing usable follows the `@`.
    EmptyDomain,
}

impl fmt::Display for MalformedEmailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => f.write_str("no '@' separator"),
            Self::EmptyUsername => f.write_str("empty username"),
            Self::EmptyDomain => f.write_str("empty domain"),
        }
    }
}

/// Row-scoped failures recorded on an annotated record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The observed email address could not be split into username and domain.
    #[error("malformed email '{email}': {reason}")]
    MalformedEmail {
        /// The email as supplied.
        email: String,
        /// What was wrong with it.
        reason: MalformedEmailReason,
    },
    /// The domain or URL value is empty once cleaned.
    #[error("unparseable domain '{value}'")]
    UnparseableDomain {
        /// The domain or URL as supplied.
        value: String,
    },
    /// The username could not be built.
    #[error(transparent)]
    Construct(#[from] ConventionError),
}

/// Batch-scoped failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// Required columns are absent from the input table.
    #[error("missing required columns: {}", missing.join(", "))]
    RejectedInput {
        /// Names of the missing columns, in contract order.
        missing: Vec<String>,
    },
    /// Table-driven synthesis was asked to run before any convention was
    /// inferred.
    #[error("no email conventions available; infer from a sample table first")]
    NoConventions,
    /// The batch was cancelled before every record was processed.
    #[error("batch cancelled after {processed} records")]
    Cancelled {
        /// Records processed before cancellation was observed.
        processed: usize,
    },
    /// The background worker panicked.
    #[error("batch worker panicked")]
    WorkerPanicked,
}
