//! Convention inference from observed email addresses.
//!
//! Classification walks a fixed, ordered list of rules and returns the
//! convention of the first rule whose shape matches the username. A rule that
//! needs the initial of an empty name is skipped rather than failing, so
//! classification is total over any input.

use tracing::{debug, info, warn};

use crate::batch::{BatchObserver, drive};
use crate::convention::Convention;
use crate::error::BatchError;
use crate::names::{normalise_name, split_email};
use crate::records::{Detection, InferredRecord, SampleRecord};
use crate::store::ConventionStore;

/// One piece of an expected username shape.
#[derive(Debug, Clone, Copy)]
enum Part {
    Literal(&'static str),
    First,
    Last,
    FirstInitial,
    LastInitial,
}

/// Priority-ordered classification rules; first match wins.
const RULES: [(&[Part], Convention); 9] = [
    (
        &[Part::Literal("d"), Part::First],
        Convention::LastNameFirstLetterFirstName,
    ),
    (
        &[Part::First, Part::FirstInitial],
        Convention::FirstNameFirstLetterLastName,
    ),
    (
        &[Part::First, Part::LastInitial],
        Convention::FirstNameFirstLetterLastName,
    ),
    (&[Part::First, Part::Last], Convention::FirstNameLastName),
    (
        &[Part::FirstInitial, Part::Last],
        Convention::FirstLetterLastName,
    ),
    (
        &[Part::First, Part::Literal("."), Part::Last],
        Convention::FirstNameDotLastName,
    ),
    (
        &[Part::First, Part::Literal("_"), Part::Last],
        Convention::FirstNameUnderscoreLastName,
    ),
    (&[Part::Last], Convention::LastName),
    (&[Part::First], Convention::FirstName),
];

fn initial(part: &str) -> Option<&str> {
    let first_char = part.chars().next()?;
    part.get(..first_char.len_utf8())
}

fn resolve_part<'a>(part: Part, first: &'a str, last: &'a str) -> Option<&'a str> {
    match part {
        Part::Literal(text) => Some(text),
        Part::First => Some(first),
        Part::Last => Some(last),
        Part::FirstInitial => initial(first),
        Part::LastInitial => initial(last),
    }
}

/// Returns `true` if `username` is exactly the concatenation of `parts`.
///
/// Returns `false` if any part is unavailable.
fn matches_shape(username: &str, parts: &[Part], first: &str, last: &str) -> bool {
    let mut rest = username;
    for part in parts {
        let Some(text) = resolve_part(*part, first, last) else {
            return false;
        };
        let Some(remaining) = rest.strip_prefix(text) else {
            return false;
        };
        rest = remaining;
    }
    rest.is_empty()
}

/// Classifies a username against a person's normalised names.
///
/// All three arguments are expected to be trimmed and lower-cased already.
///
/// ```
/// use email_pattern::{Convention, classify};
///
/// assert_eq!(classify("jane.doe", "jane", "doe"), Convention::FirstNameDotLastName);
/// assert_eq!(classify("jdoe", "jane", "doe"), Convention::FirstLetterLastName);
/// assert_eq!(classify("xyz", "jane", "doe"), Convention::FirstNameFirstLetterLastName);
/// ```
#[must_use]
pub fn classify(username: &str, first: &str, last: &str) -> Convention {
    if let Some((_, convention)) = RULES
        .iter()
        .find(|(parts, _)| matches_shape(username, parts, first, last))
    {
        return *convention;
    }

    if username.starts_with(first) {
        Convention::FirstNameFirstLetterLastName
    } else if username.starts_with('d') {
        Convention::LastNameFirstLetterFirstName
    } else {
        warn!(username, first, last, "unrecognised username shape; using default");
        Convention::default()
    }
}

/// Output of an inference run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inference {
    /// Every input row with its detected convention or failure.
    pub records: Vec<InferredRecord>,
    /// Per-domain conventions; later rows win for a repeated domain.
    pub store: ConventionStore,
}

impl Inference {
    /// Number of rows that could not be classified.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_failure()).count()
    }
}

fn infer_record(record: &SampleRecord) -> InferredRecord {
    let outcome = split_email(&record.email).map(|split| {
        let first = normalise_name(&record.first_name);
        let last = normalise_name(&record.last_name);
        let convention = classify(&split.username, &first, &last);
        debug!(email = %record.email, %convention, domain = %split.domain, "detected convention");
        Detection {
            domain: split.domain,
            convention,
        }
    });
    if let Err(err) = &outcome {
        warn!(error = %err, "row skipped during inference");
    }
    InferredRecord {
        record: record.clone(),
        outcome,
    }
}

fn build_store(records: &[InferredRecord]) -> ConventionStore {
    let mut store = ConventionStore::new();
    for detection in records.iter().filter_map(|r| r.outcome.as_ref().ok()) {
        store.insert(&detection.domain, detection.convention);
    }
    store
}

fn finish(records: Vec<InferredRecord>) -> Inference {
    let store = build_store(&records);
    let inference = Inference { records, store };
    info!(
        rows = inference.records.len(),
        failed = inference.failure_count(),
        domains = inference.store.len(),
        "inference complete"
    );
    inference
}

/// Infers a convention for every sample and builds the per-domain table.
///
/// Malformed rows are annotated with their error and take no part in the
/// table.
///
/// ```
/// use email_pattern::{Convention, SampleRecord, infer};
///
/// let inference = infer(&[SampleRecord {
///     first_name: "Jane".to_owned(),
///     last_name: "Doe".to_owned(),
///     email: "jane.doe@acme.com".to_owned(),
/// }]);
///
/// assert_eq!(inference.store.get("acme.com"), Some(Convention::FirstNameDotLastName));
/// ```
#[must_use]
pub fn infer(records: &[SampleRecord]) -> Inference {
    finish(records.iter().map(infer_record).collect())
}

/// Like [`infer`], reporting progress to `observer` after each row.
///
/// # Errors
///
/// Returns [`BatchError::Cancelled`] if the observer cancels the batch; no
/// table is produced in that case.
pub fn infer_with<O>(records: &[SampleRecord], observer: &mut O) -> Result<Inference, BatchError>
where
    O: BatchObserver + ?Sized,
{
    let annotated = drive(records, observer, infer_record)?;
    Ok(finish(annotated))
}
