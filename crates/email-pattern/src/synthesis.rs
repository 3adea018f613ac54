//! Email synthesis from conventions.
//!
//! Two entry points share [`Convention::construct`]: table-driven synthesis
//! resolves each row's convention from a [`ConventionStore`], and direct
//! synthesis takes it from the row's own format label. A failing row is
//! annotated with its error and the batch carries on.

use tracing::{debug, info, warn};

use crate::batch::{BatchObserver, drive};
use crate::convention::Convention;
use crate::error::{BatchError, RecordError};
use crate::names::{normalise_name, parse_domain};
use crate::records::{
    DirectRecord, DirectSynthesizedRecord, ProspectRecord, Synthesis, SynthesizedRecord,
};
use crate::store::ConventionStore;

/// Builds the email for one person under `convention`.
///
/// Names are normalised before the convention is applied; `domain` is used
/// as given.
///
/// # Errors
///
/// Returns [`RecordError::Construct`] if the convention needs the initial of
/// an empty name.
///
/// ```
/// use email_pattern::{Convention, synthesize_email};
///
/// let email = synthesize_email(Convention::LastName, "Amy", "Lee", "x.com")
///     .expect("last name present");
/// assert_eq!(email, "lee@x.com");
/// ```
pub fn synthesize_email(
    convention: Convention,
    first_name: &str,
    last_name: &str,
    domain: &str,
) -> Result<String, RecordError> {
    let first = normalise_name(first_name);
    let last = normalise_name(last_name);
    let username = convention.construct(&first, &last)?;
    Ok(format!("{username}@{domain}"))
}

fn synthesize_record(record: &ProspectRecord, store: &ConventionStore) -> SynthesizedRecord {
    let outcome = parse_domain(&record.url).and_then(|domain| {
        let convention = store.resolve(&domain);
        let email = synthesize_email(convention, &record.first_name, &record.last_name, &domain)?;
        debug!(%email, %convention, "generated email");
        Ok(Synthesis {
            domain,
            convention,
            email,
        })
    });
    if let Err(err) = &outcome {
        warn!(error = %err, url = %record.url, "email generation failed for row");
    }
    SynthesizedRecord {
        record: record.clone(),
        outcome,
    }
}

fn direct_record(record: &DirectRecord) -> DirectSynthesizedRecord {
    let convention = Convention::from_label(&record.email_format);
    let domain = record.domain.trim();
    let outcome = if domain.is_empty() {
        Err(RecordError::UnparseableDomain {
            value: record.domain.clone(),
        })
    } else {
        synthesize_email(convention, &record.first_name, &record.last_name, domain).map(
            |email| Synthesis {
                domain: domain.to_owned(),
                convention,
                email,
            },
        )
    };
    if let Err(err) = &outcome {
        warn!(error = %err, format = %record.email_format, "email prediction failed for row");
    }
    DirectSynthesizedRecord {
        record: record.clone(),
        outcome,
    }
}

fn log_summary<R, T>(mode: &'static str, records: &[crate::records::Annotated<R, T>]) {
    let failed = records.iter().filter(|r| r.is_failure()).count();
    info!(mode, rows = records.len(), failed, "synthesis complete");
}

/// Predicts an email for every prospect using the conventions in `store`.
///
/// Each row's `URL` is cleaned to a domain and resolved with
/// [`ConventionStore::resolve`].
///
/// ```
/// use email_pattern::{ProspectRecord, SampleRecord, infer, synthesize};
///
/// let inference = infer(&[SampleRecord {
///     first_name: "Jane".to_owned(),
///     last_name: "Doe".to_owned(),
///     email: "jane.doe@acme.com".to_owned(),
/// }]);
/// let results = synthesize(
///     &[ProspectRecord {
///         first_name: "Bob".to_owned(),
///         last_name: "Roe".to_owned(),
///         url: "www.acme.com/contact".to_owned(),
///     }],
///     &inference.store,
/// );
///
/// let synthesis = results[0].outcome.as_ref().expect("generated");
/// assert_eq!(synthesis.email, "bob.roe@acme.com");
/// ```
#[must_use]
pub fn synthesize(records: &[ProspectRecord], store: &ConventionStore) -> Vec<SynthesizedRecord> {
    let results: Vec<_> = records
        .iter()
        .map(|record| synthesize_record(record, store))
        .collect();
    log_summary("table", &results);
    results
}

/// Like [`synthesize`], reporting progress to `observer` after each row.
///
/// # Errors
///
/// Returns [`BatchError::Cancelled`] if the observer cancels the batch.
pub fn synthesize_with<O>(
    records: &[ProspectRecord],
    store: &ConventionStore,
    observer: &mut O,
) -> Result<Vec<SynthesizedRecord>, BatchError>
where
    O: BatchObserver + ?Sized,
{
    let results = drive(records, observer, |record| synthesize_record(record, store))?;
    log_summary("table", &results);
    Ok(results)
}

/// Generates an email for every row using the row's own format label.
///
/// Unrecognised labels fall back to the default convention.
///
/// ```
/// use email_pattern::{DirectRecord, synthesize_direct};
///
/// let results = synthesize_direct(&[DirectRecord {
///     first_name: "Amy".to_owned(),
///     last_name: "Lee".to_owned(),
///     email_format: "LastName".to_owned(),
///     domain: "x.com".to_owned(),
/// }]);
///
/// let synthesis = results[0].outcome.as_ref().expect("generated");
/// assert_eq!(synthesis.email, "lee@x.com");
/// ```
#[must_use]
pub fn synthesize_direct(records: &[DirectRecord]) -> Vec<DirectSynthesizedRecord> {
    let results: Vec<_> = records.iter().map(direct_record).collect();
    log_summary("direct", &results);
    results
}

/// Like [`synthesize_direct`], reporting progress to `observer` after each row.
///
/// # Errors
///
/// Returns [`BatchError::Cancelled`] if the observer cancels the batch.
pub fn synthesize_direct_with<O>(
    records: &[DirectRecord],
    observer: &mut O,
) -> Result<Vec<DirectSynthesizedRecord>, BatchError>
where
    O: BatchObserver + ?Sized,
{
    let results = drive(records, observer, direct_record)?;
    log_summary("direct", &results);
    Ok(results)
}
