//! Typed input rows, annotated results, and export rows.
//!
//! Each input row type declares the columns it requires through
//! [`TabularRecord`]; the contract is checked once per batch before any row
//! is processed. Annotated records pair an input row with its row-scoped
//! outcome and are never mutated after creation. Export rows fix the column
//! names written back to disk.

use serde::{Deserialize, Serialize};

use crate::convention::Convention;
use crate::error::{BatchError, RecordError};

const FIRST_NAME: &str = "First Name";
const LAST_NAME: &str = "Last Name";

/// Cell text written when inference could not classify a row.
pub const INVALID_FORMAT_CELL: &str = "invalid";
/// Cell text written in `Email Format` when table-driven synthesis fails.
pub const ERROR_FORMAT_CELL: &str = "error";
/// Cell text written in `Predicted Email` when table-driven synthesis fails.
pub const GENERATION_ERROR_CELL: &str = "Error generating email";
/// Cell text written in `Email generated` when direct synthesis fails.
pub const PREDICTION_ERROR_CELL: &str = "Error predicting email";

/// A row type read from a table with a fixed set of required columns.
pub trait TabularRecord {
    /// Column names that must be present in the header row.
    const REQUIRED_COLUMNS: &'static [&'static str];

    /// Checks that every required column appears among `headers`.
    ///
    /// Header names are compared after trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::RejectedInput`] naming every missing column in
    /// contract order.
    ///
    /// ```
    /// use email_pattern::{BatchError, SampleRecord, TabularRecord};
    ///
    /// let result = SampleRecord::check_columns(["First Name", "Last Name"]);
    /// assert_eq!(
    ///     result,
    ///     Err(BatchError::RejectedInput { missing: vec!["Email".to_owned()] })
    /// );
    /// ```
    fn check_columns<'a, I>(headers: I) -> Result<(), BatchError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: Vec<&str> = headers.into_iter().map(str::trim).collect();
        let missing: Vec<String> = Self::REQUIRED_COLUMNS
            .iter()
            .filter(|column| !present.contains(*column))
            .map(|column| (*column).to_owned())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(BatchError::RejectedInput { missing })
        }
    }
}

/// A known person and their observed email address; inference input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Given name as supplied.
    #[serde(rename = "First Name", default)]
    pub first_name: String,
    /// Family name as supplied.
    #[serde(rename = "Last Name", default)]
    pub last_name: String,
    /// Observed email address as supplied.
    #[serde(rename = "Email", default)]
    pub email: String,
}

impl TabularRecord for SampleRecord {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["Email", FIRST_NAME, LAST_NAME];
}

/// A person whose address should be predicted from a domain's convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProspectRecord {
    /// Given name as supplied.
    #[serde(rename = "First Name", default)]
    pub first_name: String,
    /// Family name as supplied.
    #[serde(rename = "Last Name", default)]
    pub last_name: String,
    /// Company URL or bare domain.
    #[serde(rename = "URL", default)]
    pub url: String,
}

impl TabularRecord for ProspectRecord {
    const REQUIRED_COLUMNS: &'static [&'static str] = &[FIRST_NAME, LAST_NAME, "URL"];
}

/// A person with an explicitly stated format label and domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectRecord {
    /// Given name as supplied.
    #[serde(rename = "First Name", default)]
    pub first_name: String,
    /// Family name as supplied.
    #[serde(rename = "Last Name", default)]
    pub last_name: String,
    /// Convention label, for example `FirstName.LastName`.
    #[serde(rename = "Email Format", default)]
    pub email_format: String,
    /// Domain appended after the `@`.
    #[serde(rename = "Domain", default)]
    pub domain: String,
}

impl TabularRecord for DirectRecord {
    const REQUIRED_COLUMNS: &'static [&'static str] =
        &[FIRST_NAME, LAST_NAME, "Email Format", "Domain"];
}

/// An input row paired with its row-scoped outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotated<R, T> {
    /// The input row, unchanged.
    pub record: R,
    /// What the engine produced for the row, or why it could not.
    pub outcome: Result<T, RecordError>,
}

impl<R, T> Annotated<R, T> {
    /// Returns `true` when the row failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }
}

/// The convention detected for one observed email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Cleaned domain taken from the email.
    pub domain: String,
    /// Convention the username matched.
    pub convention: Convention,
}

/// A generated email and how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    /// Domain the email was generated for.
    pub domain: String,
    /// Convention actually applied.
    pub convention: Convention,
    /// The generated address.
    pub email: String,
}

/// Inference result for one sample row.
pub type InferredRecord = Annotated<SampleRecord, Detection>;
/// Table-driven synthesis result for one prospect row.
pub type SynthesizedRecord = Annotated<ProspectRecord, Synthesis>;
/// Direct synthesis result for one row.
pub type DirectSynthesizedRecord = Annotated<DirectRecord, Synthesis>;

fn client_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}")
}

fn format_cell(convention: Convention, domain: &str) -> String {
    format!("{convention}@{domain}")
}

/// Exported inference row: `Client, Domain, Email Format, Email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferenceExportRow {
    /// First and last name joined by a space.
    #[serde(rename = "Client")]
    pub client: String,
    /// Domain taken from the email, empty on failure.
    #[serde(rename = "Domain")]
    pub domain: String,
    /// `<Label>@<domain>`, or `invalid`.
    #[serde(rename = "Email Format")]
    pub email_format: String,
    /// Observed email as supplied.
    #[serde(rename = "Email")]
    pub email: String,
}

impl From<&InferredRecord> for InferenceExportRow {
    fn from(annotated: &InferredRecord) -> Self {
        let record = &annotated.record;
        let (domain, email_format) = match &annotated.outcome {
            Ok(detection) => (
                detection.domain.clone(),
                format_cell(detection.convention, &detection.domain),
            ),
            Err(_) => (String::new(), INVALID_FORMAT_CELL.to_owned()),
        };
        Self {
            client: client_name(&record.first_name, &record.last_name),
            domain,
            email_format,
            email: record.email.clone(),
        }
    }
}

/// Exported table-driven row: `Client, Domain, Email Format, Predicted Email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionExportRow {
    /// First and last name joined by a space.
    #[serde(rename = "Client")]
    pub client: String,
    /// The `URL` value as supplied.
    #[serde(rename = "Domain")]
    pub domain: String,
    /// `<Label>@<domain>`, or `error`.
    #[serde(rename = "Email Format")]
    pub email_format: String,
    /// Generated email, or an error marker.
    #[serde(rename = "Predicted Email")]
    pub predicted_email: String,
}

impl From<&SynthesizedRecord> for PredictionExportRow {
    fn from(annotated: &SynthesizedRecord) -> Self {
        let record = &annotated.record;
        let (email_format, predicted_email) = match &annotated.outcome {
            Ok(synthesis) => (
                format_cell(synthesis.convention, &synthesis.domain),
                synthesis.email.clone(),
            ),
            Err(_) => (
                ERROR_FORMAT_CELL.to_owned(),
                GENERATION_ERROR_CELL.to_owned(),
            ),
        };
        Self {
            client: client_name(&record.first_name, &record.last_name),
            domain: record.url.clone(),
            email_format,
            predicted_email,
        }
    }
}

/// Exported direct-mode row:
/// `First Name, Last Name, Email Format, Domain, Email generated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectExportRow {
    /// Given name as supplied.
    #[serde(rename = "First Name")]
    pub first_name: String,
    /// Family name as supplied.
    #[serde(rename = "Last Name")]
    pub last_name: String,
    /// Format label as supplied.
    #[serde(rename = "Email Format")]
    pub email_format: String,
    /// Domain as supplied.
    #[serde(rename = "Domain")]
    pub domain: String,
    /// Generated email, or an error marker.
    #[serde(rename = "Email generated")]
    pub email_generated: String,
}

impl From<&DirectSynthesizedRecord> for DirectExportRow {
    fn from(annotated: &DirectSynthesizedRecord) -> Self {
        let record = &annotated.record;
        let email_generated = match &annotated.outcome {
            Ok(synthesis) => synthesis.email.clone(),
            Err(_) => PREDICTION_ERROR_CELL.to_owned(),
        };
        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email_format: record.email_format.clone(),
            domain: record.domain.clone(),
            email_generated,
        }
    }
}
