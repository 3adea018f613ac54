//! Email pattern inference and synthesis.
//!
//! The crate learns, per company domain, how usernames are built from a
//! person's first and last name, then generates addresses for new people at
//! those domains. It works in two directions:
//!
//! - **Inference**: [`infer`] classifies each observed address against a
//!   fixed, priority-ordered set of [`Convention`]s and records the result
//!   in a [`ConventionStore`].
//! - **Synthesis**: [`synthesize`] resolves a convention for each prospect's
//!   domain from the store, while [`synthesize_direct`] takes it from an
//!   explicit label on the row.
//!
//! Row failures are captured on the returned records and never abort a
//! batch. The `*_with` variants report progress to a [`BatchObserver`] and
//! can be cancelled between rows; [`spawn_batch`] runs them on a worker
//! thread.
//!
//! # Example
//!
//! ```
//! use email_pattern::{ProspectRecord, SampleRecord, infer, synthesize};
//!
//! let samples = [SampleRecord {
//!     first_name: "Jane".to_owned(),
//!     last_name: "Doe".to_owned(),
//!     email: "jane.doe@acme.com".to_owned(),
//! }];
//! let prospects = [ProspectRecord {
//!     first_name: "Bob".to_owned(),
//!     last_name: "Roe".to_owned(),
//!     url: "https://www.acme.com/contact".to_owned(),
//! }];
//!
//! let inference = infer(&samples);
//! let predicted = synthesize(&prospects, &inference.store);
//!
//! let email = predicted
//!     .first()
//!     .and_then(|row| row.outcome.as_ref().ok())
//!     .map(|synthesis| synthesis.email.as_str());
//! assert_eq!(email, Some("bob.roe@acme.com"));
//! ```

mod batch;
pub mod cli;
mod convention;
mod error;
mod inference;
mod names;
mod records;
mod settings;
mod store;
mod synthesis;
mod table_io;

pub use batch::{
    BatchHandle, BatchObserver, BatchProgress, CancelFlag, ChannelObserver, NoopObserver,
    spawn_batch,
};
pub use convention::Convention;
pub use error::{
    BatchError, ConventionError, MalformedEmailReason, NameComponent, RecordError,
    UnknownConventionLabel,
};
pub use inference::{Inference, classify, infer, infer_with};
pub use names::{SplitEmail, clean_domain, normalise_name, parse_domain, split_email};
pub use records::{
    Annotated, Detection, DirectExportRow, DirectRecord, DirectSynthesizedRecord,
    ERROR_FORMAT_CELL, GENERATION_ERROR_CELL, INVALID_FORMAT_CELL, InferenceExportRow,
    InferredRecord, PREDICTION_ERROR_CELL, PredictionExportRow, ProspectRecord, SampleRecord,
    Synthesis, SynthesizedRecord, TabularRecord,
};
pub use settings::{DEFAULT_INFERENCE_OUTPUT, DEFAULT_PREDICTION_OUTPUT, EmailPatternSettings};
pub use store::{ConventionStore, SharedConventionStore};
pub use synthesis::{
    synthesize, synthesize_direct, synthesize_direct_with, synthesize_email, synthesize_with,
};
pub use table_io::{
    TableError, read_records, read_records_from_path, write_atomic, write_rows, write_table,
};
