//! Error types for the command-line surface.

use thiserror::Error;

use crate::error::BatchError;
use crate::table_io::TableError;

/// Errors that end a command without producing an export.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    /// An input table could not be read or an export could not be written.
    #[error(transparent)]
    Table(#[from] TableError),
    /// The batch was rejected, cancelled or its worker failed.
    #[error(transparent)]
    Batch(#[from] BatchError),
    /// The background worker thread could not be started.
    #[error("failed to start batch worker: {message}")]
    Spawn {
        /// Description of the spawn failure.
        message: String,
    },
    /// Settings could not be loaded from the environment or config files.
    #[error("failed to load settings: {message}")]
    Settings {
        /// Description of the configuration error.
        message: String,
    },
}
