//! Runtime settings loaded via `OrthoConfig`.

use std::path::PathBuf;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Default export name for inference runs.
pub const DEFAULT_INFERENCE_OUTPUT: &str = "pattern_analysis_results.csv";
/// Default export name for table-driven and direct synthesis runs.
pub const DEFAULT_PREDICTION_OUTPUT: &str = "email_predictions.csv";

const DEFAULT_PROGRESS_EVERY: usize = 1;

/// Settings shared by every command.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EMAIL_PATTERN")]
pub struct EmailPatternSettings {
    /// Emit logs as JSON lines instead of human-readable text.
    #[ortho_config(default = false)]
    pub json_logs: bool,
    /// Forward one progress event every this many records.
    pub progress_every: Option<usize>,
    /// Directory that default export names are written into.
    pub output_dir: Option<PathBuf>,
}

impl EmailPatternSettings {
    /// Returns the progress throttle, never less than one.
    #[must_use]
    pub fn progress_every(&self) -> usize {
        self.progress_every
            .unwrap_or(DEFAULT_PROGRESS_EVERY)
            .max(1)
    }

    /// Returns where an export called `file_name` should go when no output
    /// path was given.
    ///
    /// Falls back to the working directory; a non-UTF-8 directory is
    /// rendered lossily.
    #[must_use]
    pub fn default_output(&self, file_name: &str) -> Utf8PathBuf {
        let dir = self.output_dir.as_ref().map_or_else(
            || Utf8PathBuf::from("."),
            |dir| Utf8PathBuf::from(dir.to_string_lossy().into_owned()),
        );
        dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings loading.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> EmailPatternSettings {
        EmailPatternSettings::load_from_iter([OsString::from("email-pattern")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("EMAIL_PATTERN_JSON_LOGS", None::<String>),
            ("EMAIL_PATTERN_PROGRESS_EVERY", None::<String>),
            ("EMAIL_PATTERN_OUTPUT_DIR", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(!settings.json_logs);
        assert_eq!(settings.progress_every(), DEFAULT_PROGRESS_EVERY);
        assert_eq!(
            settings.default_output(DEFAULT_INFERENCE_OUTPUT),
            Utf8PathBuf::from("./pattern_analysis_results.csv")
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("EMAIL_PATTERN_JSON_LOGS", Some("true".to_owned())),
            ("EMAIL_PATTERN_PROGRESS_EVERY", Some("25".to_owned())),
            ("EMAIL_PATTERN_OUTPUT_DIR", Some("/tmp/exports".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.json_logs);
        assert_eq!(settings.progress_every(), 25);
        assert_eq!(
            settings.default_output(DEFAULT_PREDICTION_OUTPUT),
            Utf8PathBuf::from("/tmp/exports/email_predictions.csv")
        );
    }

    #[rstest]
    fn zero_progress_throttle_is_raised_to_one() {
        let _guard = lock_env([
            ("EMAIL_PATTERN_JSON_LOGS", None::<String>),
            ("EMAIL_PATTERN_PROGRESS_EVERY", Some("0".to_owned())),
            ("EMAIL_PATTERN_OUTPUT_DIR", None::<String>),
        ]);

        assert_eq!(load_from_empty_args().progress_every(), 1);
    }
}
