//! Command-line entry point for email pattern inference and synthesis.
//!
//! This binary delegates to `email_pattern::cli` for the command flow,
//! keeping the behaviour testable without spawning a process.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use email_pattern::EmailPatternSettings;
use email_pattern::cli::{Cli, CliError, run};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match load_settings().and_then(|settings| {
        init_tracing(&settings);
        run(&cli, &settings)
    }) {
        Ok(summary) => {
            write_line(io::stdout().lock(), &summary.message());
            ExitCode::SUCCESS
        }
        Err(err) => {
            write_line(io::stderr().lock(), &err.to_string());
            ExitCode::FAILURE
        }
    }
}

fn load_settings() -> Result<EmailPatternSettings, CliError> {
    // Command-line flags belong to `Cli`; settings come from the environment
    // and configuration files only.
    EmailPatternSettings::load_from_iter([OsString::from("email-pattern")]).map_err(|err| {
        CliError::Settings {
            message: err.to_string(),
        }
    })
}

fn init_tracing(settings: &EmailPatternSettings) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let result = if settings.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

fn write_line(mut out: impl Write, message: &str) {
    if let Err(err) = writeln!(out, "{message}") {
        drop(err);
    }
}
