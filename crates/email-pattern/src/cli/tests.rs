//! Unit tests for command parsing and execution.

use std::sync::atomic::{AtomicUsize, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use rstest::{fixture, rstest};

use super::*;
use crate::table_io::TableError;

const SAMPLES: &str = "\
First Name,Last Name,Email
Jane,Doe,jane.doe@acme.com
Ann,Lee,alee@globex.com
Bad,Row,not-an-email
";

const PROSPECTS: &str = "\
First Name,Last Name,URL
Bob,Roe,www.acme.com/contact
Tom,Kay,https://globex.com
Sue,Ng,initech.io
";

const DIRECT: &str = "\
First Name,Last Name,Email Format,Domain
Amy,Lee,LastName,x.com
Amy,,FirstNameFirstLetterLastName,x.com
";

struct Workspace {
    dir: Utf8PathBuf,
}

impl Workspace {
    fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let dir = Dir::open_ambient_dir(&self.dir, ambient_authority()).expect("open workspace");
        dir.write(name, contents).expect("write table");
        self.dir.join(name)
    }

    fn read(&self, path: &Utf8Path) -> String {
        let dir = Dir::open_ambient_dir(&self.dir, ambient_authority()).expect("open workspace");
        let name = path.file_name().expect("file name");
        dir.read_to_string(name).expect("read export")
    }

    fn settings(&self) -> EmailPatternSettings {
        EmailPatternSettings {
            json_logs: false,
            progress_every: Some(1),
            output_dir: Some(self.dir.clone().into_std_path_buf()),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Ok(root) = Dir::open_ambient_dir(".", ambient_authority()) {
            drop(root.remove_dir_all(&self.dir));
        }
    }
}

#[fixture]
fn workspace() -> Workspace {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = Utf8PathBuf::from("target")
        .join("email-pattern-tests")
        .join(format!("cli-{}-{counter}", std::process::id()));
    let root = Dir::open_ambient_dir(".", ambient_authority()).expect("open workspace dir");
    root.create_dir_all(&dir).expect("create temp dir");
    Workspace { dir }
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("email-pattern").chain(args.iter().copied()))
        .expect("parse args")
}

#[test]
fn parses_predict_arguments() {
    let cli = parse(&["predict", "--sample", "s.csv", "--input", "p.csv"]);

    let Command::Predict(args) = cli.command else {
        panic!("expected predict command");
    };
    assert_eq!(args.sample, Utf8PathBuf::from("s.csv"));
    assert_eq!(args.input, Utf8PathBuf::from("p.csv"));
    assert!(args.output.is_none());
}

#[test]
fn infer_requires_input() {
    let result = Cli::try_parse_from(["email-pattern", "infer"]);
    assert!(result.is_err());
}

#[rstest]
fn infer_writes_default_export(workspace: Workspace) {
    let input = workspace.write("samples.csv", SAMPLES);
    let cli = parse(&["infer", "--input", input.as_str()]);

    let summary = run(&cli, &workspace.settings()).expect("infer runs");

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.output.file_name(), Some(DEFAULT_INFERENCE_OUTPUT));
    assert_eq!(
        workspace.read(&summary.output),
        "Client,Domain,Email Format,Email\n\
         Jane Doe,acme.com,FirstName.LastName@acme.com,jane.doe@acme.com\n\
         Ann Lee,globex.com,FirstLetterLastName@globex.com,alee@globex.com\n\
         Bad Row,,invalid,not-an-email\n"
    );
}

#[rstest]
fn predict_uses_inferred_conventions(workspace: Workspace) {
    let sample = workspace.write("samples.csv", SAMPLES);
    let input = workspace.write("prospects.csv", PROSPECTS);
    let output = workspace.dir.join("predicted.csv");
    let cli = parse(&[
        "predict",
        "--sample",
        sample.as_str(),
        "--input",
        input.as_str(),
        "--output",
        output.as_str(),
    ]);

    let summary = run(&cli, &workspace.settings()).expect("predict runs");

    assert_eq!(summary.failed, 0);
    assert_eq!(
        workspace.read(&output),
        "Client,Domain,Email Format,Predicted Email\n\
         Bob Roe,www.acme.com/contact,FirstName.LastName@acme.com,bob.roe@acme.com\n\
         Tom Kay,https://globex.com,FirstLetterLastName@globex.com,tkay@globex.com\n\
         Sue Ng,initech.io,FirstNameFirstLetterLastName@initech.io,suen@initech.io\n"
    );
}

#[rstest]
fn direct_marks_failed_rows(workspace: Workspace) {
    let input = workspace.write("direct.csv", DIRECT);
    let cli = parse(&["direct", "--input", input.as_str()]);

    let summary = run(&cli, &workspace.settings()).expect("direct runs");

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.output.file_name(), Some(DEFAULT_PREDICTION_OUTPUT));
    assert_eq!(
        workspace.read(&summary.output),
        "First Name,Last Name,Email Format,Domain,Email generated\n\
         Amy,Lee,LastName,x.com,lee@x.com\n\
         Amy,,FirstNameFirstLetterLastName,x.com,Error predicting email\n"
    );
}

#[rstest]
fn predict_rejects_prospects_without_url_before_writing(workspace: Workspace) {
    let sample = workspace.write("samples.csv", SAMPLES);
    let input = workspace.write("prospects.csv", "First Name,Last Name\nBob,Roe\n");
    let cli = parse(&[
        "predict",
        "--sample",
        sample.as_str(),
        "--input",
        input.as_str(),
    ]);

    let err = run(&cli, &workspace.settings()).expect_err("missing URL column");

    assert_eq!(
        err,
        CliError::Table(TableError::Rejected(BatchError::RejectedInput {
            missing: vec!["URL".to_owned()],
        }))
    );
    let export = workspace.dir.join(DEFAULT_PREDICTION_OUTPUT);
    let dir = Dir::open_ambient_dir(&workspace.dir, ambient_authority()).expect("open workspace");
    assert!(!dir.exists(export.file_name().expect("file name")));
}

#[rstest]
fn predict_without_inferred_conventions_fails_before_writing(workspace: Workspace) {
    let sample = workspace.write("samples.csv", "First Name,Last Name,Email\n");
    let input = workspace.write("prospects.csv", PROSPECTS);
    let cli = parse(&[
        "predict",
        "--sample",
        sample.as_str(),
        "--input",
        input.as_str(),
    ]);

    let err = run(&cli, &workspace.settings()).expect_err("no conventions");

    assert_eq!(err, CliError::Batch(BatchError::NoConventions));
    let dir = Dir::open_ambient_dir(&workspace.dir, ambient_authority()).expect("open workspace");
    assert!(!dir.exists(DEFAULT_PREDICTION_OUTPUT));
}

#[rstest]
fn predict_with_only_malformed_samples_fails(workspace: Workspace) {
    let sample = workspace.write(
        "samples.csv",
        "First Name,Last Name,Email\nBad,Row,not-an-email\n",
    );
    let input = workspace.write("prospects.csv", PROSPECTS);
    let cli = parse(&[
        "predict",
        "--sample",
        sample.as_str(),
        "--input",
        input.as_str(),
    ]);

    let err = run(&cli, &workspace.settings()).expect_err("no conventions");

    assert_eq!(err, CliError::Batch(BatchError::NoConventions));
}
