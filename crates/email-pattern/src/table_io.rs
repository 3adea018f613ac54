//! Reading input tables and writing export tables.
//!
//! Tables are comma-separated with a header row. Header names are trimmed
//! before the column contract is checked, and a table that fails the check is
//! rejected before any row is deserialised. Exports are written to a hidden
//! temporary file and renamed into place so a failed run never leaves a
//! partial file behind.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::error::BatchError;
use crate::records::TabularRecord;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Errors raised while moving tables to and from disk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The input file could not be opened or read.
    #[error("failed to read table at '{path}': {message}")]
    Read {
        /// Path of the input table.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },
    /// The export could not be written.
    #[error("failed to write table at '{path}': {message}")]
    Write {
        /// Path being written.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },
    /// The table is not well-formed CSV.
    #[error("invalid table: {message}")]
    Csv {
        /// Description of the CSV error.
        message: String,
    },
    /// The header row does not satisfy the column contract.
    #[error(transparent)]
    Rejected(#[from] BatchError),
}

impl From<csv::Error> for TableError {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            message: err.to_string(),
        }
    }
}

/// Reads every row of a table into `R`.
///
/// Cells missing from short rows read as empty strings.
///
/// # Errors
///
/// Returns [`TableError::Rejected`] if a required column is absent, or
/// [`TableError::Csv`] if the data cannot be parsed.
///
/// ```
/// use email_pattern::{SampleRecord, read_records};
///
/// let table = "First Name, Last Name ,Email\nJane,Doe,jane.doe@acme.com\n";
/// let rows: Vec<SampleRecord> = read_records(table.as_bytes()).expect("valid table");
///
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].last_name, "Doe");
/// ```
pub fn read_records<R, T>(reader: T) -> Result<Vec<R>, TableError>
where
    R: TabularRecord + DeserializeOwned,
    T: io::Read,
{
    let mut table = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(reader);
    R::check_columns(table.headers()?.iter())?;
    let rows = table.deserialize().collect::<Result<Vec<R>, _>>()?;
    debug!(rows = rows.len(), "read table");
    Ok(rows)
}

/// Reads a table from `path`.
///
/// # Errors
///
/// Returns [`TableError::Read`] if the file cannot be read, otherwise as
/// [`read_records`].
pub fn read_records_from_path<R>(path: &Utf8Path) -> Result<Vec<R>, TableError>
where
    R: TabularRecord + DeserializeOwned,
{
    let read_error = |err: io::Error| TableError::Read {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let parent = parent_of(path);
    let file_name = path.file_name().ok_or_else(|| TableError::Read {
        path: path.to_path_buf(),
        message: "table path must name a file".to_owned(),
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    let file = dir.open(file_name).map_err(read_error)?;
    read_records(file)
}

/// Serialises `rows` as a table with a header row.
///
/// An empty slice produces an empty string, since headers come from the
/// first row.
///
/// # Errors
///
/// Returns [`TableError::Csv`] if a row cannot be serialised.
pub fn write_rows<S>(rows: &[S]) -> Result<String, TableError>
where
    S: Serialize,
{
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().map_err(|err| TableError::Csv {
        message: err.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|err| TableError::Csv {
        message: err.to_string(),
    })
}

/// Writes `rows` to `path`, replacing any existing file atomically.
///
/// # Errors
///
/// Returns [`TableError::Write`] if the directory cannot be opened or the
/// file cannot be written, or [`TableError::Csv`] if serialisation fails.
pub fn write_table<S>(path: &Utf8Path, rows: &[S]) -> Result<(), TableError>
where
    S: Serialize,
{
    let contents = write_rows(rows)?;
    let dir = Dir::open_ambient_dir(parent_of(path), ambient_authority()).map_err(|err| {
        TableError::Write {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    })?;
    let file_name = path.file_name().map(Utf8Path::new).unwrap_or(path);
    write_atomic(&dir, file_name, &contents)
}

fn parent_of(path: &Utf8Path) -> &Utf8Path {
    path.parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."))
}

/// Writes `contents` to `path` inside `dir` through a temporary file.
///
/// `path` must be a bare file name.
///
/// # Errors
///
/// Returns [`TableError::Write`] if the file cannot be written.
pub fn write_atomic(dir: &Dir, path: &Utf8Path, contents: &str) -> Result<(), TableError> {
    let mut components = path.components();
    let (Some(Utf8Component::Normal(file_name)), None) = (components.next(), components.next())
    else {
        return Err(TableError::Write {
            path: path.to_path_buf(),
            message: "export path must be a file name".to_owned(),
        });
    };
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(".{file_name}.tmp.{}.{stamp}.{counter}", std::process::id());

    write_temp(dir, &tmp_name, path, contents)?;
    if let Err(err) = rename_into_place(dir, &tmp_name, file_name) {
        drop(dir.remove_file(&tmp_name));
        return Err(TableError::Write {
            path: path.to_path_buf(),
            message: err.to_string(),
        });
    }
    // Directory sync is best effort.
    if dir.open(".").and_then(|handle| handle.sync_all()).is_err() {
        debug!(path = %path, "directory sync skipped");
    }
    Ok(())
}

fn write_temp(
    dir: &Dir,
    tmp_name: &str,
    target: &Utf8Path,
    contents: &str,
) -> Result<(), TableError> {
    let write_error = |err: io::Error| TableError::Write {
        path: target.with_file_name(tmp_name),
        message: err.to_string(),
    };
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options).map_err(write_error)?;
    let written = file
        .write_all(contents.as_bytes())
        .and_then(|()| file.sync_all());
    if let Err(err) = written {
        drop(file);
        drop(dir.remove_file(tmp_name));
        return Err(write_error(err));
    }
    Ok(())
}

#[cfg(windows)]
fn rename_into_place(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    // Windows refuses to rename over an existing file.
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn rename_into_place(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}
