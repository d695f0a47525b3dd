use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
};

use miette::Diagnostic;
use thiserror::Error;

use crate::{YearlyObservations, HEADER};

#[derive(Debug, Error, Diagnostic)]
pub enum WriteError {
    #[error("Could not create `{}`", path.display())]
    #[diagnostic(code(weather_history::export::create))]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not write a record to `{}`", path.display())]
    #[diagnostic(code(weather_history::export::record))]
    Record {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Create (or truncate) `path` and write the year into it.
///
/// The file always starts with the header, even when no day had a record.
pub fn write_year(data: &YearlyObservations, path: &Path) -> Result<usize, WriteError> {
    let file = File::create(path).map_err(|source| WriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_records(file, data).map_err(|source| WriteError::Record {
        path: path.to_path_buf(),
        source,
    })
}

/// Header, then one row per record with day boundaries flattened away.
/// Returns the number of records written.
pub fn write_records<W: Write>(out: W, data: &YearlyObservations) -> Result<usize, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);

    writer.write_record(HEADER)?;
    let mut written = 0;
    for record in data.records() {
        writer.serialize(record)?;
        written += 1;
    }
    writer.flush()?;

    Ok(written)
}
