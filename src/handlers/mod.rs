mod event_log;
mod song_catalog;

pub use event_log::{EventLogHandler, DEFAULT_SONG_PLAY_PAGE};
pub use song_catalog::SongCatalogHandler;

use crate::error::{EtlError, ParseError};
use crate::report::FileReport;
use crate::warehouse::Warehouse;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Loads one data file into the warehouse.
///
/// A handler parses the whole file before writing anything, so a malformed
/// file leaves no rows behind. Recoverable write failures are counted in the
/// returned report; fatal ones end the call with `EtlError::Store`.
pub trait FileHandler {
    fn name(&self) -> &'static str;

    fn handle(&self, path: &Path, warehouse: &mut dyn Warehouse) -> Result<FileReport, EtlError>;
}

/// Reads newline-delimited JSON, skipping blank lines.
fn read_json_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ParseError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| ParseError::Json {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Reads one or more JSON values laid out back to back, each possibly
/// spanning several lines. At least one value is required.
fn read_json_values<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ParseError> {
    let text = std::fs::read_to_string(path)?;
    let mut records = Vec::new();
    for value in serde_json::Deserializer::from_str(&text).into_iter::<T>() {
        let record = value.map_err(|source| ParseError::Json {
            line: source.line(),
            source,
        })?;
        records.push(record);
    }
    if records.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(records)
}

fn malformed(path: &Path) -> impl FnOnce(ParseError) -> EtlError + '_ {
    move |source| EtlError::MalformedFile {
        path: path.to_path_buf(),
        source,
    }
}
