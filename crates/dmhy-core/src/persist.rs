//! Appending selected results to a CSV file

use std::fs::OpenOptions;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::types::SearchResult;

/// Column set of the result file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvLayout {
    /// `time,title,size,magnet`
    #[default]
    Full,
    /// `title,size,magnet`, as written by older releases
    Legacy,
}

impl CsvLayout {
    pub fn header(self) -> &'static [&'static str] {
        match self {
            Self::Full => &["time", "title", "size", "magnet"],
            Self::Legacy => &["title", "size", "magnet"],
        }
    }

    fn fields(self, result: &SearchResult) -> Vec<&str> {
        match self {
            Self::Full => vec![
                result.time.as_str(),
                result.title.as_str(),
                result.size.as_str(),
                result.magnet.as_str(),
            ],
            Self::Legacy => vec![
                result.title.as_str(),
                result.size.as_str(),
                result.magnet.as_str(),
            ],
        }
    }
}

/// Appends one result as a CSV row
///
/// A header row is written first when the file is new or empty. The file
/// handle is closed on every return path.
///
/// # Errors
/// Returns `Io` or `Persist` if the file cannot be opened or written
pub fn append_row(path: &Path, result: &SearchResult, layout: CsvLayout) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(file);

    if needs_header {
        writer.write_record(layout.header())?;
    }
    writer.write_record(layout.fields(result))?;
    writer.flush()?;

    debug!(path = %path.display(), title = %result.title, "appended result row");
    Ok(())
}
