//! Error types for the dmhy search library
//!
//! Provides a single error enum covering validation, markup, network
//! and persistence failures.

use thiserror::Error;

/// Error type for all dmhy search operations
#[derive(Error, Debug)]
pub enum DmhyError {
    /// Category id is not one the site accepts
    #[error("'{0}' is not a valid sort_id")]
    InvalidSortId(u32),

    /// Storage unit outside of B/KB/MB/GB/TB
    #[error("invalid storage unit '{0}'")]
    InvalidUnit(String),

    /// Size label does not start with `<number><optional space><unit>`
    #[error("invalid size '{0}'")]
    InvalidSizeFormat(String),

    /// strftime pattern rejected at configuration time
    #[error("invalid time format: {0}")]
    InvalidTimeFormat(String),

    /// Session configuration rejected before any request
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A listing row does not have the expected structure
    #[error("malformed row {row} on page {page}: {reason}")]
    MalformedRow {
        page: u32,
        row: usize,
        reason: String,
    },

    /// Failed to set up HTML parsing
    #[error("Failed to parse HTML: {0}")]
    ParseError(String),

    /// Operation needs an active selection
    #[error("no item selected, call select() first")]
    NotSelected,

    /// Selection index past the end of the result set
    #[error("index {index} out of range for {len} results")]
    IndexOutOfRange { index: usize, len: usize },

    /// Proxy URL could not be used to build the client
    #[error("invalid proxy '{url}': {source}")]
    InvalidProxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request failed
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// Writing the result file failed
    #[error("failed to write CSV: {0}")]
    Persist(#[from] csv::Error),

    /// Filesystem error outside of the CSV writer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DmhyError {
    pub(crate) fn malformed(page: u32, row: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            page,
            row,
            reason: reason.into(),
        }
    }
}

/// Result type alias for dmhy operations
pub type Result<T> = std::result::Result<T, DmhyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_sort_id() {
        let error = DmhyError::InvalidSortId(5);
        assert_eq!(error.to_string(), "'5' is not a valid sort_id");
    }

    #[test]
    fn test_error_display_invalid_unit() {
        let error = DmhyError::InvalidUnit("XB".to_string());
        assert_eq!(error.to_string(), "invalid storage unit 'XB'");
    }

    #[test]
    fn test_error_display_invalid_size() {
        let error = DmhyError::InvalidSizeFormat("bad".to_string());
        assert_eq!(error.to_string(), "invalid size 'bad'");
    }

    #[test]
    fn test_error_display_malformed_row() {
        let error = DmhyError::malformed(2, 7, "missing size cell");
        assert_eq!(
            error.to_string(),
            "malformed row 7 on page 2: missing size cell"
        );
    }

    #[test]
    fn test_error_display_not_selected() {
        let error = DmhyError::NotSelected;
        assert_eq!(error.to_string(), "no item selected, call select() first");
    }

    #[test]
    fn test_error_display_index_out_of_range() {
        let error = DmhyError::IndexOutOfRange { index: 3, len: 3 };
        assert_eq!(error.to_string(), "index 3 out of range for 3 results");
    }
}
