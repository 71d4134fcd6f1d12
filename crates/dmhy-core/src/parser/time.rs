//! Release time reformatting
//!
//! The site prints release times as `YYYY/MM/DD hh:mm`. A [`TimeFormat`]
//! other than that native pattern reparses each timestamp and renders it
//! with the configured strftime pattern.

use std::fmt::{self, Write};

use chrono::NaiveDateTime;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DmhyError, Result};

/// Timestamp pattern used by the listing markup
pub const NATIVE_TIME_FORMAT: &str = "%Y/%m/%d %H:%M";

/// A validated strftime pattern for release times
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFormat(String);

impl TimeFormat {
    /// Validate a strftime pattern
    ///
    /// # Errors
    /// Returns `InvalidTimeFormat` if chrono rejects any specifier, or if
    /// the pattern needs data a naive timestamp lacks (e.g. `%z`)
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let unknown = StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error));
        if unknown || render(&NaiveDateTime::default(), &pattern).is_none() {
            return Err(DmhyError::InvalidTimeFormat(pattern));
        }
        Ok(Self(pattern))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the site's own pattern, in which case times pass through
    pub fn is_native(&self) -> bool {
        self.0 == NATIVE_TIME_FORMAT
    }

    /// Re-render a native timestamp in this format
    ///
    /// Returns `None` if `raw` is not a native timestamp.
    pub fn reformat(&self, raw: &str) -> Option<String> {
        let parsed = NaiveDateTime::parse_from_str(raw.trim(), NATIVE_TIME_FORMAT).ok()?;
        render(&parsed, &self.0)
    }
}

/// Format `time` with `pattern`, `None` if chrono cannot render it
fn render(time: &NaiveDateTime, pattern: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", time.format(pattern)).ok()?;
    Some(out)
}

impl Default for TimeFormat {
    fn default() -> Self {
        Self(NATIVE_TIME_FORMAT.to_string())
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TimeFormat {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TimeFormat {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pattern = String::deserialize(deserializer)?;
        TimeFormat::new(pattern).map_err(serde::de::Error::custom)
    }
}
