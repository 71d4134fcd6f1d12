//! Byte-size labels and unit conversion
//!
//! Listing rows carry sizes as free text such as `"1.5 GB"` or `"700MB"`.
//! [`parse_size`] splits such a label into a number and a unit token and
//! [`convert_byte`] re-expresses a value in another unit.
//!
//! All units scale by powers of 1024 even though they carry the decimal
//! names (`KB`, not `KiB`). Results are rounded to two decimal places with
//! [`f64::round`], i.e. half away from zero.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::error;

use crate::error::{DmhyError, Result};

static SIZE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*([A-Za-z]+)").ok());

/// A recognized storage unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteUnit {
    B,
    KB,
    MB,
    GB,
    TB,
}

impl ByteUnit {
    /// All units, smallest first
    pub const ALL: [ByteUnit; 5] = [Self::B, Self::KB, Self::MB, Self::GB, Self::TB];

    /// Number of bytes in one of this unit
    pub fn factor(self) -> f64 {
        match self {
            Self::B => 1.0,
            Self::KB => 1024.0,
            Self::MB => 1_048_576.0,
            Self::GB => 1_073_741_824.0,
            Self::TB => 1_099_511_627_776.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::B => "B",
            Self::KB => "KB",
            Self::MB => "MB",
            Self::GB => "GB",
            Self::TB => "TB",
        }
    }
}

impl fmt::Display for ByteUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ByteUnit {
    type Err = DmhyError;

    /// Case-insensitive lookup
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "B" => Ok(Self::B),
            "KB" => Ok(Self::KB),
            "MB" => Ok(Self::MB),
            "GB" => Ok(Self::GB),
            "TB" => Ok(Self::TB),
            _ => Err(DmhyError::InvalidUnit(s.to_string())),
        }
    }
}

/// Converts a byte quantity from one unit to another
///
/// # Arguments
/// * `value` - Quantity expressed in `from_unit`
/// * `from_unit` - Source unit name, case-insensitive
/// * `to_unit` - Target unit name, case-insensitive
///
/// # Returns
/// `value * from_factor / to_factor` rounded to 2 decimal places
///
/// # Errors
/// Returns `InvalidUnit` naming the first unit that is not recognized
///
/// # Example
/// ```
/// use dmhy_core::convert_byte;
/// assert_eq!(convert_byte(1024.0, "KB", "MB").unwrap(), 1.0);
/// assert_eq!(convert_byte(1.0, "tb", "gb").unwrap(), 1024.0);
/// ```
pub fn convert_byte(value: f64, from_unit: &str, to_unit: &str) -> Result<f64> {
    let units = from_unit
        .parse::<ByteUnit>()
        .and_then(|from| Ok((from, to_unit.parse::<ByteUnit>()?)));

    match units {
        Ok((from, to)) => Ok(convert(value, from, to)),
        Err(e) => {
            error!(from_unit, to_unit, "unit conversion failed: {}", e);
            Err(e)
        }
    }
}

/// Typed variant of [`convert_byte`]
pub fn convert(value: f64, from: ByteUnit, to: ByteUnit) -> f64 {
    round2(value * (from.factor() / to.factor()))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Splits a size label into its numeric value and unit token
///
/// The label must start with a number (integer or decimal), optionally
/// followed by whitespace, then an alphabetic unit. Anything after the
/// unit is ignored. The unit is returned as written and is not checked
/// against the known units; [`convert_byte`] does that.
///
/// # Errors
/// Returns `InvalidSizeFormat` if the label does not match
///
/// # Example
/// ```
/// use dmhy_core::parse_size;
/// assert_eq!(parse_size("1.5 GB").unwrap(), (1.5, "GB".to_string()));
/// assert_eq!(parse_size("700MB").unwrap(), (700.0, "MB".to_string()));
/// assert!(parse_size("bad").is_err());
/// ```
pub fn parse_size(label: &str) -> Result<(f64, String)> {
    let invalid = || {
        error!(label, "could not extract value and unit from size label");
        DmhyError::InvalidSizeFormat(label.to_string())
    };

    let Some(re) = SIZE_PATTERN.as_ref() else {
        return Err(invalid());
    };

    let caps = re.captures(label).ok_or_else(invalid)?;
    let value = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .ok_or_else(invalid)?;
    let unit = caps.get(2).map(|m| m.as_str().to_string()).ok_or_else(invalid)?;

    Ok((value, unit))
}
