//! HTML parsing for dmhy.org
//!
//! Contains the listing page parser and release time handling.

pub mod listing;
pub mod time;

pub use listing::{ListingOptions, TitleRule, parse_listing};
pub use time::{NATIVE_TIME_FORMAT, TimeFormat};
