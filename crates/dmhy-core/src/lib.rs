//! dmhy.org Search Core Library
//!
//! Provides an async API for searching the dmhy.org torrent index and
//! picking magnet links out of the results.
//!
//! # Overview
//!
//! This crate provides:
//! - An HTTP page fetcher with proxy, timeout and TLS settings
//! - A parser for the `/topics/list` result table
//! - A search session that walks every result page for a query
//! - Size label parsing and conversion between B/KB/MB/GB/TB
//! - Appending a chosen result to a CSV file
//!
//! # Example
//!
//! ```no_run
//! use dmhy_core::{ClientConfig, CsvLayout, Result, SearchQuery, SearchSession, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut session = SearchSession::new(ClientConfig::default(), SessionConfig::default())?;
//!
//!     let summary = session.search(&SearchQuery::new("frieren").sort_id(2)).await?;
//!     println!("{} results on {} pages", summary.results, summary.pages_fetched);
//!
//!     if !session.is_empty() {
//!         let chosen = session.select(0)?;
//!         println!("{}: {}", chosen.title, chosen.magnet);
//!
//!         session.format_selected_size("MB")?;
//!         session.persist("results.csv", CsvLayout::Full)?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Sizes
//!
//! Units carry decimal names but scale by 1024: `1 GB == 1024 MB`.

mod client;
mod error;
pub mod parser;
mod persist;
mod session;
mod size;
pub mod testing;
mod types;
pub mod url;

// Re-export client types
pub use client::{ClientConfig, DmhyClient, PageFetcher, ProxyConfig};

// Re-export error types
pub use error::{DmhyError, Result};

// Re-export parser types
pub use parser::{ListingOptions, NATIVE_TIME_FORMAT, TimeFormat, TitleRule, parse_listing};

// Re-export persistence
pub use persist::{CsvLayout, append_row};

// Re-export main search API
pub use session::{AVAILABLE_SORT_IDS, SearchSession, SessionConfig, SessionState};

// Re-export size helpers
pub use size::{ByteUnit, convert, convert_byte, parse_size};

// Re-export data types
pub use types::{SearchQuery, SearchResult, SearchSummary, StopReason};
