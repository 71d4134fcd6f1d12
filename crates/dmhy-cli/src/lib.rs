//! Command-line front end for `dmhy-core`.

pub mod cli;
pub mod logging;
mod render;
