//! CLI module
//!
//! Command-line interface for scraping declarative sites.
//!
//! # Commands
//!
//! - `run` - Scrape a site and print every item as a JSON line
//! - `validate` - Check a site file without fetching anything

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
