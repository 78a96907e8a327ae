//! YAML loader module
//!
//! Parse scraper configurations from YAML (or JSON) files.
//!
//! # Overview
//!
//! A file is either a full [`ScraperConfig`](crate::config::ScraperConfig)
//! with a top-level `site` key, or a bare
//! [`SiteDefinition`](crate::site::SiteDefinition), which is wrapped in the
//! default settings.

mod parser;

pub use parser::{load_config, load_config_from_str};
