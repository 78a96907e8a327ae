//! YAML parser for scraper configurations

use crate::config::ScraperConfig;
use crate::error::{Error, Result};
use crate::site::SiteDefinition;
use std::fs;
use std::path::Path;

/// Load a scraper configuration from a file
///
/// # Examples
///
/// ```ignore
/// let config = load_config("./sites/shop.yaml")?;
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ScraperConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::config(format!("Site file '{}' not found", path.display()))
        } else {
            Error::config(format!(
                "Failed to read site file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_config_from_str(&content)
}

/// Load a scraper configuration from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<ScraperConfig> {
    let raw: serde_yaml::Value = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse site YAML: {e}")))?;

    let config = if raw.get("site").is_some() {
        serde_yaml::from_value::<ScraperConfig>(raw)
    } else {
        serde_yaml::from_value::<SiteDefinition>(raw).map(ScraperConfig::new)
    }
    .map_err(|e| Error::config(format!("Invalid site definition: {e}")))?;

    config.validate()?;
    Ok(config)
}
