// src/config/loader.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::model::SiteConfig;
use crate::config::validate::validate_config;

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<SiteConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: SiteConfig = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {:?}", path))?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<SiteConfig> {
    let config = load_from_path(&path)?;
    validate_config(&config)
        .with_context(|| format!("validating config from {:?}", path.as_ref()))?;
    Ok(config)
}

/// Resolve the configuration for a run.
///
/// Without an explicit path the built-in defaults are used and no file is
/// read.
pub fn resolve(path: Option<&Path>) -> Result<SiteConfig> {
    match path {
        Some(p) => load_and_validate(p),
        None => {
            let config = SiteConfig::default();
            validate_config(&config).context("validating built-in defaults")?;
            Ok(config)
        }
    }
}
