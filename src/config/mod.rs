// src/config/mod.rs

//! Configuration for assetflow.
//!
//! Responsibilities:
//! - Define the path table (`paths.rs`) and the rest of the settings
//!   (`model.rs`), all with built-in defaults.
//! - Load an optional TOML override file (`loader.rs`).
//! - Validate globs, destinations and settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod paths;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve};
pub use model::{
    FaviconSettings, IconToggles, ImageSettings, ScriptSettings, SiteConfig, WatchSettings,
};
pub use paths::{AssetGroup, PathEntry, PathTable};
pub use validate::validate_config;
