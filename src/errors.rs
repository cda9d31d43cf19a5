// src/errors.rs

//! Crate-wide error types.
//!
//! Task-level failures are reported as [`AssetError`] so the runtime can log
//! them with a stable shape; the application layer (`lib.rs`, config
//! loading) uses `anyhow` with context on top.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    /// Malformed stylesheet or script input.
    #[error("compile error in {}{}: {message}", file.display(), line_suffix(*line))]
    Compile {
        file: PathBuf,
        line: Option<u32>,
        message: String,
    },

    /// Filesystem failure while cleaning, reading or writing.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input a format-specific converter cannot handle.
    #[error("cannot transform {}: {message}", file.display())]
    Transform { file: PathBuf, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl AssetError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        AssetError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn transform(file: impl AsRef<Path>, message: impl Into<String>) -> Self {
        AssetError::Transform {
            file: file.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    pub fn compile(file: impl AsRef<Path>, line: Option<u32>, message: impl Into<String>) -> Self {
        AssetError::Compile {
            file: file.as_ref().to_path_buf(),
            line,
            message: message.into(),
        }
    }
}

fn line_suffix(line: Option<u32>) -> String {
    match line {
        Some(l) => format!(":{l}"),
        None => String::new(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AssetError>;
