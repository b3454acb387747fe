//! Error types for the fallible, non-realtime surfaces.
//!
//! Audio pacing and option lookups never fail; they degrade to defaults.
//! Only loading the core's own config file reports errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
