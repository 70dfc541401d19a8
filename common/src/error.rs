use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading or validating the TOML configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Failures of the durable resolution cache.
///
/// None of these are fatal to resolution: a failed read is a cache miss and
/// a failed write is dropped after logging.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("no private storage directory is available on this platform")]
    NoStorageDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt cache file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to encode cache entry: {0}")]
    Encode(#[from] toml::ser::Error),
}
