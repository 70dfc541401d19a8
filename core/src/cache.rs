//! # Resolution Cache
//!
//! Remembers the last host a scan found so the next process start can skip
//! the scan. There is exactly one entry, later writes replace it.
//!
//! The durable variant keeps a small TOML file in the application's private
//! data directory:
//!
//! ```toml
//! [NetworkPrefs]
//! backend_ip = "192.168.1.41"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use pawprobe_common::config::Config;
use pawprobe_common::error::CacheError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const CACHE_FILE_NAME: &str = "network_prefs.toml";

/// Storage for the last-known-good backend host.
///
/// Storage failures never reach the caller: a failed load is a miss and a
/// failed store is dropped.
pub trait EndpointCache: Send + Sync {
    fn load(&self) -> Option<String>;
    fn store(&self, host: &str);
    fn clear(&self);
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct PrefsFile {
    #[serde(rename = "NetworkPrefs", default)]
    network_prefs: NetworkPrefs,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct NetworkPrefs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    backend_ip: Option<String>,
}

/// Cache persisted across process restarts.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    /// A cache stored as [`CACHE_FILE_NAME`] inside `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CACHE_FILE_NAME),
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, CacheError> {
        cfg.data_dir().map(Self::new).ok_or(CacheError::NoStorageDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached host. A missing file is an empty cache.
    pub fn read(&self) -> Result<Option<String>, CacheError> {
        let raw: String = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let prefs: PrefsFile = toml::from_str(&raw).map_err(|source| CacheError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(prefs
            .network_prefs
            .backend_ip
            .filter(|host| !host.trim().is_empty()))
    }

    /// Replaces the cached host, or empties the cache when `host` is `None`.
    pub fn write(&self, host: Option<&str>) -> Result<(), CacheError> {
        let prefs = PrefsFile {
            network_prefs: NetworkPrefs {
                backend_ip: host.map(str::to_string),
            },
        };
        let encoded: String = toml::to_string(&prefs)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // Rename over the old file so a crash never leaves half an entry.
        let staging: PathBuf = self.path.with_extension("toml.tmp");
        fs::write(&staging, encoded).map_err(|source| CacheError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &self.path).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl EndpointCache for FileCache {
    fn load(&self) -> Option<String> {
        match self.read() {
            Ok(host) => host,
            Err(e) => {
                warn!("Ignoring resolution cache: {e}");
                None
            }
        }
    }

    fn store(&self, host: &str) {
        match self.write(Some(host)) {
            Ok(()) => debug!("Cached backend host {host} in {}", self.path.display()),
            Err(e) => warn!("Could not cache backend host {host}: {e}"),
        }
    }

    fn clear(&self) {
        if let Err(e) = self.write(None) {
            warn!("Could not clear resolution cache: {e}");
        }
    }
}

/// Cache living only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entry: Mutex<Option<String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(host: impl Into<String>) -> Self {
        Self {
            entry: Mutex::new(Some(host.into())),
        }
    }

    fn entry(&self) -> MutexGuard<'_, Option<String>> {
        self.entry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EndpointCache for MemoryCache {
    fn load(&self) -> Option<String> {
        self.entry().clone()
    }

    fn store(&self, host: &str) {
        *self.entry() = Some(host.to_string());
    }

    fn clear(&self) {
        *self.entry() = None;
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
