//! # Configuration
//!
//! Settings are read from a TOML file. The file is looked up in this order:
//!
//! 1. An explicit path handed in by the caller (`--config`).
//! 2. `config.toml` inside the platform config directory
//!    (e.g. `~/.config/pawprobe/config.toml` on Linux).
//!
//! A missing file at the platform location is not an error, every field has a
//! default. A missing file at an explicit path is.
//!
//! ```toml
//! [resolver]
//! port = 8080
//! fallback_host = "192.168.1.41"
//! probe_timeout_ms = 1000
//!
//! [storage]
//! data_dir = "/var/lib/pawprobe"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::device::BuildFingerprint;
use crate::error::ConfigError;
use crate::network::subnet::{FIRST_HOST_OCTET, LAST_HOST_OCTET};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_FALLBACK_HOST: &str = "192.168.1.41";
pub const DEFAULT_EMULATOR_HOST: &str = "10.0.2.2";
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1_000;
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;
pub const DEFAULT_SCAN_DEADLINE_MS: u64 = 5_000;

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Build fingerprint used by the emulator heuristic.
    #[serde(default)]
    pub device: Option<BuildFingerprint>,

    /// Verbosity reduction requested on the command line.
    #[serde(skip)]
    pub quiet: u8,

    /// Keeps the resolution cache in memory only.
    ///
    /// Nothing is read from or written to the private storage area.
    #[serde(skip)]
    pub no_cache: bool,

    /// Forces the emulator verdict instead of matching the build fingerprint.
    #[serde(skip)]
    pub emulator_override: Option<bool>,
}

/// Knobs of the endpoint resolution state machine.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct ResolverConfig {
    /// Port the backend listens on, used for probing and for the API base URL.
    pub port: u16,
    /// Host used when neither the cache nor the subnet scan produce one.
    pub fallback_host: String,
    /// Loopback alias of the development machine as seen from an emulator.
    pub emulator_host: String,
    pub probe_timeout_ms: u64,
    /// Upper bound on concurrent connection attempts during a scan.
    pub max_in_flight: usize,
    /// Wall-clock cap for a whole subnet scan.
    pub scan_deadline_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            fallback_host: DEFAULT_FALLBACK_HOST.to_string(),
            emulator_host: DEFAULT_EMULATOR_HOST.to_string(),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            scan_deadline_ms: DEFAULT_SCAN_DEADLINE_MS,
        }
    }
}

impl ResolverConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn scan_deadline(&self) -> Duration {
        Duration::from_millis(self.scan_deadline_ms)
    }

    /// Time a full /24 sweep takes when every probe runs into its timeout.
    pub fn worst_case_sweep(&self) -> Duration {
        let hosts: u64 = u64::from(LAST_HOST_OCTET - FIRST_HOST_OCTET) + 1;
        let rounds: u64 = hosts.div_ceil(self.max_in_flight.max(1) as u64);
        Duration::from_millis(rounds.saturating_mul(self.probe_timeout_ms))
    }

    /// Whether the scan deadline leaves room for a sweep of unresponsive hosts.
    pub fn sweep_fits_deadline(&self) -> bool {
        self.worst_case_sweep() <= self.scan_deadline()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid {
                key: "resolver.port",
                reason: "port 0 cannot be connected to".to_string(),
            });
        }
        if self.max_in_flight == 0 {
            return Err(ConfigError::Invalid {
                key: "resolver.max_in_flight",
                reason: "at least one probe must be allowed in flight".to_string(),
            });
        }
        if self.probe_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "resolver.probe_timeout_ms",
                reason: "timeout must be positive".to_string(),
            });
        }
        if self.fallback_host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "resolver.fallback_host",
                reason: "host cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Overrides the platform data directory holding `network_prefs.toml`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Loads the configuration from `path`, or from the platform location when
    /// no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(explicit) => Self::load_file(explicit),
            None => match default_config_path() {
                Some(candidate) if candidate.is_file() => Self::load_file(&candidate),
                Some(candidate) => {
                    debug!("No config file at {}, using defaults", candidate.display());
                    Ok(Self::default())
                }
                None => Ok(Self::default()),
            },
        }
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let raw: String = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.resolver.validate()?;
        if !cfg.resolver.sweep_fits_deadline() {
            warn!(
                "Scan deadline of {}ms is shorter than a worst-case sweep of {}ms, \
                 hosts late in the subnet may never be probed",
                cfg.resolver.scan_deadline_ms,
                cfg.resolver.worst_case_sweep().as_millis()
            );
        }
        debug!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }

    /// Directory holding the durable resolution cache.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.storage
            .data_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "pawprobe", "pawprobe")
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
