//! Emulator detection.
//!
//! An emulator reaches the development machine through a fixed loopback
//! alias, so detecting one skips the whole network search.

use std::env;

use pawprobe_common::config::Config;
use pawprobe_common::device::BuildFingerprint;
use tracing::debug;

/// Environment variable forcing the verdict: `1`/`true` or `0`/`false`.
pub const EMULATOR_OVERRIDE_VAR: &str = "PAWPROBE_EMULATOR";

pub trait EnvironmentProbe: Send + Sync {
    fn is_emulator(&self) -> bool;
}

/// Build-fingerprint heuristic with an optional explicit override.
#[derive(Debug, Clone, Default)]
pub struct FingerprintHeuristic {
    fingerprint: Option<BuildFingerprint>,
    forced: Option<bool>,
}

impl FingerprintHeuristic {
    pub fn new(fingerprint: Option<BuildFingerprint>) -> Self {
        Self {
            fingerprint,
            forced: None,
        }
    }

    /// The `[device]` fingerprint and the override carried by `cfg`.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.device.clone()).with_override(cfg.emulator_override)
    }

    pub fn with_override(mut self, forced: Option<bool>) -> Self {
        self.forced = forced;
        self
    }
}

impl EnvironmentProbe for FingerprintHeuristic {
    fn is_emulator(&self) -> bool {
        if let Some(forced) = self.forced {
            debug!("Emulator verdict forced to {forced}");
            return forced;
        }
        self.fingerprint
            .as_ref()
            .is_some_and(BuildFingerprint::looks_emulated)
    }
}

/// A verdict decided up front.
#[derive(Debug, Clone, Copy)]
pub struct StaticEnvironment(pub bool);

impl EnvironmentProbe for StaticEnvironment {
    fn is_emulator(&self) -> bool {
        self.0
    }
}

/// The verdict forced through [`EMULATOR_OVERRIDE_VAR`], if it is set to a
/// recognised flag.
pub fn override_from_env() -> Option<bool> {
    env::var(EMULATOR_OVERRIDE_VAR)
        .ok()
        .and_then(|raw| parse_flag(&raw))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
