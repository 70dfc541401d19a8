//! Build fingerprint of the device the client runs on.
//!
//! Emulator images ship with a recognisable set of build properties. Matching
//! on them is a heuristic, a physical device with a custom ROM can trip it,
//! which is why an explicit override exists one level up.

use serde::Deserialize;

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct BuildFingerprint {
    pub fingerprint: String,
    pub model: String,
    pub manufacturer: String,
    pub brand: String,
    pub device: String,
    pub product: String,
    pub hardware: String,
}

impl BuildFingerprint {
    /// Whether the build properties look like a virtualized development device.
    pub fn looks_emulated(&self) -> bool {
        self.fingerprint.starts_with("generic")
            || self.fingerprint.starts_with("unknown")
            || self.model.contains("google_sdk")
            || self.model.contains("Emulator")
            || self.model.contains("Android SDK built for x86")
            || self.manufacturer.contains("Genymotion")
            || (self.brand.starts_with("generic") && self.device.starts_with("generic"))
            || self.product == "google_sdk"
            || self.product.starts_with("sdk_gphone")
            || self.hardware == "goldfish"
            || self.hardware == "ranchu"
    }
}
