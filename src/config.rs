//! Configuration for the bridge
//!
//! Stored as TOML. Every field has a default, so a missing file or a
//! partial one is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use rigdial_transport::{default_devices, SupportedDevice};
use serde::{Deserialize, Serialize};

use crate::mapper::StepPolicy;
use crate::radio::flrig::DEFAULT_URL;
use crate::rigctl::DEFAULT_BIND;

/// Remote radio endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioConfig {
    /// flrig XML-RPC URL
    #[serde(default = "default_radio_url")]
    pub url: String,
    /// Per-call timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_radio_url() -> String {
    DEFAULT_URL.to_string()
}
fn default_timeout_ms() -> u64 {
    2000
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            url: default_radio_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl RadioConfig {
    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Status bridge and query server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Whether to poll the radio and serve status queries at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Listen address for status queries
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_true() -> bool {
    true
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: default_bind(),
        }
    }
}

/// Jog tuning step sizes
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StepConfig {
    /// Fine step in Hz (initial)
    #[serde(default = "default_fine")]
    pub fine_hz: u32,
    /// Coarse step in Hz
    #[serde(default = "default_coarse")]
    pub coarse_hz: u32,
}

fn default_fine() -> u32 {
    10
}
fn default_coarse() -> u32 {
    1000
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            fine_hz: default_fine(),
            coarse_hz: default_coarse(),
        }
    }
}

impl StepConfig {
    /// Fresh step policy starting on the fine step
    pub fn policy(&self) -> StepPolicy {
        StepPolicy::new(self.fine_hz, self.coarse_hz)
    }
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigdialConfig {
    #[serde(default)]
    pub radio: RadioConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub steps: StepConfig,
    /// Devices to bind; defaults to the built-in table
    #[serde(default = "default_devices")]
    pub devices: Vec<SupportedDevice>,
}

impl Default for RigdialConfig {
    fn default() -> Self {
        Self {
            radio: RadioConfig::default(),
            status: StatusConfig::default(),
            steps: StepConfig::default(),
            devices: default_devices(),
        }
    }
}

impl RigdialConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rigdial")
            .join("rigdial.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: RigdialConfig = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: RigdialConfig = toml::from_str("").unwrap();
        assert_eq!(config.radio.url, "http://127.0.0.1:12345/RPC2");
        assert_eq!(config.radio.timeout(), Duration::from_secs(2));
        assert!(config.status.enabled);
        assert_eq!(config.status.bind, "127.0.0.1:4532");
        assert_eq!(config.steps.fine_hz, 10);
        assert_eq!(config.steps.coarse_hz, 1000);
        assert_eq!(config.devices, default_devices());
    }

    #[test]
    fn test_partial_sections() {
        let config: RigdialConfig = toml::from_str(
            r#"
[status]
enabled = false

[steps]
coarse_hz = 500
"#,
        )
        .unwrap();
        assert!(!config.status.enabled);
        assert_eq!(config.status.bind, "127.0.0.1:4532");
        assert_eq!(config.steps.fine_hz, 10);
        assert_eq!(config.steps.policy().current(), 10);
        assert_eq!(config.steps.coarse_hz, 500);
    }

    #[test]
    fn test_device_override() {
        let config: RigdialConfig = toml::from_str(
            r#"
[[devices]]
manufacturer = "Contour Design"
product = "ShuttlePRO v2"
vendor_id = 0x0b33
product_id = 0x0030
"#,
        )
        .unwrap();
        assert_eq!(config.devices.len(), 1);
        assert_eq!(config.devices[0].product_id, 0x0030);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rigdial.toml");

        let mut config = RigdialConfig::load(&path).unwrap();
        assert_eq!(config.devices.len(), 2);
        config.radio.url = "http://10.0.0.5:12345/RPC2".into();
        config.steps.coarse_hz = 100;
        config.save(&path).unwrap();

        let loaded = RigdialConfig::load(&path).unwrap();
        assert_eq!(loaded.radio.url, "http://10.0.0.5:12345/RPC2");
        assert_eq!(loaded.steps.coarse_hz, 100);
        assert_eq!(loaded.devices, default_devices());
    }

    #[test]
    fn test_bad_toml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rigdial.toml");
        std::fs::write(&path, "[radio\nurl = 3").unwrap();
        let err = RigdialConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }
}
