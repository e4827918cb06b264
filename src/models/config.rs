// Uplink Manager - Application Configuration
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Daemon configuration model.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::validation::{validate_baud_rate, validate_non_zero, validate_probe_host};
use super::{Error, Result, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use crate::policy::PriorityTable;

/// Background monitoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Start the monitor after the initial selection pass.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds between monitoring ticks.
    #[serde(default = "default_monitor_interval")]
    pub interval_secs: u64,

    /// Also probe the reference host when a device reports activated.
    #[serde(default)]
    pub require_reachability: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_monitor_interval(),
            require_reachability: false,
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Connectivity probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Reference host for reachability checks.
    #[serde(default = "default_probe_host")]
    pub host: String,

    /// Overall bound for one reachability check, in seconds.
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,

    /// Echo requests sent per reachability check.
    #[serde(default = "default_probe_attempts")]
    pub attempts: u32,

    /// Tool queried for cellular signal quality.
    #[serde(default = "default_signal_tool")]
    pub signal_tool: String,

    /// Modem index passed to the signal tool.
    #[serde(default)]
    pub modem_index: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host: default_probe_host(),
            timeout_secs: default_probe_timeout(),
            attempts: default_probe_attempts(),
            signal_tool: default_signal_tool(),
            modem_index: 0,
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Registry (NetworkManager) client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Bound for each D-Bus call, in seconds.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_call_timeout(),
        }
    }
}

impl RegistryConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

/// Cellular modem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModemConfig {
    /// Run modem bring-up at startup.
    #[serde(default)]
    pub enabled: bool,

    /// Serial device of the modem's AT port.
    #[serde(default = "default_modem_port")]
    pub port: PathBuf,

    /// Serial baud rate.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Bound for one AT command, in seconds.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Delay after opening the port before the first command, in milliseconds.
    #[serde(default = "default_settle_millis")]
    pub settle_millis: u64,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_modem_port(),
            baud_rate: default_baud_rate(),
            command_timeout_secs: default_command_timeout(),
            settle_millis: default_settle_millis(),
        }
    }
}

impl ModemConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }
}

fn default_true() -> bool {
    true
}

fn default_monitor_interval() -> u64 {
    30
}

fn default_probe_host() -> String {
    "8.8.8.8".to_string()
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_probe_attempts() -> u32 {
    3
}

fn default_signal_tool() -> String {
    "mmcli".to_string()
}

fn default_call_timeout() -> u64 {
    25
}

fn default_modem_port() -> PathBuf {
    PathBuf::from("/dev/ttyUSB2")
}

fn default_baud_rate() -> u32 {
    115200
}

fn default_command_timeout() -> u64 {
    5
}

fn default_settle_millis() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Monitoring loop.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Connectivity probe.
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Registry client.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Cellular modem.
    #[serde(default)]
    pub modem: ModemConfig,

    /// Category route metrics.
    #[serde(default)]
    pub priorities: PriorityTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            monitor: MonitorConfig::default(),
            probe: ProbeConfig::default(),
            registry: RegistryConfig::default(),
            modem: ModemConfig::default(),
            priorities: PriorityTable::default(),
        }
    }
}

impl AppConfig {
    /// Default configuration file location under the XDG config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigReadFailed(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load from an explicit path, or from the default location if it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Check every value the daemon depends on.
    pub fn validate(&self) -> Result<()> {
        validate_non_zero("monitor.interval_secs", self.monitor.interval_secs)?;
        validate_non_zero("probe.timeout_secs", self.probe.timeout_secs)?;
        validate_non_zero("probe.attempts", u64::from(self.probe.attempts))?;
        validate_non_zero("registry.call_timeout_secs", self.registry.call_timeout_secs)?;
        validate_non_zero("modem.command_timeout_secs", self.modem.command_timeout_secs)?;
        validate_probe_host(&self.probe.host)?;
        validate_baud_rate(self.modem.baud_rate)?;

        if self.modem.port.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("modem.port must not be empty".to_string()));
        }
        if self.probe.signal_tool.trim().is_empty() {
            return Err(Error::InvalidConfig("probe.signal_tool must not be empty".to_string()));
        }
        Ok(())
    }
}
