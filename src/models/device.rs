// Uplink Manager - Device Model
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Live network interfaces as reported by the registry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of network device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Wired Ethernet adapter.
    Ethernet,
    /// Wireless (WiFi) adapter.
    Wifi,
    /// Cellular modem.
    Cellular,
    /// Unknown or other type.
    Unknown,
}

impl DeviceType {
    /// Map a NetworkManager `NMDeviceType` code.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Ethernet,
            2 => Self::Wifi,
            8 => Self::Cellular,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ethernet => "ethernet",
            Self::Wifi => "wifi",
            Self::Cellular => "cellular",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device state, mirroring NetworkManager's `NMDeviceState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    Unknown,
    Unmanaged,
    Unavailable,
    Disconnected,
    Prepare,
    Config,
    NeedAuth,
    IpConfig,
    IpCheck,
    Secondaries,
    Activated,
    Deactivating,
    Failed,
}

impl DeviceState {
    /// Map a NetworkManager `NMDeviceState` code.
    pub fn from_code(code: u32) -> Self {
        match code {
            10 => Self::Unmanaged,
            20 => Self::Unavailable,
            30 => Self::Disconnected,
            40 => Self::Prepare,
            50 => Self::Config,
            60 => Self::NeedAuth,
            70 => Self::IpConfig,
            80 => Self::IpCheck,
            90 => Self::Secondaries,
            100 => Self::Activated,
            110 => Self::Deactivating,
            120 => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Unmanaged => "unmanaged",
            Self::Unavailable => "unavailable",
            Self::Disconnected => "disconnected",
            Self::Prepare => "prepare",
            Self::Config => "config",
            Self::NeedAuth => "need_auth",
            Self::IpConfig => "ip_config",
            Self::IpCheck => "ip_check",
            Self::Secondaries => "secondaries",
            Self::Activated => "activated",
            Self::Deactivating => "deactivating",
            Self::Failed => "failed",
        }
    }

    pub fn is_activated(&self) -> bool {
        matches!(self, Self::Activated)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time snapshot of one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Kernel interface name (e.g. "wlan0"), when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    /// Device type.
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Current state.
    pub state: DeviceState,
    /// First IPv4 address; only present when activated and the lookup succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl Device {
    /// Create a device snapshot without an address.
    pub fn new(device_type: DeviceType, state: DeviceState) -> Self {
        Self {
            interface: None,
            device_type,
            state,
            ip_address: None,
        }
    }

    /// Attach an interface name.
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    /// Attach an IP address. Ignored unless the device is activated.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        if self.state.is_activated() {
            self.ip_address = Some(ip.into());
        }
        self
    }
}
