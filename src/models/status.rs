// Uplink Manager - Status Snapshot
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Point-in-time status of the controller and the devices it supervises.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::device::Device;

/// Phase of the failover controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControllerPhase {
    /// No selection attempted yet.
    #[default]
    Idle,
    /// Ranking candidates.
    Selecting,
    /// One candidate in flight.
    Activating,
    /// A connection is up and last known healthy.
    Active,
    /// The active connection is unhealthy; re-selection pending.
    Degraded,
    /// Every candidate failed in the last pass.
    NoLink,
}

impl ControllerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Selecting => "selecting",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Degraded => "degraded",
            Self::NoLink => "no_link",
        }
    }
}

impl fmt::Display for ControllerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status snapshot handed to external consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Wall-clock time the snapshot was taken.
    pub timestamp: DateTime<Local>,
    /// Connection the controller last activated.
    pub active_connection_id: Option<String>,
    /// Controller phase at snapshot time.
    pub phase: ControllerPhase,
    /// Whether the monitor task is running.
    pub monitoring_enabled: bool,
    /// Devices reported by the registry.
    pub devices: Vec<Device>,
    /// Cellular signal reading, when a cellular device is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_quality: Option<String>,
}

impl StatusSnapshot {
    /// Whether any device reports the activated state.
    pub fn has_activated_device(&self) -> bool {
        self.devices.iter().any(|d| d.state.is_activated())
    }

    /// Serialize to pretty JSON for structured output.
    pub fn to_json_pretty(&self) -> Result<String, super::Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status at {}", self.timestamp.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(
            f,
            "  Active connection: {}",
            self.active_connection_id.as_deref().unwrap_or("none")
        )?;
        writeln!(
            f,
            "  Controller: {} (monitoring {})",
            self.phase,
            if self.monitoring_enabled { "on" } else { "off" }
        )?;
        if let Some(signal) = &self.signal_quality {
            writeln!(f, "  Signal quality: {}", signal.lines().next().unwrap_or("N/A"))?;
        }
        writeln!(f, "  Devices:")?;
        for device in &self.devices {
            writeln!(
                f,
                "    - {} {}: {} ({})",
                device.device_type,
                device.interface.as_deref().unwrap_or("-"),
                device.state,
                device.ip_address.as_deref().unwrap_or("N/A"),
            )?;
        }
        Ok(())
    }
}
