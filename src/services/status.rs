// Uplink Manager - Status Reporter
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Assembles [`StatusSnapshot`]s from controller state and live device data.

use chrono::Local;
use std::sync::Arc;
use tracing::debug;

use super::controller::ControllerState;
use super::probe::ConnectivityProbe;
use crate::models::{DeviceType, Result, StatusSnapshot};
use crate::registry::ConnectionRegistry;

/// Read-only status assembly; never activates or re-prioritises anything.
pub struct StatusReporter {
    registry: Arc<dyn ConnectionRegistry>,
    probe: Arc<dyn ConnectivityProbe>,
}

impl StatusReporter {
    pub fn new(registry: Arc<dyn ConnectionRegistry>, probe: Arc<dyn ConnectivityProbe>) -> Self {
        Self { registry, probe }
    }

    /// Build a snapshot for the given controller state.
    pub async fn snapshot(&self, state: &ControllerState) -> Result<StatusSnapshot> {
        let devices = self.registry.device_states().await?;

        let signal_quality = if devices.iter().any(|d| d.device_type == DeviceType::Cellular) {
            Some(self.probe.signal_quality().await.to_string())
        } else {
            None
        };

        debug!("Status snapshot: {} devices", devices.len());
        Ok(StatusSnapshot {
            timestamp: Local::now(),
            active_connection_id: state.active_connection_id.clone(),
            phase: state.phase,
            monitoring_enabled: state.monitoring_enabled,
            devices,
            signal_quality,
        })
    }
}
