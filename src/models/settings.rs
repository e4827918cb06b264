// Uplink Manager - Connection Settings
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Typed view of the registry's per-connection settings.
//!
//! Only the fields the controller reads or writes are modelled; everything
//! else in the registry's settings document is carried through untouched by
//! the registry adapter.

use serde::{Deserialize, Serialize};

/// Settings of one configured connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// The `connection` section.
    pub connection: ConnectionSection,
    /// The `ipv4` section.
    #[serde(default)]
    pub ipv4: Ipv4Settings,
}

/// Identity of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSection {
    /// Human-readable unique name.
    pub id: String,
    /// Registry UUID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Transport type (e.g. "gsm", "802-11-wireless", "802-3-ethernet").
    #[serde(rename = "type")]
    pub kind: String,
    /// Interface the connection is bound to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_name: Option<String>,
}

/// IPv4 settings relevant to uplink ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Settings {
    /// Address configuration method ("auto", "manual", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Route metric for routes of this connection; `None` = registry default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_metric: Option<u32>,
}

impl Ipv4Settings {
    /// Set the route metric. Returns `false` when the value was already in place.
    pub fn set_route_metric(&mut self, metric: u32) -> bool {
        if self.route_metric == Some(metric) {
            return false;
        }
        self.route_metric = Some(metric);
        true
    }
}
