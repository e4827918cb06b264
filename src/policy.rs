// Uplink Manager - Priority Policy
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Category-based ranking of candidate connections.
//!
//! The table maps each [`Category`] to the route metric the controller
//! installs for it. Lower metrics are preferred; the ordering is recomputed
//! on every selection pass because registry contents change between passes.

use serde::{Deserialize, Serialize};

use crate::models::{Category, Connection};

/// Category → route metric table, fixed once the controller is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityTable {
    #[serde(default = "default_cellular_5g")]
    pub cellular_5g: u32,
    #[serde(default = "default_cellular_4g")]
    pub cellular_4g: u32,
    #[serde(default = "default_wifi")]
    pub wifi: u32,
    #[serde(default = "default_ethernet")]
    pub ethernet: u32,
    /// Rank for categories without an entry of their own.
    #[serde(default = "default_unrecognized")]
    pub unrecognized: u32,
}

fn default_cellular_5g() -> u32 {
    100
}

fn default_cellular_4g() -> u32 {
    200
}

fn default_wifi() -> u32 {
    300
}

fn default_ethernet() -> u32 {
    400
}

fn default_unrecognized() -> u32 {
    999
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self {
            cellular_5g: default_cellular_5g(),
            cellular_4g: default_cellular_4g(),
            wifi: default_wifi(),
            ethernet: default_ethernet(),
            unrecognized: default_unrecognized(),
        }
    }
}

impl PriorityTable {
    /// Route metric for a category.
    pub fn metric_for(&self, category: Category) -> u32 {
        match category {
            Category::Cellular5g => self.cellular_5g,
            Category::Cellular4g => self.cellular_4g,
            Category::Wifi => self.wifi,
            Category::Ethernet => self.ethernet,
            Category::Other => self.unrecognized,
        }
    }

    /// Rank of a connection; lower sorts first.
    pub fn rank(&self, connection: &Connection) -> u32 {
        self.metric_for(connection.category)
    }

    /// Order candidates by rank. The sort is stable, so ties keep
    /// enumeration order.
    pub fn order(&self, mut connections: Vec<Connection>) -> Vec<Connection> {
        connections.sort_by_key(|c| self.rank(c));
        connections
    }
}
