// Uplink Manager - Connection Registry
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Connection registry adapter.
//!
//! The registry is the network configuration service that owns connection
//! profiles and devices. The controller only talks to it through
//! [`ConnectionRegistry`]; the production implementation speaks to
//! NetworkManager over the system D-Bus.

mod network_manager;
mod proxies;
mod wire;

use async_trait::async_trait;

use crate::models::{Connection, Device, Result};

pub use network_manager::NmRegistry;

/// Outcome of a route-metric write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUpdate {
    /// The registry stored a new value.
    Applied,
    /// The value was already in place; nothing was written.
    Unchanged,
}

/// Operations the controller needs from the network configuration service.
///
/// Implementations convert every transport failure into a typed [`Error`]
/// and bound each call with their own timeout.
///
/// [`Error`]: crate::models::Error
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Enumerate configured connections in registry order.
    ///
    /// An empty registry is an empty list, not an error.
    async fn list_connections(&self) -> Result<Vec<Connection>>;

    /// Write `metric` into the connection's IPv4 route-metric field.
    async fn set_priority(&self, connection_id: &str, metric: u32) -> Result<MetricUpdate>;

    /// Ask the registry to bring a connection up. Does not wait for the
    /// link to settle; poll [`device_states`](Self::device_states) for that.
    async fn activate(&self, connection_id: &str) -> Result<()>;

    /// Snapshot every device. A failed address lookup leaves that device's
    /// `ip_address` empty instead of failing the call.
    async fn device_states(&self) -> Result<Vec<Device>>;
}
