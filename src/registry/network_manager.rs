// Uplink Manager - NetworkManager Registry
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! [`ConnectionRegistry`] backed by NetworkManager on the system D-Bus.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};
use zbus::proxy::CacheProperties;
use zbus::zvariant::{ObjectPath, Value};

use super::proxies::{
    DeviceProxy, Ip4ConfigProxy, NetworkManagerProxy, SettingsConnectionProxy, SettingsProxy,
};
use super::wire::{self, WireSettings};
use super::{ConnectionRegistry, MetricUpdate};
use crate::models::{
    Connection, Device, DeviceState, DeviceType, Error, RegistryConfig, Result, NM_SERVICE_NAME,
};

const SETTINGS_CONNECTION_IFACE: &str = "org.freedesktop.NetworkManager.Settings.Connection";

/// NetworkManager client. The bus connection is opened lazily and reused,
/// so a registry that is down at startup is retried on the next call.
pub struct NmRegistry {
    bus: OnceCell<zbus::Connection>,
    call_timeout: Duration,
}

impl NmRegistry {
    /// Create a new registry client.
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            bus: OnceCell::new(),
            call_timeout: config.call_timeout(),
        }
    }

    /// Connect to the system bus, or reuse the existing connection.
    async fn bus(&self) -> Result<&zbus::Connection> {
        self.bus
            .get_or_try_init(|| async {
                match zbus::Connection::system().await {
                    Ok(conn) => {
                        debug!("Connected to system D-Bus");
                        Ok(conn)
                    }
                    Err(e) => {
                        error!("Failed to connect to system D-Bus: {}", e);
                        Err(Error::RegistryUnavailable(e.to_string()))
                    }
                }
            })
            .await
    }

    /// Run a registry operation under the call timeout.
    async fn bounded<T>(&self, operation: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Registry call '{}' timed out", operation);
                Err(Error::timeout(operation, self.call_timeout.as_secs()))
            }
        }
    }

    async fn settings_proxy<'a>(
        &self,
        bus: &zbus::Connection,
        path: &'a str,
    ) -> Result<SettingsConnectionProxy<'a>> {
        Ok(SettingsConnectionProxy::builder(bus)
            .path(path)?
            .cache_properties(CacheProperties::No)
            .build()
            .await?)
    }

    async fn read_settings(&self, bus: &zbus::Connection, path: &str) -> Result<WireSettings> {
        let proxy = self.settings_proxy(bus, path).await?;
        Ok(proxy.get_settings().await?)
    }

    async fn enumerate(&self) -> Result<Vec<Connection>> {
        let bus = self.bus().await?;
        let settings = SettingsProxy::new(bus).await?;
        let paths = settings.list_connections().await?;

        let mut connections = Vec::with_capacity(paths.len());
        for path in paths {
            // A connection deleted mid-enumeration must not fail the whole listing
            let raw = match self.read_settings(bus, path.as_str()).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Skipping connection {}: {}", path.as_str(), e);
                    continue;
                }
            };
            match wire::decode_settings(&raw) {
                Some(decoded) => connections.push(Connection::from_settings(path.as_str(), &decoded)),
                None => warn!("Skipping connection {}: settings carry no id", path.as_str()),
            }
        }

        debug!("Enumerated {} connections", connections.len());
        Ok(connections)
    }

    async fn find(&self, connection_id: &str) -> Result<Connection> {
        self.enumerate()
            .await?
            .into_iter()
            .find(|c| c.id == connection_id)
            .ok_or_else(|| Error::ConnectionNotFound(connection_id.to_string()))
    }

    async fn write_metric(&self, connection_id: &str, metric: u32) -> Result<MetricUpdate> {
        let target = self.find(connection_id).await?;
        let bus = self.bus().await?;
        let raw = self.read_settings(bus, &target.path).await?;

        let mut settings = wire::decode_settings(&raw)
            .ok_or_else(|| Error::ConnectionNotFound(connection_id.to_string()))?;
        if !settings.ipv4.set_route_metric(metric) {
            debug!("Route metric of {} already {}", connection_id, metric);
            return Ok(MetricUpdate::Unchanged);
        }

        let value = wire::route_metric_value(metric);
        let update = wire::with_route_metric(&raw, &value);
        bus.call_method(
            Some(NM_SERVICE_NAME),
            target.path.as_str(),
            Some(SETTINGS_CONNECTION_IFACE),
            "Update",
            &(update,),
        )
        .await
        .map_err(|e| Error::RegistryError(format!("{}: {}", connection_id, e)))?;

        info!("Set route metric of {} to {}", connection_id, metric);
        Ok(MetricUpdate::Applied)
    }

    async fn request_activation(&self, connection_id: &str) -> Result<()> {
        let target = self.find(connection_id).await?;
        let bus = self.bus().await?;
        let nm = NetworkManagerProxy::new(bus).await?;

        let connection_path = ObjectPath::try_from(target.path.as_str())
            .map_err(|e| Error::activation_failed(connection_id, e.to_string()))?;
        let any = ObjectPath::from_static_str_unchecked("/");

        let active = nm
            .activate_connection(&connection_path, &any, &any)
            .await
            .map_err(|e| Error::activation_failed(connection_id, e.to_string()))?;

        debug!("Activation of {} requested ({})", connection_id, active.as_str());
        Ok(())
    }

    async fn read_devices(&self) -> Result<Vec<Device>> {
        let bus = self.bus().await?;
        let nm = NetworkManagerProxy::new(bus).await?;
        let paths = nm.get_devices().await?;

        let mut devices = Vec::with_capacity(paths.len());
        for path in paths {
            match self.read_device(bus, path.as_str()).await {
                Ok(device) => devices.push(device),
                Err(e) => warn!("Skipping device {}: {}", path.as_str(), e),
            }
        }
        Ok(devices)
    }

    async fn read_device(&self, bus: &zbus::Connection, path: &str) -> Result<Device> {
        let proxy = DeviceProxy::builder(bus)
            .path(path)?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;

        let device_type = DeviceType::from_code(proxy.device_type().await?);
        let state = DeviceState::from_code(proxy.state().await?);
        let mut device = Device::new(device_type, state);

        match proxy.interface_name().await {
            Ok(name) if !name.is_empty() => device = device.with_interface(name),
            Ok(_) => {}
            Err(e) => debug!("No interface name for {}: {}", path, e),
        }

        if state.is_activated() {
            let lookup = self.read_ip4_address(bus, &proxy).await;
            device = attach_address(device, lookup, path);
        }

        Ok(device)
    }

    async fn read_ip4_address(
        &self,
        bus: &zbus::Connection,
        device: &DeviceProxy<'_>,
    ) -> Result<Option<String>> {
        let config_path = device.ip4_config().await?;
        if config_path.as_str() == "/" {
            return Ok(None);
        }

        let ip4 = Ip4ConfigProxy::builder(bus)
            .path(config_path.as_str())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;

        let addresses = ip4.address_data().await?;
        Ok(addresses
            .first()
            .and_then(|entry| entry.get("address"))
            .and_then(|value| match &**value {
                Value::Str(s) => Some(s.as_str().to_string()),
                _ => None,
            }))
    }
}

/// Apply an address lookup to a device. A failed lookup keeps the device
/// without an address.
fn attach_address(device: Device, lookup: Result<Option<String>>, path: &str) -> Device {
    match lookup {
        Ok(Some(ip)) => device.with_ip(ip),
        Ok(None) => device,
        Err(e) => {
            debug!("Address lookup failed for {}: {}", path, e);
            device
        }
    }
}

#[async_trait]
impl ConnectionRegistry for NmRegistry {
    async fn list_connections(&self) -> Result<Vec<Connection>> {
        self.bounded("list connections", self.enumerate()).await
    }

    async fn set_priority(&self, connection_id: &str, metric: u32) -> Result<MetricUpdate> {
        self.bounded("set route metric", self.write_metric(connection_id, metric))
            .await
    }

    async fn activate(&self, connection_id: &str) -> Result<()> {
        self.bounded("activate connection", self.request_activation(connection_id))
            .await
    }

    async fn device_states(&self) -> Result<Vec<Device>> {
        self.bounded("read device states", self.read_devices()).await
    }
}
