// Uplink Manager - Shared Models
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! # Uplink Manager Models
//!
//! Typed records shared by the registry adapter, the probe and the
//! failover controller:
//!
//! - **Connection**: configured attachment points and their category
//! - **Settings**: typed view of a connection's registry settings
//! - **Device**: live interfaces and their state
//! - **Status**: point-in-time snapshot for external consumers
//! - **Config**: daemon configuration
//! - **Error**: shared error types

pub mod config;
pub mod connection;
pub mod device;
pub mod error;
pub mod settings;
pub mod status;
pub mod validation;

// Re-export main types for convenience
pub use config::{AppConfig, ModemConfig, ProbeConfig, RegistryConfig};
pub use connection::{Category, Connection};
pub use device::{Device, DeviceState, DeviceType};
pub use error::{Error, Result};
pub use settings::ConnectionSettings;
pub use status::{ControllerPhase, StatusSnapshot};

/// Configuration directory name (under XDG_CONFIG_HOME).
pub const CONFIG_DIR_NAME: &str = "uplink-manager";

/// Configuration file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Well-known name of the NetworkManager service.
pub const NM_SERVICE_NAME: &str = "org.freedesktop.NetworkManager";

/// Sentinel returned when no signal reading is available.
pub const SIGNAL_UNAVAILABLE: &str = "N/A";
