// Uplink Manager - Error Types
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Shared error types for the uplink manager.

use thiserror::Error;

/// Result type alias for uplink manager operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for uplink manager operations.
#[derive(Debug, Error)]
pub enum Error {
    // ========================================
    // Registry Errors
    // ========================================
    #[error("Connection registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Activation failed: {connection} - {reason}")]
    ActivationFailed { connection: String, reason: String },

    #[error("Registry rejected settings update: {0}")]
    RegistryError(String),

    // ========================================
    // Controller Errors
    // ========================================
    #[error("No available connection could be activated")]
    NoAvailableConnection,

    #[error("{operation} timed out after {secs}s")]
    AdapterTimeout { operation: String, secs: u64 },

    // ========================================
    // Modem Errors
    // ========================================
    #[error("Modem command failed: {command} - {response}")]
    ModemCommandFailed { command: String, response: String },

    // ========================================
    // Configuration Errors
    // ========================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read configuration: {0}")]
    ConfigReadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParseFailed(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid hostname: {0}")]
    InvalidHostname(String),

    // ========================================
    // System Errors
    // ========================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new activation failed error.
    pub fn activation_failed(connection: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ActivationFailed {
            connection: connection.into(),
            reason: reason.into(),
        }
    }

    /// Create a new adapter timeout error.
    pub fn timeout(operation: impl Into<String>, secs: u64) -> Self {
        Self::AdapterTimeout {
            operation: operation.into(),
            secs,
        }
    }

    /// Check if the failed operation may succeed when simply retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RegistryUnavailable(_) | Self::AdapterTimeout { .. } | Self::NoAvailableConnection
        )
    }

    /// Short machine-friendly name of the error kind, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RegistryUnavailable(_) => "registry_unavailable",
            Self::ConnectionNotFound(_) => "connection_not_found",
            Self::ActivationFailed { .. } => "activation_error",
            Self::RegistryError(_) => "registry_error",
            Self::NoAvailableConnection => "no_available_connection",
            Self::AdapterTimeout { .. } => "adapter_timeout",
            Self::ModemCommandFailed { .. } => "modem_command_failed",
            Self::InvalidConfig(_)
            | Self::ConfigReadFailed(_)
            | Self::ConfigParseFailed(_)
            | Self::InvalidIpAddress(_)
            | Self::InvalidHostname(_) => "config_error",
            Self::Io(_) => "io_error",
        }
    }
}

// Transport-level D-Bus failures mean the configuration service could not be reached
impl From<zbus::Error> for Error {
    fn from(err: zbus::Error) -> Self {
        Error::RegistryUnavailable(err.to_string())
    }
}

// Convert from toml parse errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParseFailed(err.to_string())
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParseFailed(err.to_string())
    }
}
