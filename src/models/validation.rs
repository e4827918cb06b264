// Uplink Manager - Validation Utilities
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Input validation utilities for configuration values.

use std::net::IpAddr;
use std::str::FromStr;

use super::error::{Error, Result};

/// Baud rates accepted for the modem serial port.
pub const STANDARD_BAUD_RATES: [u32; 8] = [9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600];

/// Validate an IP address string (v4 or v6).
pub fn validate_ip(s: &str) -> Result<IpAddr> {
    IpAddr::from_str(s).map_err(|_| Error::InvalidIpAddress(s.to_string()))
}

/// Validate a hostname.
pub fn validate_hostname(s: &str) -> Result<String> {
    if s.is_empty() || s.len() > 253 {
        return Err(Error::InvalidHostname(format!(
            "Hostname must be 1-253 characters: {}",
            s
        )));
    }

    // Check each label
    for label in s.split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(Error::InvalidHostname(format!(
                "Label must be 1-63 characters: {}",
                label
            )));
        }

        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(Error::InvalidHostname(format!(
                "Invalid characters in label: {}",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(Error::InvalidHostname(format!(
                "Label cannot start or end with hyphen: {}",
                label
            )));
        }
    }

    Ok(s.to_lowercase())
}

/// Validate a reachability probe target: an IP address or a hostname.
///
/// The value ends up as a `ping` argument, so anything that could be read
/// as an option is rejected here.
pub fn validate_probe_host(s: &str) -> Result<String> {
    let s = s.trim();
    if validate_ip(s).is_ok() {
        return Ok(s.to_string());
    }
    validate_hostname(s)
}

/// Validate a modem baud rate.
pub fn validate_baud_rate(rate: u32) -> Result<u32> {
    if !STANDARD_BAUD_RATES.contains(&rate) {
        return Err(Error::InvalidConfig(format!(
            "Unsupported baud rate: {}",
            rate
        )));
    }
    Ok(rate)
}

/// Validate a duration-like setting that must be non-zero.
pub fn validate_non_zero(name: &str, value: u64) -> Result<u64> {
    if value == 0 {
        return Err(Error::InvalidConfig(format!("{} must be greater than zero", name)));
    }
    Ok(value)
}
