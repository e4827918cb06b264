// Uplink Manager - Connectivity Probe
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Connectivity probe adapter.
//!
//! Reachability is checked with the system `ping`, signal quality with
//! ModemManager's `mmcli`. Both are best-effort: failures and timeouts turn
//! into a negative or unavailable result, never an error.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::models::{ProbeConfig, SIGNAL_UNAVAILABLE};

/// Bound for a signal-quality query.
const SIGNAL_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Signal reading for a cellular link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalQuality {
    /// Raw text reported by the querying tool.
    Reading(String),
    /// No reading could be obtained.
    Unavailable,
}

impl SignalQuality {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Reading(text) => text,
            Self::Unavailable => SIGNAL_UNAVAILABLE,
        }
    }
}

impl fmt::Display for SignalQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Link-health checks used by the controller and the status reporter.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Whether `host` answers within `timeout` across `attempts` requests.
    async fn check_reachable(&self, host: &str, timeout: Duration, attempts: u32) -> bool;

    /// Current cellular signal reading.
    async fn signal_quality(&self) -> SignalQuality;
}

/// Probe backed by system tools.
pub struct SystemProbe {
    signal_tool: String,
    modem_index: u32,
}

impl SystemProbe {
    /// Create a new system probe.
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            signal_tool: config.signal_tool.clone(),
            modem_index: config.modem_index,
        }
    }
}

#[async_trait]
impl ConnectivityProbe for SystemProbe {
    async fn check_reachable(&self, host: &str, timeout: Duration, attempts: u32) -> bool {
        let mut ping = Command::new("ping");
        let count = attempts.max(1).to_string();
        ping.args(["-c", count.as_str(), "-W", "1", "--", host])
            .kill_on_drop(true);

        match tokio::time::timeout(timeout, ping.output()).await {
            Ok(Ok(output)) => {
                let reachable = output.status.success();
                debug!("Probe: {} {}", host, if reachable { "reachable" } else { "unreachable" });
                reachable
            }
            Ok(Err(e)) => {
                debug!("Ping command failed: {}", e);
                false
            }
            Err(_) => {
                warn!("Probe: ping {} timed out after {}s", host, timeout.as_secs());
                false
            }
        }
    }

    async fn signal_quality(&self) -> SignalQuality {
        let mut query = Command::new(&self.signal_tool);
        query.arg("-m").arg(self.modem_index.to_string()).kill_on_drop(true);

        match tokio::time::timeout(SIGNAL_QUERY_TIMEOUT, query.output()).await {
            Ok(Ok(output)) if output.status.success() => {
                parse_signal_output(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(Ok(output)) => {
                debug!("{} exited with {}", self.signal_tool, output.status);
                SignalQuality::Unavailable
            }
            Ok(Err(e)) => {
                debug!("{} unavailable: {}", self.signal_tool, e);
                SignalQuality::Unavailable
            }
            Err(_) => {
                warn!("{} timed out", self.signal_tool);
                SignalQuality::Unavailable
            }
        }
    }
}

/// Extract the signal line from `mmcli -m N` output, falling back to the
/// whole report when no such line exists.
fn parse_signal_output(stdout: &str) -> SignalQuality {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return SignalQuality::Unavailable;
    }

    let signal_line = trimmed
        .lines()
        .map(|line| line.rsplit('|').next().unwrap_or(line).trim())
        .find(|line| line.starts_with("signal quality:"));

    match signal_line {
        Some(line) => SignalQuality::Reading(line.trim_start_matches("signal quality:").trim().to_string()),
        None => SignalQuality::Reading(trimmed.to_string()),
    }
}
