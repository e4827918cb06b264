// Uplink Manager - Cellular Modem Driver
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Cellular modem initialisation over the AT command port.
//!
//! The port is configured with `stty` and then driven as a plain async
//! stream, so [`AtSession`] works over any reader/writer pair.

use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::models::{Error, ModemConfig, Result};

/// Liveness check; the modem must answer it.
const CMD_ATTENTION: &str = "AT";
/// Switch the USB network function to ECM.
const CMD_USBNET_ECM: &str = "AT+QCFG=\"usbnet\",1";
/// Prefer 5G radio access where supported.
const CMD_PREFER_5G: &str = "AT+CNMP=71";

/// Line-oriented AT command session.
pub struct AtSession<T> {
    io: BufReader<T>,
    command_timeout: Duration,
}

impl<T: AsyncRead + AsyncWrite + Unpin> AtSession<T> {
    pub fn new(io: T, command_timeout: Duration) -> Self {
        Self {
            io: BufReader::new(io),
            command_timeout,
        }
    }

    /// Send one command and collect the response lines before the final
    /// `OK`. A final `ERROR` becomes [`Error::ModemCommandFailed`].
    ///
    /// The write and the read share one timeout.
    pub async fn command(&mut self, command: &str) -> Result<Vec<String>> {
        debug!("AT > {}", command);
        let limit = self.command_timeout;
        bounded(limit, format!("modem command {}", command), self.exchange(command)).await
    }

    async fn exchange(&mut self, command: &str) -> Result<Vec<String>> {
        let framed = format!("{}\r\n", command);
        self.io.get_mut().write_all(framed.as_bytes()).await?;
        self.io.get_mut().flush().await?;
        self.read_response(command).await
    }

    async fn read_response(&mut self, command: &str) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let mut raw = String::new();
            if self.io.read_line(&mut raw).await? == 0 {
                return Err(Error::ModemCommandFailed {
                    command: command.to_string(),
                    response: "port closed".to_string(),
                });
            }

            let line = raw.trim();
            // Blank separators and the modem's echo of our command
            if line.is_empty() || line == command {
                continue;
            }
            debug!("AT < {}", line);

            if line == "OK" {
                return Ok(lines);
            }
            if line == "ERROR" || line.starts_with("+CME ERROR") || line.starts_with("+CMS ERROR") {
                return Err(Error::ModemCommandFailed {
                    command: command.to_string(),
                    response: line.to_string(),
                });
            }
            lines.push(line.to_string());
        }
    }

    /// Run the initialisation sequence. Only the liveness check is
    /// mandatory; mode commands unsupported by the module are logged.
    pub async fn initialize(&mut self) -> Result<()> {
        self.command(CMD_ATTENTION).await?;

        for command in [CMD_USBNET_ECM, CMD_PREFER_5G] {
            if let Err(e) = self.command(command).await {
                warn!("Modem did not accept {}: {}", command, e);
            }
        }
        Ok(())
    }
}

/// Driver for the modem's serial AT port.
pub struct ModemDriver {
    config: ModemConfig,
}

impl ModemDriver {
    pub fn new(config: &ModemConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Open the AT port and put the modem into ECM / 5G-preferred mode.
    pub async fn initialize(&self) -> Result<()> {
        let port = self.config.port.as_path();
        info!("Initializing modem on {}", port.display());

        let limit = self.config.command_timeout();
        bounded(limit, "stty", configure_port(port, self.config.baud_rate)).await?;
        let file = bounded(limit, "open modem port", async {
            Ok(OpenOptions::new().read(true).write(true).open(port).await?)
        })
        .await?;
        tokio::time::sleep(self.config.settle_delay()).await;

        let mut session = AtSession::new(file, self.config.command_timeout());
        session.initialize().await?;

        info!("Modem initialized");
        Ok(())
    }
}

/// Run a modem step under `limit`, mapping expiry to [`Error::AdapterTimeout`].
async fn bounded<T>(
    limit: Duration,
    operation: impl Into<String>,
    step: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, step).await {
        Ok(result) => result,
        Err(_) => {
            let operation = operation.into();
            warn!("{} timed out after {}s", operation, limit.as_secs());
            Err(Error::timeout(operation, limit.as_secs()))
        }
    }
}

/// Set line speed and raw mode on a serial device.
async fn configure_port(port: &Path, baud_rate: u32) -> Result<()> {
    let output = Command::new("stty")
        .arg("-F")
        .arg(port)
        .arg(baud_rate.to_string())
        .args(["raw", "-echo"])
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        return Err(Error::ModemCommandFailed {
            command: "stty".to_string(),
            response: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
