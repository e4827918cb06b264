// Uplink Manager - Main Entry Point
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! # Uplink Manager
//!
//! Multi-uplink failover daemon for Linux gateways. Ranks the connections
//! NetworkManager knows about (5G, 4G, Wi-Fi, Ethernet), keeps the best
//! available one up and re-selects when the link drops.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod models;
mod policy;
mod registry;
mod services;

use models::AppConfig;
use registry::{MetricUpdate, NmRegistry};
use services::{ControllerOptions, FailoverController, ModemDriver, SystemProbe};

/// Human-readable application name.
pub const APP_NAME: &str = "Uplink Manager";

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What the process does.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RunMode {
    /// Initial selection, then monitor until SIGINT/SIGTERM.
    Daemon,
    /// One selection pass, print status, exit.
    Once,
    /// Print a JSON status snapshot without touching any connection.
    Status,
    /// Bring up one named connection regardless of rank, then exit.
    Activate(String),
    /// Write a route metric on one named connection, then exit.
    SetPriority { connection: String, metric: u32 },
}

/// Parsed command line.
#[derive(Debug)]
struct CliOptions {
    debug: bool,
    config_path: Option<PathBuf>,
    interval_secs: Option<u64>,
    probe_host: Option<String>,
    mode: RunMode,
}

/// Print version information and exit.
fn print_version() {
    println!("{} {}", APP_NAME, VERSION);
    println!("Copyright (C) 2026 Christos A. Daggas");
    println!("License: MIT");
    println!();
    println!("Multi-uplink failover daemon for NetworkManager.");
}

/// Print help information and exit.
fn print_help() {
    println!("Usage: {} [OPTIONS]", env::args().next().unwrap_or_else(|| "uplink-manager".to_string()));
    println!();
    println!("Keeps the best available uplink (5G, 4G, Wi-Fi, Ethernet) active.");
    println!();
    println!("Options:");
    println!("  -h, --help             Show this help message and exit");
    println!("  -v, --version          Show version information and exit");
    println!("  -d, --debug            Enable debug logging");
    println!("  -c, --config <FILE>    Read configuration from FILE");
    println!("  -i, --interval <SECS>  Override the monitoring interval");
    println!("      --host <HOST>      Override the reachability probe host");
    println!("      --once             Run one selection pass, print status and exit");
    println!("      --status           Print a JSON status snapshot and exit");
    println!("      --activate <ID>    Activate connection ID, bypassing the ranking");
    println!("      --set-priority <ID> <METRIC>");
    println!("                         Set the route metric of connection ID");
    println!();
    println!("Environment variables:");
    println!("  RUST_LOG               Set log level (trace, debug, info, warn, error)");
}

/// Parse arguments. `Err(code)` means exit immediately with that code.
fn parse_args(args: &[String]) -> Result<CliOptions, ExitCode> {
    let mut options = CliOptions {
        debug: false,
        config_path: None,
        interval_secs: None,
        probe_host: None,
        mode: RunMode::Daemon,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return Err(ExitCode::SUCCESS);
            }
            "-v" | "--version" => {
                print_version();
                return Err(ExitCode::SUCCESS);
            }
            "-d" | "--debug" => options.debug = true,
            "--once" => options.mode = RunMode::Once,
            "--status" => options.mode = RunMode::Status,
            "-c" | "--config" => {
                options.config_path = Some(PathBuf::from(required_value(arg, iter.next())?));
            }
            "-i" | "--interval" => {
                let value = required_value(arg, iter.next())?;
                match value.parse::<u64>() {
                    Ok(secs) => options.interval_secs = Some(secs),
                    Err(_) => {
                        eprintln!("Invalid interval: {}", value);
                        return Err(ExitCode::FAILURE);
                    }
                }
            }
            "--host" => options.probe_host = Some(required_value(arg, iter.next())?.to_string()),
            "--activate" => {
                options.mode = RunMode::Activate(required_value(arg, iter.next())?.to_string());
            }
            "--set-priority" => {
                let connection = required_value(arg, iter.next())?.to_string();
                let value = required_value(arg, iter.next())?;
                match value.parse::<u32>() {
                    Ok(metric) => options.mode = RunMode::SetPriority { connection, metric },
                    Err(_) => {
                        eprintln!("Invalid metric: {}", value);
                        return Err(ExitCode::FAILURE);
                    }
                }
            }
            _ => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Try '--help' for more information.");
                return Err(ExitCode::FAILURE);
            }
        }
    }
    Ok(options)
}

fn required_value<'a>(flag: &str, value: Option<&'a String>) -> Result<&'a str, ExitCode> {
    match value {
        Some(v) => Ok(v.as_str()),
        None => {
            eprintln!("Option {} requires a value", flag);
            Err(ExitCode::FAILURE)
        }
    }
}

/// Load the configuration file and apply command-line overrides.
fn load_config(options: &CliOptions) -> models::Result<AppConfig> {
    let mut config = AppConfig::load(options.config_path.as_deref())?;
    if let Some(secs) = options.interval_secs {
        config.monitor.interval_secs = secs;
    }
    if let Some(host) = &options.probe_host {
        config.probe.host = host.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Wait for SIGINT or SIGTERM.
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!("Cannot listen for SIGTERM: {}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Cannot listen for SIGINT: {}", e);
            }
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT"),
        _ = terminate.recv() => tracing::info!("Received SIGTERM"),
    }
}

async fn run(config: AppConfig, mode: RunMode) -> models::Result<()> {
    let registry = Arc::new(NmRegistry::new(&config.registry));
    let probe = Arc::new(SystemProbe::new(&config.probe));
    let controller =
        FailoverController::new(registry, probe, ControllerOptions::from_config(&config));

    match &mode {
        RunMode::Status => {
            let snapshot = controller.snapshot_status().await?;
            println!("{}", snapshot.to_json_pretty()?);
            return Ok(());
        }
        RunMode::Activate(connection) => {
            controller.activate_connection(connection).await?;
            println!(
                "Activated {}",
                controller.active_connection_id().as_deref().unwrap_or(connection.as_str())
            );
            return Ok(());
        }
        RunMode::SetPriority { connection, metric } => {
            match controller.set_priority(connection, *metric).await? {
                MetricUpdate::Applied => println!("Set route metric of {} to {}", connection, metric),
                MetricUpdate::Unchanged => {
                    println!("Route metric of {} already {}", connection, metric)
                }
            }
            return Ok(());
        }
        RunMode::Daemon | RunMode::Once => {}
    }

    if config.modem.enabled {
        // A modem that fails to initialise may still attach with its stored mode
        if let Err(e) = ModemDriver::new(&config.modem).initialize().await {
            tracing::warn!("Modem initialization failed: {}", e);
        }
    }

    match controller.list_connections().await {
        Ok(connections) => tracing::info!("Found {} configured connections", connections.len()),
        Err(e) => tracing::warn!("Cannot list connections: {}", e),
    }

    if let Err(e) = controller.select_and_activate().await {
        if e.is_retryable() && mode == RunMode::Daemon {
            tracing::warn!("Initial selection failed, monitor will retry: {}", e);
        } else {
            tracing::warn!("Initial selection failed: {}", e);
        }
    }

    if mode == RunMode::Once {
        let snapshot = controller.snapshot_status().await?;
        if !snapshot.has_activated_device() {
            tracing::warn!("No device has finished activating yet");
        }
        print!("{}", snapshot);
        return Ok(());
    }

    if config.monitor.enabled {
        controller.start_monitoring(config.monitor.interval())?;
    } else {
        tracing::info!("Monitoring disabled by configuration");
    }

    wait_for_shutdown().await;
    if controller.is_monitoring() {
        controller.stop_monitoring().await;
    }
    tracing::info!("Shutting down");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(code) => return code,
    };

    let config = match load_config(&options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging with appropriate level
    let log_level = if options.debug {
        tracing::Level::DEBUG
    } else {
        config.log_level.parse().unwrap_or(tracing::Level::INFO)
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(log_level.into()),
        )
        .init();

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    match run(config, options.mode).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{} [{}]", e, e.kind());
            ExitCode::FAILURE
        }
    }
}
