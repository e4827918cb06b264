// Uplink Manager - Services
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Runtime services of the daemon.
//!
//! - Controller: ranks connections, activates the best one, monitors health
//! - Status: builds status snapshots for external consumers
//! - Probe: reachability and signal-quality checks
//! - Modem: AT-port initialisation of the cellular module

pub mod controller;
pub mod modem;
pub mod probe;
pub mod status;

#[cfg(test)]
mod testing;

pub use controller::{ControllerOptions, FailoverController};
pub use modem::ModemDriver;
pub use probe::SystemProbe;
