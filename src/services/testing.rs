// Uplink Manager - Test Doubles
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! In-memory registry and scripted probe for controller tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::models::{Connection, Device, Error, Result};
use crate::registry::{ConnectionRegistry, MetricUpdate};
use crate::services::probe::{ConnectivityProbe, SignalQuality};

/// A registry call as observed by [`FakeRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Activate(String),
    SetPriority(String, u32),
    Devices,
}

/// Registry that keeps connections in memory and records every call.
#[derive(Default)]
pub struct FakeRegistry {
    connections: Mutex<Vec<Connection>>,
    failing: Mutex<HashSet<String>>,
    devices: Mutex<Vec<Device>>,
    unavailable: AtomicBool,
    calls: Mutex<Vec<Call>>,
}

impl FakeRegistry {
    pub fn new(connections: Vec<Connection>) -> Self {
        Self {
            connections: Mutex::new(connections),
            ..Default::default()
        }
    }

    pub fn fail_activation(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    pub fn set_devices(&self, devices: Vec<Device>) {
        *self.devices.lock().unwrap() = devices;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn activations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Activate(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    pub fn metric_of(&self, id: &str) -> Option<u32> {
        self.connections
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.priority_metric)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::RegistryUnavailable("fake registry offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ConnectionRegistry for FakeRegistry {
    async fn list_connections(&self) -> Result<Vec<Connection>> {
        self.record(Call::List);
        self.check_available()?;
        Ok(self.connections.lock().unwrap().clone())
    }

    async fn set_priority(&self, connection_id: &str, metric: u32) -> Result<MetricUpdate> {
        self.record(Call::SetPriority(connection_id.to_string(), metric));
        self.check_available()?;
        let mut connections = self.connections.lock().unwrap();
        let conn = connections
            .iter_mut()
            .find(|c| c.id == connection_id)
            .ok_or_else(|| Error::ConnectionNotFound(connection_id.to_string()))?;
        if conn.priority_metric == Some(metric) {
            return Ok(MetricUpdate::Unchanged);
        }
        conn.priority_metric = Some(metric);
        Ok(MetricUpdate::Applied)
    }

    async fn activate(&self, connection_id: &str) -> Result<()> {
        self.record(Call::Activate(connection_id.to_string()));
        self.check_available()?;
        if !self.connections.lock().unwrap().iter().any(|c| c.id == connection_id) {
            return Err(Error::ConnectionNotFound(connection_id.to_string()));
        }
        if self.failing.lock().unwrap().contains(connection_id) {
            return Err(Error::activation_failed(connection_id, "rejected by fake registry"));
        }
        Ok(())
    }

    async fn device_states(&self) -> Result<Vec<Device>> {
        self.record(Call::Devices);
        self.check_available()?;
        Ok(self.devices.lock().unwrap().clone())
    }
}

/// Probe with scripted answers.
pub struct FakeProbe {
    reachable: AtomicBool,
    signal: Mutex<SignalQuality>,
    probes: AtomicUsize,
}

impl Default for FakeProbe {
    fn default() -> Self {
        Self {
            reachable: AtomicBool::new(true),
            signal: Mutex::new(SignalQuality::Unavailable),
            probes: AtomicUsize::new(0),
        }
    }
}

impl FakeProbe {
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn set_signal(&self, signal: SignalQuality) {
        *self.signal.lock().unwrap() = signal;
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectivityProbe for FakeProbe {
    async fn check_reachable(&self, _host: &str, _timeout: Duration, _attempts: u32) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.reachable.load(Ordering::SeqCst)
    }

    async fn signal_quality(&self) -> SignalQuality {
        self.signal.lock().unwrap().clone()
    }
}
