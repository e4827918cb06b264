// Uplink Manager - Failover Controller
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Failover controller.
//!
//! Ranks configured connections by category, activates the best one that
//! comes up, and runs a periodic health monitor that re-selects when no
//! device is activated. Selection passes, manual activations and monitor
//! ticks are serialised on one async lock so they never interleave.

use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::probe::ConnectivityProbe;
use super::status::StatusReporter;
use crate::models::{AppConfig, Connection, ControllerPhase, Error, Result, StatusSnapshot};
use crate::policy::PriorityTable;
use crate::registry::{ConnectionRegistry, MetricUpdate};

/// Mutable controller state shared with status consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerState {
    /// Connection elected by the last successful activation.
    ///
    /// Best effort, not linearizable: an activation made directly at the
    /// registry, outside this controller, leaves it stale until the next pass.
    pub active_connection_id: Option<String>,
    /// Whether the periodic monitor is running.
    pub monitoring_enabled: bool,
    pub phase: ControllerPhase,
}

/// Reachability gate applied on monitor ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilityCheck {
    pub host: String,
    pub timeout: Duration,
    pub attempts: u32,
}

/// Construction options for [`FailoverController`].
#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    pub priorities: PriorityTable,
    /// When set, an activated device alone is not enough for a healthy tick.
    pub reachability: Option<ReachabilityCheck>,
}

impl ControllerOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        let reachability = config.monitor.require_reachability.then(|| ReachabilityCheck {
            host: config.probe.host.clone(),
            timeout: config.probe.timeout(),
            attempts: config.probe.attempts,
        });
        Self {
            priorities: config.priorities,
            reachability,
        }
    }
}

/// What a single monitor tick observed and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// At least one device is activated; nothing to do.
    Healthy,
    /// No usable link; re-selection brought this connection up.
    Reselected(String),
    /// No usable link and every candidate failed.
    NoLink,
    /// The tick could not complete; retried on the next one.
    Failed(&'static str),
}

struct MonitorTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct Inner {
    registry: Arc<dyn ConnectionRegistry>,
    probe: Arc<dyn ConnectivityProbe>,
    reporter: StatusReporter,
    options: ControllerOptions,
    state: RwLock<ControllerState>,
    /// Serialises selection passes, manual activations and ticks.
    pass_lock: tokio::sync::Mutex<()>,
    monitor: Mutex<Option<MonitorTask>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let task = match self.monitor.get_mut() {
            Ok(slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = task {
            task.cancel.cancel();
        }
    }
}

/// Handle to the failover controller. Clones share the same state.
#[derive(Clone)]
pub struct FailoverController {
    inner: Arc<Inner>,
}

impl FailoverController {
    /// Create a controller over the given adapters.
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        probe: Arc<dyn ConnectivityProbe>,
        options: ControllerOptions,
    ) -> Self {
        let reporter = StatusReporter::new(registry.clone(), probe.clone());
        Self {
            inner: Arc::new(Inner {
                registry,
                probe,
                reporter,
                options,
                state: RwLock::new(ControllerState::default()),
                pass_lock: tokio::sync::Mutex::new(()),
                monitor: Mutex::new(None),
            }),
        }
    }

    // ========================================================================
    // State access
    // ========================================================================

    fn read_state<R>(&self, reader: impl FnOnce(&ControllerState) -> R) -> R {
        match self.inner.state.read() {
            Ok(guard) => reader(&guard),
            Err(poisoned) => {
                warn!("Controller state lock poisoned, recovering");
                reader(&poisoned.into_inner())
            }
        }
    }

    fn write_state(&self, writer: impl FnOnce(&mut ControllerState)) {
        match self.inner.state.write() {
            Ok(mut guard) => writer(&mut guard),
            Err(poisoned) => {
                warn!("Controller state lock poisoned, recovering");
                writer(&mut poisoned.into_inner())
            }
        }
    }

    fn set_phase(&self, phase: ControllerPhase) {
        self.write_state(|state| {
            if state.phase != phase {
                debug!("Controller phase: {} -> {}", state.phase, phase);
                state.phase = phase;
            }
        });
    }

    /// Copy of the current state.
    pub fn state(&self) -> ControllerState {
        self.read_state(Clone::clone)
    }

    pub fn phase(&self) -> ControllerPhase {
        self.read_state(|state| state.phase)
    }

    pub fn active_connection_id(&self) -> Option<String> {
        self.read_state(|state| state.active_connection_id.clone())
    }

    pub fn is_monitoring(&self) -> bool {
        self.read_state(|state| state.monitoring_enabled)
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Enumerate configured connections and log them with their category.
    pub async fn list_connections(&self) -> Result<Vec<Connection>> {
        let connections = self.inner.registry.list_connections().await?;
        for conn in &connections {
            info!(
                "Connection: {} [{}] metric={}",
                conn.id,
                conn.category,
                conn.priority_metric
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
        }
        Ok(connections)
    }

    /// Activate the best available connection.
    ///
    /// Candidates are tried one at a time in rank order; the first that
    /// activates wins and gets its category metric installed. When every
    /// candidate fails the previously elected connection id is kept.
    pub async fn select_and_activate(&self) -> Result<Connection> {
        let _pass = self.inner.pass_lock.lock().await;
        self.run_selection().await
    }

    async fn run_selection(&self) -> Result<Connection> {
        let previous = self.phase();
        self.set_phase(ControllerPhase::Selecting);

        let connections = match self.inner.registry.list_connections().await {
            Ok(connections) => connections,
            Err(e) => {
                warn!("Selection aborted, cannot list connections: {}", e);
                self.set_phase(previous);
                return Err(e);
            }
        };

        let ranked = self.inner.options.priorities.order(connections);
        if ranked.is_empty() {
            warn!("No connections configured");
        }

        for candidate in ranked {
            self.set_phase(ControllerPhase::Activating);
            info!("Trying {} ({})", candidate.id, candidate.category);

            if let Err(e) = self.inner.registry.activate(&candidate.id).await {
                warn!("Failed to activate {}: {} [{}]", candidate.id, e, e.kind());
                continue;
            }

            let metric = self.inner.options.priorities.metric_for(candidate.category);
            match self.inner.registry.set_priority(&candidate.id, metric).await {
                Ok(MetricUpdate::Applied) => debug!("Installed metric {} on {}", metric, candidate.id),
                Ok(MetricUpdate::Unchanged) => {}
                Err(e) => warn!("Activated {} but could not set metric {}: {}", candidate.id, metric, e),
            }

            self.write_state(|state| {
                state.active_connection_id = Some(candidate.id.clone());
                state.phase = ControllerPhase::Active;
            });
            info!("Active connection: {} ({})", candidate.id, candidate.category);
            return Ok(candidate);
        }

        self.set_phase(ControllerPhase::NoLink);
        error!("No available connection could be activated");
        Err(Error::NoAvailableConnection)
    }

    /// Activate a named connection, bypassing the ranking.
    pub async fn activate_connection(&self, connection_id: &str) -> Result<()> {
        let _pass = self.inner.pass_lock.lock().await;

        let known = self.inner.registry.list_connections().await?;
        if !known.iter().any(|c| c.id == connection_id) {
            return Err(Error::ConnectionNotFound(connection_id.to_string()));
        }

        self.inner.registry.activate(connection_id).await?;
        self.write_state(|state| {
            state.active_connection_id = Some(connection_id.to_string());
            state.phase = ControllerPhase::Active;
        });
        info!("Manually activated {}", connection_id);
        Ok(())
    }

    /// Install a route metric on a named connection.
    pub async fn set_priority(&self, connection_id: &str, metric: u32) -> Result<MetricUpdate> {
        self.inner.registry.set_priority(connection_id, metric).await
    }

    /// Assemble a status snapshot. Never mutates controller state.
    pub async fn snapshot_status(&self) -> Result<StatusSnapshot> {
        let state = self.state();
        self.inner.reporter.snapshot(&state).await
    }

    // ========================================================================
    // Monitoring
    // ========================================================================

    /// Run one health check, re-selecting when no link is usable.
    ///
    /// Never returns an error; failures are logged and the next tick retries.
    pub async fn monitor_tick(&self) -> TickOutcome {
        let _pass = self.inner.pass_lock.lock().await;

        let devices = match self.inner.registry.device_states().await {
            Ok(devices) => devices,
            Err(e) => {
                warn!("Monitor: cannot read device states: {}", e);
                return TickOutcome::Failed(e.kind());
            }
        };

        let mut healthy = devices.iter().any(|d| d.state.is_activated());
        if healthy {
            if let Some(check) = &self.inner.options.reachability {
                healthy = self
                    .inner
                    .probe
                    .check_reachable(&check.host, check.timeout, check.attempts)
                    .await;
                if !healthy {
                    warn!("Monitor: {} unreachable over the active link", check.host);
                }
            }
        }

        if healthy {
            if matches!(
                self.phase(),
                ControllerPhase::Idle | ControllerPhase::Degraded | ControllerPhase::NoLink
            ) {
                self.set_phase(ControllerPhase::Active);
            }
            return TickOutcome::Healthy;
        }

        info!("Monitor: no usable link, re-selecting");
        if self.phase() == ControllerPhase::Active {
            self.set_phase(ControllerPhase::Degraded);
        }

        match self.run_selection().await {
            Ok(conn) => TickOutcome::Reselected(conn.id),
            Err(Error::NoAvailableConnection) => TickOutcome::NoLink,
            Err(e) => TickOutcome::Failed(e.kind()),
        }
    }

    /// Start the periodic monitor. The first tick runs immediately.
    ///
    /// Calling this while the monitor already runs is a no-op.
    pub fn start_monitoring(&self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(Error::InvalidConfig(
                "monitor interval must be greater than zero".to_string(),
            ));
        }

        let mut slot = match self.inner.monitor.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if slot.is_some() {
            debug!("Monitoring already running");
            return Ok(());
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_monitor(
            Arc::downgrade(&self.inner),
            interval,
            cancel.clone(),
        ));
        *slot = Some(MonitorTask { cancel, handle });
        drop(slot);

        self.write_state(|state| state.monitoring_enabled = true);
        info!("Monitoring started (interval: {}s)", interval.as_secs());
        Ok(())
    }

    /// Stop the periodic monitor and wait for the in-flight tick to finish.
    pub async fn stop_monitoring(&self) {
        let task = match self.inner.monitor.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        self.write_state(|state| state.monitoring_enabled = false);

        let Some(task) = task else {
            return;
        };
        task.cancel.cancel();
        if let Err(e) = task.handle.await {
            error!("Monitor task ended abnormally: {}", e);
        }
        info!("Monitoring stopped");
    }
}

/// Monitor loop. Holds only a weak handle so a dropped controller ends it.
async fn run_monitor(inner: Weak<Inner>, interval: Duration, cancel: CancellationToken) {
    loop {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        let outcome = FailoverController { inner }.monitor_tick().await;
        debug!("Monitor tick: {:?}", outcome);

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Device, DeviceState, DeviceType};
    use crate::services::testing::{Call, FakeProbe, FakeRegistry};

    fn conn(id: &str, kind: &str) -> Connection {
        Connection::new(id, kind, format!("/org/freedesktop/NetworkManager/Settings/{}", id))
    }

    fn controller(registry: &Arc<FakeRegistry>, probe: &Arc<FakeProbe>) -> FailoverController {
        FailoverController::new(registry.clone(), probe.clone(), ControllerOptions::default())
    }

    fn all_categories() -> Vec<Connection> {
        vec![
            conn("office-lan", "ethernet"),
            conn("vpn", "vpn"),
            conn("home-wifi", "802-11-wireless"),
            conn("lte", "gsm"),
            conn("cell5g", "gsm"),
        ]
    }

    fn activated(device_type: DeviceType) -> Device {
        Device::new(device_type, DeviceState::Activated)
    }

    #[tokio::test]
    async fn test_falls_back_to_wifi_when_5g_fails() {
        let registry = Arc::new(FakeRegistry::new(vec![
            conn("home-wifi", "wifi"),
            conn("cell5g", "gsm"),
        ]));
        registry.fail_activation("cell5g");
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        let elected = controller.select_and_activate().await.unwrap();

        assert_eq!(elected.id, "home-wifi");
        assert_eq!(registry.activations(), vec!["cell5g", "home-wifi"]);
        assert_eq!(registry.metric_of("home-wifi"), Some(300));
        assert_eq!(controller.active_connection_id().as_deref(), Some("home-wifi"));
        assert_eq!(controller.phase(), ControllerPhase::Active);
    }

    #[tokio::test]
    async fn test_attempts_follow_rank_and_stop_at_first_success() {
        let registry = Arc::new(FakeRegistry::new(all_categories()));
        registry.fail_activation("cell5g");
        registry.fail_activation("lte");
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        controller.select_and_activate().await.unwrap();

        assert_eq!(registry.activations(), vec!["cell5g", "lte", "home-wifi"]);
        assert_eq!(
            registry.count(|c| matches!(c, Call::SetPriority(..))),
            1,
            "only the elected connection gets a metric"
        );
        assert_eq!(registry.metric_of("office-lan"), None);
    }

    #[tokio::test]
    async fn test_all_candidates_fail() {
        let registry = Arc::new(FakeRegistry::new(all_categories()));
        for id in ["office-lan", "vpn", "home-wifi", "lte", "cell5g"] {
            registry.fail_activation(id);
        }
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        let err = controller.select_and_activate().await.unwrap_err();

        assert!(matches!(err, Error::NoAvailableConnection));
        assert_eq!(
            registry.activations(),
            vec!["cell5g", "lte", "home-wifi", "office-lan", "vpn"]
        );
        assert_eq!(registry.count(|c| matches!(c, Call::SetPriority(..))), 0);
        assert_eq!(controller.phase(), ControllerPhase::NoLink);
        assert_eq!(controller.active_connection_id(), None);
    }

    #[tokio::test]
    async fn test_empty_registry_makes_no_activation_calls() {
        let registry = Arc::new(FakeRegistry::default());
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        let err = controller.select_and_activate().await.unwrap_err();

        assert!(matches!(err, Error::NoAvailableConnection));
        assert_eq!(registry.calls(), vec![Call::List]);
    }

    #[tokio::test]
    async fn test_failed_pass_keeps_previous_election() {
        let registry = Arc::new(FakeRegistry::new(vec![conn("lte", "gsm")]));
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        controller.select_and_activate().await.unwrap();
        registry.fail_activation("lte");
        let err = controller.select_and_activate().await.unwrap_err();

        assert!(matches!(err, Error::NoAvailableConnection));
        assert_eq!(controller.active_connection_id().as_deref(), Some("lte"));
    }

    #[tokio::test]
    async fn test_registry_outage_restores_phase() {
        let registry = Arc::new(FakeRegistry::new(vec![conn("lte", "gsm")]));
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);
        controller.select_and_activate().await.unwrap();

        registry.set_unavailable(true);
        let err = controller.select_and_activate().await.unwrap_err();

        assert!(matches!(err, Error::RegistryUnavailable(_)));
        assert_eq!(controller.phase(), ControllerPhase::Active);
    }

    #[tokio::test]
    async fn test_custom_priorities_change_order() {
        let registry = Arc::new(FakeRegistry::new(vec![
            conn("cell5g", "gsm"),
            conn("office-lan", "ethernet"),
        ]));
        let probe = Arc::new(FakeProbe::default());
        let options = ControllerOptions {
            priorities: PriorityTable {
                ethernet: 50,
                ..PriorityTable::default()
            },
            reachability: None,
        };
        let controller = FailoverController::new(registry.clone(), probe, options);

        controller.select_and_activate().await.unwrap();

        assert_eq!(registry.activations(), vec!["office-lan"]);
        assert_eq!(registry.metric_of("office-lan"), Some(50));
    }

    #[tokio::test]
    async fn test_manual_activation() {
        let registry = Arc::new(FakeRegistry::new(vec![conn("home-wifi", "wifi")]));
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        let err = controller.activate_connection("missing").await.unwrap_err();
        assert!(matches!(err, Error::ConnectionNotFound(ref id) if id == "missing"));
        assert_eq!(registry.activations(), Vec::<String>::new());

        controller.activate_connection("home-wifi").await.unwrap();
        assert_eq!(controller.active_connection_id().as_deref(), Some("home-wifi"));
        assert_eq!(registry.count(|c| matches!(c, Call::SetPriority(..))), 0);
    }

    #[tokio::test]
    async fn test_manual_activation_failure_leaves_state() {
        let registry = Arc::new(FakeRegistry::new(vec![conn("home-wifi", "wifi")]));
        registry.fail_activation("home-wifi");
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        let err = controller.activate_connection("home-wifi").await.unwrap_err();

        assert_eq!(err.kind(), "activation_error");
        assert_eq!(controller.active_connection_id(), None);
    }

    #[tokio::test]
    async fn test_set_priority_is_idempotent() {
        let registry = Arc::new(FakeRegistry::new(vec![conn("lte", "gsm")]));
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        assert_eq!(controller.set_priority("lte", 200).await.unwrap(), MetricUpdate::Applied);
        assert_eq!(controller.set_priority("lte", 200).await.unwrap(), MetricUpdate::Unchanged);
        assert_eq!(registry.metric_of("lte"), Some(200));
    }

    #[tokio::test]
    async fn test_tick_with_activated_device_does_not_select() {
        let registry = Arc::new(FakeRegistry::new(vec![conn("lte", "gsm")]));
        registry.set_devices(vec![
            Device::new(DeviceType::Wifi, DeviceState::Disconnected),
            activated(DeviceType::Cellular),
        ]);
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        assert_eq!(controller.monitor_tick().await, TickOutcome::Healthy);
        assert_eq!(registry.calls(), vec![Call::Devices]);
        assert_eq!(probe.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_tick_without_activated_device_selects_once() {
        let registry = Arc::new(FakeRegistry::new(vec![conn("home-wifi", "wifi")]));
        registry.set_devices(vec![Device::new(DeviceType::Wifi, DeviceState::Disconnected)]);
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        let outcome = controller.monitor_tick().await;

        assert_eq!(outcome, TickOutcome::Reselected("home-wifi".to_string()));
        assert_eq!(registry.count(|c| *c == Call::List), 1);
    }

    #[tokio::test]
    async fn test_tick_reports_no_link() {
        let registry = Arc::new(FakeRegistry::new(vec![conn("home-wifi", "wifi")]));
        registry.fail_activation("home-wifi");
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        assert_eq!(controller.monitor_tick().await, TickOutcome::NoLink);
        assert_eq!(controller.phase(), ControllerPhase::NoLink);
    }

    #[tokio::test]
    async fn test_tick_survives_registry_outage() {
        let registry = Arc::new(FakeRegistry::new(vec![conn("home-wifi", "wifi")]));
        registry.set_unavailable(true);
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        assert_eq!(
            controller.monitor_tick().await,
            TickOutcome::Failed("registry_unavailable")
        );
        assert_eq!(controller.phase(), ControllerPhase::Idle);
    }

    #[tokio::test]
    async fn test_tick_degrades_then_recovers() {
        let registry = Arc::new(FakeRegistry::new(vec![conn("lte", "gsm")]));
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);
        controller.select_and_activate().await.unwrap();

        registry.fail_activation("lte");
        assert_eq!(controller.monitor_tick().await, TickOutcome::NoLink);
        assert_eq!(controller.phase(), ControllerPhase::NoLink);

        registry.set_devices(vec![activated(DeviceType::Cellular)]);
        assert_eq!(controller.monitor_tick().await, TickOutcome::Healthy);
        assert_eq!(controller.phase(), ControllerPhase::Active);
    }

    #[tokio::test]
    async fn test_healthy_tick_promotes_idle_after_outage() {
        let registry = Arc::new(FakeRegistry::new(vec![conn("lte", "gsm")]));
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        registry.set_unavailable(true);
        assert!(controller.select_and_activate().await.is_err());
        assert_eq!(controller.phase(), ControllerPhase::Idle);

        registry.set_unavailable(false);
        registry.set_devices(vec![activated(DeviceType::Cellular)]);
        assert_eq!(controller.monitor_tick().await, TickOutcome::Healthy);
        assert_eq!(controller.phase(), ControllerPhase::Active);
    }

    #[tokio::test]
    async fn test_reachability_gate() {
        let registry = Arc::new(FakeRegistry::new(vec![conn("home-wifi", "wifi")]));
        registry.set_devices(vec![activated(DeviceType::Wifi)]);
        let probe = Arc::new(FakeProbe::default());
        probe.set_reachable(false);
        let options = ControllerOptions {
            priorities: PriorityTable::default(),
            reachability: Some(ReachabilityCheck {
                host: "8.8.8.8".to_string(),
                timeout: Duration::from_secs(1),
                attempts: 1,
            }),
        };
        let controller = FailoverController::new(registry.clone(), probe.clone(), options);

        let outcome = controller.monitor_tick().await;

        assert_eq!(outcome, TickOutcome::Reselected("home-wifi".to_string()));
        assert_eq!(probe.probe_count(), 1);
    }

    #[test]
    fn test_options_from_config() {
        let mut config = AppConfig::default();
        assert_eq!(ControllerOptions::from_config(&config).reachability, None);

        config.monitor.require_reachability = true;
        config.probe.host = "1.1.1.1".to_string();
        let check = ControllerOptions::from_config(&config).reachability.unwrap();
        assert_eq!(check.host, "1.1.1.1");
        assert_eq!(check.attempts, config.probe.attempts);
    }

    #[tokio::test]
    async fn test_snapshot_does_not_mutate() {
        let registry = Arc::new(FakeRegistry::new(vec![conn("lte", "gsm")]));
        registry.set_devices(vec![activated(DeviceType::Cellular)]);
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);
        controller.select_and_activate().await.unwrap();
        registry.clear_calls();
        let before = controller.state();

        let snap = controller.snapshot_status().await.unwrap();

        assert_eq!(snap.active_connection_id.as_deref(), Some("lte"));
        assert_eq!(snap.phase, ControllerPhase::Active);
        assert!(!snap.monitoring_enabled);
        assert_eq!(registry.calls(), vec![Call::Devices]);
        assert_eq!(controller.state(), before);
    }

    #[tokio::test]
    async fn test_zero_interval_rejected() {
        let registry = Arc::new(FakeRegistry::default());
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        let err = controller.start_monitoring(Duration::ZERO).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(!controller.is_monitoring());
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_ticks_until_stopped() {
        let registry = Arc::new(FakeRegistry::new(vec![conn("home-wifi", "wifi")]));
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        controller.start_monitoring(Duration::from_secs(30)).unwrap();
        assert!(controller.is_monitoring());
        // Starting twice keeps the single running task
        controller.start_monitoring(Duration::from_secs(30)).unwrap();

        tokio::time::sleep(Duration::from_secs(65)).await;
        assert_eq!(registry.count(|c| *c == Call::Devices), 3);

        controller.stop_monitoring().await;
        assert!(!controller.is_monitoring());

        let seen = registry.calls().len();
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(registry.calls().len(), seen);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_harmless() {
        let registry = Arc::new(FakeRegistry::default());
        let probe = Arc::new(FakeProbe::default());
        let controller = controller(&registry, &probe);

        controller.stop_monitoring().await;
        assert!(!controller.is_monitoring());
        assert!(registry.calls().is_empty());
    }
}
