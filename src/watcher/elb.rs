// src/watcher/elb.rs
use super::change::has_changed;
use super::policy::{apply_policy, ApplyDecision};
use super::{ExitSignal, LoopState, Watcher};
use crate::backends::{BackendDescriptor, BackendListBuilder, Snapshot};
use crate::config::{ConfigError, ServiceConfig, WatcherConfig};
use crate::health::{DiscoveryError, HealthResolver, LoadBalancerApi};
use crate::metrics::{CycleOutcome, MetricsCollector, Timer};
use crate::sink::ReconfigureSink;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Polls one load balancer and keeps the sink in step with its healthy
/// membership.
pub struct ElbWatcher {
    config: WatcherConfig,
    resolver: HealthResolver,
    builder: BackendListBuilder,
    sink: Arc<dyn ReconfigureSink>,
    metrics: Option<Arc<MetricsCollector>>,

    // Owned by the watcher task; replaced whole, never edited in place.
    backends: Snapshot,
    last_discovered: Snapshot,
    state: LoopState,
}

impl ElbWatcher {
    pub fn new(
        config: WatcherConfig,
        api: Arc<dyn LoadBalancerApi>,
        sink: Arc<dyn ReconfigureSink>,
    ) -> Self {
        let builder = BackendListBuilder::from_config(&config);

        Self {
            config,
            resolver: HealthResolver::new(api),
            builder,
            sink,
            metrics: None,
            backends: Vec::new(),
            last_discovered: Vec::new(),
            state: LoopState::Running,
        }
    }

    /// Validate a service block and build its watcher.
    pub fn from_service(
        service: &ServiceConfig,
        own_zone: &str,
        api: Arc<dyn LoadBalancerApi>,
        sink: Arc<dyn ReconfigureSink>,
    ) -> Result<Self, ConfigError> {
        let config = WatcherConfig::from_service(service, own_zone)?;
        Ok(Self::new(config, api, sink))
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    /// The currently applied backend list.
    pub fn backends(&self) -> &[BackendDescriptor] {
        &self.backends
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Resolve healthy instances and build this cycle's ordered list.
    pub async fn discover(&self) -> Result<Snapshot, DiscoveryError> {
        let healthy = self.resolver.resolve(&self.config.elb_name).await?;
        if let Some(metrics) = &self.metrics {
            metrics.update_healthy_backends(&self.config.service, healthy.total());
        }
        Ok(self.builder.build(&healthy))
    }

    /// One reconciliation pass. Errors leave all state untouched.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, DiscoveryError> {
        let current = self.discover().await?;

        if !has_changed(&self.last_discovered, &current) {
            info!("No changes found to healthy instances");
            return Ok(CycleOutcome::Unchanged);
        }

        self.last_discovered = current.clone();
        self.configure_backends(current).await;
        Ok(CycleOutcome::Changed)
    }

    /// Apply a changed backend list, falling back to defaults when it is
    /// empty, and reload downstream configuration.
    ///
    /// The sink runs in every branch, including when the previous list is
    /// kept and the applied list does not actually change.
    pub async fn configure_backends(&mut self, new_backends: Snapshot) -> ApplyDecision {
        let service = &self.config.service;
        let decision = apply_policy(&new_backends, &self.config.default_servers);

        match decision {
            ApplyDecision::Discovered => {
                info!("Discovered {} backends for service {}", new_backends.len(), service);
                self.backends = new_backends;
            }
            ApplyDecision::Defaults => {
                warn!(
                    "No backends for service {}; using default servers: {:?}",
                    service, self.config.default_servers
                );
                self.backends = self.config.default_servers.clone();
            }
            ApplyDecision::KeepPrevious => {
                warn!(
                    "No backends and no default servers configured for service {}; using previous backends: {:?}",
                    service, self.backends
                );
            }
        }

        self.reconfigure(decision).await;
        decision
    }

    async fn reconfigure(&self, decision: ApplyDecision) {
        let service = &self.config.service;

        if let Err(e) = self.sink.reconfigure(service, &self.backends).await {
            error!(service = %service, error = %e, "Reconfiguration failed");
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_reconfigure(service, decision.as_str(), self.backends.len());
        }
    }

    async fn sleep_until_next_check(&self, start: Instant) {
        let elapsed = start.elapsed();
        if let Some(remaining) = self.config.check_interval.checked_sub(elapsed) {
            if !remaining.is_zero() {
                tokio::time::sleep(remaining).await;
            }
        }
    }
}

#[async_trait]
impl Watcher for ElbWatcher {
    fn name(&self) -> &str {
        &self.config.service
    }

    async fn run(&mut self, exit: ExitSignal) {
        self.state = LoopState::Running;
        info!(
            service = %self.config.service,
            elb = %self.config.elb_name,
            zone = %self.config.own_zone,
            interval = ?self.config.check_interval,
            "Starting ELB watcher"
        );

        while !exit.should_exit() {
            let start = Instant::now();
            let timer = Timer::new();
            let span = info_span!(
                "cycle",
                service = %self.config.service,
                cycle_id = %Uuid::new_v4()
            );

            let outcome = match self.run_cycle().instrument(span).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(service = %self.config.service, error = %e, "Error in watcher task!");
                    error!(service = %self.config.service, details = ?e, "Watcher cycle abandoned");
                    CycleOutcome::Error
                }
            };

            if let Some(metrics) = &self.metrics {
                metrics.record_cycle(&self.config.service, outcome, timer.elapsed());
            }

            self.sleep_until_next_check(start).await;
        }

        self.state = LoopState::Exiting;
        info!(service = %self.config.service, "ElbWatcher exited successfully");
    }
}
