// src/metrics/collector.rs
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use anyhow::Result;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

/// Outcome label of one reconciliation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Changed,
    Unchanged,
    Error,
}

impl CycleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleOutcome::Changed => "changed",
            CycleOutcome::Unchanged => "unchanged",
            CycleOutcome::Error => "error",
        }
    }
}

pub struct MetricsCollector {
    // Cycle metrics
    pub cycles_total: IntCounterVec,
    pub cycle_duration_seconds: HistogramVec,

    // Backend metrics
    pub reconfigures_total: IntCounterVec,
    pub healthy_backends: IntGaugeVec,
    pub applied_backends: IntGaugeVec,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let cycles_total = IntCounterVec::new(
            Opts::new("watcher_cycles_total", "Reconciliation cycles by outcome"),
            &["service", "outcome"],
        )?;
        registry.register(Box::new(cycles_total.clone()))?;

        let cycle_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "watcher_cycle_duration_seconds",
                "Reconciliation cycle duration in seconds",
            ),
            &["service"],
        )?;
        registry.register(Box::new(cycle_duration_seconds.clone()))?;

        let reconfigures_total = IntCounterVec::new(
            Opts::new(
                "watcher_reconfigures_total",
                "Sink invocations by applied list source (discovered, defaults, previous)",
            ),
            &["service", "decision"],
        )?;
        registry.register(Box::new(reconfigures_total.clone()))?;

        let healthy_backends = IntGaugeVec::new(
            Opts::new(
                "watcher_healthy_backends",
                "Healthy backends found by the last successful cycle",
            ),
            &["service"],
        )?;
        registry.register(Box::new(healthy_backends.clone()))?;

        let applied_backends = IntGaugeVec::new(
            Opts::new("watcher_applied_backends", "Backends currently applied"),
            &["service"],
        )?;
        registry.register(Box::new(applied_backends.clone()))?;

        Ok(Self {
            cycles_total,
            cycle_duration_seconds,
            reconfigures_total,
            healthy_backends,
            applied_backends,
        })
    }

    pub fn record_cycle(&self, service: &str, outcome: CycleOutcome, duration: Duration) {
        self.cycles_total
            .with_label_values(&[service, outcome.as_str()])
            .inc();

        self.cycle_duration_seconds
            .with_label_values(&[service])
            .observe(duration.as_secs_f64());
    }

    pub fn record_reconfigure(&self, service: &str, decision: &str, applied: usize) {
        self.reconfigures_total
            .with_label_values(&[service, decision])
            .inc();
        self.applied_backends
            .with_label_values(&[service])
            .set(applied as i64);
    }

    pub fn update_healthy_backends(&self, service: &str, healthy: usize) {
        self.healthy_backends
            .with_label_values(&[service])
            .set(healthy as i64);
    }
}

// Helper for timing operations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
