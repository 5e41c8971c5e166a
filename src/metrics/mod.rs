// src/metrics/mod.rs
mod collector;

pub use collector::{CycleOutcome, MetricsCollector, MetricsRegistry, Timer};
