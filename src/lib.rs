// src/lib.rs
pub mod backends;
pub mod config;
pub mod health;
pub mod metrics;
pub mod sink;
pub mod watcher;
pub mod zones;
