// src/zones/mod.rs
mod priority;
mod provider;

pub use priority::prioritize;
pub use provider::{zone_provider, InstanceMetadataZone, StaticZone, ZoneError, ZoneProvider};
