// src/backends/mod.rs
mod builder;
mod descriptor;

pub use builder::BackendListBuilder;
pub use descriptor::{BackendDescriptor, Snapshot};
