// src/watcher/policy.rs
use crate::backends::BackendDescriptor;

/// Which list becomes the applied backend list after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyDecision {
    /// The newly discovered backends.
    Discovered,
    /// The configured default servers; nothing healthy was found.
    Defaults,
    /// The previously applied list; nothing healthy and no defaults.
    KeepPrevious,
}

impl ApplyDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyDecision::Discovered => "discovered",
            ApplyDecision::Defaults => "defaults",
            ApplyDecision::KeepPrevious => "previous",
        }
    }
}

pub fn apply_policy(
    new_backends: &[BackendDescriptor],
    default_servers: &[BackendDescriptor],
) -> ApplyDecision {
    if !new_backends.is_empty() {
        ApplyDecision::Discovered
    } else if !default_servers.is_empty() {
        ApplyDecision::Defaults
    } else {
        ApplyDecision::KeepPrevious
    }
}
