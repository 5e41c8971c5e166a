// src/backends/descriptor.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// A routable server handed to the reconfiguration sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackendDescriptor {
    pub name: String,
    pub host: String,
    pub port: u16,
    /// Only ever `Some(true)` when produced by discovery; absent otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<bool>,
}

impl BackendDescriptor {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            backup: None,
        }
    }

    pub fn as_backup(mut self) -> Self {
        self.backup = Some(true);
        self
    }

    pub fn is_backup(&self) -> bool {
        self.backup == Some(true)
    }
}

impl fmt::Display for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.name, self.host, self.port)?;
        if self.is_backup() {
            write!(f, " (backup)")?;
        }
        Ok(())
    }
}

/// One cycle's ordered backend list. Order is part of equality.
pub type Snapshot = Vec<BackendDescriptor>;
