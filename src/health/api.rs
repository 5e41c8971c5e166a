// src/health/api.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Health state the load balancer reports for instances eligible for traffic.
pub const IN_SERVICE: &str = "InService";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub availability_zone: String,
    pub public_dns_name: String,
    pub private_ip_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceHealth {
    pub instance: Instance,
    pub state: String,
}

impl InstanceHealth {
    pub fn new(instance: Instance, state: impl Into<String>) -> Self {
        Self {
            instance,
            state: state.into(),
        }
    }

    /// Exact match against the API vocabulary; transitional states do not count.
    pub fn is_in_service(&self) -> bool {
        self.state == IN_SERVICE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadBalancerState {
    pub exists: bool,
    pub active: bool,
}

impl LoadBalancerState {
    pub fn missing() -> Self {
        Self {
            exists: false,
            active: false,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.exists && self.active
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("No active ELB '{0}' found!")]
    LoadBalancerNotFound(String),

    #[error("load balancer API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("load balancer API returned HTTP {status} for {path}")]
    Api { status: u16, path: String },

    #[error("malformed load balancer API response: {0}")]
    Decode(String),

    #[error("invalid load balancer API endpoint {0}")]
    InvalidEndpoint(String),
}

/// Read-only view of the cloud load balancer.
#[async_trait]
pub trait LoadBalancerApi: Send + Sync {
    async fn describe(&self, name: &str) -> Result<LoadBalancerState, DiscoveryError>;

    async fn instances_with_health(&self, name: &str)
        -> Result<Vec<InstanceHealth>, DiscoveryError>;
}
