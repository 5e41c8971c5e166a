// src/health/mod.rs
mod api;
mod http;
mod resolver;
mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{
    DiscoveryError, Instance, InstanceHealth, LoadBalancerApi, LoadBalancerState, IN_SERVICE,
};
pub use http::HttpLoadBalancerApi;
pub use resolver::HealthResolver;
pub use status::{HealthyInstances, ZoneGroup};
