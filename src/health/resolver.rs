// src/health/resolver.rs
use super::api::{DiscoveryError, LoadBalancerApi};
use super::status::HealthyInstances;
use std::sync::Arc;
use tracing::info;

/// Resolves the in-service instances behind a load balancer.
#[derive(Clone)]
pub struct HealthResolver {
    api: Arc<dyn LoadBalancerApi>,
}

impl HealthResolver {
    pub fn new(api: Arc<dyn LoadBalancerApi>) -> Self {
        Self { api }
    }

    pub async fn resolve(&self, elb_name: &str) -> Result<HealthyInstances, DiscoveryError> {
        let state = self.api.describe(elb_name).await?;
        if !state.is_usable() {
            return Err(DiscoveryError::LoadBalancerNotFound(elb_name.to_string()));
        }
        info!(elb = %elb_name, "Found active ELB");

        let healthy: HealthyInstances = self
            .api
            .instances_with_health(elb_name)
            .await?
            .into_iter()
            .filter(|health| health.is_in_service())
            .map(|health| health.instance)
            .collect();

        info!("Found {} healthy instances", healthy.total());
        for group in healthy.groups() {
            let ids: Vec<&str> = group.instances.iter().map(|i| i.id.as_str()).collect();
            info!(zone = %group.zone, instances = ?ids, "Healthy instances in zone");
        }

        Ok(healthy)
    }
}
