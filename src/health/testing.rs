// src/health/testing.rs
//! In-memory load balancer used by unit tests.

use super::api::{DiscoveryError, Instance, InstanceHealth, LoadBalancerApi, LoadBalancerState};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;

pub struct StaticApi {
    state: LoadBalancerState,
    instances: Mutex<Vec<InstanceHealth>>,
    failing: AtomicBool,
    describe_calls: AtomicUsize,
    describe_starts: Mutex<Vec<Instant>>,
    delay: Option<Duration>,
    exit_after: Option<(usize, Arc<watch::Sender<bool>>)>,
}

impl StaticApi {
    pub fn new(state: LoadBalancerState, instances: Vec<InstanceHealth>) -> Self {
        Self {
            state,
            instances: Mutex::new(instances),
            failing: AtomicBool::new(false),
            describe_calls: AtomicUsize::new(0),
            describe_starts: Mutex::new(Vec::new()),
            delay: None,
            exit_after: None,
        }
    }

    pub fn active(instances: Vec<InstanceHealth>) -> Self {
        Self::new(
            LoadBalancerState {
                exists: true,
                active: true,
            },
            instances,
        )
    }

    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    /// Raise the exit flag while serving the `cycles`-th describe call.
    pub fn exit_after(mut self, cycles: usize, exit: Arc<watch::Sender<bool>>) -> Self {
        self.exit_after = Some((cycles, exit));
        self
    }

    /// Make every describe call take `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_instances(&self, instances: Vec<InstanceHealth>) {
        *self.instances.lock().unwrap() = instances;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    /// When each describe call began, in call order.
    pub fn describe_starts(&self) -> Vec<Instant> {
        self.describe_starts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LoadBalancerApi for StaticApi {
    async fn describe(&self, _name: &str) -> Result<LoadBalancerState, DiscoveryError> {
        self.describe_starts.lock().unwrap().push(Instant::now());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let calls = self.describe_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((cycles, exit)) = &self.exit_after {
            if calls >= *cycles {
                let _ = exit.send(true);
            }
        }
        Ok(self.state)
    }

    async fn instances_with_health(
        &self,
        name: &str,
    ) -> Result<Vec<InstanceHealth>, DiscoveryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DiscoveryError::Api {
                status: 503,
                path: format!("/v1/load-balancers/{name}/instance-health"),
            });
        }
        Ok(self.instances.lock().unwrap().clone())
    }
}

pub fn us_east_1b() -> Instance {
    Instance {
        id: "i-d2e638f9".to_string(),
        availability_zone: "us-east-1b".to_string(),
        public_dns_name: "ec2-1-2-3-4.compute-1.amazonaws.com".to_string(),
        private_ip_address: "1.2.3.4".to_string(),
    }
}

pub fn us_east_1e() -> Instance {
    Instance {
        id: "i-d3e638f8".to_string(),
        availability_zone: "us-east-1e".to_string(),
        public_dns_name: "ec2-5-6-7-8.compute-1.amazonaws.com".to_string(),
        private_ip_address: "5.6.7.8".to_string(),
    }
}

/// One instance in us-east-1b and one in us-east-1e with the given states.
pub fn scenario_instances(state_1b: &str, state_1e: &str) -> Vec<InstanceHealth> {
    vec![
        InstanceHealth::new(us_east_1b(), state_1b),
        InstanceHealth::new(us_east_1e(), state_1e),
    ]
}
