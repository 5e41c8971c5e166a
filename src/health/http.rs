// src/health/http.rs
use super::api::{DiscoveryError, Instance, InstanceHealth, LoadBalancerApi, LoadBalancerState};
use crate::config::ElbApiConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Load balancer API spoken over JSON/HTTP to a health gateway.
pub struct HttpLoadBalancerApi {
    base: Url,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct LoadBalancerResponse {
    #[allow(dead_code)]
    name: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct InstanceHealthResponse {
    instances: Vec<InstanceHealthEntry>,
}

#[derive(Debug, Deserialize)]
struct InstanceHealthEntry {
    instance_id: String,
    availability_zone: String,
    public_dns_name: String,
    private_ip_address: String,
    state: String,
}

impl From<InstanceHealthEntry> for InstanceHealth {
    fn from(entry: InstanceHealthEntry) -> Self {
        InstanceHealth {
            instance: Instance {
                id: entry.instance_id,
                availability_zone: entry.availability_zone,
                public_dns_name: entry.public_dns_name,
                private_ip_address: entry.private_ip_address,
            },
            state: entry.state,
        }
    }
}

impl HttpLoadBalancerApi {
    pub fn new(config: &ElbApiConfig) -> Result<Self, DiscoveryError> {
        if config.endpoint.cannot_be_a_base() {
            return Err(DiscoveryError::InvalidEndpoint(config.endpoint.to_string()));
        }

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            base: config.endpoint.clone(),
            client,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, DiscoveryError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DiscoveryError::InvalidEndpoint(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, DiscoveryError> {
        debug!(url = %url, "Querying load balancer API");
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DiscoveryError::Api {
                status: status.as_u16(),
                path: url.path().to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| DiscoveryError::Decode(e.to_string()))
    }
}

#[async_trait]
impl LoadBalancerApi for HttpLoadBalancerApi {
    async fn describe(&self, name: &str) -> Result<LoadBalancerState, DiscoveryError> {
        let url = self.url(&["v1", "load-balancers", name])?;

        Ok(match self.get_json::<LoadBalancerResponse>(url).await? {
            Some(lb) => LoadBalancerState {
                exists: true,
                active: lb.state.eq_ignore_ascii_case("active"),
            },
            None => LoadBalancerState::missing(),
        })
    }

    async fn instances_with_health(
        &self,
        name: &str,
    ) -> Result<Vec<InstanceHealth>, DiscoveryError> {
        let url = self.url(&["v1", "load-balancers", name, "instance-health"])?;

        match self.get_json::<InstanceHealthResponse>(url).await? {
            Some(response) => Ok(response.instances.into_iter().map(Into::into).collect()),
            None => Err(DiscoveryError::LoadBalancerNotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_for(server: &mockito::ServerGuard) -> HttpLoadBalancerApi {
        HttpLoadBalancerApi::new(&ElbApiConfig {
            endpoint: Url::parse(&server.url()).unwrap(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_describe_active_load_balancer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/load-balancers/foo")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "foo", "state": "active"}"#)
            .create_async()
            .await;

        let state = api_for(&server).describe("foo").await.unwrap();

        assert!(state.exists);
        assert!(state.active);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_describe_inactive_load_balancer() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/load-balancers/foo")
            .with_status(200)
            .with_body(r#"{"name": "foo", "state": "provisioning"}"#)
            .create_async()
            .await;

        let state = api_for(&server).describe("foo").await.unwrap();

        assert!(state.exists);
        assert!(!state.active);
    }

    #[tokio::test]
    async fn test_describe_missing_load_balancer() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/load-balancers/foo")
            .with_status(404)
            .create_async()
            .await;

        let state = api_for(&server).describe("foo").await.unwrap();

        assert_eq!(state, LoadBalancerState::missing());
    }

    #[tokio::test]
    async fn test_instances_with_health() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/load-balancers/foo/instance-health")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"instances": [
                    {"instance_id": "i-d2e638f9", "availability_zone": "us-east-1b",
                     "public_dns_name": "ec2-1-2-3-4.compute-1.amazonaws.com",
                     "private_ip_address": "1.2.3.4", "state": "InService"},
                    {"instance_id": "i-d3e638f8", "availability_zone": "us-east-1e",
                     "public_dns_name": "ec2-5-6-7-8.compute-1.amazonaws.com",
                     "private_ip_address": "5.6.7.8", "state": "OutOfService"}
                ]}"#,
            )
            .create_async()
            .await;

        let health = api_for(&server).instances_with_health("foo").await.unwrap();

        assert_eq!(health.len(), 2);
        assert_eq!(health[0].instance.id, "i-d2e638f9");
        assert!(health[0].is_in_service());
        assert_eq!(health[1].instance.private_ip_address, "5.6.7.8");
        assert!(!health[1].is_in_service());
    }

    #[tokio::test]
    async fn test_server_error_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/load-balancers/foo/instance-health")
            .with_status(500)
            .create_async()
            .await;

        let err = api_for(&server)
            .instances_with_health("foo")
            .await
            .unwrap_err();

        assert!(matches!(err, DiscoveryError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/load-balancers/foo")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = api_for(&server).describe("foo").await.unwrap_err();

        assert!(matches!(err, DiscoveryError::Decode(_)));
    }

    #[test]
    fn test_endpoint_path_prefix_is_kept() {
        let api = HttpLoadBalancerApi::new(&ElbApiConfig {
            endpoint: Url::parse("http://gateway.internal/elb/").unwrap(),
            timeout_secs: 5,
        })
        .unwrap();

        let url = api.url(&["v1", "load-balancers", "foo"]).unwrap();

        assert_eq!(url.as_str(), "http://gateway.internal/elb/v1/load-balancers/foo");
    }
}
