// src/zones/provider.rs
use crate::config::ZoneConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ZoneError {
    #[error("availability zone lookup failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("instance metadata returned HTTP {0}")]
    Status(u16),

    #[error("instance metadata returned an empty availability zone")]
    Empty,
}

/// Source of the availability zone this daemon runs in.
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    async fn own_zone(&self) -> Result<String, ZoneError>;
}

/// A zone fixed in configuration.
pub struct StaticZone(pub String);

#[async_trait]
impl ZoneProvider for StaticZone {
    async fn own_zone(&self) -> Result<String, ZoneError> {
        if self.0.trim().is_empty() {
            return Err(ZoneError::Empty);
        }
        Ok(self.0.trim().to_string())
    }
}

/// Reads the placement zone from the EC2 instance metadata service.
pub struct InstanceMetadataZone {
    url: Url,
    client: Client,
}

impl InstanceMetadataZone {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, ZoneError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl ZoneProvider for InstanceMetadataZone {
    async fn own_zone(&self) -> Result<String, ZoneError> {
        let response = self.client.get(self.url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(ZoneError::Status(response.status().as_u16()));
        }

        let zone = response.text().await?.trim().to_string();
        if zone.is_empty() {
            return Err(ZoneError::Empty);
        }
        Ok(zone)
    }
}

/// Pick the provider for the configured zone settings.
pub fn zone_provider(config: &ZoneConfig) -> Result<Arc<dyn ZoneProvider>, ZoneError> {
    match &config.availability_zone {
        Some(zone) => Ok(Arc::new(StaticZone(zone.clone()))),
        None => Ok(Arc::new(InstanceMetadataZone::new(
            config.metadata_url.clone(),
            config.timeout(),
        )?)),
    }
}
