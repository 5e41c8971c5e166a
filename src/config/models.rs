// src/config/models.rs
use super::ConfigError;
use crate::backends::BackendDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_CHECK_INTERVAL_SECS: f64 = 30.0;
pub const DEFAULT_METADATA_URL: &str =
    "http://169.254.169.254/latest/meta-data/placement/availability-zone";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub services: Vec<ServiceConfig>,
    pub elb_api: ElbApiConfig,
    #[serde(default)]
    pub zone: ZoneConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.services.is_empty() {
            return Err(ConfigError::NoServices);
        }

        let mut seen = HashSet::new();
        for service in &self.services {
            service.validate()?;
            let name = service.name()?;
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateService(name.to_string()));
            }
        }

        Ok(())
    }
}

/// One watched service, shaped like a synapse-style service block.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub discovery: Option<DiscoveryConfig>,
    #[serde(default)]
    pub haproxy: Option<HaproxyConfig>,
    /// Servers applied when discovery finds no healthy backends.
    #[serde(default)]
    pub default_servers: Vec<BackendDescriptor>,
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.name()?;
        self.discovery()?;
        self.port_override()?;
        Ok(())
    }

    pub fn name(&self) -> Result<&str, ConfigError> {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(ConfigError::MissingOption("name")),
        }
    }

    pub fn discovery(&self) -> Result<&DiscoveryConfig, ConfigError> {
        let discovery = self
            .discovery
            .as_ref()
            .ok_or(ConfigError::MissingOption("discovery"))?;
        discovery.validate()?;
        Ok(discovery)
    }

    pub fn port_override(&self) -> Result<u16, ConfigError> {
        let haproxy = self
            .haproxy
            .as_ref()
            .ok_or(ConfigError::MissingOption("haproxy"))?;
        haproxy
            .server_port_override
            .ok_or(ConfigError::MissingPortOverride)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    #[serde(default)]
    pub method: Option<String>,

    #[serde(rename = "elb-name", default)]
    pub elb_name: Option<String>,

    /// Seconds between the start of two consecutive checks.
    #[serde(default = "default_check_interval")]
    pub check_interval: f64,

    /// Mark servers outside our own zone as backups.
    #[serde(rename = "prefer-same-zone", default)]
    pub prefer_same_zone: bool,
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.method.as_deref() != Some("elb") {
            return Err(ConfigError::InvalidDiscoveryMethod);
        }

        match self.elb_name.as_deref() {
            Some(name) if !name.is_empty() => {}
            _ => return Err(ConfigError::MissingElbName),
        }

        self.interval()?;
        Ok(())
    }

    /// The check interval as a non-zero `Duration`.
    pub fn interval(&self) -> Result<Duration, ConfigError> {
        match Duration::try_from_secs_f64(self.check_interval) {
            Ok(interval) if !interval.is_zero() => Ok(interval),
            _ => Err(ConfigError::InvalidCheckInterval(self.check_interval)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HaproxyConfig {
    /// Frontend port of the proxy. Accepted so synapse-style service blocks
    /// load unchanged; the watcher only uses `server_port_override`.
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub server_port_override: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ElbApiConfig {
    pub endpoint: Url,
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

impl ElbApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZoneConfig {
    /// Fixed zone; skips the metadata lookup when set.
    #[serde(default)]
    pub availability_zone: Option<String>,
    #[serde(default = "default_metadata_url")]
    pub metadata_url: Url,
    #[serde(default = "default_metadata_timeout")]
    pub timeout_secs: u64,
}

impl ZoneConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            availability_zone: None,
            metadata_url: default_metadata_url(),
            timeout_secs: default_metadata_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkConfig {
    #[default]
    Log,
    JsonFile { directory: PathBuf },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_metrics_port(),
            path: default_metrics_path(),
        }
    }
}

/// Validated per-watcher settings.
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherConfig {
    pub service: String,
    pub elb_name: String,
    pub check_interval: Duration,
    pub own_zone: String,
    pub prefer_same_zone: bool,
    pub port: u16,
    pub default_servers: Vec<BackendDescriptor>,
}

impl WatcherConfig {
    pub fn from_service(
        service: &ServiceConfig,
        own_zone: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let name = service.name()?;
        let discovery = service.discovery()?;
        let port = service.port_override()?;

        Ok(Self {
            service: name.to_string(),
            // validated non-empty above
            elb_name: discovery.elb_name.clone().unwrap_or_default(),
            check_interval: discovery.interval()?,
            own_zone: own_zone.into(),
            prefer_same_zone: discovery.prefer_same_zone,
            port,
            default_servers: service.default_servers.clone(),
        })
    }
}

fn default_check_interval() -> f64 {
    DEFAULT_CHECK_INTERVAL_SECS
}

fn default_api_timeout() -> u64 {
    10
}

fn default_metadata_url() -> Url {
    // constant, known to parse
    Url::parse(DEFAULT_METADATA_URL).unwrap_or_else(|_| unreachable!())
}

fn default_metadata_timeout() -> u64 {
    2
}

fn default_true() -> bool {
    true
}

fn default_metrics_port() -> u16 {
    9100
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}
