// src/config/error.rs

/// Construction-time configuration failures. A watcher never starts when
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required option {0}")]
    MissingOption(&'static str),

    #[error("discovery method must be set to 'elb'")]
    InvalidDiscoveryMethod,

    #[error("elb-name is required")]
    MissingElbName,

    #[error("check_interval must be a positive number of seconds, got {0}")]
    InvalidCheckInterval(f64),

    #[error("haproxy.server_port_override is required")]
    MissingPortOverride,

    #[error("at least one service must be configured")]
    NoServices,

    #[error("duplicate service name '{0}'")]
    DuplicateService(String),
}
