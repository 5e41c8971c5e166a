// src/sink/mod.rs
mod file;
mod logger;

pub use file::JsonFileSink;
pub use logger::LogSink;

use crate::backends::BackendDescriptor;
use crate::config::SinkConfig;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to write backend state for {service}: {source}")]
    Io {
        service: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode backend state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Downstream configuration reload, invoked with the full applied list.
///
/// One watcher calls this from its own task; implementations shared by
/// several watchers must serialize themselves.
#[async_trait]
pub trait ReconfigureSink: Send + Sync {
    async fn reconfigure(
        &self,
        service: &str,
        backends: &[BackendDescriptor],
    ) -> Result<(), SinkError>;
}

pub fn create_sink(config: &SinkConfig) -> Arc<dyn ReconfigureSink> {
    match config {
        SinkConfig::Log => Arc::new(LogSink),
        SinkConfig::JsonFile { directory } => Arc::new(JsonFileSink::new(directory.clone())),
    }
}
