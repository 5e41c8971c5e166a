// src/sink/logger.rs
use super::{ReconfigureSink, SinkError};
use crate::backends::BackendDescriptor;
use async_trait::async_trait;
use tracing::info;

/// Reports every reconfiguration to the log and nothing else.
pub struct LogSink;

#[async_trait]
impl ReconfigureSink for LogSink {
    async fn reconfigure(
        &self,
        service: &str,
        backends: &[BackendDescriptor],
    ) -> Result<(), SinkError> {
        info!(service = %service, count = backends.len(), "Reconfiguring backends");
        for backend in backends {
            info!(service = %service, "  {}", backend);
        }
        Ok(())
    }
}
