// src/sink/file.rs
use super::{ReconfigureSink, SinkError};
use crate::backends::BackendDescriptor;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes `<directory>/<service>.json` for a downstream reloader to pick up.
pub struct JsonFileSink {
    directory: PathBuf,
}

#[derive(Serialize)]
struct BackendState<'a> {
    service: &'a str,
    updated_at: String,
    backends: &'a [BackendDescriptor],
}

impl JsonFileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, service: &str) -> PathBuf {
        self.directory.join(format!("{service}.json"))
    }

    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.directory).await?;

        // readers only ever see a complete file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, path).await
    }
}

#[async_trait]
impl ReconfigureSink for JsonFileSink {
    async fn reconfigure(
        &self,
        service: &str,
        backends: &[BackendDescriptor],
    ) -> Result<(), SinkError> {
        let state = BackendState {
            service,
            updated_at: Utc::now().to_rfc3339(),
            backends,
        };
        let contents = serde_json::to_vec_pretty(&state)?;

        let path = self.path_for(service);
        self.write_atomic(&path, &contents)
            .await
            .map_err(|source| SinkError::Io {
                service: service.to_string(),
                source,
            })?;

        info!(
            service = %service,
            path = %path.display(),
            count = backends.len(),
            "Wrote backend state"
        );
        Ok(())
    }
}
