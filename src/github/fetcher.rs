use std::path::Path;
use std::sync::Arc;

use crate::error::{LinearizeError, Result};
use crate::io::HttpTransport;

use super::client::GitHubConfig;
use super::reference::CanonicalReference;

/// Downloads repository archives from the codeload host.
pub struct ArchiveFetcher {
    transport: Arc<dyn HttpTransport>,
    config: GitHubConfig,
}

impl ArchiveFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, config: GitHubConfig) -> Self {
        Self { transport, config }
    }

    /// Download the ZIP archive for `reference`.
    pub async fn fetch(&self, reference: &CanonicalReference) -> Result<Vec<u8>> {
        let url = reference.download_url(&self.config.codeload_base)?;
        log::info!("Downloading {} from {}", reference, url);

        let response = self
            .transport
            .get(url.as_str(), &self.config.headers())
            .await
            .map_err(|err| LinearizeError::Download {
                url: url.to_string(),
                reason: format!("{:#}", err),
            })?;

        if !response.is_success() {
            return Err(LinearizeError::Download {
                url: url.to_string(),
                reason: format!("HTTP status {}", response.status),
            });
        }

        log::info!("Downloaded {} bytes", response.body.len());
        Ok(response.body)
    }

    /// Download the archive straight into `path`.
    pub async fn fetch_to(&self, reference: &CanonicalReference, path: &Path) -> Result<()> {
        let bytes = self.fetch(reference).await?;
        Self::persist(&bytes, path).await
    }

    /// Write downloaded bytes to a caller-supplied path.
    pub async fn persist(bytes: &[u8], path: &Path) -> Result<()> {
        tokio::fs::write(path, bytes).await.map_err(|err| {
            LinearizeError::OutputWrite(format!("{}: {}", path.display(), err))
        })?;
        log::debug!("Archive written to {}", path.display());
        Ok(())
    }
}
