//! Remote package registry boundary
//!
//! The orchestrator consumes the registry through this trait: version
//! listing (newest first), download-URL resolution, descriptive metadata,
//! archive download, and a best-effort uninstall notification. The HTTP
//! implementation talks to the market API over reqwest.

use async_trait::async_trait;
use futures::StreamExt;
use packhost_core::types::{PromoteMode, RegistryDetail, RegistryVersion};
use packhost_core::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

/// Remote package registry client
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// List published versions, newest first (index 0 is "latest")
    async fn get_versions(&self, identifier: &str) -> Result<Vec<RegistryVersion>>;

    /// Resolve the archive download URL for one version
    async fn get_download_url(
        &self,
        identifier: &str,
        version: &str,
        mode: PromoteMode,
    ) -> Result<String>;

    /// Fetch descriptive metadata for an extension
    async fn get_detail(&self, identifier: &str) -> Result<RegistryDetail>;

    /// Download an archive to `dest_dir`, named `<basename>.<ext>` with the
    /// extension inferred from the response
    ///
    /// Returns the written file path.
    async fn download(&self, url: &str, dest_dir: &Path, basename: &str) -> Result<PathBuf>;

    /// Tell the registry an extension was uninstalled (best-effort; callers
    /// log failures and continue)
    async fn notify_uninstall(&self, identifier: &str, version: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct DownloadUrlResponse {
    url: String,
}

/// HTTP registry client over the market API
pub struct HttpRegistryClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRegistryClient {
    /// Create a client against the given market base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::registry(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::registry(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::registry(format!("invalid response from {}: {}", url, e)))
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn get_versions(&self, identifier: &str) -> Result<Vec<RegistryVersion>> {
        let url = self.endpoint(&format!("extensions/{}/versions", identifier));
        self.get_json(&url).await
    }

    async fn get_download_url(
        &self,
        identifier: &str,
        version: &str,
        mode: PromoteMode,
    ) -> Result<String> {
        let url = self.endpoint(&format!(
            "extensions/{}/download?version={}&mode={}",
            identifier, version, mode
        ));
        let response: DownloadUrlResponse = self.get_json(&url).await?;
        Ok(response.url)
    }

    async fn get_detail(&self, identifier: &str) -> Result<RegistryDetail> {
        let url = self.endpoint(&format!("extensions/{}", identifier));
        self.get_json(&url).await
    }

    async fn download(&self, url: &str, dest_dir: &Path, basename: &str) -> Result<PathBuf> {
        info!("Downloading archive from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::registry(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::registry(format!(
                "download from {} returned {}",
                url,
                response.status()
            )));
        }

        let disposition = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let extension = crate::cache::infer_file_extension(disposition.as_deref(), url);
        let dest = dest_dir.join(format!("{}.{}", basename, extension));

        tokio::fs::create_dir_all(dest_dir).await?;

        // Stream to a scratch name first; only a complete archive may land
        // at a path the cache resolves, otherwise a mid-stream failure would
        // leave a truncated file that every retry hits as a cache entry.
        let partial = dest_dir.join(format!("dl-{}.part", Uuid::new_v4()));
        let mut file = tokio::fs::File::create(&partial).await?;

        let streamed = async {
            let mut stream = response.bytes_stream();
            let mut written: u64 = 0;
            while let Some(chunk) = stream.next().await {
                let chunk = chunk
                    .map_err(|e| Error::registry(format!("download stream error: {}", e)))?;
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok::<u64, Error>(written)
        }
        .await;

        let written = match streamed {
            Ok(written) => written,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };

        tokio::fs::rename(&partial, &dest).await?;

        debug!("Downloaded {} bytes to {:?}", written, dest);
        Ok(dest)
    }

    async fn notify_uninstall(&self, identifier: &str, version: &str) -> Result<()> {
        let url = self.endpoint(&format!(
            "extensions/{}/uninstalled?version={}",
            identifier, version
        ));

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| Error::registry(format!("POST {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::registry(format!(
                "POST {} returned {}",
                url,
                response.status()
            )));
        }

        Ok(())
    }
}
