//! Reference manifest download over HTTP(S)

use crate::error::{ApiError, NetworkError, StorageError};
use crate::manifest::Manifest;
use reqwest::Client;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Reference manifest published for the cache cleaner
pub const DEFAULT_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/Allerek/vibe-rp-cache-cleaner/main/hashes.json";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const FETCH_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// Map reqwest failures onto the network error taxonomy
fn map_http_error(url: &str, error: reqwest::Error) -> NetworkError {
    if let Some(status) = error.status() {
        NetworkError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        }
    } else if error.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        NetworkError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        NetworkError::Request {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Downloads reference manifests
#[derive(Debug, Clone)]
pub struct ManifestFetcher {
    client: Client,
}

impl ManifestFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .connect_timeout(FETCH_CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// GET `url` and return the body; any non-2xx status is an error
    pub async fn fetch_text(&self, url: &str) -> Result<String, NetworkError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_http_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        debug!(url, status = status.as_u16(), "Manifest response received");

        response.text().await.map_err(|e| map_http_error(url, e))
    }

    /// Download the manifest at `url` into `dest`, then load it from there
    #[instrument(skip(self), fields(dest = %dest.display()))]
    pub async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<Manifest, ApiError> {
        let body = self.fetch_text(url).await?;

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::create_dir(parent, e))?;
        }
        fs::write(dest, &body).map_err(|e| StorageError::write(dest, e))?;
        info!(bytes = body.len(), "Downloaded manifest");

        Manifest::load(dest)
    }
}
