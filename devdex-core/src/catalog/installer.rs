//! Pack installation into the overlay directory
//!
//! Downloads are written to a hidden temporary file and renamed into place
//! only after the transfer finished with HTTP 200, so a failed download never
//! leaves a file claiming success. Content is not validated here; the next
//! catalog load does that and quarantines anything unparseable.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::RemoteIndexEntry;
use crate::error::InstallError;
use crate::storage::{validate_file_name, PackDirectory};

/// Raw result of fetching a URL
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Transport used to download packs and the remote index
#[async_trait]
pub trait PackFetcher: Send + Sync {
    /// GET `url`. Non-success statuses are returned, not raised; the body is
    /// only read for 200 responses.
    async fn fetch(&self, url: &str) -> Result<FetchResponse, InstallError>;
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("devdex/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PackFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, InstallError> {
        let transport = |e: reqwest::Error| InstallError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status().as_u16();

        if status != 200 {
            return Ok(FetchResponse {
                status,
                body: Vec::new(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        Ok(FetchResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Downloads and removes overlay pack files
pub struct PackInstaller {
    directory: Arc<dyn PackDirectory>,
    fetcher: Arc<dyn PackFetcher>,
}

impl PackInstaller {
    pub fn new(directory: Arc<dyn PackDirectory>, fetcher: Arc<dyn PackFetcher>) -> Self {
        Self { directory, fetcher }
    }

    /// Download `url` into the overlay directory as `filename`
    ///
    /// Returns true only when the transfer completed with HTTP 200 and the
    /// file was committed.
    pub async fn install_pack(&self, url: &str, filename: &str) -> bool {
        self.report(filename, self.install_pack_detailed(url, filename).await)
    }

    /// Install a pack advertised by the remote index, checking its digest
    /// when one is published
    pub async fn install_entry(&self, entry: &RemoteIndexEntry) -> bool {
        let result = self
            .download(&entry.url, &entry.filename, entry.digest.as_deref())
            .await;
        self.report(&entry.filename, result)
    }

    /// Typed form of [`PackInstaller::install_pack`]
    pub async fn install_pack_detailed(
        &self,
        url: &str,
        filename: &str,
    ) -> Result<(), InstallError> {
        self.download(url, filename, None).await
    }

    /// Delete an installed pack file
    ///
    /// Returns false on any failure, including a file that does not exist.
    pub async fn remove_pack(&self, filename: &str) -> bool {
        match self.directory.remove(filename).await {
            Ok(()) => {
                info!("Removed pack file {}", filename);
                true
            }
            Err(e) => {
                warn!("Could not remove pack file {}: {}", filename, e);
                false
            }
        }
    }

    /// File names currently in the overlay directory; empty if unreadable
    pub async fn list_installed_files(&self) -> Vec<String> {
        match self.directory.list().await {
            Ok(files) => files,
            Err(e) => {
                debug!("Overlay directory not listable: {}", e);
                Vec::new()
            }
        }
    }

    fn report(&self, filename: &str, result: Result<(), InstallError>) -> bool {
        match result {
            Ok(()) => {
                info!("Installed pack file {}", filename);
                true
            }
            Err(e) => {
                warn!("Failed to install pack file {}: {}", filename, e);
                false
            }
        }
    }

    async fn download(
        &self,
        url: &str,
        filename: &str,
        digest: Option<&str>,
    ) -> Result<(), InstallError> {
        validate_file_name(filename)?;
        self.directory.ensure().await?;

        info!("Downloading {} from {}", filename, url);
        let response = self.fetcher.fetch(url).await?;

        if response.status != 200 {
            return Err(InstallError::Http {
                status: response.status,
                url: url.to_string(),
            });
        }

        if let Some(expected) = digest {
            verify_digest(&response.body, expected)?;
            debug!("Verified digest: {}", expected);
        }

        let partial = format!(".{}.{}.part", filename, Uuid::new_v4().simple());

        let committed = match self.directory.write(&partial, &response.body).await {
            Ok(()) => self.directory.rename(&partial, filename).await,
            Err(e) => Err(e),
        };

        if let Err(e) = committed {
            if let Err(cleanup) = self.directory.remove(&partial).await {
                debug!("No partial download to clean up for {}: {}", filename, cleanup);
            }
            return Err(e.into());
        }

        Ok(())
    }
}

/// Check bytes against a `sha256:<hex>` (or bare hex) digest
fn verify_digest(bytes: &[u8], expected: &str) -> Result<(), InstallError> {
    let actual = hex::encode(Sha256::digest(bytes));
    let wanted = expected
        .strip_prefix("sha256:")
        .unwrap_or(expected)
        .to_ascii_lowercase();

    if actual != wanted {
        return Err(InstallError::DigestMismatch {
            expected: expected.to_string(),
            actual: format!("sha256:{actual}"),
        });
    }

    Ok(())
}
