//! Dataset download clients.

use crate::errors::DownloadError;
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Matches the token Drive embeds in its large-file warning page, either as a
/// query parameter or as a hidden form field.
const CONFIRM_PATTERN: &str = r#"confirm=([0-9A-Za-z_-]+)|name="confirm"\s+value="([0-9A-Za-z_-]+)""#;

/// Fetches a remote file to a local path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Downloads `url` into `dest`, overwriting it, and returns the number of
    /// bytes written.
    ///
    /// # Errors
    ///
    /// Returns a [`DownloadError`] describing the transport, protocol, or
    /// write failure.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError>;
}

/// HTTP downloader that understands Google Drive's confirmation page.
#[derive(Debug, Clone, Default)]
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    /// Creates a downloader with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a downloader with a preconfigured client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| DownloadError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let mut response = self.get(url).await?;

        if let Some(content_type) = html_content_type(&response) {
            let body = response.text().await.map_err(|source| DownloadError::Transport {
                url: url.to_string(),
                source,
            })?;
            let Some(token) = confirm_token(&body) else {
                warn!(url, "Received an HTML page without a confirmation token");
                return Err(DownloadError::UnexpectedContent {
                    url: url.to_string(),
                    content_type,
                });
            };

            let confirmed = with_confirm(url, &token);
            debug!(url = %confirmed, "Retrying download with confirmation token");
            response = self.get(&confirmed).await?;
            if let Some(content_type) = html_content_type(&response) {
                return Err(DownloadError::UnexpectedContent {
                    url: confirmed,
                    content_type,
                });
            }
        }

        write_body(url, response, dest).await
    }
}

async fn write_body(
    url: &str,
    mut response: reqwest::Response,
    dest: &Path,
) -> Result<u64, DownloadError> {
    let write_err = |source| DownloadError::Write {
        path: dest.to_path_buf(),
        source,
    };
    let mut file = tokio::fs::File::create(dest).await.map_err(write_err)?;

    let mut written = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|source| DownloadError::Transport {
            url: url.to_string(),
            source,
        })?
    {
        file.write_all(&chunk).await.map_err(write_err)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(write_err)?;

    Ok(written)
}

fn html_content_type(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.starts_with("text/html"))
        .map(str::to_string)
}

/// Extracts the confirmation token from a Drive warning page.
pub(crate) fn confirm_token(body: &str) -> Option<String> {
    let re = Regex::new(CONFIRM_PATTERN).ok()?;
    let caps = re.captures(body)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

fn with_confirm(url: &str, token: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}confirm={token}")
}
