//! Versioned blob store client.
//!
//! # Responsibilities
//! - Fetch the storefront document from raw-content hosting (cache-busted)
//! - Read the blob's version token from the contents API
//! - Write the document back with optimistic concurrency
//!
//! # Design Decisions
//! - Reads retry transport errors and 5xx with backoff; writes never retry
//! - A version mismatch is its own error (`WriteConflict`), never swallowed
//! - The token is checked before any authenticated call goes out

use base64::prelude::{Engine as _, BASE64_STANDARD};
use chrono::Utc;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

use crate::catalog::StoreConfig;
use crate::config::{RemoteSettings, ResolverSettings, RetrySettings};
use crate::observability::metrics;
use crate::remote::types::{
    ContentMetadata, ErrorResponse, RemoteError, RemoteResult, RemoteWriteResult, VersionToken,
    WriteRequest, WriteResponse,
};
use crate::resilience::retry_delay;
use crate::tenant::TenantCoordinates;

const CONTENTS_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const GENERIC_WRITE_FAILURE: &str = "write failed";

/// Client for the remote configuration blob.
#[derive(Clone)]
pub struct BlobStoreClient {
    http: Client,
    remote: RemoteSettings,
    retries: RetrySettings,
}

impl BlobStoreClient {
    /// Build a client from resolver settings.
    pub fn new(settings: &ResolverSettings) -> RemoteResult<Self> {
        let http = Client::builder()
            .user_agent(settings.remote.user_agent.as_str())
            .connect_timeout(Duration::from_secs(settings.timeouts.connect_secs))
            .timeout(Duration::from_secs(settings.timeouts.request_secs))
            .build()?;

        Ok(Self {
            http,
            remote: settings.remote.clone(),
            retries: settings.retries.clone(),
        })
    }

    /// Raw-content URL for `coords`, or the built-in default document when
    /// the tenant has no repository configured.
    pub fn raw_url(&self, coords: Option<&TenantCoordinates>) -> String {
        match coords.filter(|c| c.is_configured()) {
            Some(c) => format!(
                "{}/{}/{}/{}",
                c.raw_host(&self.remote.raw_host),
                c.namespace(),
                c.branch(),
                self.blob_path()
            ),
            None => self.remote.default_config_url.clone(),
        }
    }

    /// Contents API URL for `coords`.
    pub fn contents_url(&self, coords: &TenantCoordinates) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.remote.api_host.trim_end_matches('/'),
            coords.namespace(),
            self.blob_path()
        )
    }

    fn blob_path(&self) -> &str {
        self.remote.config_path.trim_matches('/')
    }

    /// Fetch and decode the storefront document.
    ///
    /// Every attempt carries a fresh `t` query parameter so intermediate
    /// caches cannot serve a stale copy.
    pub async fn fetch(&self, coords: Option<&TenantCoordinates>) -> RemoteResult<StoreConfig> {
        let url = self.raw_url(coords);
        let attempts = self.retries.attempts();
        let mut attempt = 0;

        loop {
            match self.fetch_once(&url).await {
                Ok(config) => {
                    metrics::record_remote_read("ok");
                    tracing::debug!(url = %url, attempt, "Remote config fetched");
                    return Ok(config);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= attempts || !e.is_retryable() {
                        metrics::record_remote_read("failed");
                        return Err(e);
                    }
                    let delay = retry_delay(&self.retries, attempt);
                    tracing::warn!(
                        url = %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Remote read failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> RemoteResult<StoreConfig> {
        let response = self
            .http
            .get(url)
            .query(&[("t", Utc::now().timestamp_millis())])
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Unavailable {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| RemoteError::Malformed(e.to_string()))
    }

    /// Current version token of the blob, `None` if it does not exist yet.
    pub async fn version_token(
        &self,
        coords: &TenantCoordinates,
    ) -> RemoteResult<Option<VersionToken>> {
        let token = Self::credentials(coords)?;

        let response = self
            .http
            .get(self.contents_url(coords))
            .query(&[("ref", coords.branch())])
            .bearer_auth(token)
            .header(ACCEPT, CONTENTS_MEDIA_TYPE)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(namespace = %coords.namespace(), "Remote config absent, will create");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RemoteError::WriteRejected {
                status: status.as_u16(),
                message: error_message(response).await,
            });
        }

        let metadata: ContentMetadata = response.json().await?;
        Ok(metadata.sha.map(VersionToken))
    }

    /// Publish `config` for `coords`: read the current version token, then
    /// write with it.
    pub async fn write(
        &self,
        config: &StoreConfig,
        coords: &TenantCoordinates,
    ) -> RemoteResult<RemoteWriteResult> {
        Self::credentials(coords)?;
        let version = self.version_token(coords).await?;
        self.write_with_version(config, coords, version.as_ref()).await
    }

    /// Write `config` asserting the blob is still at `version`.
    ///
    /// `None` asserts the blob does not exist. A mismatch yields
    /// [`RemoteError::WriteConflict`] and leaves the stored blob untouched.
    pub async fn write_with_version(
        &self,
        config: &StoreConfig,
        coords: &TenantCoordinates,
        version: Option<&VersionToken>,
    ) -> RemoteResult<RemoteWriteResult> {
        let token = Self::credentials(coords)?;

        let json = serde_json::to_string_pretty(config)?;
        let body = WriteRequest {
            message: change_description(),
            content: BASE64_STANDARD.encode(json.as_bytes()),
            sha: version.map(VersionToken::as_str),
            branch: coords.branch(),
        };

        let response = self
            .http
            .put(self.contents_url(coords))
            .bearer_auth(token)
            .header(ACCEPT, CONTENTS_MEDIA_TYPE)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let parsed = match response.json::<WriteResponse>().await {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(
                        namespace = %coords.namespace(),
                        error = %e,
                        "Write accepted but response unreadable, version unknown"
                    );
                    WriteResponse::default()
                }
            };
            let result = RemoteWriteResult {
                version: parsed.content.and_then(|c| c.sha).map(VersionToken),
                commit: parsed.commit.and_then(|c| c.sha),
                created: status == StatusCode::CREATED,
            };
            metrics::record_remote_write("ok");
            tracing::info!(
                namespace = %coords.namespace(),
                branch = %coords.branch(),
                version = ?result.version,
                created = result.created,
                "Remote config written"
            );
            return Ok(result);
        }

        let message = error_message(response).await;
        // Without a token the backend reports "sha wasn't supplied" when the
        // blob appeared since we last looked; that is a conflict too.
        let conflict = status == StatusCode::CONFLICT
            || (status == StatusCode::UNPROCESSABLE_ENTITY
                && version.is_none()
                && message.contains("sha"));

        if conflict {
            metrics::record_remote_write("conflict");
            tracing::warn!(namespace = %coords.namespace(), message = %message, "Remote write conflict");
            Err(RemoteError::WriteConflict { message })
        } else {
            metrics::record_remote_write("rejected");
            tracing::error!(
                namespace = %coords.namespace(),
                status = status.as_u16(),
                message = %message,
                "Remote write rejected"
            );
            Err(RemoteError::WriteRejected {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn credentials(coords: &TenantCoordinates) -> RemoteResult<&str> {
        if !coords.is_configured() {
            return Err(RemoteError::NoCoordinates);
        }
        coords.token().ok_or(RemoteError::MissingToken)
    }
}

/// Human-readable change description recorded with each write.
fn change_description() -> String {
    format!(
        "Update store settings - {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Backend-provided error message, or a generic one.
async fn error_message(response: Response) -> String {
    response
        .text()
        .await
        .ok()
        .and_then(|text| serde_json::from_str::<ErrorResponse>(&text).ok())
        .and_then(|body| body.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| GENERIC_WRITE_FAILURE.to_string())
}
