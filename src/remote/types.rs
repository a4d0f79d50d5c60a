//! Remote store types and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque marker of the remote blob's current version.
///
/// Must accompany a write that replaces an existing blob; a write without
/// one creates the blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct VersionToken(pub String);

impl VersionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VersionToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur talking to the remote store.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Read returned a non-success status.
    #[error("remote config unavailable at {url}: HTTP {status}")]
    Unavailable { url: String, status: u16 },

    /// Network-level failure (DNS, connect, timeout, body read).
    #[error("remote transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Body was not a valid storefront document.
    #[error("remote config is malformed: {0}")]
    Malformed(String),

    /// The supplied version token no longer matches the stored blob.
    /// Re-read the token and retry.
    #[error("remote write conflict: {message}")]
    WriteConflict { message: String },

    /// Any other rejected write, with the backend's message when it gave one.
    #[error("remote write rejected (HTTP {status}): {message}")]
    WriteRejected { status: u16, message: String },

    /// A write was attempted without a credential token.
    #[error("tenant has no credential token configured")]
    MissingToken,

    /// The tenant has no remote repository configured.
    #[error("tenant has no remote coordinates configured")]
    NoCoordinates,

    #[error("failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RemoteError {
    /// Whether repeating the operation may succeed.
    ///
    /// A conflict is retryable only after re-reading the version token.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::WriteConflict { .. } => true,
            RemoteError::Transport(e) => !e.is_builder() && !e.is_decode(),
            RemoteError::Unavailable { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether this is a version mismatch on write.
    pub fn is_conflict(&self) -> bool {
        matches!(self, RemoteError::WriteConflict { .. })
    }
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteWriteResult {
    /// Version token of the blob just written; pass it to the next write.
    pub version: Option<VersionToken>,
    /// Identifier of the change the backend recorded, if reported.
    pub commit: Option<String>,
    /// Whether the blob did not exist before.
    pub created: bool,
}

/// Body of a contents API write.
#[derive(Debug, Serialize)]
pub(crate) struct WriteRequest<'a> {
    pub message: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
    pub branch: &'a str,
}

/// Subset of a contents API metadata response.
#[derive(Debug, Deserialize)]
pub(crate) struct ContentMetadata {
    pub sha: Option<String>,
}

/// Subset of a contents API write response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct WriteResponse {
    #[serde(default)]
    pub content: Option<ContentMetadata>,
    #[serde(default)]
    pub commit: Option<ContentMetadata>,
}

/// Error body returned by the contents API.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}
