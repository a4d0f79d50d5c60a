//! Remote blob store module.
//!
//! # Data Flow
//! ```text
//! read:   GET {raw_host}/{owner}/{repo}/{branch}/config.json?t={ms}
//! token:  GET {api_host}/repos/{owner}/{repo}/contents/config.json?ref={branch}
//! write:  PUT {api_host}/repos/{owner}/{repo}/contents/config.json
//!         {message, content: base64(json), sha?, branch}
//! ```

pub mod client;
pub mod types;

pub use client::BlobStoreClient;
pub use types::{RemoteError, RemoteResult, RemoteWriteResult, VersionToken};
