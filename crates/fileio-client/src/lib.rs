//! HTTP client for the file.io file-hosting service.
//!
//! Provides a blocking transport (`ApiClient`) over the service's two
//! endpoints (multipart upload POST, streamed download GET) and the
//! `FileIo` facade that orchestrates the upload registry on top of it.
//! The CLI crate uses the facade directly.

pub mod api;

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::Duration;

use crate::api::UploadResponse;

/// Blocking HTTP transport for the file.io service.
///
/// Every call blocks the caller until the network operation completes;
/// timeout and TLS are the transport's concern, retries are the
/// caller's.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(ApiClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from environment: FILEIO_BASE_URL, FILEIO_TIMEOUT_SECS.
    pub fn from_env() -> ClientResult<Self> {
        ApiClient::new(&ClientConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a multipart payload, with the retention duration as a query
    /// parameter when the caller overrides the service default.
    ///
    /// The service reports failures in the JSON body (`success: false`
    /// with a status code); plain HTTP failures without a parseable body
    /// are mapped from the HTTP status instead.
    pub fn upload(
        &self,
        form: reqwest::blocking::multipart::Form,
        expiry: Option<&str>,
    ) -> ClientResult<UploadReceipt> {
        let mut request = self.client.post(&self.base_url);
        if let Some(expiry) = expiry {
            request = request.query(&[("expiry", expiry)]);
        }

        let response = request
            .multipart(form)
            .send()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let http_status = response.status().as_u16();
        let body: UploadResponse = match response.json() {
            Ok(body) => body,
            Err(_) if http_status >= 400 => return Err(remote_error(http_status, None)),
            Err(e) => return Err(ClientError::SerializationFormat(e.to_string())),
        };

        if !body.success {
            return Err(remote_error(
                body.status.unwrap_or(http_status),
                body.message,
            ));
        }

        body.into_receipt()
    }

    /// GET `link` and stream the body into `dest`, creating parent
    /// directories as needed. Returns the number of bytes written.
    pub fn download_to(&self, link: &str, dest: &Path) -> ClientResult<u64> {
        let mut response = self
            .client
            .get(link)
            .send()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(remote_error(status.as_u16(), None));
        }

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut out = File::create(dest)?;
        let bytes = io::copy(&mut response, &mut out)?;
        Ok(bytes)
    }
}

/// Map a service-reported status code to the error taxonomy.
fn remote_error(code: u16, message: Option<String>) -> ClientError {
    if let Some(message) = &message {
        tracing::warn!(code, message = %message, "remote service error");
    }
    match code {
        404 => ClientError::RemoteNotFound,
        429 => ClientError::RemoteRateLimited,
        _ => ClientError::RemoteUnknown {
            code: code.to_string(),
        },
    }
}

// Re-export the facade and core types for convenience.
pub use api::{DownloadFailure, DownloadReport, FileIo, UploadReceipt, UploadRequest};
pub use fileio_core::{
    ClientConfig, ClientError, ClientResult, ExportFormat, RecordFilter, Registry, UploadRecord,
};
