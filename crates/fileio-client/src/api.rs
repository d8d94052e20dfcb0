//! Domain operations for the file.io client.
//!
//! `FileIo` owns the upload registry and the transport; upload, download,
//! lookup, export, and load all flow through it. Response types match the
//! service's JSON shape.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use reqwest::blocking::multipart::{Form, Part};
use serde::Deserialize;

use fileio_core::persist;
use fileio_core::{
    ClientConfig, ClientError, ClientResult, ExportFormat, RecordFilter, Registry, UploadRecord,
};

use crate::ApiClient;

/// Filename used for text payloads when the caller does not name one.
const DEFAULT_TEXT_FILENAME: &str = "paste.txt";

/// Raw upload response body. The service reports failures in-band with
/// `success: false` and a status code, so every field is optional here.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The fields a successful upload must carry.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub key: String,
    pub link: String,
    pub expiry: String,
}

impl UploadResponse {
    pub(crate) fn into_receipt(self) -> ClientResult<UploadReceipt> {
        let missing = |field: &str| {
            ClientError::SerializationFormat(format!("upload response missing `{field}`"))
        };
        Ok(UploadReceipt {
            key: self.key.ok_or_else(|| missing("key"))?,
            link: self.link.ok_or_else(|| missing("link"))?,
            expiry: self.expiry.ok_or_else(|| missing("expiry"))?,
        })
    }
}

/// One upload request: a file path XOR a literal text blob, plus the
/// optional tag and retention override.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file: Option<PathBuf>,
    pub text: Option<String>,
    /// Filename for text payloads; also names the download destination.
    pub filename: Option<String>,
    pub tag: Option<String>,
    /// Retention duration to request; service default when omitted.
    pub expiry: Option<String>,
}

impl UploadRequest {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        UploadRequest {
            file: Some(path.into()),
            ..UploadRequest::default()
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        UploadRequest {
            text: Some(text.into()),
            ..UploadRequest::default()
        }
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = Some(expiry.into());
        self
    }
}

/// Outcome of a download batch. Per-item failures are collected here
/// rather than aborting the remaining items.
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// Records fetched and removed from the registry, in registry order.
    pub downloaded: Vec<UploadRecord>,
    /// Keys skipped because the remote copy had already expired; their
    /// records stay in the registry.
    pub skipped_expired: Vec<String>,
    /// Per-item fetch/write failures; their records stay in the registry.
    pub failures: Vec<DownloadFailure>,
}

#[derive(Debug)]
pub struct DownloadFailure {
    pub key: String,
    pub error: ClientError,
}

impl DownloadReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Client facade: upload registry plus transport.
///
/// Mutating operations take `&mut self`; callers using the client from
/// several threads must serialize access externally.
#[derive(Debug)]
pub struct FileIo {
    api: ApiClient,
    registry: Registry,
}

impl FileIo {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(FileIo {
            api: ApiClient::new(config)?,
            registry: Registry::new(),
        })
    }

    pub fn from_env() -> ClientResult<Self> {
        FileIo::new(&ClientConfig::from_env())
    }

    /// Wrap an existing transport with an empty registry.
    pub fn with_client(api: ApiClient) -> Self {
        FileIo {
            api,
            registry: Registry::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Upload a file or text blob and register the resulting record.
    ///
    /// The payload must be exactly one of file and text. File payloads
    /// are read fully into memory; missing files and symbolic links are
    /// rejected. On success the record is appended to the registry and
    /// returned.
    pub fn upload(&mut self, request: &UploadRequest) -> ClientResult<UploadRecord> {
        let (form, path) = match (&request.file, &request.text) {
            (None, None) => return Err(ClientError::MissingPayload),
            (Some(_), Some(_)) => return Err(ClientError::ConflictingPayload),
            (Some(file), None) => self.file_payload(file)?,
            (None, Some(text)) => self.text_payload(text, request.filename.as_deref())?,
        };

        let receipt = self.api.upload(form, request.expiry.as_deref())?;
        let record = UploadRecord::new(
            receipt.key,
            receipt.link,
            receipt.expiry,
            request.tag.clone(),
            path,
            Utc::now(),
        )?;

        tracing::info!(
            key = %record.key,
            tag = ?record.tag,
            expire_at = %record.expire_at,
            "upload registered"
        );
        self.registry.push(record.clone());
        Ok(record)
    }

    fn file_payload(&self, file: &Path) -> ClientResult<(Form, PathBuf)> {
        let invalid = || ClientError::InvalidFileReference(file.to_path_buf());

        // symlink_metadata does not follow links, so a dangling or
        // ambiguous symlink is caught before any resolution happens.
        let meta = fs::symlink_metadata(file).map_err(|_| invalid())?;
        if meta.file_type().is_symlink() || !meta.is_file() {
            return Err(invalid());
        }

        let path = fs::canonicalize(file)?;
        let bytes = fs::read(&path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename));
        Ok((form, path))
    }

    fn text_payload(&self, text: &str, filename: Option<&str>) -> ClientResult<(Form, PathBuf)> {
        let filename = filename.unwrap_or(DEFAULT_TEXT_FILENAME).to_string();
        // A text blob has no source file; anchor the record (and any
        // later download) to that name in the current directory.
        let path = env::current_dir()?.join(&filename);

        let form = Form::new().part(
            "file",
            Part::text(text.to_string()).file_name(filename),
        );
        Ok((form, path))
    }

    /// Fetch the matching records that are still live and write each to
    /// its stored local path, removing it from the registry on success.
    ///
    /// Expired records are skipped without error and without network
    /// traffic. A failure on one item does not abort the rest; failures
    /// are collected in the report.
    pub fn download(&mut self, filter: &RecordFilter) -> DownloadReport {
        let now = Utc::now();
        let mut report = DownloadReport::default();
        let mut fetched = Vec::new();

        for idx in self.registry.find_indices(filter) {
            let Some(record) = self.registry.get(idx) else {
                continue;
            };

            if !record.is_live(now) {
                tracing::debug!(key = %record.key, expire_at = %record.expire_at, "skipping expired upload");
                report.skipped_expired.push(record.key.clone());
                continue;
            }

            match self.api.download_to(&record.link, record.path()) {
                Ok(bytes) => {
                    tracing::info!(key = %record.key, path = %record.path.display(), bytes, "download complete");
                    fetched.push(idx);
                }
                Err(error) => {
                    tracing::warn!(key = %record.key, error = %error, "download failed");
                    report.failures.push(DownloadFailure {
                        key: record.key.clone(),
                        error,
                    });
                }
            }
        }

        // Remove back-to-front so earlier indices stay valid, then
        // restore registry order in the report.
        for idx in fetched.iter().rev() {
            report.downloaded.push(self.registry.remove(*idx));
        }
        report.downloaded.reverse();
        report
    }

    /// Order-preserving lookup over the registry; never mutates it.
    pub fn show_uploads(&self, filter: &RecordFilter) -> Vec<&UploadRecord> {
        self.registry.find(filter)
    }

    /// Serialize the registry to disk; returns the path written.
    pub fn export(
        &self,
        path: Option<&Path>,
        format: Option<ExportFormat>,
    ) -> ClientResult<PathBuf> {
        let (path, format) = persist::resolve_export_path(path, format);
        persist::export_registry(&self.registry, &path, format)?;
        tracing::info!(path = %path.display(), %format, count = self.registry.len(), "registry exported");
        Ok(path)
    }

    /// Read records from disk and append them to the registry; returns
    /// how many were appended.
    pub fn load(&mut self, path: &Path, format: Option<ExportFormat>) -> ClientResult<usize> {
        let format = persist::resolve_load_format(path, format);
        let records = persist::load_records(path, format)?;
        let count = records.len();
        self.registry.extend(records);
        tracing::info!(path = %path.display(), %format, count, "registry loaded");
        Ok(count)
    }
}
