//! Upload record model

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientResult;
use crate::expiry::expiry_deadline;

/// Metadata about one uploaded file or text blob.
///
/// `expire_at` is derived exactly once, at construction, from the raw
/// `expiry` duration the service reported; it is never recomputed. The
/// raw string is kept alongside it so persisted registries round-trip
/// field-for-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    /// Remote identifier assigned by the service
    pub key: String,
    /// Download URL for the uploaded content
    pub link: String,
    /// Optional user-supplied label for grouping/filtering
    pub tag: Option<String>,
    /// Raw retention duration as reported by the service (e.g. "1w")
    pub expiry: String,
    /// Absolute local path associated with the upload; downloads write here
    pub path: PathBuf,
    /// Absolute deadline after which the remote copy is gone
    pub expire_at: DateTime<Utc>,
}

impl UploadRecord {
    /// Build a record from a successful upload response.
    ///
    /// `created_at` is the record-creation instant the deadline is
    /// anchored to; callers pass `Utc::now()`.
    pub fn new(
        key: String,
        link: String,
        expiry: String,
        tag: Option<String>,
        path: impl Into<PathBuf>,
        created_at: DateTime<Utc>,
    ) -> ClientResult<Self> {
        let expire_at = expiry_deadline(&expiry, created_at)?;
        Ok(UploadRecord {
            key,
            link,
            tag,
            expiry,
            path: path.into(),
            expire_at,
        })
    }

    /// Whether the remote copy is still available at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expire_at > now
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
