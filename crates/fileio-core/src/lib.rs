//! fileio Core Library
//!
//! This crate provides the domain models, upload registry, persistence
//! formats, error types, and configuration shared by the file.io client
//! and CLI crates.

pub mod config;
pub mod error;
pub mod expiry;
pub mod persist;
pub mod record;
pub mod registry;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use expiry::expiry_deadline;
pub use persist::ExportFormat;
pub use record::UploadRecord;
pub use registry::{RecordFilter, Registry};
