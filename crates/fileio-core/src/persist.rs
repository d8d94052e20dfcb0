//! Registry persistence
//!
//! Two on-disk formats: `Json`, a human-readable object with an `uploaded`
//! list of field-maps (`expire_at` as an ISO-8601 string), and `Cbor`, a
//! compact binary encoding of the same serde representation. Only the Json
//! format carries a compatibility contract; the Cbor encoding is an
//! implementation detail and is not an interchange format.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ClientError, ClientResult};
use crate::record::UploadRecord;
use crate::registry::Registry;

/// Persisted registry format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Textual, human-readable; the portable format.
    #[default]
    Json,
    /// Compact binary (ciborium); not portable across implementations.
    Cbor,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Cbor => "cbor",
        }
    }

    /// Well-known output filename used when the caller gives no path.
    pub const fn default_filename(self) -> &'static str {
        match self {
            ExportFormat::Json => "exported.json",
            ExportFormat::Cbor => "exported.cbor",
        }
    }

    /// Recognize a path extension as a format token.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "cbor" => Some(ExportFormat::Cbor),
            _ => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::from_extension(s)
            .ok_or_else(|| ClientError::SerializationFormat(format!("unknown format: {s}")))
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Resolve the output path and format for an export.
///
/// No path: the format's well-known filename. A recognized extension
/// infers the format when none is given; an explicit format that
/// conflicts with a recognized extension wins and replaces it. Missing
/// or unrecognized extensions get the format's extension appended.
pub fn resolve_export_path(
    path: Option<&Path>,
    format: Option<ExportFormat>,
) -> (PathBuf, ExportFormat) {
    let Some(path) = path else {
        let format = format.unwrap_or_default();
        return (PathBuf::from(format.default_filename()), format);
    };

    let inferred = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ExportFormat::from_extension);

    match (inferred, format) {
        (Some(inferred), None) => (path.to_path_buf(), inferred),
        (Some(inferred), Some(explicit)) if inferred == explicit => {
            (path.to_path_buf(), explicit)
        }
        (Some(_), Some(explicit)) => (path.with_extension(explicit.extension()), explicit),
        (None, format) => {
            let format = format.unwrap_or_default();
            (append_extension(path, format.extension()), format)
        }
    }
}

/// Resolve the format for a load: a recognized extension wins, anything
/// else falls back to the explicit or default format.
pub fn resolve_load_format(path: &Path, format: Option<ExportFormat>) -> ExportFormat {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ExportFormat::from_extension)
        .or(format)
        .unwrap_or_default()
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}

/// Serialize the full registry to `path` in the given format.
pub fn export_registry(
    registry: &Registry,
    path: &Path,
    format: ExportFormat,
) -> ClientResult<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    match format {
        ExportFormat::Json => serde_json::to_writer_pretty(writer, registry)?,
        ExportFormat::Cbor => ciborium::into_writer(registry, writer)
            .map_err(|e| ClientError::SerializationFormat(e.to_string()))?,
    }
    Ok(())
}

/// Read records back from `path` in the given format.
pub fn load_records(path: &Path, format: ExportFormat) -> ClientResult<Vec<UploadRecord>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let registry: Registry = match format {
        ExportFormat::Json => serde_json::from_reader(reader)?,
        ExportFormat::Cbor => ciborium::from_reader(reader)
            .map_err(|e| ClientError::SerializationFormat(e.to_string()))?,
    };
    Ok(registry.into_records())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(key: &str, tag: Option<&str>) -> UploadRecord {
        UploadRecord::new(
            key.to_string(),
            format!("https://file.io/{key}"),
            "2 weeks".to_string(),
            tag.map(str::to_string),
            format!("/data/{key}.txt"),
            Utc::now(),
        )
        .unwrap()
    }

    fn registry() -> Registry {
        Registry::from_records(vec![
            record("abc", Some("t1")),
            record("def", None),
            record("ghi", Some("t2")),
        ])
    }

    #[test]
    fn test_resolve_defaults() {
        assert_eq!(
            resolve_export_path(None, None),
            (PathBuf::from("exported.json"), ExportFormat::Json)
        );
        assert_eq!(
            resolve_export_path(None, Some(ExportFormat::Cbor)),
            (PathBuf::from("exported.cbor"), ExportFormat::Cbor)
        );
    }

    #[test]
    fn test_resolve_infers_from_extension() {
        let (path, format) = resolve_export_path(Some(Path::new("backup.cbor")), None);
        assert_eq!(path, PathBuf::from("backup.cbor"));
        assert_eq!(format, ExportFormat::Cbor);
    }

    #[test]
    fn test_resolve_explicit_format_replaces_conflicting_extension() {
        let (path, format) =
            resolve_export_path(Some(Path::new("data.cbor")), Some(ExportFormat::Json));
        assert_eq!(path, PathBuf::from("data.json"));
        assert_eq!(format, ExportFormat::Json);
    }

    #[test]
    fn test_resolve_appends_to_unrecognized_extension() {
        let (path, format) = resolve_export_path(Some(Path::new("notes.txt")), None);
        assert_eq!(path, PathBuf::from("notes.txt.json"));
        assert_eq!(format, ExportFormat::Json);

        let (path, format) =
            resolve_export_path(Some(Path::new("t.e.s.t.p.k.l")), Some(ExportFormat::Cbor));
        assert_eq!(path, PathBuf::from("t.e.s.t.p.k.l.cbor"));
        assert_eq!(format, ExportFormat::Cbor);
    }

    #[test]
    fn test_resolve_appends_when_no_extension() {
        let (path, format) = resolve_export_path(Some(Path::new("backup")), None);
        assert_eq!(path, PathBuf::from("backup.json"));
        assert_eq!(format, ExportFormat::Json);
    }

    #[test]
    fn test_resolve_load_extension_wins() {
        assert_eq!(
            resolve_load_format(Path::new("x.cbor"), Some(ExportFormat::Json)),
            ExportFormat::Cbor
        );
        assert_eq!(
            resolve_load_format(Path::new("x.dat"), Some(ExportFormat::Cbor)),
            ExportFormat::Cbor
        );
        assert_eq!(resolve_load_format(Path::new("x.dat"), None), ExportFormat::Json);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("CBOR".parse::<ExportFormat>().unwrap(), ExportFormat::Cbor);
        let err = "pkl".parse::<ExportFormat>().unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_FORMAT_ERROR");
    }

    #[test]
    fn test_json_round_trip_reproduces_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        let original = registry();

        export_registry(&original, &path, ExportFormat::Json).unwrap();
        let loaded = load_records(&path, ExportFormat::Json).unwrap();

        assert_eq!(loaded, original.records());
    }

    #[test]
    fn test_json_output_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        export_registry(&registry(), &path, ExportFormat::Json).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"uploaded\""));
        assert!(text.contains("\"key\": \"abc\""));
        assert!(text.contains("\"expire_at\""));
    }

    #[test]
    fn test_cbor_round_trip_reproduces_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.cbor");
        let original = registry();

        export_registry(&original, &path, ExportFormat::Cbor).unwrap();
        let loaded = load_records(&path, ExportFormat::Cbor).unwrap();

        assert_eq!(loaded, original.records());
        // untagged record survives the binary round trip
        assert_eq!(loaded[1].tag, None);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_records(Path::new("/nonexistent/registry.json"), ExportFormat::Json)
            .unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_load_malformed_json_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"uploaded\": [{\"key\":").unwrap();

        let err = load_records(&path, ExportFormat::Json).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_FORMAT_ERROR");
    }
}
