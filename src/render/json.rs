//! JSON rendering for pipeline outputs.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert any pipeline output to JSON.
///
/// Non-ASCII text is written as-is, never as `\u` escapes.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Read a stored document back, e.g. a raw document written earlier.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| Error::InvalidDocument(e.to_string()))
}

/// Write a value as JSON to `path`, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(
    value: &T,
    path: impl AsRef<Path>,
    format: JsonFormat,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_json(value, format)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, HashAlgorithm, Metadata, RawDocument, SummaryDocument};

    fn raw() -> RawDocument {
        let metadata = Metadata::for_bytes("wo-1.pdf", b"%PDF-1.4", HashAlgorithm::Md5)
            .with_page_count(1);
        RawDocument::new(
            metadata,
            vec![Block::from_lines(1, 60.0, 700.0, &["Service Configurations"])],
        )
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&raw(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"file_hash\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&SummaryDocument::default(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_non_ascii_is_not_escaped() {
        let json = to_json(&"Straße", JsonFormat::Compact).unwrap();
        assert_eq!(json, "\"Straße\"");
    }

    #[test]
    fn test_from_json_reads_raw_document() {
        let doc = raw();
        let json = to_json(&doc, JsonFormat::Compact).unwrap();
        let back: RawDocument = from_json(&json).unwrap();
        assert_eq!(back.blocks()[0].text, "Service Configurations");
        assert_eq!(back.metadata.file_hash, doc.metadata.file_hash);
    }

    #[test]
    fn test_from_json_rejects_other_shapes() {
        let result: Result<RawDocument> = from_json(r#"{"content": 3}"#);
        assert!(matches!(result, Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn test_write_json_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("summary.json");
        write_json(&SummaryDocument::default(), &path, JsonFormat::Pretty).unwrap();
        let back: SummaryDocument = from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, SummaryDocument::default());
    }
}
