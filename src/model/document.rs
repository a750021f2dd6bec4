//! Raw extraction document, as stored by callers before organizing.

use chrono::{Local, NaiveDateTime};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::Block;

/// The raw extraction result of one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// File information and processing details
    pub metadata: Metadata,
    /// Merged blocks and the raw text
    pub content: Content,
    /// Placeholder for manual labeling
    #[serde(default)]
    pub annotations: Annotations,
}

impl RawDocument {
    /// Build a raw document from merged blocks.
    pub fn new(metadata: Metadata, blocks: Vec<Block>) -> Self {
        Self {
            metadata,
            content: Content::from_blocks(blocks),
            annotations: Annotations::default(),
        }
    }

    /// The merged blocks.
    pub fn blocks(&self) -> &[Block] {
        &self.content.blocks
    }
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// File name hint supplied by the caller
    pub filename: String,

    /// Path relative to the batch base directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Hex digest of the PDF bytes
    pub file_hash: String,

    /// Local time the document was processed
    pub processed_date: NaiveDateTime,

    /// Number of pages that carried text
    pub page_count: u32,
}

impl Metadata {
    /// Create metadata for a buffer, stamped with the current local time.
    pub fn for_bytes(filename: impl Into<String>, data: &[u8], algorithm: HashAlgorithm) -> Self {
        Self {
            filename: filename.into(),
            file_path: None,
            file_hash: algorithm.hex_digest(data),
            processed_date: Local::now().naive_local(),
            page_count: 0,
        }
    }

    /// Set the relative file path.
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Set the page count.
    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = page_count;
        self
    }
}

/// Digest used for `file_hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// MD5, as written by the single-file converter
    #[default]
    Md5,
    /// SHA-256, as written by the batch converter
    Sha256,
}

impl HashAlgorithm {
    /// Lowercase hex digest of `data`.
    pub fn hex_digest(self, data: &[u8]) -> String {
        match self {
            HashAlgorithm::Md5 => format!("{:x}", Md5::digest(data)),
            HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(data)),
        }
    }
}

/// Extracted content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Blocks in reading order
    pub blocks: Vec<Block>,
    /// Block texts joined by newlines
    pub raw: String,
}

impl Content {
    /// Build content from blocks, deriving the raw text.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let raw = blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self { blocks, raw }
    }
}

/// Annotation placeholder kept for the labeling workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    pub labeled: bool,
    pub relevant_lines: Vec<serde_json::Value>,
    pub extracted_data: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_digests() {
        assert_eq!(
            HashAlgorithm::Md5.hex_digest(b"abc"),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            HashAlgorithm::Sha256.hex_digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_content_raw_text() {
        let content = Content::from_blocks(vec![
            Block::from_lines(1, 60.0, 700.0, &["Service Configurations"]),
            Block::from_lines(1, 60.0, 680.0, &["Service ID:"]),
        ]);
        assert_eq!(content.raw, "Service Configurations\nService ID:");
    }

    #[test]
    fn test_raw_document_json_shape() {
        let metadata = Metadata::for_bytes("report.pdf", b"%PDF-1.4", HashAlgorithm::Md5)
            .with_page_count(2);
        let doc = RawDocument::new(metadata, vec![]);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["metadata"]["filename"], "report.pdf");
        assert_eq!(value["metadata"]["page_count"], 2);
        assert!(value["metadata"].get("file_path").is_none());
        assert_eq!(value["content"]["raw"], "");
        assert_eq!(value["annotations"]["labeled"], false);
        assert!(value["annotations"]["relevant_lines"].as_array().unwrap().is_empty());
        assert!(value["annotations"]["extracted_data"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_reads_microsecond_date_without_annotations() {
        let json = r#"{
            "metadata": {
                "filename": "P-1-WR.pdf",
                "file_hash": "00",
                "processed_date": "2025-03-01T10:15:30.123456",
                "page_count": 3
            },
            "content": { "blocks": [], "raw": "" }
        }"#;
        let doc: RawDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.metadata.page_count, 3);
        assert!(!doc.annotations.labeled);
    }
}
