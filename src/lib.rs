//! # wrextract
//!
//! Work-order report extraction for Rust.
//!
//! This library reads the PDF work-order reports of one telecom report
//! template and turns their text layer into structured JSON: merged text
//! blocks, the organized configuration and flexibility-point sections, and
//! a compact summary of the work to do.
//!
//! ## Quick Start
//!
//! ```no_run
//! use wrextract::{process_file, render};
//!
//! fn main() -> wrextract::Result<()> {
//!     let report = process_file("work-order.pdf")?;
//!
//!     let json = render::to_json(&report.summary, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Stages
//!
//! - **Extraction**: positioned text fragments from the PDF text layer
//! - **Merging**: fragments grouped into blocks along text columns
//! - **Organizing**: blocks partitioned by the template's anchors
//! - **Summarizing**: selected fields and action sections only
//!
//! Each stage reads its input immutably and returns a new value, so
//! independent documents can be processed in parallel.

pub mod batch;
pub mod detect;
pub mod error;
pub mod merge;
pub mod model;
pub mod organize;
pub mod parser;
pub mod render;
pub mod summarize;

// Re-export commonly used types
pub use batch::{BatchConverter, BatchOptions, BatchReport, BatchStatus, OutputStage};
pub use detect::{is_pdf_bytes, sniff_header, PdfHeader};
pub use error::{Error, Result};
pub use merge::{BlockMerger, MergeOptions};
pub use model::{
    Block, FieldMap, FlexibilityPointRecord, FlexibilityPointSummary, Fragment, HashAlgorithm,
    Metadata, OrganizedDocument, RawDocument, Section, SummaryDocument,
};
pub use organize::{AnchorRole, AnchorTable, OrganizeOptions, Organizer, Profile, RegionEnd};
pub use parser::{extract_fragments, ErrorMode, ExtractOptions};
pub use render::JsonFormat;
pub use summarize::{SummaryOptions, Summarizer};

use std::path::Path;

use serde::Serialize;

/// Outputs of all pipeline stages for one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedReport {
    /// Metadata and merged blocks
    pub raw: RawDocument,
    /// Organized sections
    pub organized: OrganizedDocument,
    /// Compact summary
    pub summary: SummaryDocument,
}

/// Builder running the extraction, merge, organize and summarize stages.
///
/// # Example
///
/// ```no_run
/// use wrextract::{Pipeline, Profile};
///
/// let data = std::fs::read("work-order.pdf")?;
/// let report = Pipeline::new()
///     .lenient()
///     .with_profile(Profile::indented())
///     .process_bytes(&data, "work-order.pdf")?;
/// println!("{} flexibility points", report.summary.flexibility_points.len());
/// # Ok::<(), wrextract::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    extract_options: ExtractOptions,
    merge_options: MergeOptions,
    organize_options: OrganizeOptions,
    summary_options: SummaryOptions,
    hash: HashAlgorithm,
}

impl Pipeline {
    /// Create a pipeline with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip pages whose content cannot be decoded.
    pub fn lenient(mut self) -> Self {
        self.extract_options = self.extract_options.lenient();
        self
    }

    /// Set extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract_options = options;
        self
    }

    /// Set merge options.
    pub fn with_merge_options(mut self, options: MergeOptions) -> Self {
        self.merge_options = options;
        self
    }

    /// Set organize options.
    pub fn with_organize_options(mut self, options: OrganizeOptions) -> Self {
        self.organize_options = options;
        self
    }

    /// Set summary options.
    pub fn with_summary_options(mut self, options: SummaryOptions) -> Self {
        self.summary_options = options;
        self
    }

    /// Use one anchor table for merging, organizing and summarizing.
    pub fn with_anchors(mut self, anchors: AnchorTable) -> Self {
        self.summary_options = self
            .summary_options
            .with_action_keywords(anchors.all(AnchorRole::Action));
        self.organize_options = self.organize_options.with_anchors(anchors);
        self
    }

    /// Organize with a single layout profile.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.organize_options = self.organize_options.with_profile(profile);
        self
    }

    /// Set the digest written as `file_hash`.
    pub fn with_hash_algorithm(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    /// The anchor table in use.
    pub fn anchors(&self) -> &AnchorTable {
        &self.organize_options.anchors
    }

    /// Extract the text fragments of a PDF.
    pub fn extract_fragments(&self, data: &[u8]) -> Result<Vec<Fragment>> {
        parser::extract_fragments_with_options(data, &self.extract_options)
    }

    /// Merge fragments into ordered blocks.
    pub fn merge(&self, fragments: &[Fragment]) -> Vec<Block> {
        BlockMerger::new(self.merge_options.clone(), self.anchors()).merge(fragments)
    }

    /// Extract and merge a PDF into a raw document.
    ///
    /// `filename` is recorded in the metadata only.
    pub fn extract(&self, data: &[u8], filename: &str) -> Result<RawDocument> {
        let fragments = self.extract_fragments(data)?;
        let metadata = Metadata::for_bytes(filename, data, self.hash)
            .with_page_count(parser::count_pages(&fragments));
        let blocks = self.merge(&fragments);

        log::info!(
            "{}: {} fragments, {} blocks",
            filename,
            fragments.len(),
            blocks.len()
        );
        Ok(RawDocument::new(metadata, blocks))
    }

    /// Organize merged blocks.
    pub fn organize(&self, blocks: &[Block]) -> OrganizedDocument {
        Organizer::new(self.organize_options.clone()).organize(blocks)
    }

    /// Summarize an organized document.
    pub fn summarize(&self, doc: &OrganizedDocument) -> SummaryDocument {
        Summarizer::new(self.summary_options.clone()).summarize(doc)
    }

    /// Run every stage on a PDF buffer.
    pub fn process_bytes(&self, data: &[u8], filename: &str) -> Result<ProcessedReport> {
        let raw = self.extract(data, filename)?;
        let organized = self.organize(raw.blocks());
        let summary = self.summarize(&organized);
        Ok(ProcessedReport {
            raw,
            organized,
            summary,
        })
    }

    /// Run every stage on a PDF file.
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<ProcessedReport> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        self.process_bytes(&data, &file_name(path))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Extract a PDF file into a raw document.
///
/// # Example
///
/// ```no_run
/// use wrextract::extract_file;
///
/// let raw = extract_file("work-order.pdf").unwrap();
/// println!("{} blocks", raw.blocks().len());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<RawDocument> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    Pipeline::new().extract(&data, &file_name(path))
}

/// Run every stage on a PDF buffer with default options.
pub fn process_bytes(data: &[u8], filename: &str) -> Result<ProcessedReport> {
    Pipeline::new().process_bytes(data, filename)
}

/// Run every stage on a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// use wrextract::process_file;
///
/// let report = process_file("work-order.pdf").unwrap();
/// println!("LID: {}", report.summary.lid);
/// ```
pub fn process_file<P: AsRef<Path>>(path: P) -> Result<ProcessedReport> {
    Pipeline::new().process_file(path)
}

/// Organize blocks with default options.
pub fn organize_blocks(blocks: &[Block]) -> OrganizedDocument {
    Organizer::default().organize(blocks)
}

/// Summarize an organized document with default options.
pub fn summarize(doc: &OrganizedDocument) -> SummaryDocument {
    Summarizer::default().summarize(doc)
}

/// Read a PDF file asynchronously, then run every stage.
///
/// The stages themselves are synchronous.
#[cfg(feature = "async")]
pub async fn process_file_async<P: AsRef<Path>>(
    pipeline: &Pipeline,
    path: P,
) -> Result<ProcessedReport> {
    let path = path.as_ref();
    let data = tokio::fs::read(path).await?;
    pipeline.process_bytes(&data, &file_name(path))
}
