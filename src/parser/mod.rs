//! PDF text extraction module.

pub mod backend;
mod extract;
mod options;

pub use backend::{FontResource, LopdfBackend, PdfBackend};
pub use extract::{count_pages, FragmentExtractor};
pub use options::{ErrorMode, ExtractOptions};

use crate::detect::sniff_header;
use crate::error::Result;
use crate::model::Fragment;

/// Extract the positioned text fragments of a PDF byte buffer.
pub fn extract_fragments(data: &[u8]) -> Result<Vec<Fragment>> {
    extract_fragments_with_options(data, &ExtractOptions::default())
}

/// Extract fragments with custom options.
pub fn extract_fragments_with_options(data: &[u8], options: &ExtractOptions) -> Result<Vec<Fragment>> {
    let header = sniff_header(data)?;
    log::debug!("reading {}", header);

    let backend = LopdfBackend::load_bytes(data)?;
    FragmentExtractor::new(&backend, options.clone()).extract()
}
