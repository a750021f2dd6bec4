//! Data model shared by the pipeline stages.
//!
//! Each stage reads its input immutably and returns a new value:
//! [`Fragment`]s become [`Block`]s, blocks become an [`OrganizedDocument`],
//! and that becomes a [`SummaryDocument`].

mod block;
mod document;
mod fragment;
mod organized;
mod summary;

pub(crate) use block::BlockBuilder;
pub use block::{join_lines, standardize_key, Block};
pub use document::{Annotations, Content, HashAlgorithm, Metadata, RawDocument};
pub use fragment::Fragment;
pub use organized::{FieldMap, FlexibilityPointRecord, OrganizedDocument, Section, SiteOperations};
pub use summary::{FlexibilityPointSummary, SummaryDocument};
