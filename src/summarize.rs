//! Summaries of organized reports.
//!
//! A summary keeps the two service fields operators look up, and per
//! flexibility point its location fields plus the state sections that
//! describe work to do (add, connect, remove).

use indexmap::IndexMap;

use crate::model::{
    standardize_key, FieldMap, FlexibilityPointRecord, FlexibilityPointSummary,
    OrganizedDocument, Section, SummaryDocument,
};
use crate::organize::{block_value, AnchorRole, AnchorTable};

/// Options for summarizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Header substrings that mark a state section as an action
    /// (case-sensitive)
    pub action_keywords: Vec<String>,

    /// Info key substring for the address (case-insensitive)
    pub address_keyword: String,

    /// Info key substring for the position (case-insensitive)
    pub position_keyword: String,

    /// Info key substring for the remark (case-insensitive)
    pub remark_keyword: String,

    /// Key collecting unlabeled blocks of an action section
    pub notes_key: String,
}

impl SummaryOptions {
    /// Create summary options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take action keywords from an anchor table.
    pub fn from_anchors(anchors: &AnchorTable) -> Self {
        Self::default().with_action_keywords(anchors.all(AnchorRole::Action))
    }

    /// Replace the action keywords.
    pub fn with_action_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.action_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the key for unlabeled action blocks.
    pub fn with_notes_key(mut self, key: impl Into<String>) -> Self {
        self.notes_key = key.into();
        self
    }
}

impl Default for SummaryOptions {
    fn default() -> Self {
        let anchors = AnchorTable::default();
        Self {
            action_keywords: anchors.all(AnchorRole::Action).map(String::from).collect(),
            address_keyword: "address".to_string(),
            position_keyword: "position".to_string(),
            remark_keyword: "remark".to_string(),
            notes_key: "Notes".to_string(),
        }
    }
}

/// Produces a [`SummaryDocument`] from an [`OrganizedDocument`].
#[derive(Debug, Clone, Default)]
pub struct Summarizer {
    options: SummaryOptions,
}

impl Summarizer {
    /// Create a summarizer.
    pub fn new(options: SummaryOptions) -> Self {
        Self { options }
    }

    /// Summarize an organized document.
    pub fn summarize(&self, doc: &OrganizedDocument) -> SummaryDocument {
        let service = &doc.service_configurations;
        let lookup = |key: &str| service.get(key).cloned().unwrap_or_default();

        let flexibility_points: Vec<_> = doc
            .flexibility_points()
            .iter()
            .map(|(name, record)| self.summarize_point(name, record))
            .collect();

        log::debug!(
            "summarized {} flexibility points",
            flexibility_points.len()
        );

        SummaryDocument {
            subscriber_address: lookup("Subscriber address"),
            lid: lookup("Service ID"),
            flexibility_points,
        }
    }

    fn summarize_point(&self, name: &str, record: &FlexibilityPointRecord) -> FlexibilityPointSummary {
        let info = info_fields(&record.info);
        let find = |keyword: &str| {
            let keyword = keyword.to_lowercase();
            info.iter()
                .find(|(key, _)| key.to_lowercase().contains(&keyword))
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        };

        let mut actions = IndexMap::new();
        for (header, section) in &record.state_sections {
            if !self.is_action(header) {
                continue;
            }
            let fields = self.action_fields(section);
            if fields.is_empty() {
                log::debug!("action '{}' of '{}' has no fields", header, name);
                continue;
            }
            actions.insert(header.clone(), fields);
        }

        FlexibilityPointSummary {
            name: name.to_string(),
            address: find(&self.options.address_keyword),
            position: find(&self.options.position_keyword),
            remark: find(&self.options.remark_keyword),
            actions,
        }
    }

    fn is_action(&self, header: &str) -> bool {
        self.options
            .action_keywords
            .iter()
            .any(|keyword| header.contains(keyword.as_str()))
    }

    fn action_fields(&self, section: &Section) -> FieldMap {
        let blocks = match section {
            Section::Fields(fields) => return fields.clone(),
            Section::Blocks(blocks) => blocks,
        };

        let mut fields = FieldMap::new();
        let mut notes: Vec<&str> = Vec::new();
        // First block is the header.
        for block in blocks.iter().skip(1) {
            if block.is_label() {
                fields.insert(standardize_key(block.first_line()), block_value(block));
            } else {
                notes.push(block.text.trim());
            }
        }
        if !notes.is_empty() {
            fields.insert(self.options.notes_key.clone(), notes.join("\n"));
        }
        fields
    }
}

/// Key/value view of an info region. A repeated label keeps its first value.
fn info_fields(info: &Section) -> FieldMap {
    match info {
        Section::Fields(fields) => fields.clone(),
        Section::Blocks(blocks) => {
            let mut fields = FieldMap::new();
            for block in blocks.iter().filter(|b| b.is_label()) {
                fields
                    .entry(standardize_key(block.first_line()))
                    .or_insert_with(|| block_value(block));
            }
            fields
        }
    }
}
