//! Organized report structure.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Block;

/// Ordered string-to-string field map.
pub type FieldMap = IndexMap<String, String>;

/// A report split into its configuration and site-operation regions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizedDocument {
    /// Standardized key → value from the "Service Configurations" region
    #[serde(rename = "Service Configurations", default)]
    pub service_configurations: FieldMap,

    /// The "Site Operations" region
    #[serde(rename = "Site Operations", default)]
    pub site_operations: SiteOperations,
}

impl OrganizedDocument {
    /// Flexibility points in document order.
    pub fn flexibility_points(&self) -> &IndexMap<String, FlexibilityPointRecord> {
        &self.site_operations.flexibility_points
    }

    /// Whether at least one flexibility point has a state section.
    ///
    /// Used to decide whether a layout profile fit the document.
    pub fn has_state_sections(&self) -> bool {
        self.flexibility_points()
            .values()
            .any(|fp| !fp.state_sections.is_empty())
    }

    /// Whether nothing at all was recognized.
    pub fn is_empty(&self) -> bool {
        self.service_configurations.is_empty() && self.flexibility_points().is_empty()
    }
}

/// The "Site Operations" region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteOperations {
    /// Title → record, in document order
    #[serde(rename = "Flexibility Points", default)]
    pub flexibility_points: IndexMap<String, FlexibilityPointRecord>,
}

/// One flexibility point with its info and labeled state sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlexibilityPointRecord {
    /// Content before the first state header
    pub info: Section,
    /// Standardized header → section content
    #[serde(default)]
    pub state_sections: IndexMap<String, Section>,
}

/// Content of an info region or a state section.
///
/// The representation depends on the layout profile that organized the
/// document. A block list keeps the header block as its first element;
/// a field map holds only the fields below the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section {
    /// Blocks in document order
    Blocks(Vec<Block>),
    /// Standardized key → value
    Fields(FieldMap),
}

impl Section {
    /// Whether the section holds no content.
    pub fn is_empty(&self) -> bool {
        match self {
            Section::Blocks(blocks) => blocks.is_empty(),
            Section::Fields(fields) => fields.is_empty(),
        }
    }

    /// Number of blocks or fields.
    pub fn len(&self) -> usize {
        match self {
            Section::Blocks(blocks) => blocks.len(),
            Section::Fields(fields) => fields.len(),
        }
    }
}

impl Default for Section {
    fn default() -> Self {
        Section::Fields(FieldMap::new())
    }
}
