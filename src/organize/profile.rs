//! Layout profiles.
//!
//! The same report template reaches us in slightly different PDF
//! renderings. A [`Profile`] bundles the rules that fit one rendering:
//! how state headers are recognized, how a label finds its value, and
//! whether sections are kept as blocks or as key/value fields. Rules of
//! different profiles encode different assumptions and are never combined
//! inside one profile.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::model::{join_lines, standardize_key, Block};

/// Recognizes the header block of a state section.
pub trait StateHeaderRule: Send + Sync {
    /// Whether `block` starts a new state section.
    fn is_state_header(&self, block: &Block) -> bool;
}

/// A labeled value read from one or more blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Standardized label
    pub key: String,
    /// Value text, possibly empty
    pub value: String,
    /// Number of blocks the field occupies, starting at the label
    pub span: usize,
}

/// Reads a labeled field starting at a block.
pub trait FieldRule: Send + Sync {
    /// Read the field whose label is `blocks[index]`.
    ///
    /// Returns `None` when `index` is out of range.
    fn extract_field(&self, blocks: &[Block], index: usize) -> Option<Field>;

    /// Read the name of the entity anchored at `blocks[index]`.
    ///
    /// Returns the name and the number of blocks occupied by anchor and
    /// name together.
    fn extract_title(&self, blocks: &[Block], index: usize) -> Option<(String, usize)>;
}

/// A header is a single-line block indented past a fixed x.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleLineIndent {
    pub min_x: f32,
}

impl Default for SingleLineIndent {
    fn default() -> Self {
        Self { min_x: 80.0 }
    }
}

impl StateHeaderRule for SingleLineIndent {
    fn is_state_header(&self, block: &Block) -> bool {
        block.line_count() == 1 && block.x > self.min_x
    }
}

/// A header uses the secondary font and sits outside the label column.
#[derive(Debug, Clone, PartialEq)]
pub struct FontBand {
    /// Font resource name of section headers
    pub font: String,
    /// X band of the label column, which uses the same font
    pub label_column: RangeInclusive<f32>,
}

impl Default for FontBand {
    fn default() -> Self {
        Self {
            font: "F2".to_string(),
            label_column: 55.0..=60.0,
        }
    }
}

impl StateHeaderRule for FontBand {
    fn is_state_header(&self, block: &Block) -> bool {
        block.font_name.eq_ignore_ascii_case(&self.font) && !self.label_column.contains(&block.x)
    }
}

/// Label and value sit side by side: the value is the next block.
///
/// A block that is not a label (no trailing colon) becomes a field with an
/// empty value. The next block is not taken as a value if it is itself a
/// label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjacentFields;

impl FieldRule for AdjacentFields {
    fn extract_field(&self, blocks: &[Block], index: usize) -> Option<Field> {
        let block = blocks.get(index)?;
        let key = standardize_key(&block.text);

        if block.text.trim_end().ends_with(':') {
            if let Some(next) = blocks.get(index + 1).filter(|b| !b.is_label()) {
                return Some(Field {
                    key,
                    value: next.text.trim().to_string(),
                    span: 2,
                });
            }
        }

        Some(Field {
            key,
            value: String::new(),
            span: 1,
        })
    }

    fn extract_title(&self, blocks: &[Block], index: usize) -> Option<(String, usize)> {
        let next = blocks.get(index + 1).filter(|b| !b.is_label())?;
        let title = next.text.trim();
        (!title.is_empty()).then(|| (title.to_string(), 2))
    }
}

/// Label and value are stacked in one block: the first line is the label,
/// the remaining lines the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineFields;

impl FieldRule for LineFields {
    fn extract_field(&self, blocks: &[Block], index: usize) -> Option<Field> {
        let block = blocks.get(index)?;
        let value = block
            .rest_lines()
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Some(Field {
            key: standardize_key(block.first_line()),
            value,
            span: 1,
        })
    }

    fn extract_title(&self, blocks: &[Block], index: usize) -> Option<(String, usize)> {
        let title = blocks.get(index)?.lines.get(1)?.trim();
        (!title.is_empty()).then(|| (title.to_string(), 1))
    }
}

/// How info regions and state sections are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionLayout {
    /// Keep the blocks (header block first)
    Blocks,
    /// Read key/value fields with the profile's field rule
    #[default]
    Fields,
}

/// One consistent set of layout rules.
#[derive(Clone)]
pub struct Profile {
    name: String,
    headers: Arc<dyn StateHeaderRule>,
    fields: Arc<dyn FieldRule>,
    layout: SectionLayout,
}

impl Profile {
    /// Build a profile from its rules.
    pub fn new(
        name: impl Into<String>,
        headers: impl StateHeaderRule + 'static,
        fields: impl FieldRule + 'static,
        layout: SectionLayout,
    ) -> Self {
        Self {
            name: name.into(),
            headers: Arc::new(headers),
            fields: Arc::new(fields),
            layout,
        }
    }

    /// Indented single-line headers, side-by-side fields, key/value sections.
    pub fn indented() -> Self {
        Self::new(
            "indented",
            SingleLineIndent::default(),
            AdjacentFields,
            SectionLayout::Fields,
        )
    }

    /// Font-tagged headers, stacked fields, block-list sections.
    pub fn font_tagged() -> Self {
        Self::new(
            "font-tagged",
            FontBand::default(),
            LineFields,
            SectionLayout::Blocks,
        )
    }

    /// Profile name, for logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Section storage.
    pub fn layout(&self) -> SectionLayout {
        self.layout
    }

    /// Whether `block` starts a state section.
    pub fn is_state_header(&self, block: &Block) -> bool {
        self.headers.is_state_header(block)
    }

    /// Read the field labeled by `blocks[index]`.
    pub fn extract_field(&self, blocks: &[Block], index: usize) -> Option<Field> {
        self.fields.extract_field(blocks, index)
    }

    /// Read the name of the entity anchored at `blocks[index]`.
    pub fn extract_title(&self, blocks: &[Block], index: usize) -> Option<(String, usize)> {
        self.fields.extract_title(blocks, index)
    }

    /// Read a field inside a flexibility point body.
    ///
    /// A block the header rule accepts starts a state section, so it never
    /// serves as the value of the label before it.
    pub fn extract_body_field(&self, blocks: &[Block], index: usize) -> Option<Field> {
        let mut field = self.extract_field(blocks, index)?;
        let header = (1..field.span).find(|offset| {
            blocks
                .get(index + offset)
                .is_some_and(|b| self.is_state_header(b))
        });
        if let Some(offset) = header {
            field.value.clear();
            field.span = offset;
        }
        Some(field)
    }

    /// Read all fields of a block run, in order. Later duplicates of a key
    /// replace earlier values.
    pub fn read_fields(&self, blocks: &[Block]) -> crate::model::FieldMap {
        let mut fields = crate::model::FieldMap::new();
        let mut index = 0;
        while let Some(field) = self.extract_body_field(blocks, index) {
            index += field.span.max(1);
            if field.key.is_empty() {
                continue;
            }
            fields.insert(field.key, field.value);
        }
        fields
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("layout", &self.layout)
            .finish()
    }
}

/// The value of a field block, for block-list sections: remaining lines
/// joined like block text.
pub(crate) fn block_value(block: &Block) -> String {
    join_lines(block.rest_lines()).trim().to_string()
}
