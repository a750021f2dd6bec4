//! Section organization.
//!
//! Locates the template's anchor blocks and partitions the block sequence
//! into the configuration fields and the flexibility points with their
//! state sections. A document that does not match the template is never
//! an error: missing anchors leave the corresponding parts empty.

mod anchors;
mod profile;

pub use anchors::{AnchorRole, AnchorTable};
pub use profile::{
    AdjacentFields, Field, FieldRule, FontBand, LineFields, Profile, SectionLayout,
    SingleLineIndent, StateHeaderRule,
};
pub(crate) use profile::block_value;

use indexmap::IndexMap;

use crate::model::{
    standardize_key, Block, FieldMap, FlexibilityPointRecord, OrganizedDocument, Section,
};

/// Where the configuration region ends.
///
/// Report variants disagree on whether the block right before the
/// "Site Operations" heading still belongs to the configuration region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionEnd {
    /// The region ends right before the "Site Operations" block
    #[default]
    BeforeAnchor,
    /// The region also excludes the block preceding "Site Operations"
    BeforePrecedingBlock,
}

/// Options for organizing blocks.
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    /// Template anchors
    pub anchors: AnchorTable,

    /// Layout profiles, tried in order
    pub profiles: Vec<Profile>,

    /// End of the configuration region
    pub region_end: RegionEnd,
}

impl OrganizeOptions {
    /// Create organize options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the anchor table.
    pub fn with_anchors(mut self, anchors: AnchorTable) -> Self {
        self.anchors = anchors;
        self
    }

    /// Use a single profile.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profiles = vec![profile];
        self
    }

    /// Try several profiles in order.
    pub fn with_profiles(mut self, profiles: Vec<Profile>) -> Self {
        self.profiles = profiles;
        self
    }

    /// Set where the configuration region ends.
    pub fn with_region_end(mut self, region_end: RegionEnd) -> Self {
        if region_end != RegionEnd::BeforeAnchor {
            log::warn!(
                "configuration region set to {:?}; older report variants expect BeforeAnchor",
                region_end
            );
        }
        self.region_end = region_end;
        self
    }
}

impl Default for OrganizeOptions {
    fn default() -> Self {
        Self {
            anchors: AnchorTable::default(),
            profiles: vec![Profile::indented(), Profile::font_tagged()],
            region_end: RegionEnd::default(),
        }
    }
}

/// Organizes merged blocks into an [`OrganizedDocument`].
#[derive(Debug, Clone, Default)]
pub struct Organizer {
    options: OrganizeOptions,
}

impl Organizer {
    /// Create an organizer.
    pub fn new(options: OrganizeOptions) -> Self {
        Self { options }
    }

    /// The anchor table in use.
    pub fn anchors(&self) -> &AnchorTable {
        &self.options.anchors
    }

    /// Organize with each profile in turn and keep the first result that
    /// found at least one state section, or else the first result.
    pub fn organize(&self, blocks: &[Block]) -> OrganizedDocument {
        let default_profile;
        let profiles = if self.options.profiles.is_empty() {
            default_profile = [Profile::indented()];
            &default_profile[..]
        } else {
            &self.options.profiles[..]
        };

        let mut fallback = None;
        for profile in profiles {
            let doc = self.organize_with(profile, blocks);
            if doc.has_state_sections() {
                log::debug!("profile '{}' matched the document layout", profile.name());
                return doc;
            }
            log::debug!("profile '{}' found no state sections", profile.name());
            fallback.get_or_insert(doc);
        }

        fallback.unwrap_or_default()
    }

    /// Organize with one profile.
    pub fn organize_with(&self, profile: &Profile, blocks: &[Block]) -> OrganizedDocument {
        let mut doc = OrganizedDocument::default();

        let Some(config_start) = self.find(blocks, 0, AnchorRole::ServiceConfigurations) else {
            log::warn!("no 'Service Configurations' block, returning empty document");
            return doc;
        };

        let ops_start = self.find(blocks, config_start + 1, AnchorRole::SiteOperations);
        let config_end = match (ops_start, self.options.region_end) {
            (Some(ops), RegionEnd::BeforeAnchor) => ops,
            (Some(ops), RegionEnd::BeforePrecedingBlock) => ops.saturating_sub(1).max(config_start),
            (None, _) => blocks.len(),
        };
        doc.service_configurations =
            self.read_service_fields(profile, &blocks[config_start..config_end]);

        let Some(ops_start) = ops_start else {
            log::warn!("no 'Site Operations' block, document has no flexibility points");
            return doc;
        };
        let ops_end = self
            .find(blocks, ops_start + 1, AnchorRole::OperationsEnd)
            .unwrap_or(blocks.len());

        doc.site_operations.flexibility_points =
            self.read_flexibility_points(profile, &blocks[ops_start..ops_end]);
        doc
    }

    /// Index of the first block at or after `from` containing an anchor of `role`.
    fn find(&self, blocks: &[Block], from: usize, role: AnchorRole) -> Option<usize> {
        blocks
            .get(from..)?
            .iter()
            .position(|b| self.options.anchors.matches(role, &b.text))
            .map(|i| i + from)
    }

    fn read_service_fields(&self, profile: &Profile, region: &[Block]) -> FieldMap {
        let mut fields = FieldMap::new();

        for label in self.options.anchors.all(AnchorRole::ServiceField) {
            let Some(index) = region.iter().position(|b| b.contains(label)) else {
                log::debug!("label '{}' not found in configuration region", label);
                continue;
            };
            match profile.extract_field(region, index) {
                Some(field) if !field.value.is_empty() => {
                    fields.insert(standardize_key(label), field.value);
                }
                _ => log::debug!("label '{}' has no value", label),
            }
        }

        fields
    }

    fn read_flexibility_points(
        &self,
        profile: &Profile,
        region: &[Block],
    ) -> IndexMap<String, FlexibilityPointRecord> {
        let starts: Vec<usize> = region
            .iter()
            .enumerate()
            .filter(|(_, b)| {
                self.options
                    .anchors
                    .matches(AnchorRole::FlexibilityPoint, &b.text)
            })
            .map(|(i, _)| i)
            .collect();

        let mut points = IndexMap::new();
        if starts.is_empty() {
            log::warn!("no flexibility point blocks in site operations");
            return points;
        }

        for (n, &start) in starts.iter().enumerate() {
            let end = starts.get(n + 1).copied().unwrap_or(region.len());
            let range = &region[start..end];

            let (title, body) = match profile.extract_title(range, 0) {
                Some((title, span)) => (title, &range[span.min(range.len())..]),
                None => (format!("Flexibility Point {}", n + 1), &range[1..]),
            };

            let record = self.read_record(profile, body);
            if points.insert(title.clone(), record).is_some() {
                log::warn!("duplicate flexibility point '{}', keeping the later one", title);
            }
        }

        points
    }

    fn read_record(&self, profile: &Profile, body: &[Block]) -> FlexibilityPointRecord {
        let headers = header_positions(profile, body);
        let info_end = headers.first().copied().unwrap_or(body.len());

        let info = match profile.layout() {
            SectionLayout::Blocks => Section::Blocks(body[..info_end].to_vec()),
            SectionLayout::Fields => Section::Fields(profile.read_fields(&body[..info_end])),
        };

        let mut state_sections = IndexMap::new();
        for (n, &header) in headers.iter().enumerate() {
            let end = headers.get(n + 1).copied().unwrap_or(body.len());
            let section = match profile.layout() {
                SectionLayout::Blocks => Section::Blocks(body[header..end].to_vec()),
                SectionLayout::Fields => {
                    Section::Fields(profile.read_fields(&body[header + 1..end]))
                }
            };

            let key = unique_key(&state_sections, standardize_key(&body[header].text));
            state_sections.insert(key, section);
        }

        FlexibilityPointRecord {
            info,
            state_sections,
        }
    }
}

/// Positions of state headers. A field's value block is skipped, but a
/// value candidate the header rule accepts is a header, not a value.
fn header_positions(profile: &Profile, body: &[Block]) -> Vec<usize> {
    let mut headers = Vec::new();
    let mut index = 0;

    while index < body.len() {
        if profile.is_state_header(&body[index]) {
            headers.push(index);
            index += 1;
            continue;
        }

        index += profile
            .extract_body_field(body, index)
            .map_or(1, |field| field.span.max(1));
    }

    headers
}

/// Suffix repeated headers: "Existing interface termination (2)".
fn unique_key(sections: &IndexMap<String, Section>, key: String) -> String {
    if !sections.contains_key(&key) {
        return key;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{} ({})", key, n);
        if !sections.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(x: f32, lines: &[&str]) -> Block {
        Block::from_lines(1, x, 400.0, lines)
    }

    fn report_blocks() -> Vec<Block> {
        vec![
            block(60.0, &["Service Configurations"]),
            block(60.0, &["Subscriber address:"]),
            block(200.0, &["123 Main St"]),
            block(60.0, &["Service ID:"]),
            block(200.0, &["SID-42"]),
            block(60.0, &["Site Operations"]),
            block(60.0, &["Flexibility point 1"]),
            block(60.0, &["FP-Alpha"]),
            block(90.0, &["Add Drop Cable:"]),
            block(60.0, &["Fiber-7"]),
        ]
    }

    fn indented() -> Organizer {
        Organizer::new(OrganizeOptions::new().with_profile(Profile::indented()))
    }

    #[test]
    fn test_service_fields() {
        let doc = indented().organize(&report_blocks());
        assert_eq!(doc.service_configurations["Subscriber address"], "123 Main St");
        assert_eq!(doc.service_configurations["Service ID"], "SID-42");
    }

    #[test]
    fn test_flexibility_point_and_section() {
        let doc = indented().organize(&report_blocks());
        let fp = &doc.flexibility_points()["FP-Alpha"];
        assert!(fp.info.is_empty());
        match &fp.state_sections["Add Drop Cable"] {
            Section::Fields(fields) => assert_eq!(fields["Fiber-7"], ""),
            other => panic!("unexpected section {:?}", other),
        }
    }

    #[test]
    fn test_idempotent() {
        let organizer = Organizer::default();
        let blocks = report_blocks();
        assert_eq!(organizer.organize(&blocks), organizer.organize(&blocks));
    }

    #[test]
    fn test_missing_start_anchor_gives_empty_document() {
        let blocks = vec![block(60.0, &["Site Operations"]), block(60.0, &["Flexibility point 1"])];
        assert!(indented().organize(&blocks).is_empty());
    }

    #[test]
    fn test_missing_site_operations_keeps_config() {
        let blocks = report_blocks()[..5].to_vec();
        let doc = indented().organize(&blocks);
        assert_eq!(doc.service_configurations.len(), 2);
        assert!(doc.flexibility_points().is_empty());
    }

    #[test]
    fn test_no_flexibility_points() {
        let blocks = vec![
            block(60.0, &["Service Configurations"]),
            block(60.0, &["Site Operations"]),
            block(60.0, &["Remark:"]),
        ];
        let doc = indented().organize(&blocks);
        assert!(doc.flexibility_points().is_empty());
    }

    #[test]
    fn test_region_end_variants() {
        // "Service ID:" sits right before "Site Operations".
        let blocks = vec![
            block(60.0, &["Service Configurations"]),
            block(60.0, &["Subscriber address:"]),
            block(200.0, &["123 Main St"]),
            block(60.0, &["Service ID:", "SID-42"]),
            block(60.0, &["Site Operations"]),
        ];
        let stacked = Profile::new(
            "stacked",
            SingleLineIndent::default(),
            LineFields,
            SectionLayout::Fields,
        );

        let exclusive = Organizer::new(OrganizeOptions::new().with_profile(stacked.clone()));
        let doc = exclusive.organize(&blocks);
        assert_eq!(doc.service_configurations["Service ID"], "SID-42");

        let shifted = Organizer::new(
            OrganizeOptions::new()
                .with_profile(stacked)
                .with_region_end(RegionEnd::BeforePrecedingBlock),
        );
        let doc = shifted.organize(&blocks);
        assert!(!doc.service_configurations.contains_key("Service ID"));
    }

    #[test]
    fn test_ops_region_ends_at_file_footer() {
        let mut blocks = report_blocks();
        blocks.push(block(20.0, &["file:///C:/reports/P-1.html"]));
        blocks.push(block(60.0, &["Flexibility point 2"]));
        blocks.push(block(60.0, &["FP-Beta"]));

        let doc = indented().organize(&blocks);
        assert_eq!(doc.flexibility_points().len(), 1);
    }

    #[test]
    fn test_title_fallback_uses_ordinal() {
        let blocks = vec![
            block(60.0, &["Service Configurations"]),
            block(60.0, &["Site Operations"]),
            block(60.0, &["Flexibility point"]),
            block(60.0, &["Address:"]),
            block(60.0, &["Main St 1"]),
            block(60.0, &["Flexibility point"]),
        ];
        let doc = indented().organize(&blocks);
        let titles: Vec<&str> = doc.flexibility_points().keys().map(|k| k.as_str()).collect();
        assert_eq!(titles, vec!["Flexibility Point 1", "Flexibility Point 2"]);

        match &doc.flexibility_points()["Flexibility Point 1"].info {
            Section::Fields(fields) => assert_eq!(fields["Address"], "Main St 1"),
            other => panic!("unexpected info {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_titles_last_wins() {
        let blocks = vec![
            block(60.0, &["Service Configurations"]),
            block(60.0, &["Site Operations"]),
            block(60.0, &["Flexibility point:"]),
            block(200.0, &["ODF-1"]),
            block(60.0, &["Remark:"]),
            block(60.0, &["first"]),
            block(60.0, &["Flexibility point:"]),
            block(200.0, &["ODF-1"]),
            block(60.0, &["Remark:"]),
            block(60.0, &["second"]),
        ];
        let doc = indented().organize(&blocks);
        assert_eq!(doc.flexibility_points().len(), 1);
        match &doc.flexibility_points()["ODF-1"].info {
            Section::Fields(fields) => assert_eq!(fields["Remark"], "second"),
            other => panic!("unexpected info {:?}", other),
        }
        assert!(!doc.has_state_sections());
    }

    #[test]
    fn test_header_after_empty_label_starts_a_section() {
        let blocks = vec![
            block(60.0, &["Service Configurations"]),
            block(60.0, &["Site Operations"]),
            block(60.0, &["Flexibility point 1"]),
            block(200.0, &["FP-A"]),
            block(60.0, &["Remark:"]),
            block(95.0, &["Add equipment"]),
            block(60.0, &["Type:"]),
            block(60.0, &["ODF"]),
        ];
        let doc = indented().organize(&blocks);
        let fp = &doc.flexibility_points()["FP-A"];

        match &fp.info {
            Section::Fields(fields) => assert_eq!(fields["Remark"], ""),
            other => panic!("unexpected info {:?}", other),
        }
        match &fp.state_sections["Add equipment"] {
            Section::Fields(fields) => assert_eq!(fields["Type"], "ODF"),
            other => panic!("unexpected section {:?}", other),
        }
    }

    #[test]
    fn test_zero_headers_puts_everything_in_info() {
        let blocks = vec![
            block(60.0, &["Service Configurations"]),
            block(60.0, &["Site Operations"]),
            block(60.0, &["Flexibility point", "FP-Gamma"]),
            block(60.0, &["Address:", "Main St 1"]),
            block(60.0, &["Position:", "Basement"]),
        ];
        let organizer = Organizer::new(OrganizeOptions::new().with_profile(Profile::font_tagged()));
        let doc = organizer.organize(&blocks);
        let fp = &doc.flexibility_points()["FP-Gamma"];
        assert!(fp.state_sections.is_empty());
        assert!(matches!(&fp.info, Section::Blocks(b) if b.len() == 2));
    }

    #[test]
    fn test_font_tagged_sections_keep_header_block() {
        let blocks = vec![
            block(60.0, &["Service Configurations"]),
            block(60.0, &["Service ID:", "SID-7"]).with_font("F2"),
            block(60.0, &["Site Operations"]),
            block(60.0, &["Flexibility point", "FP-Delta"]),
            block(57.0, &["Address:", "Main St 1"]).with_font("F2"),
            block(70.0, &["Connect equipment"]).with_font("F2"),
            block(57.0, &["Equipment ref.:", "EQ-9"]).with_font("F2"),
            block(70.0, &["Existing interface termination"]).with_font("F2"),
            block(70.0, &["Existing interface termination"]).with_font("F2"),
        ];
        let organizer = Organizer::new(OrganizeOptions::new().with_profile(Profile::font_tagged()));
        let doc = organizer.organize(&blocks);
        assert_eq!(doc.service_configurations["Service ID"], "SID-7");

        let fp = &doc.flexibility_points()["FP-Delta"];
        let keys: Vec<&str> = fp.state_sections.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "Connect equipment",
                "Existing interface termination",
                "Existing interface termination (2)"
            ]
        );
        match &fp.state_sections["Connect equipment"] {
            Section::Blocks(blocks) => {
                assert_eq!(blocks.len(), 2);
                assert_eq!(blocks[0].text, "Connect equipment");
            }
            other => panic!("unexpected section {:?}", other),
        }
    }

    #[test]
    fn test_profiles_tried_in_order() {
        // Only the font-tagged profile finds headers here.
        let blocks = vec![
            block(60.0, &["Service Configurations"]),
            block(60.0, &["Site Operations"]),
            block(60.0, &["Flexibility point", "FP-Echo"]),
            block(70.0, &["Remove", "splitter"]).with_font("F2"),
            block(60.0, &["Port:", "3"]),
        ];
        let doc = Organizer::default().organize(&blocks);
        let fp = &doc.flexibility_points()["FP-Echo"];
        assert!(fp.state_sections.contains_key("Remove splitter"));
    }
}
