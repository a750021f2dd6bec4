//! Literal anchors of the report template.
//!
//! Every string the pipeline matches against lives here, keyed by the role
//! it plays. A new template variant adds entries instead of code.

/// What an anchor marks in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorRole {
    /// Start of the configuration region; everything before it is dropped
    ServiceConfigurations,
    /// Start of the site-operations region
    SiteOperations,
    /// End of the site-operations region (browser print footer)
    OperationsEnd,
    /// Start of one flexibility point
    FlexibilityPoint,
    /// Label captured from the configuration region
    ServiceField,
    /// Keyword selecting a state section as an action in summaries
    Action,
}

/// Anchor text → role table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorTable {
    entries: Vec<(String, AnchorRole)>,
}

impl AnchorTable {
    /// An empty table.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an anchor.
    pub fn with(mut self, text: impl Into<String>, role: AnchorRole) -> Self {
        self.entries.push((text.into(), role));
        self
    }

    /// All anchors for a role, in insertion order.
    pub fn all(&self, role: AnchorRole) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(_, r)| *r == role)
            .map(|(text, _)| text.as_str())
    }

    /// The first anchor for a role.
    pub fn first(&self, role: AnchorRole) -> Option<&str> {
        self.all(role).next()
    }

    /// Whether `text` contains any anchor of `role`.
    pub fn matches(&self, role: AnchorRole, text: &str) -> bool {
        self.all(role).any(|anchor| text.contains(anchor))
    }

    /// Whether `text` starts with a section anchor.
    ///
    /// The merger never lets a section heading continue another block.
    pub fn starts_section(&self, text: &str) -> bool {
        let text = text.trim_start();
        self.all(AnchorRole::ServiceConfigurations)
            .chain(self.all(AnchorRole::SiteOperations))
            .any(|anchor| text.starts_with(anchor))
    }

    /// Whether `text` starts with the document start anchor.
    pub fn starts_document(&self, text: &str) -> bool {
        let text = text.trim_start();
        self.all(AnchorRole::ServiceConfigurations)
            .any(|anchor| text.starts_with(anchor))
    }
}

impl Default for AnchorTable {
    fn default() -> Self {
        Self::empty()
            .with("Service Configurations", AnchorRole::ServiceConfigurations)
            .with("Site Operations", AnchorRole::SiteOperations)
            .with("file://", AnchorRole::OperationsEnd)
            .with("Flexibility point", AnchorRole::FlexibilityPoint)
            .with("Subscriber address:", AnchorRole::ServiceField)
            .with("Service ID:", AnchorRole::ServiceField)
            .with("Add", AnchorRole::Action)
            .with("Connect", AnchorRole::Action)
            .with("Remove", AnchorRole::Action)
    }
}
