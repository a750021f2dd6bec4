//! Text blocks merged from fragments.

use serde::{Deserialize, Serialize};

use super::Fragment;

/// One or more fragments merged along a vertical text column.
///
/// Blocks are built by the merger and never modified afterward; `text`
/// is always the [`join_lines`] of `lines`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Page number (1-indexed)
    pub page: u32,
    /// Leftmost X position
    pub x: f32,
    /// Y position of the first fragment
    pub y: f32,
    /// Max right edge minus `x`
    pub width: f32,
    /// Highest top minus lowest baseline
    pub height: f32,
    /// Font of the first fragment
    pub font_name: String,
    /// Source lines in merge order
    pub lines: Vec<String>,
    /// Lines joined with single spaces where needed
    pub text: String,
}

impl Block {
    /// Start a block from its first fragment.
    pub fn from_fragment(fragment: &Fragment) -> Self {
        Self {
            page: fragment.page,
            x: fragment.x,
            y: fragment.y,
            width: fragment.width,
            height: fragment.height,
            font_name: fragment.font_name.clone(),
            lines: vec![fragment.text.clone()],
            text: fragment.text.clone(),
        }
    }

    /// Create a block directly from lines, e.g. when reading stored JSON
    /// produced by another extractor.
    pub fn from_lines<S: AsRef<str>>(page: u32, x: f32, y: f32, lines: &[S]) -> Self {
        let lines: Vec<String> = lines.iter().map(|l| l.as_ref().to_string()).collect();
        Self {
            page,
            x,
            y,
            width: 0.0,
            height: 0.0,
            font_name: String::new(),
            text: join_lines(&lines),
            lines,
        }
    }

    /// Set the font name.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }

    /// Number of source lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// First source line, trimmed.
    pub fn first_line(&self) -> &str {
        self.lines.first().map(|l| l.trim()).unwrap_or("")
    }

    /// Source lines after the first one.
    pub fn rest_lines(&self) -> &[String] {
        self.lines.get(1..).unwrap_or(&[])
    }

    /// Whether the first line reads as a field label (`"Address:"`).
    pub fn is_label(&self) -> bool {
        self.first_line().ends_with(':')
    }

    /// Whether the joined text contains `needle` (case-sensitive).
    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }
}

/// Accumulates fragments into a [`Block`] while the merger walks a column.
#[derive(Debug)]
pub(crate) struct BlockBuilder {
    block: Block,
    right: f32,
    top: f32,
    bottom: f32,
}

impl BlockBuilder {
    pub(crate) fn start(fragment: &Fragment) -> Self {
        Self {
            block: Block::from_fragment(fragment),
            right: fragment.right(),
            top: fragment.top(),
            bottom: fragment.y,
        }
    }

    pub(crate) fn push(&mut self, fragment: &Fragment) {
        self.right = self.right.max(fragment.right());
        self.top = self.top.max(fragment.top());
        self.bottom = self.bottom.min(fragment.y);
        self.block.x = self.block.x.min(fragment.x);
        self.block.lines.push(fragment.text.clone());
    }

    pub(crate) fn finish(mut self) -> Block {
        self.block.width = self.right - self.block.x;
        self.block.height = self.top - self.bottom;
        self.block.text = join_lines(&self.block.lines);
        self.block
    }
}

/// Join lines, inserting one space where neither side is whitespace.
///
/// `["Flexibility", "point 3"]` joins to `"Flexibility point 3"`, while
/// `["Remark: ", "none"]` keeps its existing space.
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut joined = String::new();
    for line in lines {
        let line = line.as_ref();
        let prev_is_space = joined.chars().last().map_or(true, char::is_whitespace);
        let next_is_space = line.chars().next().map_or(true, char::is_whitespace);
        if !joined.is_empty() && !prev_is_space && !next_is_space {
            joined.push(' ');
        }
        joined.push_str(line);
    }
    joined
}

/// Trim a label and drop one trailing colon: `" Service ID: "` → `"Service ID"`.
pub fn standardize_key(label: &str) -> String {
    let trimmed = label.trim();
    trimmed
        .strip_suffix(':')
        .unwrap_or(trimmed)
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_inserts_single_space() {
        assert_eq!(
            join_lines(&["Flexibility", "point 3"]),
            "Flexibility point 3"
        );
        assert_eq!(join_lines(&["Remark: ", "none"]), "Remark: none");
        assert_eq!(join_lines(&["Remark:", " none"]), "Remark: none");
        assert_eq!(join_lines(&["one"]), "one");
        assert_eq!(join_lines::<&str>(&[]), "");
    }

    #[test]
    fn test_standardize_key() {
        assert_eq!(standardize_key(" Service ID: "), "Service ID");
        assert_eq!(standardize_key("Add drop cable:"), "Add drop cable");
        assert_eq!(standardize_key("Address"), "Address");
        assert_eq!(standardize_key("Remark :"), "Remark");
    }

    #[test]
    fn test_builder_extends_geometry() {
        let first = Fragment::new("Flexibility", 1, 60.0, 500.0)
            .with_size(40.0, 10.0)
            .with_font("F1");
        let second = Fragment::new("point 3", 1, 59.5, 488.0).with_size(55.0, 10.0);

        let mut builder = BlockBuilder::start(&first);
        builder.push(&second);
        let block = builder.finish();

        assert_eq!(block.text, "Flexibility point 3");
        assert_eq!(block.lines.len(), 2);
        assert_eq!(block.x, 59.5);
        assert_eq!(block.y, 500.0);
        assert!((block.width - 55.0).abs() < 1e-4);
        assert!((block.height - 22.0).abs() < 1e-4);
        assert_eq!(block.font_name, "F1");
    }

    #[test]
    fn test_label_detection() {
        let block = Block::from_lines(1, 60.0, 400.0, &["Address: ", "Main St 1"]);
        assert!(block.is_label());
        assert_eq!(block.first_line(), "Address:");
        assert_eq!(block.rest_lines(), &["Main St 1".to_string()]);

        let plain = Block::from_lines(1, 60.0, 400.0, &["Fiber-7"]);
        assert!(!plain.is_label());
        assert!(plain.rest_lines().is_empty());
    }
}
