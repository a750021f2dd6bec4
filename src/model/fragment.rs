//! Positioned text fragments reported by the PDF text layer.

use serde::{Deserialize, Serialize};

/// One positioned text run as reported by the PDF text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// The text content
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline, increasing upward)
    pub y: f32,
    /// Width of the text
    pub width: f32,
    /// Height of the text (effective font size)
    pub height: f32,
    /// Font resource name
    pub font_name: String,
    /// The logical line continues into a later fragment at the same x
    pub end_of_line: bool,
}

impl Fragment {
    /// Create a fragment with zero width and height.
    pub fn new(text: impl Into<String>, page: u32, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            page,
            x,
            y,
            width: 0.0,
            height: 0.0,
            font_name: String::new(),
            end_of_line: false,
        }
    }

    /// Set the size of the fragment.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the font name.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }

    /// Mark the fragment as continuing on the next line.
    pub fn with_end_of_line(mut self, end_of_line: bool) -> Self {
        self.end_of_line = end_of_line;
        self
    }

    /// Right edge of the fragment.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge of the fragment.
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the fragment carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
