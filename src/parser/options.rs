//! Extraction options.

/// Options for extracting fragments from a PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Error handling mode for individual pages
    pub error_mode: ErrorMode,

    /// Apply Unicode NFC normalization to fragment text
    pub normalize: bool,

    /// Line leading used by `T*` and `'` until a `TL` operator sets one
    pub default_leading: f32,
}

impl ExtractOptions {
    /// Create extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages that fail to decode).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable Unicode normalization.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set the default line leading.
    pub fn with_default_leading(mut self, leading: f32) -> Self {
        self.default_leading = leading;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            normalize: true,
            default_leading: 12.0,
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on the first page that cannot be read
    #[default]
    Strict,
    /// Skip unreadable pages and continue
    Lenient,
}
