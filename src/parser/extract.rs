//! Fragment extraction from page content streams.
//!
//! Runs a small text-state machine over each page's operations and reports
//! every shown string as a [`Fragment`] positioned in page space. A
//! fragment is flagged `end_of_line` when the next text operation of the
//! same text object moves to a new line.

use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::model::Fragment;

use super::backend::{
    decode_text_simple, get_number_from_value, ContentOp, PageId, PdfBackend, PdfValue,
};
use super::options::{ErrorMode, ExtractOptions};

/// Average glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;

/// `TJ` adjustment (thousandths of text space) treated as a word gap.
const SPACE_THRESHOLD: f32 = 200.0;

/// An affine transform `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }
}

impl Matrix {
    fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    fn from_op(op: &ContentOp) -> Option<Self> {
        Some(Self::new(
            op.number(0)?,
            op.number(1)?,
            op.number(2)?,
            op.number(3)?,
            op.number(4)?,
            op.number(5)?,
        ))
    }

    fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Graphics and text state of one page.
struct TextState {
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text: Matrix,
    line: Matrix,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
    /// Index of the first fragment of the current text object
    object_start: usize,
}

impl TextState {
    fn new(leading: f32) -> Self {
        Self {
            ctm: Matrix::default(),
            ctm_stack: Vec::new(),
            text: Matrix::default(),
            line: Matrix::default(),
            font: Vec::new(),
            font_size: 12.0,
            leading,
            object_start: 0,
        }
    }

    /// Move to the start of the next line, offset by (tx, ty).
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line = Matrix::translation(tx, ty).then(&self.line);
        self.text = self.line;
    }

    /// Advance the text position by `tx` in text space.
    fn advance(&mut self, tx: f32) {
        self.text = Matrix::translation(tx, 0.0).then(&self.text);
    }

    fn device(&self) -> Matrix {
        self.text.then(&self.ctm)
    }
}

/// Extracts fragments through a [`PdfBackend`].
pub struct FragmentExtractor<'a, B: PdfBackend> {
    backend: &'a B,
    options: ExtractOptions,
}

impl<'a, B: PdfBackend> FragmentExtractor<'a, B> {
    /// Create an extractor.
    pub fn new(backend: &'a B, options: ExtractOptions) -> Self {
        Self { backend, options }
    }

    /// Extract the fragments of all pages in page order.
    pub fn extract(&self) -> Result<Vec<Fragment>> {
        let mut fragments = Vec::new();

        for (page_num, page_id) in self.backend.pages() {
            match self.extract_page(page_num, page_id) {
                Ok(mut page) => fragments.append(&mut page),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("skipping page {}: {}", page_num, e);
                }
                Err(e) => {
                    return Err(Error::TextExtract(format!("page {}: {}", page_num, e)));
                }
            }
        }

        log::debug!("extracted {} fragments", fragments.len());
        Ok(fragments)
    }

    /// Extract the fragments of one page.
    pub fn extract_page(&self, page_num: u32, page_id: PageId) -> Result<Vec<Fragment>> {
        let content = self.backend.page_content(page_id)?;
        let ops = self.backend.decode_content(&content)?;

        let mut state = TextState::new(self.options.default_leading);
        let mut fragments: Vec<Fragment> = Vec::new();

        for op in &ops {
            match op.operator.as_str() {
                "q" => state.ctm_stack.push(state.ctm),
                "Q" => {
                    if let Some(ctm) = state.ctm_stack.pop() {
                        state.ctm = ctm;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_op(op) {
                        state.ctm = m.then(&state.ctm);
                    }
                }
                "BT" => {
                    state.text = Matrix::default();
                    state.line = Matrix::default();
                    state.object_start = fragments.len();
                }
                "Tf" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        state.font = name.clone();
                    }
                    state.font_size = op.number(1).unwrap_or(state.font_size);
                }
                "TL" => state.leading = op.number(0).unwrap_or(state.leading),
                "Td" | "TD" => {
                    let tx = op.number(0).unwrap_or(0.0);
                    let ty = op.number(1).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                    if ty != 0.0 {
                        mark_line_break(&mut fragments, &state);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_op(op) {
                        let new_line = m.f != state.line.f;
                        state.text = m;
                        state.line = m;
                        if new_line {
                            mark_line_break(&mut fragments, &state);
                        }
                    }
                }
                "T*" => {
                    state.move_line(0.0, -state.leading);
                    mark_line_break(&mut fragments, &state);
                }
                "Tj" => {
                    if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                        let text = self.decode(page_id, &state, bytes);
                        self.show(&mut fragments, &mut state, page_num, text, 0.0);
                    }
                }
                "TJ" => {
                    if let Some(PdfValue::Array(items)) = op.operands.first() {
                        let (text, adjust) = self.decode_array(page_id, &state, items);
                        self.show(&mut fragments, &mut state, page_num, text, adjust);
                    }
                }
                "'" | "\"" => {
                    state.move_line(0.0, -state.leading);
                    mark_line_break(&mut fragments, &state);
                    let index = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(PdfValue::Str(bytes)) = op.operands.get(index) {
                        let text = self.decode(page_id, &state, bytes);
                        self.show(&mut fragments, &mut state, page_num, text, 0.0);
                    }
                }
                _ => {}
            }
        }

        log::trace!("page {}: {} fragments", page_num, fragments.len());
        Ok(fragments)
    }

    fn decode(&self, page_id: PageId, state: &TextState, bytes: &[u8]) -> String {
        if state.font.is_empty() {
            return decode_text_simple(bytes);
        }
        self.backend.decode_text(page_id, &state.font, bytes)
    }

    /// Decode a `TJ` array. Returns the text and the total positioning
    /// adjustment in thousandths of text space.
    fn decode_array(&self, page_id: PageId, state: &TextState, items: &[PdfValue]) -> (String, f32) {
        let mut combined = String::new();
        let mut adjust = 0.0;

        for item in items {
            match item {
                PdfValue::Str(bytes) => combined.push_str(&self.decode(page_id, state, bytes)),
                PdfValue::Integer(_) | PdfValue::Real(_) => {
                    let n = get_number_from_value(item).unwrap_or(0.0);
                    adjust += n;
                    let wants_space = -n > SPACE_THRESHOLD
                        && combined
                            .chars()
                            .last()
                            .is_some_and(|c| !c.is_whitespace() && !is_spaceless_script_char(c));
                    if wants_space {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }

        (combined, adjust)
    }

    /// Record a shown string and advance the text position past it.
    fn show(
        &self,
        fragments: &mut Vec<Fragment>,
        state: &mut TextState,
        page_num: u32,
        text: String,
        adjust: f32,
    ) {
        let chars = text.chars().count() as f32;
        let advance = chars * state.font_size * GLYPH_WIDTH - adjust / 1000.0 * state.font_size;

        let device = state.device();
        let text = if self.options.normalize {
            text.nfc().collect::<String>()
        } else {
            text
        };

        if !text.trim().is_empty() {
            let width = chars * state.font_size * GLYPH_WIDTH * device.horizontal_scale();
            let height = state.font_size * device.vertical_scale();
            fragments.push(
                Fragment::new(text, page_num, device.e, device.f)
                    .with_size(width, height)
                    .with_font(String::from_utf8_lossy(&state.font)),
            );
        }

        state.advance(advance);
    }
}

/// Flag the last fragment of the current text object as continuing on the
/// next line.
fn mark_line_break(fragments: &mut [Fragment], state: &TextState) {
    if fragments.len() > state.object_start {
        if let Some(last) = fragments.last_mut() {
            last.end_of_line = true;
        }
    }
}

/// Scripts written without spaces between words (CJK, kana, Hangul).
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30FF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{AC00}'..='\u{D7AF}'
        | '\u{F900}'..='\u{FAFF}'
    )
}

/// Number of distinct pages carrying fragments.
pub fn count_pages(fragments: &[Fragment]) -> u32 {
    fragments
        .iter()
        .map(|f| f.page)
        .collect::<BTreeSet<_>>()
        .len() as u32
}
