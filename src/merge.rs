//! Block merging.
//!
//! Groups the flat fragment stream of one document into blocks. A block
//! follows one text column downward for as long as each fragment reports
//! that its line continues; everything in the header/footer margin band
//! and everything before the "Service Configurations" heading is dropped.

use std::collections::BTreeMap;

use crate::model::{Block, BlockBuilder, Fragment};
use crate::organize::AnchorTable;

/// Options for block merging.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    /// Distance from the page's highest/lowest fragment that counts as
    /// header/footer margin, in absolute units
    pub margin: f32,

    /// Maximum x distance for a continuation to join a block
    pub column_tolerance: f32,
}

impl MergeOptions {
    /// Create merge options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the margin band.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Set the column tolerance.
    pub fn with_column_tolerance(mut self, tolerance: f32) -> Self {
        self.column_tolerance = tolerance;
        self
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            margin: 5.0,
            column_tolerance: 1.0,
        }
    }
}

/// Merges fragments into blocks.
pub struct BlockMerger<'a> {
    options: MergeOptions,
    anchors: &'a AnchorTable,
}

impl<'a> BlockMerger<'a> {
    /// Create a merger.
    pub fn new(options: MergeOptions, anchors: &'a AnchorTable) -> Self {
        Self { options, anchors }
    }

    /// Merge the fragments of one document into ordered blocks.
    pub fn merge(&self, fragments: &[Fragment]) -> Vec<Block> {
        let visible: Vec<&Fragment> = fragments.iter().filter(|f| !f.is_blank()).collect();
        let kept = self.drop_margins(visible);

        let Some(start) = kept.iter().position(|f| self.anchors.starts_document(&f.text)) else {
            log::debug!(
                "no document start anchor among {} fragments, nothing to merge",
                kept.len()
            );
            return Vec::new();
        };

        let mut blocks = self.build_blocks(&kept[start..]);
        // The anchor block always leads; only the blocks after it are sorted.
        if let Some((_, rest)) = blocks.split_first_mut() {
            order_blocks(rest);
        }

        log::debug!(
            "merged {} fragments into {} blocks",
            kept.len() - start,
            blocks.len()
        );
        blocks
    }

    /// Drop fragments inside the margin band of their page.
    fn drop_margins<'f>(&self, fragments: Vec<&'f Fragment>) -> Vec<&'f Fragment> {
        let mut extents: BTreeMap<u32, (f32, f32)> = BTreeMap::new();
        for frag in &fragments {
            let extent = extents.entry(frag.page).or_insert((frag.y, frag.y));
            extent.0 = extent.0.min(frag.y);
            extent.1 = extent.1.max(frag.y);
        }

        let margin = self.options.margin;
        fragments
            .into_iter()
            .filter(|frag| {
                let (min_y, max_y) = extents[&frag.page];
                max_y - frag.y > margin && frag.y - min_y > margin
            })
            .collect()
    }

    /// Greedy column walk. `used` is the consumed set; fragments are never
    /// modified.
    fn build_blocks(&self, fragments: &[&Fragment]) -> Vec<Block> {
        let mut used = vec![false; fragments.len()];
        let mut blocks = Vec::new();

        for start in 0..fragments.len() {
            if used[start] {
                continue;
            }
            used[start] = true;

            let origin_x = fragments[start].x;
            let mut builder = BlockBuilder::start(fragments[start]);
            let mut current = start;

            while fragments[current].end_of_line {
                let candidate = (start + 1..fragments.len()).find(|&i| {
                    !used[i] && (fragments[i].x - origin_x).abs() <= self.options.column_tolerance
                });

                match candidate {
                    Some(next) if !self.anchors.starts_section(&fragments[next].text) => {
                        used[next] = true;
                        builder.push(fragments[next]);
                        current = next;
                    }
                    _ => break,
                }
            }

            blocks.push(builder.finish());
        }

        blocks
    }
}

/// Sort blocks per page top-to-bottom, then left-to-right.
///
/// Baselines are compared at whole-unit precision so that fragments of one
/// visual row with sub-unit jitter still order by x.
fn order_blocks(blocks: &mut [Block]) {
    blocks.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then_with(|| b.y.round().total_cmp(&a.y.round()))
            .then_with(|| a.x.total_cmp(&b.x))
    });
}
