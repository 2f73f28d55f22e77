//! Fixed-height position heuristic.
//!
//! Measured layout is not available synchronously while scroll events are
//! being handled, so every item is assumed to occupy a fixed height chosen by
//! its kind. Items with variable aspect ratios will drift from their true
//! on-screen position; the locator has no way to detect that.

use reelfeed_model::{FeedEntry, FeedItem, MediaKind, ModelResult};

use crate::config::LayoutConfig;

/// Lays out feed entries top to bottom using per-kind fixed heights.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedHeightLayout {
    config: LayoutConfig,
}

impl FixedHeightLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn height_for(&self, kind: MediaKind) -> f32 {
        match kind {
            MediaKind::NativeVideo | MediaKind::EmbeddedVideo => {
                self.config.video_height
            }
            MediaKind::Image => self.config.image_height,
        }
    }

    /// Assign estimated positions in feed order.
    pub fn place(
        &self,
        entries: impl IntoIterator<Item = FeedEntry>,
    ) -> ModelResult<Vec<FeedItem>> {
        let spacing = self.config.item_spacing.max(0.0);
        let mut cursor = 0.0_f32;
        let mut items = Vec::new();
        for entry in entries {
            let height = self.height_for(entry.kind);
            items.push(FeedItem::from_entry(entry, cursor, height)?);
            cursor += height + spacing;
        }
        Ok(items)
    }
}

impl Default for FixedHeightLayout {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}
