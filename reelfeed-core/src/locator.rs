//! Candidate selection: which video sits closest to the viewport center.

use reelfeed_model::{FeedItem, ItemId, ViewportWindow};
use serde::Serialize;

/// The item chosen for playback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: ItemId,
    /// Position of the item in the locator's input sequence.
    pub index: usize,
    /// Absolute distance between item center and viewport center.
    pub distance: f32,
}

/// Pick the in-view video whose center is closest to the viewport center.
///
/// An item is in view when it strictly overlaps the viewport. Images are
/// skipped. Equal distances resolve to the earliest item in `items`, so the
/// result depends only on the inputs.
pub fn locate_candidate<'a, I>(
    items: I,
    viewport: &ViewportWindow,
) -> Option<Candidate>
where
    I: IntoIterator<Item = &'a FeedItem>,
{
    let center = viewport.center();
    items
        .into_iter()
        .enumerate()
        .filter(|(_, item)| item.is_video() && item.intersects(viewport))
        .map(|(index, item)| (index, item, (item.center() - center).abs()))
        // min_by keeps the first of equal elements
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(index, item, distance)| Candidate {
            id: item.id.clone(),
            index,
            distance,
        })
}
