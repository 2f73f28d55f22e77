//! Scroll trace and feed file formats.

use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use reelfeed_model::{FeedEntry, ItemId};
use serde::Deserialize;

/// One recorded UI event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    Scroll { offset: f32 },
    Resize { height: f32 },
    /// The item's view mounted and registered its handle.
    Mount { id: ItemId },
    /// The item's view went away.
    Unmount { id: ItemId },
}

/// An event with its offset from the start of the trace.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimedEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: TraceEvent,
}

/// Read a trace: a JSON array of timed events. Events are replayed in
/// timestamp order; equal timestamps keep file order.
pub fn load_trace(path: &Path) -> anyhow::Result<Vec<TimedEvent>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read trace {}", path.display()))?;
    let mut events: Vec<TimedEvent> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid trace {}", path.display()))?;
    events.sort_by_key(|event| event.at_ms);
    Ok(events)
}

/// Read a feed: a JSON array of entries in display order.
pub fn load_feed(path: &Path) -> anyhow::Result<Vec<FeedEntry>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read feed {}", path.display()))?;
    let entries: Vec<FeedEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid feed {}", path.display()))?;
    if entries.is_empty() {
        bail!("feed {} has no entries", path.display());
    }
    Ok(entries)
}
