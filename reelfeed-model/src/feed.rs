use crate::error::{ModelError, Result};
use crate::ids::ItemId;
use crate::media_kind::MediaKind;
use crate::viewport::ViewportWindow;

/// Feed record as delivered by the content service, before layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedEntry {
    pub id: ItemId,
    pub kind: MediaKind,
    pub source_uri: String,
    /// Advertised duration in seconds, when the service knows it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration_hint: Option<f32>,
}

impl FeedEntry {
    pub fn new(
        id: impl Into<ItemId>,
        kind: MediaKind,
        source_uri: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            source_uri: source_uri.into(),
            duration_hint: None,
        }
    }

    pub fn with_duration_hint(mut self, seconds: f32) -> Self {
        self.duration_hint = Some(seconds);
        self
    }
}

/// A positioned feed item.
///
/// `estimated_top` and `estimated_height` come from a layout heuristic, not
/// from measured layout, so selections made from them can diverge from what
/// is actually on screen.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedItem {
    pub id: ItemId,
    pub kind: MediaKind,
    pub source_uri: String,
    pub estimated_top: f32,
    pub estimated_height: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration_hint: Option<f32>,
}

impl FeedItem {
    /// Build a positioned item, rejecting empty ids and degenerate geometry.
    pub fn new(
        id: impl Into<ItemId>,
        kind: MediaKind,
        source_uri: impl Into<String>,
        estimated_top: f32,
        estimated_height: f32,
    ) -> Result<Self> {
        let item = Self {
            id: id.into(),
            kind,
            source_uri: source_uri.into(),
            estimated_top,
            estimated_height,
            duration_hint: None,
        };
        item.validate()?;
        Ok(item)
    }

    /// Place a raw entry at the given position.
    pub fn from_entry(
        entry: FeedEntry,
        estimated_top: f32,
        estimated_height: f32,
    ) -> Result<Self> {
        let item = Self {
            id: entry.id,
            kind: entry.kind,
            source_uri: entry.source_uri,
            estimated_top,
            estimated_height,
            duration_hint: entry.duration_hint,
        };
        item.validate()?;
        Ok(item)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(ModelError::EmptyId);
        }
        if !self.estimated_top.is_finite() || self.estimated_top < 0.0 {
            return Err(ModelError::InvalidGeometry {
                id: self.id.clone(),
                reason: "top must be finite and non-negative",
            });
        }
        if !self.estimated_height.is_finite() || self.estimated_height <= 0.0 {
            return Err(ModelError::InvalidGeometry {
                id: self.id.clone(),
                reason: "height must be finite and positive",
            });
        }
        Ok(())
    }

    pub fn is_video(&self) -> bool {
        self.kind.is_video()
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.estimated_top + self.estimated_height
    }

    #[inline]
    pub fn center(&self) -> f32 {
        self.estimated_top + self.estimated_height / 2.0
    }

    /// Strict overlap test: an item touching the viewport edge is not in view.
    #[inline]
    pub fn intersects(&self, viewport: &ViewportWindow) -> bool {
        self.bottom() > viewport.top && self.estimated_top < viewport.bottom()
    }
}
