use std::fmt::{self, Display, Formatter};

/// Kind of media carried by a feed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MediaKind {
    /// Video decoded and controlled in-process.
    NativeVideo,
    /// Video hosted by an embedded player reachable only through messages.
    EmbeddedVideo,
    /// Still image; never a playback candidate.
    Image,
}

impl MediaKind {
    pub fn is_video(self) -> bool {
        matches!(self, MediaKind::NativeVideo | MediaKind::EmbeddedVideo)
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::NativeVideo => write!(f, "native_video"),
            MediaKind::EmbeddedVideo => write!(f, "embedded_video"),
            MediaKind::Image => write!(f, "image"),
        }
    }
}
