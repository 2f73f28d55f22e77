//! Flat re-export of the model surface for coordinator and CLI code.

pub use super::error::{ModelError, Result as ModelResult};
pub use super::feed::{FeedEntry, FeedItem};
pub use super::ids::ItemId;
pub use super::media_kind::MediaKind;
pub use super::viewport::ViewportWindow;
