//! Core data model definitions shared across Reelfeed crates.
#![allow(missing_docs)]

pub mod error;
pub mod feed;
pub mod ids;
pub mod media_kind;
pub mod prelude;
pub mod viewport;

pub use error::{ModelError, Result as ModelResult};
pub use feed::{FeedEntry, FeedItem};
pub use ids::ItemId;
pub use media_kind::MediaKind;
pub use viewport::ViewportWindow;
