//! # Reelfeed Core
//!
//! Playback coordination for vertically scrolling feeds that mix images with
//! natively decoded and embedded videos. At most one video plays at a time:
//! the one whose center sits closest to the center of the viewport.
//!
//! ## Architecture
//!
//! - [`viewport`]: latest scroll offset and the visible window
//! - [`scheduler`]: trailing-edge debounce of candidate recomputation
//! - [`locator`]: pure candidate selection
//! - [`layout`]: fixed-height position estimates for raw feed entries
//! - [`playback`]: handle registry and uniform play/pause/mute/status control
//! - [`coordinator`]: the actor that ties everything together
//! - [`config`]: tuning knobs and their loader
//!
//! ## Examples
//!
//! ```no_run
//! use reelfeed_core::{
//!     config::CoordinatorConfig,
//!     coordinator::FeedCoordinator,
//!     playback::{EmbeddedChannel, PlaybackHandle},
//!     DeliveryError,
//! };
//! use reelfeed_model::{FeedEntry, MediaKind};
//! use std::sync::Arc;
//!
//! struct Frame;
//!
//! impl EmbeddedChannel for Frame {
//!     fn post_message(&self, message: &str) -> Result<(), DeliveryError> {
//!         println!("-> {message}");
//!         Ok(())
//!     }
//! }
//!
//! async fn drive() -> Result<(), Box<dyn std::error::Error>> {
//!     let coordinator = FeedCoordinator::new(CoordinatorConfig::default()).spawn()?;
//!     coordinator
//!         .register_handle("clip-1", PlaybackHandle::embedded(Arc::new(Frame)))
//!         .await?;
//!     coordinator
//!         .set_feed_entries(vec![FeedEntry::new(
//!             "clip-1",
//!             MediaKind::EmbeddedVideo,
//!             "https://player.example/embed/1",
//!         )])
//!         .await?;
//!     coordinator.on_scroll(120.0).await?;
//!     coordinator.shutdown().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod layout;
pub mod locator;
pub mod playback;
pub mod scheduler;
pub mod viewport;

pub use config::{ConfigSource, CoordinatorConfig, LayoutConfig};
pub use coordinator::{
    CoordinatorHandle, CoordinatorSnapshot, CoordinatorState, FeedCoordinator,
};
pub use error::{
    ControlError, CoordinatorError, DeliveryError, NativeFault, Result,
};
pub use layout::FixedHeightLayout;
pub use locator::{Candidate, locate_candidate};
pub use playback::{
    ControlOp, ControlOutcome, PlaybackController, PlaybackHandle,
    PlaybackService,
};
