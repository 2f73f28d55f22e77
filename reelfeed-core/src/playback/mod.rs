//! Playback control over heterogeneous handles.
//!
//! Feed videos are backed either by an in-process decoder ([`NativeHandle`])
//! or by an embedded player that only accepts posted messages
//! ([`EmbeddedHandle`]). Both sit behind [`PlaybackHandle`] and are driven
//! through the [`PlaybackController`] operations, which never surface errors
//! to the caller: every call resolves to a [`ControlOutcome`].

pub mod handle;
pub mod registry;
pub mod service;

use std::fmt;

use async_trait::async_trait;
use reelfeed_model::ItemId;
use serde::Serialize;

pub use handle::{
    EmbeddedChannel, EmbeddedCommand, EmbeddedFunc, EmbeddedHandle,
    NativeHandle, NativePlayer, PlaybackHandle,
};
pub use registry::{HandleKey, HandleRegistry, Registration};
pub use service::{PlaybackService, ScopedController};

/// Operation issued against a playback handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlOp {
    Play,
    Pause,
    Mute,
    Status,
}

impl fmt::Display for ControlOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlOp::Play => write!(f, "play"),
            ControlOp::Pause => write!(f, "pause"),
            ControlOp::Mute => write!(f, "mute"),
            ControlOp::Status => write!(f, "status"),
        }
    }
}

/// How a control call resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlOutcome {
    /// The native decoder acknowledged the call.
    Applied,
    /// The embedded channel accepted the command; delivery is unconfirmed.
    Asserted,
    /// No handle was registered for the item.
    Unavailable,
    /// The handle was unregistered, or the activation superseded, before
    /// the call resolved.
    Cancelled,
    /// The decoder rejected the call or did not answer in time.
    Failed,
}

impl ControlOutcome {
    /// Whether the call probably took effect.
    pub fn is_effective(self) -> bool {
        matches!(self, ControlOutcome::Applied | ControlOutcome::Asserted)
    }
}

/// Uniform control surface over registered playback handles.
#[async_trait]
pub trait PlaybackController: Send + Sync {
    async fn play(&self, id: &ItemId) -> ControlOutcome;

    async fn pause(&self, id: &ItemId) -> ControlOutcome;

    async fn mute(&self, id: &ItemId) -> ControlOutcome;

    /// Faithful for native handles; the last locally asserted state for
    /// embedded ones. Unknown items report `false`.
    async fn is_playing(&self, id: &ItemId) -> bool;
}
