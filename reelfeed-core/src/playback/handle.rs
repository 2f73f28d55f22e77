//! Playback handle backends.
//!
//! `PlaybackHandle` dispatches by variant instead of through a single trait
//! object: native decoders answer asynchronously and can report their real
//! state, embedded players only take fire-and-forget messages.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use reelfeed_model::MediaKind;
use serde::{Deserialize, Serialize};

use super::ControlOp;
use crate::error::{DeliveryError, NativeFault};

/// In-process decoder surface.
#[async_trait]
pub trait NativePlayer: Send + Sync {
    async fn play(&self) -> Result<(), NativeFault>;

    async fn pause(&self) -> Result<(), NativeFault>;

    async fn set_muted(&self, muted: bool) -> Result<(), NativeFault>;

    async fn is_playing(&self) -> Result<bool, NativeFault>;
}

/// Message sink of an embedded player.
///
/// `Ok` means the message left the host, not that the player acted on it.
pub trait EmbeddedChannel: Send + Sync {
    fn post_message(&self, message: &str) -> Result<(), DeliveryError>;
}

/// Function names understood by the embedded player's command protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmbeddedFunc {
    PlayVideo,
    PauseVideo,
    Mute,
    UnMute,
}

/// Wire envelope posted to an embedded player.
///
/// Serializes as `{"event":"command","func":"playVideo","args":[]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedCommand {
    pub event: String,
    pub func: EmbeddedFunc,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl EmbeddedCommand {
    pub fn new(func: EmbeddedFunc) -> Self {
        Self {
            event: "command".to_owned(),
            func,
            args: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, DeliveryError> {
        serde_json::to_string(self)
            .map_err(|err| DeliveryError(format!("encode failed: {err}")))
    }
}

#[derive(Clone)]
pub struct NativeHandle {
    player: Arc<dyn NativePlayer>,
}

impl NativeHandle {
    pub fn new(player: Arc<dyn NativePlayer>) -> Self {
        Self { player }
    }

    /// Run `op` against the decoder. `Status` only probes reachability.
    pub async fn perform(&self, op: ControlOp) -> Result<(), NativeFault> {
        match op {
            ControlOp::Play => self.player.play().await,
            ControlOp::Pause => self.player.pause().await,
            ControlOp::Mute => self.player.set_muted(true).await,
            ControlOp::Status => self.player.is_playing().await.map(|_| ()),
        }
    }

    pub async fn is_playing(&self) -> Result<bool, NativeFault> {
        self.player.is_playing().await
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("player", &"<native player>")
            .finish()
    }
}

/// Embedded player handle.
///
/// The player never reports back, so the handle remembers what it last
/// asserted. Clones share that memory.
#[derive(Clone)]
pub struct EmbeddedHandle {
    channel: Arc<dyn EmbeddedChannel>,
    asserted_playing: Arc<AtomicBool>,
}

impl EmbeddedHandle {
    pub fn new(channel: Arc<dyn EmbeddedChannel>) -> Self {
        Self {
            channel,
            asserted_playing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Post the command for `op`. Play and pause update the asserted state
    /// only once the channel accepts the message.
    pub fn perform(&self, op: ControlOp) -> Result<(), DeliveryError> {
        let func = match op {
            ControlOp::Play => EmbeddedFunc::PlayVideo,
            ControlOp::Pause => EmbeddedFunc::PauseVideo,
            ControlOp::Mute => EmbeddedFunc::Mute,
            ControlOp::Status => return Ok(()),
        };
        self.post(func)?;
        match op {
            ControlOp::Play => self.asserted_playing.store(true, Ordering::Release),
            ControlOp::Pause => {
                self.asserted_playing.store(false, Ordering::Release)
            }
            ControlOp::Mute | ControlOp::Status => {}
        }
        Ok(())
    }

    pub fn post(&self, func: EmbeddedFunc) -> Result<(), DeliveryError> {
        let message = EmbeddedCommand::new(func).to_json()?;
        self.channel.post_message(&message)
    }

    /// Last asserted play state. Unconfirmed by the player.
    pub fn is_playing(&self) -> bool {
        self.asserted_playing.load(Ordering::Acquire)
    }
}

impl fmt::Debug for EmbeddedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedHandle")
            .field("channel", &"<embedded channel>")
            .field("asserted_playing", &self.is_playing())
            .finish()
    }
}

/// Control handle registered for one feed item.
#[derive(Debug, Clone)]
pub enum PlaybackHandle {
    Native(NativeHandle),
    Embedded(EmbeddedHandle),
}

impl PlaybackHandle {
    pub fn native(player: Arc<dyn NativePlayer>) -> Self {
        PlaybackHandle::Native(NativeHandle::new(player))
    }

    pub fn embedded(channel: Arc<dyn EmbeddedChannel>) -> Self {
        PlaybackHandle::Embedded(EmbeddedHandle::new(channel))
    }

    pub fn media_kind(&self) -> MediaKind {
        match self {
            PlaybackHandle::Native(_) => MediaKind::NativeVideo,
            PlaybackHandle::Embedded(_) => MediaKind::EmbeddedVideo,
        }
    }
}
