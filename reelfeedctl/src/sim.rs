//! Simulated playback handles that log every call they receive.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use reelfeed_core::playback::{
    EmbeddedChannel, EmbeddedCommand, EmbeddedFunc, NativePlayer,
    PlaybackHandle,
};
use reelfeed_core::{ControlOp, DeliveryError, NativeFault};
use reelfeed_model::{ItemId, MediaKind};
use serde::Serialize;
use tokio::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct LoggedCall {
    pub at_ms: u64,
    pub item_id: ItemId,
    pub op: ControlOp,
}

/// Call log shared by every simulated handle of one replay.
#[derive(Clone)]
pub struct CallRecorder {
    started: Instant,
    calls: Arc<Mutex<Vec<LoggedCall>>>,
}

impl fmt::Debug for CallRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallRecorder")
            .field("calls", &self.calls.lock().len())
            .finish()
    }
}

impl CallRecorder {
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn record(&self, item_id: &ItemId, op: ControlOp) {
        let at_ms = self.started.elapsed().as_millis() as u64;
        self.calls.lock().push(LoggedCall {
            at_ms,
            item_id: item_id.clone(),
            op,
        });
    }

    pub fn calls(&self) -> Vec<LoggedCall> {
        self.calls.lock().clone()
    }

    /// Build a handle of the kind matching `kind`. Images get none.
    pub fn handle_for(&self, id: &ItemId, kind: MediaKind) -> Option<PlaybackHandle> {
        match kind {
            MediaKind::NativeVideo => Some(PlaybackHandle::native(Arc::new(
                SimulatedDecoder {
                    id: id.clone(),
                    recorder: self.clone(),
                    playing: AtomicBool::new(false),
                },
            ))),
            MediaKind::EmbeddedVideo => {
                Some(PlaybackHandle::embedded(Arc::new(SimulatedFrame {
                    id: id.clone(),
                    recorder: self.clone(),
                })))
            }
            MediaKind::Image => None,
        }
    }
}

struct SimulatedDecoder {
    id: ItemId,
    recorder: CallRecorder,
    playing: AtomicBool,
}

#[async_trait]
impl NativePlayer for SimulatedDecoder {
    async fn play(&self) -> Result<(), NativeFault> {
        self.playing.store(true, Ordering::SeqCst);
        self.recorder.record(&self.id, ControlOp::Play);
        Ok(())
    }

    async fn pause(&self) -> Result<(), NativeFault> {
        self.playing.store(false, Ordering::SeqCst);
        self.recorder.record(&self.id, ControlOp::Pause);
        Ok(())
    }

    async fn set_muted(&self, _muted: bool) -> Result<(), NativeFault> {
        self.recorder.record(&self.id, ControlOp::Mute);
        Ok(())
    }

    async fn is_playing(&self) -> Result<bool, NativeFault> {
        Ok(self.playing.load(Ordering::SeqCst))
    }
}

struct SimulatedFrame {
    id: ItemId,
    recorder: CallRecorder,
}

impl EmbeddedChannel for SimulatedFrame {
    fn post_message(&self, message: &str) -> Result<(), DeliveryError> {
        let command: EmbeddedCommand = serde_json::from_str(message)
            .map_err(|err| DeliveryError(err.to_string()))?;
        let op = match command.func {
            EmbeddedFunc::PlayVideo => ControlOp::Play,
            EmbeddedFunc::PauseVideo => ControlOp::Pause,
            EmbeddedFunc::Mute | EmbeddedFunc::UnMute => ControlOp::Mute,
        };
        self.recorder.record(&self.id, op);
        Ok(())
    }
}
