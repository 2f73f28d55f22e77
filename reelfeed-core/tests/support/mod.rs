//! Recording fakes and clock helpers shared by coordinator tests.
#![allow(dead_code)]

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reelfeed_core::playback::{
    EmbeddedChannel, EmbeddedCommand, EmbeddedFunc, NativePlayer,
    PlaybackHandle,
};
use reelfeed_core::{
    ControlOp, CoordinatorConfig, CoordinatorHandle, DeliveryError,
    FeedCoordinator, NativeFault,
};
use reelfeed_model::{FeedItem, ItemId, MediaKind};
use tokio::sync::Notify;

/// Default quiet window used by the tests.
pub const QUIET_MS: u64 = 150;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub item: String,
    pub op: ControlOp,
}

/// Ordered log of control calls that reached a fake, across all fakes.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl fmt::Debug for CallLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.calls.try_lock() {
            Some(guard) => f
                .debug_struct("CallLog")
                .field("calls", &guard.len())
                .finish(),
            None => f
                .debug_struct("CallLog")
                .field("calls", &"<locked>")
                .finish(),
        }
    }
}

impl CallLog {
    pub fn record(&self, item: &str, op: ControlOp) {
        self.calls.lock().push(RecordedCall {
            item: item.to_owned(),
            op,
        });
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn ops_for(&self, item: &str) -> Vec<ControlOp> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.item == item)
            .map(|call| call.op)
            .collect()
    }

    pub fn count(&self, op: ControlOp) -> usize {
        self.calls.lock().iter().filter(|call| call.op == op).count()
    }
}

/// Native decoder fake. Keeps real play/mute state and logs every call
/// that completes.
pub struct RecordingPlayer {
    id: String,
    log: CallLog,
    playing: AtomicBool,
    muted: AtomicBool,
    fail: AtomicBool,
    stall_play: AtomicBool,
    pause_delay_ms: AtomicU64,
    pub play_started: Notify,
}

impl fmt::Debug for RecordingPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingPlayer")
            .field("id", &self.id)
            .field("playing", &self.playing_now())
            .field("muted", &self.muted_now())
            .finish()
    }
}

impl RecordingPlayer {
    pub fn new(id: &str, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_owned(),
            log: log.clone(),
            playing: AtomicBool::new(false),
            muted: AtomicBool::new(false),
            fail: AtomicBool::new(false),
            stall_play: AtomicBool::new(false),
            pause_delay_ms: AtomicU64::new(0),
            play_started: Notify::new(),
        })
    }

    pub fn playing_now(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn muted_now(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    /// Every following call reports "resource not ready".
    pub fn fail_calls(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// `play` never resolves on its own.
    pub fn stall_play(&self) {
        self.stall_play.store(true, Ordering::SeqCst);
    }

    /// `pause` takes `ms` of clock time before it lands.
    pub fn slow_pause(&self, ms: u64) {
        self.pause_delay_ms.store(ms, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), NativeFault> {
        if self.fail.load(Ordering::SeqCst) {
            Err(NativeFault::not_ready())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NativePlayer for RecordingPlayer {
    async fn play(&self) -> Result<(), NativeFault> {
        self.play_started.notify_one();
        if self.stall_play.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.check()?;
        self.playing.store(true, Ordering::SeqCst);
        self.log.record(&self.id, ControlOp::Play);
        Ok(())
    }

    async fn pause(&self) -> Result<(), NativeFault> {
        let delay = self.pause_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.check()?;
        self.playing.store(false, Ordering::SeqCst);
        self.log.record(&self.id, ControlOp::Pause);
        Ok(())
    }

    async fn set_muted(&self, muted: bool) -> Result<(), NativeFault> {
        self.check()?;
        self.muted.store(muted, Ordering::SeqCst);
        self.log.record(&self.id, ControlOp::Mute);
        Ok(())
    }

    async fn is_playing(&self) -> Result<bool, NativeFault> {
        self.check()?;
        Ok(self.playing_now())
    }
}

/// Embedded player fake. Decodes every posted envelope and logs it.
pub struct RecordingChannel {
    id: String,
    log: CallLog,
    raw: Mutex<Vec<String>>,
    refuse: AtomicBool,
}

impl fmt::Debug for RecordingChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingChannel")
            .field("id", &self.id)
            .field("messages", &self.raw.lock().len())
            .finish()
    }
}

impl RecordingChannel {
    pub fn new(id: &str, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_owned(),
            log: log.clone(),
            raw: Mutex::new(Vec::new()),
            refuse: AtomicBool::new(false),
        })
    }

    pub fn messages(&self) -> Vec<String> {
        self.raw.lock().clone()
    }

    /// Every following message is rejected, as by a closed frame.
    pub fn refuse_messages(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }
}

impl EmbeddedChannel for RecordingChannel {
    fn post_message(&self, message: &str) -> Result<(), DeliveryError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(DeliveryError("frame detached".into()));
        }
        let command: EmbeddedCommand = serde_json::from_str(message)
            .map_err(|err| DeliveryError(err.to_string()))?;
        let op = match command.func {
            EmbeddedFunc::PlayVideo => ControlOp::Play,
            EmbeddedFunc::PauseVideo => ControlOp::Pause,
            EmbeddedFunc::Mute | EmbeddedFunc::UnMute => ControlOp::Mute,
        };
        self.raw.lock().push(message.to_owned());
        self.log.record(&self.id, op);
        Ok(())
    }
}

pub fn native_handle(player: &Arc<RecordingPlayer>) -> PlaybackHandle {
    PlaybackHandle::native(player.clone())
}

pub fn embedded_handle(channel: &Arc<RecordingChannel>) -> PlaybackHandle {
    PlaybackHandle::embedded(channel.clone())
}

pub fn item(id: &str, kind: MediaKind, top: f32, height: f32) -> FeedItem {
    FeedItem::new(id, kind, format!("media://{id}"), top, height)
        .expect("valid test item")
}

/// V1(0,600), V2(600,600), V3(1200,600), all native.
pub fn three_videos() -> Vec<FeedItem> {
    vec![
        item("V1", MediaKind::NativeVideo, 0.0, 600.0),
        item("V2", MediaKind::NativeVideo, 600.0, 600.0),
        item("V3", MediaKind::NativeVideo, 1200.0, 600.0),
    ]
}

pub fn id(raw: &str) -> ItemId {
    ItemId::from(raw)
}

pub fn test_config() -> CoordinatorConfig {
    CoordinatorConfig {
        debounce_window_ms: QUIET_MS,
        viewport_height: 800.0,
        ..CoordinatorConfig::default()
    }
}

pub fn spawn(config: CoordinatorConfig) -> CoordinatorHandle {
    FeedCoordinator::new(config)
        .spawn()
        .expect("valid coordinator config")
}

/// A coordinator with native players registered for V1..V3.
pub struct Rig {
    pub coordinator: CoordinatorHandle,
    pub log: CallLog,
    pub players: Vec<Arc<RecordingPlayer>>,
}

impl Rig {
    pub async fn three_videos(config: CoordinatorConfig) -> Self {
        let coordinator = spawn(config);
        let log = CallLog::default();
        let mut players = Vec::new();
        for name in ["V1", "V2", "V3"] {
            let player = RecordingPlayer::new(name, &log);
            coordinator
                .register_handle(name, native_handle(&player))
                .await
                .expect("coordinator running");
            players.push(player);
        }
        Self {
            coordinator,
            log,
            players,
        }
    }

    pub fn player(&self, name: &str) -> &Arc<RecordingPlayer> {
        let index = match name {
            "V1" => 0,
            "V2" => 1,
            "V3" => 2,
            other => panic!("no player named {other}"),
        };
        &self.players[index]
    }

    pub fn playing(&self) -> Vec<&str> {
        ["V1", "V2", "V3"]
            .into_iter()
            .filter(|name| self.player(name).playing_now())
            .collect()
    }
}

/// Let the coordinator and its transition tasks drain their queues.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Move the paused clock forward and let woken tasks run.
pub async fn advance_ms(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    settle().await;
}

/// Advance past one full quiet window.
pub async fn pass_quiet_window() {
    advance_ms(QUIET_MS + 1).await;
}
