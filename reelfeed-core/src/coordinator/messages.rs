use reelfeed_model::{FeedItem, ItemId, ViewportWindow};
use serde::Serialize;
use tokio::sync::oneshot;

use super::state::CoordinatorState;
use super::transition::TransitionPlan;

/// Mailbox commands consumed by the coordinator actor.
#[derive(Debug)]
pub(crate) enum CoordinatorCommand {
    Scroll { offset: f32 },
    Resize { height: f32 },
    SetFeed { items: Vec<FeedItem> },
    /// The handle is already in the registry.
    HandleRegistered { id: ItemId },
    /// The handle is already gone from the registry.
    HandleUnregistered { id: ItemId },
    /// Run the locator now instead of waiting for the quiet window.
    EvaluateNow,
    Snapshot {
        reply: oneshot::Sender<CoordinatorSnapshot>,
    },
    Shutdown {
        reply: oneshot::Sender<CoordinatorSnapshot>,
    },
}

/// Transition counters, by plan kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransitionStats {
    pub activations: u64,
    pub switches: u64,
    pub deactivations: u64,
    pub noops: u64,
    /// Play/mute replays after a late mount of the active item.
    pub replays: u64,
    /// Transition tasks that ran to completion.
    pub completed: u64,
    /// Transition tasks aborted or panicked.
    pub aborted: u64,
}

impl TransitionStats {
    pub(crate) fn record(&mut self, plan: &TransitionPlan) {
        match plan {
            TransitionPlan::Noop => self.noops += 1,
            TransitionPlan::Activate { .. } => self.activations += 1,
            TransitionPlan::Switch { .. } => self.switches += 1,
            TransitionPlan::Deactivate { .. } => self.deactivations += 1,
        }
    }

    /// Transitions that issued control calls.
    pub fn effective(&self) -> u64 {
        self.activations + self.switches + self.deactivations
    }
}

/// Point-in-time view of the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatorSnapshot {
    pub state: CoordinatorState,
    pub viewport: ViewportWindow,
    pub feed_len: usize,
    pub scroll_events: u64,
    pub locator_runs: u64,
    pub debounce_pending: bool,
    pub transitions: TransitionStats,
    pub in_flight: usize,
    /// Outgoing pauses that have not resolved yet.
    pub pending_pauses: usize,
    pub registered_handles: usize,
}

impl CoordinatorSnapshot {
    pub fn active_id(&self) -> Option<&ItemId> {
        self.state.active_id()
    }
}
