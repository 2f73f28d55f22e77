use std::fmt;

use reelfeed_model::ItemId;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "item_id", rename_all = "snake_case")]
pub enum CoordinatorState {
    #[default]
    Idle,
    Active(ItemId),
}

impl CoordinatorState {
    pub fn active_id(&self) -> Option<&ItemId> {
        match self {
            CoordinatorState::Idle => None,
            CoordinatorState::Active(id) => Some(id),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, CoordinatorState::Idle)
    }
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorState::Idle => write!(f, "idle"),
            CoordinatorState::Active(id) => write!(f, "active({id})"),
        }
    }
}

/// Which item the coordinator believes is playing.
///
/// Updated optimistically when a transition is planned, before any control
/// call resolves. The asserted play flag of an embedded item lives in its
/// [`EmbeddedHandle`](crate::playback::EmbeddedHandle) and only changes when
/// the channel accepts a command.
#[derive(Debug, Default)]
pub struct ActiveState {
    state: CoordinatorState,
}

impl ActiveState {
    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    pub fn active_id(&self) -> Option<&ItemId> {
        self.state.active_id()
    }

    pub fn is_active(&self, id: &ItemId) -> bool {
        self.active_id() == Some(id)
    }

    pub fn activate(&mut self, id: ItemId) {
        self.state = CoordinatorState::Active(id);
    }

    /// Return to idle, yielding the previously active item.
    pub fn deactivate(&mut self) -> Option<ItemId> {
        std::mem::take(&mut self.state).active_id().cloned()
    }
}
