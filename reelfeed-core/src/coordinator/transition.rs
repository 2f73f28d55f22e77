//! Transition planning and execution.
//!
//! Planning is pure: it diffs the current state against the located
//! candidate. Execution issues the planned control calls and runs inside a
//! per-transition task so the coordinator never waits on a handle.

use std::sync::Arc;

use reelfeed_model::ItemId;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::state::CoordinatorState;
use crate::playback::{
    ControlOp, ControlOutcome, PlaybackController, PlaybackService,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionPlan {
    Noop,
    Activate { to: ItemId },
    Switch { from: ItemId, to: ItemId },
    Deactivate { from: ItemId },
}

impl TransitionPlan {
    pub fn activates(&self) -> Option<&ItemId> {
        match self {
            TransitionPlan::Activate { to } | TransitionPlan::Switch { to, .. } => {
                Some(to)
            }
            TransitionPlan::Noop | TransitionPlan::Deactivate { .. } => None,
        }
    }

    pub fn deactivates(&self) -> Option<&ItemId> {
        match self {
            TransitionPlan::Switch { from, .. }
            | TransitionPlan::Deactivate { from } => Some(from),
            TransitionPlan::Noop | TransitionPlan::Activate { .. } => None,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, TransitionPlan::Noop)
    }
}

/// Diff the current state against the located candidate.
pub fn plan_transition(
    state: &CoordinatorState,
    candidate: Option<&ItemId>,
) -> TransitionPlan {
    match (state, candidate) {
        (CoordinatorState::Idle, None) => TransitionPlan::Noop,
        (CoordinatorState::Idle, Some(to)) => {
            TransitionPlan::Activate { to: to.clone() }
        }
        (CoordinatorState::Active(from), Some(to)) if from == to => {
            TransitionPlan::Noop
        }
        (CoordinatorState::Active(from), Some(to)) => TransitionPlan::Switch {
            from: from.clone(),
            to: to.clone(),
        },
        (CoordinatorState::Active(from), None) => {
            TransitionPlan::Deactivate { from: from.clone() }
        }
    }
}

/// One planned transition handed to its own task.
#[derive(Debug)]
pub struct Transition {
    pub id: Uuid,
    pub plan: TransitionPlan,
    /// Scope of the play/mute calls for the activated item.
    pub activation: CancellationToken,
    /// Scope of the pause of the outgoing item. Cancelled if that item is
    /// activated again before the pause resolves.
    pub pause_scope: CancellationToken,
    pub mute_on_activate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlCall {
    pub item_id: ItemId,
    pub op: ControlOp,
    pub outcome: ControlOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionReport {
    pub id: Uuid,
    pub plan: TransitionPlan,
    pub calls: Vec<ControlCall>,
}

/// Issue the calls of `transition`.
///
/// On a switch the pause of the outgoing item runs concurrently with the
/// play of the incoming one; neither waits for the other.
pub async fn execute(
    service: Arc<PlaybackService>,
    transition: Transition,
) -> TransitionReport {
    let Transition {
        id,
        plan,
        activation,
        pause_scope,
        mute_on_activate,
    } = transition;
    let scoped = service.scoped(activation);
    let outgoing = service.scoped(pause_scope);

    let calls = match &plan {
        TransitionPlan::Noop => Vec::new(),
        TransitionPlan::Activate { to } => {
            activate(&scoped, to, mute_on_activate).await
        }
        TransitionPlan::Switch { from, to } => {
            let (paused, mut calls) = tokio::join!(
                outgoing.pause(from),
                activate(&scoped, to, mute_on_activate)
            );
            calls.insert(0, call(from, ControlOp::Pause, paused));
            calls
        }
        TransitionPlan::Deactivate { from } => {
            vec![call(from, ControlOp::Pause, outgoing.pause(from).await)]
        }
    };

    TransitionReport { id, plan, calls }
}

async fn activate(
    controller: &dyn PlaybackController,
    id: &ItemId,
    mute: bool,
) -> Vec<ControlCall> {
    let mut calls = vec![call(id, ControlOp::Play, controller.play(id).await)];
    if mute {
        calls.push(call(id, ControlOp::Mute, controller.mute(id).await));
    }
    calls
}

fn call(id: &ItemId, op: ControlOp, outcome: ControlOutcome) -> ControlCall {
    ControlCall {
        item_id: id.clone(),
        op,
        outcome,
    }
}
