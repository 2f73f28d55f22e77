use std::collections::HashMap;
use std::sync::Arc;

use reelfeed_model::{FeedItem, ItemId};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::messages::{CoordinatorCommand, CoordinatorSnapshot, TransitionStats};
use super::state::ActiveState;
use super::transition::{
    self, Transition, TransitionPlan, TransitionReport, plan_transition,
};
use crate::config::CoordinatorConfig;
use crate::locator::locate_candidate;
use crate::playback::{PlaybackController, PlaybackService};
use crate::scheduler::DebounceScheduler;
use crate::viewport::ViewportTracker;

/// Owns every piece of mutable coordinator state. Commands and debounced
/// evaluations are handled one at a time; control calls run in
/// `transitions`.
pub(crate) struct CoordinatorActor {
    config: CoordinatorConfig,
    service: Arc<PlaybackService>,
    rx: mpsc::Receiver<CoordinatorCommand>,
    feed: Vec<FeedItem>,
    viewport: ViewportTracker,
    scheduler: DebounceScheduler,
    active: ActiveState,
    /// Scope of the current activation's play/mute calls.
    activation: Option<CancellationToken>,
    /// Outgoing pauses still in flight, by item.
    pausing: HashMap<ItemId, PendingPause>,
    transitions: JoinSet<TransitionReport>,
    stats: TransitionStats,
    locator_runs: u64,
    autoplayed: bool,
}

#[derive(Debug)]
struct PendingPause {
    transition_id: Uuid,
    scope: CancellationToken,
}

impl CoordinatorActor {
    pub(crate) fn new(
        config: CoordinatorConfig,
        service: Arc<PlaybackService>,
        rx: mpsc::Receiver<CoordinatorCommand>,
    ) -> Self {
        Self {
            viewport: ViewportTracker::new(config.viewport_height),
            scheduler: DebounceScheduler::new(config.debounce_window()),
            config,
            service,
            rx,
            feed: Vec::new(),
            active: ActiveState::default(),
            activation: None,
            pausing: HashMap::new(),
            transitions: JoinSet::new(),
            stats: TransitionStats::default(),
            locator_runs: 0,
            autoplayed: false,
        }
    }

    pub(crate) async fn run(mut self) {
        debug!(
            target: "reelfeed::coordinator",
            debounce_ms = self.config.debounce_window_ms,
            viewport_height = self.viewport.height(),
            "coordinator started"
        );
        loop {
            tokio::select! {
                biased;
                Some(joined) = self.transitions.join_next(), if !self.transitions.is_empty() => {
                    self.on_transition_finished(joined);
                }
                folded = self.scheduler.wait(), if self.scheduler.is_pending() => {
                    trace!(target: "reelfeed::coordinator", folded, "debounce window elapsed");
                    self.evaluate();
                }
                command = self.rx.recv() => match command {
                    Some(CoordinatorCommand::Shutdown { reply }) => {
                        let snapshot = self.teardown().await;
                        let _ = reply.send(snapshot);
                        break;
                    }
                    Some(command) => self.handle(command),
                    None => {
                        self.teardown().await;
                        break;
                    }
                },
            }
        }
    }

    fn handle(&mut self, command: CoordinatorCommand) {
        match command {
            CoordinatorCommand::Scroll { offset } => {
                self.viewport.on_scroll(offset, &mut self.scheduler);
            }
            CoordinatorCommand::Resize { height } => {
                self.viewport.resize(height, &mut self.scheduler);
            }
            CoordinatorCommand::SetFeed { items } => self.set_feed(items),
            CoordinatorCommand::HandleRegistered { id } => {
                self.on_registered(id)
            }
            CoordinatorCommand::HandleUnregistered { id } => {
                self.on_unregistered(id)
            }
            CoordinatorCommand::EvaluateNow => {
                self.scheduler.cancel();
                self.evaluate();
            }
            CoordinatorCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            // Handled by the run loop.
            CoordinatorCommand::Shutdown { .. } => {}
        }
    }

    fn set_feed(&mut self, items: Vec<FeedItem>) {
        self.feed = items;
        info!(
            target: "reelfeed::coordinator",
            items = self.feed.len(),
            videos = self.feed.iter().filter(|item| item.is_video()).count(),
            "feed replaced"
        );

        if let Some(active) = self.active.active_id().cloned()
            && !self.feed.iter().any(|item| item.id == active)
        {
            if self.service.is_registered(&active) {
                self.apply(TransitionPlan::Deactivate { from: active });
            } else {
                self.cancel_activation();
                self.active.deactivate();
            }
        }

        if self.config.autoplay_first
            && !self.autoplayed
            && let Some(first) = self.feed.iter().find(|item| item.is_video())
        {
            self.autoplayed = true;
            let first = first.id.clone();
            if self.active.state().is_idle() {
                debug!(target: "reelfeed::coordinator", item_id = %first, "autoplaying first video");
                self.apply(TransitionPlan::Activate { to: first });
            }
        }

        self.scheduler.schedule();
    }

    fn on_registered(&mut self, id: ItemId) {
        if self.active.is_active(&id) {
            // Late mount of the item we already consider active.
            debug!(target: "reelfeed::coordinator", item_id = %id, "replaying activation");
            self.stats.replays += 1;
            self.cancel_activation();
            self.spawn(TransitionPlan::Activate { to: id });
        }
        self.scheduler.schedule();
    }

    fn on_unregistered(&mut self, id: ItemId) {
        // The registration token already cancelled any pause in flight.
        self.pausing.remove(&id);
        if self.active.is_active(&id) {
            debug!(target: "reelfeed::coordinator", item_id = %id, "active handle unmounted");
            self.cancel_activation();
            self.active.deactivate();
            self.scheduler.schedule();
        }
    }

    fn evaluate(&mut self) {
        self.locator_runs += 1;
        let window = self.viewport.window();
        let service = &self.service;
        let candidate = locate_candidate(
            self.feed
                .iter()
                .filter(|item| service.is_registered(&item.id)),
            &window,
        );
        trace!(
            target: "reelfeed::coordinator",
            run = self.locator_runs,
            top = window.top,
            candidate = ?candidate.as_ref().map(|c| c.id.as_str()),
            "candidate located"
        );
        let plan = plan_transition(
            self.active.state(),
            candidate.as_ref().map(|candidate| &candidate.id),
        );
        self.apply(plan);
    }

    /// Record and launch a planned transition. The active state is written
    /// before any call resolves.
    fn apply(&mut self, plan: TransitionPlan) {
        self.stats.record(&plan);
        if plan.is_noop() {
            return;
        }

        if plan.deactivates().is_some() {
            self.cancel_activation();
            self.active.deactivate();
        }
        if let Some(to) = plan.activates() {
            self.active.activate(to.clone());
        }
        self.spawn(plan);
    }

    fn spawn(&mut self, plan: TransitionPlan) {
        let id = Uuid::now_v7();
        let activation = match plan.activates() {
            Some(to) => {
                // A pause still in flight must not land after this play.
                self.cancel_pause(to);
                let token = self
                    .service
                    .activation_token(to)
                    .unwrap_or_else(CancellationToken::new);
                self.activation = Some(token.clone());
                token
            }
            None => CancellationToken::new(),
        };
        let pause_scope = CancellationToken::new();
        if let Some(from) = plan.deactivates() {
            let pending = PendingPause {
                transition_id: id,
                scope: pause_scope.clone(),
            };
            if let Some(previous) = self.pausing.insert(from.clone(), pending) {
                previous.scope.cancel();
            }
        }
        let transition = Transition {
            id,
            plan,
            activation,
            pause_scope,
            mute_on_activate: self.config.mute_on_activate,
        };
        debug!(
            target: "reelfeed::coordinator",
            transition_id = %transition.id,
            plan = ?transition.plan,
            "transition started"
        );
        self.transitions
            .spawn(transition::execute(Arc::clone(&self.service), transition));
    }

    fn cancel_activation(&mut self) {
        if let Some(token) = self.activation.take() {
            token.cancel();
        }
    }

    fn cancel_pause(&mut self, id: &ItemId) {
        if let Some(pending) = self.pausing.remove(id) {
            pending.scope.cancel();
            debug!(
                target: "reelfeed::coordinator",
                item_id = %id,
                transition_id = %pending.transition_id,
                "pending pause cancelled by reactivation"
            );
        }
    }

    fn on_transition_finished(
        &mut self,
        joined: Result<TransitionReport, JoinError>,
    ) {
        match joined {
            Ok(report) => {
                self.stats.completed += 1;
                if let Some(from) = report.plan.deactivates()
                    && self
                        .pausing
                        .get(from)
                        .is_some_and(|pending| pending.transition_id == report.id)
                {
                    self.pausing.remove(from);
                }
                let failed = report
                    .calls
                    .iter()
                    .filter(|call| !call.outcome.is_effective())
                    .count();
                debug!(
                    target: "reelfeed::coordinator",
                    transition_id = %report.id,
                    calls = report.calls.len(),
                    ineffective = failed,
                    "transition finished"
                );
            }
            Err(err) => {
                self.stats.aborted += 1;
                if err.is_panic() {
                    warn!(target: "reelfeed::coordinator", error = %err, "transition task panicked");
                }
            }
        }
    }

    fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            state: self.active.state().clone(),
            viewport: self.viewport.window(),
            feed_len: self.feed.len(),
            scroll_events: self.viewport.scroll_events(),
            locator_runs: self.locator_runs,
            debounce_pending: self.scheduler.is_pending(),
            transitions: self.stats,
            in_flight: self.transitions.len(),
            pending_pauses: self.pausing.len(),
            registered_handles: self.service.handle_count(),
        }
    }

    /// Feed view teardown: no evaluation may run afterwards, in-flight
    /// transitions are abandoned and the active item is paused best-effort.
    async fn teardown(&mut self) -> CoordinatorSnapshot {
        self.scheduler.cancel();
        self.cancel_activation();
        self.transitions.abort_all();
        while let Some(joined) = self.transitions.join_next().await {
            self.on_transition_finished(joined);
        }
        self.pausing.clear();

        if let Some(active) = self.active.deactivate() {
            let outcome = self.service.pause(&active).await;
            debug!(target: "reelfeed::coordinator", item_id = %active, ?outcome, "paused on shutdown");
        }
        self.rx.close();
        info!(
            target: "reelfeed::coordinator",
            locator_runs = self.locator_runs,
            transitions = self.stats.effective(),
            "coordinator stopped"
        );
        self.snapshot()
    }
}
