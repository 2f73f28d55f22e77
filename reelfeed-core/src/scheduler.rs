//! Trailing-edge debounce for candidate recomputation.
//!
//! Every [`DebounceScheduler::schedule`] call pushes the deadline out to one
//! quiet window after "now", so a continuous scroll burst collapses into a
//! single evaluation once the burst stops.

use std::future;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};

#[derive(Debug)]
pub struct DebounceScheduler {
    quiet_window: Duration,
    deadline: Option<Instant>,
    /// Calls folded into the currently armed deadline.
    coalesced: u64,
}

impl DebounceScheduler {
    pub fn new(quiet_window: Duration) -> Self {
        Self {
            quiet_window: quiet_window.max(Duration::from_millis(1)),
            deadline: None,
            coalesced: 0,
        }
    }

    pub fn quiet_window(&self) -> Duration {
        self.quiet_window
    }

    /// Drop any pending deadline and re-arm one quiet window from now.
    pub fn schedule(&mut self) {
        self.deadline = Some(Instant::now() + self.quiet_window);
        self.coalesced += 1;
    }

    /// Disarm without firing. Returns whether a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.coalesced = 0;
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Resolve once the armed deadline passes, then disarm and return how many
    /// `schedule` calls were folded into this firing.
    ///
    /// Never resolves while disarmed. Cancel safe: dropping the future keeps
    /// the deadline armed.
    pub async fn wait(&mut self) -> u64 {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
                std::mem::take(&mut self.coalesced)
            }
            None => future::pending().await,
        }
    }
}
