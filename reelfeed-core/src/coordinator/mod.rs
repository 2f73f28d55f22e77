//! Transition coordinator.
//!
//! A single actor task owns the viewport, the debounce timer, the feed and
//! the active state. Scroll events only move the viewport and re-arm the
//! timer; once the feed settles the actor locates the best candidate, diffs
//! it against the active item and hands the resulting calls to a transition
//! task. At most one item is active at any time.

mod actor;
pub mod handle;
pub mod messages;
pub mod state;
pub mod transition;

pub use handle::{CoordinatorHandle, FeedCoordinator};
pub use messages::{CoordinatorSnapshot, TransitionStats};
pub use state::{ActiveState, CoordinatorState};
pub use transition::{
    ControlCall, Transition, TransitionPlan, TransitionReport, plan_transition,
};
