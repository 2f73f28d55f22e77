use reelfeed_model::{ItemId, ModelError};
use thiserror::Error;

use crate::config::ConfigGuardRailError;
use crate::playback::ControlOp;

/// Failure of a single control call against a playback handle.
///
/// These never escape the playback layer as errors: they are logged and
/// folded into a [`ControlOutcome`](crate::playback::ControlOutcome).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("no playback handle registered for {id}")]
    HandleUnavailable { id: ItemId },

    #[error("{op} on {id} failed: {reason}")]
    AsyncControlFailure {
        id: ItemId,
        op: ControlOp,
        reason: String,
    },

    #[error("{op} on {id} cancelled before it resolved")]
    Cancelled { id: ItemId, op: ControlOp },
}

/// Rejection reported by a native decoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct NativeFault(pub String);

impl NativeFault {
    pub fn new(reason: impl Into<String>) -> Self {
        NativeFault(reason.into())
    }

    pub fn not_ready() -> Self {
        NativeFault("resource not ready".to_owned())
    }
}

/// The embedded player's message channel refused a command locally.
///
/// Acceptance by the channel says nothing about delivery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("embedded channel rejected message: {0}")]
pub struct DeliveryError(pub String);

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("coordinator is shut down")]
    Closed,

    #[error("invalid feed item: {0}")]
    Model(#[from] ModelError),

    #[error("invalid coordinator config: {0}")]
    Config(#[from] ConfigGuardRailError),
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;
