use std::future::{self, Future};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reelfeed_model::ItemId;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::{
    ControlOp, ControlOutcome, HandleKey, HandleRegistry, PlaybackController,
    PlaybackHandle,
};
use crate::config::CoordinatorConfig;
use crate::error::{ControlError, NativeFault};

/// Drives registered playback handles.
///
/// The registry lock is only held to register, unregister or snapshot a
/// handle; control calls run against the snapshot without it.
#[derive(Debug)]
pub struct PlaybackService {
    registry: RwLock<HandleRegistry>,
    control_timeout: Duration,
}

impl PlaybackService {
    pub fn new(control_timeout: Duration) -> Self {
        Self {
            registry: RwLock::new(HandleRegistry::new()),
            control_timeout,
        }
    }

    pub fn from_config(config: &CoordinatorConfig) -> Self {
        Self::new(config.control_timeout())
    }

    pub fn control_timeout(&self) -> Duration {
        self.control_timeout
    }

    pub fn register(&self, id: ItemId, handle: PlaybackHandle) -> HandleKey {
        let kind = handle.media_kind();
        let key = self.registry.write().register(id.clone(), handle);
        debug!(target: "reelfeed::playback", item_id = %id, %kind, slot = key.slot(), "handle registered");
        key
    }

    /// Remove the handle for `id`. Calls in flight against it resolve as
    /// [`ControlOutcome::Cancelled`].
    pub fn unregister(&self, id: &ItemId) -> bool {
        let removed = self.registry.write().unregister(id).is_some();
        if removed {
            debug!(target: "reelfeed::playback", item_id = %id, "handle unregistered");
        }
        removed
    }

    pub fn is_registered(&self, id: &ItemId) -> bool {
        self.registry.read().contains(id)
    }

    pub fn handle_count(&self) -> usize {
        self.registry.read().len()
    }

    /// A token that fires when `id` is unregistered or when the caller
    /// cancels it. `None` if nothing is registered for `id`.
    pub fn activation_token(&self, id: &ItemId) -> Option<CancellationToken> {
        self.registry
            .read()
            .resolve(id)
            .map(|registration| registration.token.child_token())
    }

    /// A controller whose calls are abandoned once `scope` is cancelled.
    pub fn scoped(&self, scope: CancellationToken) -> ScopedController<'_> {
        ScopedController {
            service: self,
            scope,
        }
    }

    async fn control(
        &self,
        id: &ItemId,
        op: ControlOp,
        scope: Option<&CancellationToken>,
    ) -> ControlOutcome {
        let registration = self.registry.read().resolve(id);
        let Some(registration) = registration else {
            let err = ControlError::HandleUnavailable { id: id.clone() };
            debug!(target: "reelfeed::playback", %op, "{err}");
            return ControlOutcome::Unavailable;
        };

        let result = match &registration.handle {
            PlaybackHandle::Native(native) => self
                .bounded(id, op, &registration.token, scope, native.perform(op))
                .await
                .map(|()| ControlOutcome::Applied),
            PlaybackHandle::Embedded(embedded) => {
                if is_cancelled(&registration.token, scope) {
                    Err(ControlError::Cancelled { id: id.clone(), op })
                } else {
                    embedded
                        .perform(op)
                        .map(|()| ControlOutcome::Asserted)
                        .map_err(|err| ControlError::AsyncControlFailure {
                            id: id.clone(),
                            op,
                            reason: err.to_string(),
                        })
                }
            }
        };

        match result {
            Ok(outcome) => {
                trace!(target: "reelfeed::playback", item_id = %id, %op, ?outcome, "control resolved");
                outcome
            }
            Err(err @ ControlError::Cancelled { .. }) => {
                debug!(target: "reelfeed::playback", "{err}");
                ControlOutcome::Cancelled
            }
            Err(err @ ControlError::HandleUnavailable { .. }) => {
                debug!(target: "reelfeed::playback", "{err}");
                ControlOutcome::Unavailable
            }
            Err(err) => {
                warn!(target: "reelfeed::playback", error = %err, "playback control failed");
                ControlOutcome::Failed
            }
        }
    }

    async fn status(&self, id: &ItemId) -> bool {
        let registration = self.registry.read().resolve(id);
        let Some(registration) = registration else {
            return false;
        };
        match &registration.handle {
            PlaybackHandle::Native(native) => match self
                .bounded(
                    id,
                    ControlOp::Status,
                    &registration.token,
                    None,
                    native.is_playing(),
                )
                .await
            {
                Ok(playing) => playing,
                Err(err) => {
                    debug!(target: "reelfeed::playback", error = %err, "status probe failed");
                    false
                }
            },
            PlaybackHandle::Embedded(embedded) => embedded.is_playing(),
        }
    }

    /// Race a native call against its registration, the optional scope and
    /// the control timeout.
    async fn bounded<T>(
        &self,
        id: &ItemId,
        op: ControlOp,
        registration: &CancellationToken,
        scope: Option<&CancellationToken>,
        call: impl Future<Output = Result<T, NativeFault>>,
    ) -> Result<T, ControlError> {
        if is_cancelled(registration, scope) {
            return Err(ControlError::Cancelled { id: id.clone(), op });
        }
        tokio::select! {
            biased;
            _ = registration.cancelled() => {
                Err(ControlError::Cancelled { id: id.clone(), op })
            }
            _ = scope_cancelled(scope) => {
                Err(ControlError::Cancelled { id: id.clone(), op })
            }
            result = timeout(self.control_timeout, call) => match result {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(fault)) => Err(ControlError::AsyncControlFailure {
                    id: id.clone(),
                    op,
                    reason: fault.to_string(),
                }),
                Err(_) => Err(ControlError::AsyncControlFailure {
                    id: id.clone(),
                    op,
                    reason: format!(
                        "no answer within {}ms",
                        self.control_timeout.as_millis()
                    ),
                }),
            },
        }
    }
}

fn is_cancelled(
    registration: &CancellationToken,
    scope: Option<&CancellationToken>,
) -> bool {
    registration.is_cancelled()
        || scope.is_some_and(CancellationToken::is_cancelled)
}

async fn scope_cancelled(scope: Option<&CancellationToken>) {
    match scope {
        Some(token) => token.cancelled().await,
        None => future::pending().await,
    }
}

#[async_trait]
impl PlaybackController for PlaybackService {
    async fn play(&self, id: &ItemId) -> ControlOutcome {
        self.control(id, ControlOp::Play, None).await
    }

    async fn pause(&self, id: &ItemId) -> ControlOutcome {
        self.control(id, ControlOp::Pause, None).await
    }

    async fn mute(&self, id: &ItemId) -> ControlOutcome {
        self.control(id, ControlOp::Mute, None).await
    }

    async fn is_playing(&self, id: &ItemId) -> bool {
        self.status(id).await
    }
}

/// [`PlaybackService`] view bound to one activation.
#[derive(Debug)]
pub struct ScopedController<'a> {
    service: &'a PlaybackService,
    scope: CancellationToken,
}

#[async_trait]
impl PlaybackController for ScopedController<'_> {
    async fn play(&self, id: &ItemId) -> ControlOutcome {
        self.service.control(id, ControlOp::Play, Some(&self.scope)).await
    }

    async fn pause(&self, id: &ItemId) -> ControlOutcome {
        self.service
            .control(id, ControlOp::Pause, Some(&self.scope))
            .await
    }

    async fn mute(&self, id: &ItemId) -> ControlOutcome {
        self.service.control(id, ControlOp::Mute, Some(&self.scope)).await
    }

    async fn is_playing(&self, id: &ItemId) -> bool {
        self.service.status(id).await
    }
}
