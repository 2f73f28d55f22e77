use std::sync::Arc;

use reelfeed_model::{FeedEntry, FeedItem, ItemId};
use tokio::sync::{mpsc, oneshot};

use super::actor::CoordinatorActor;
use super::messages::{CoordinatorCommand, CoordinatorSnapshot};
use crate::config::CoordinatorConfig;
use crate::error::{CoordinatorError, Result};
use crate::layout::FixedHeightLayout;
use crate::playback::{
    HandleKey, PlaybackController, PlaybackHandle, PlaybackService,
};

/// Builds and spawns a coordinator actor for one feed view.
#[derive(Debug)]
pub struct FeedCoordinator {
    config: CoordinatorConfig,
}

impl FeedCoordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self { config }
    }

    /// Validate the configuration and start the actor on the current tokio
    /// runtime.
    pub fn spawn(self) -> Result<CoordinatorHandle> {
        self.config.validate()?;
        let service = Arc::new(PlaybackService::from_config(&self.config));
        let layout = FixedHeightLayout::new(self.config.layout.clone());
        let (tx, rx) = mpsc::channel(self.config.mailbox_capacity);

        let actor = CoordinatorActor::new(self.config, Arc::clone(&service), rx);
        tokio::spawn(actor.run());

        Ok(CoordinatorHandle {
            tx,
            service,
            layout,
        })
    }
}

/// Cloneable front of a running coordinator.
///
/// Handle registration takes effect in the registry before the call returns;
/// everything else is processed by the actor in submission order.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<CoordinatorCommand>,
    service: Arc<PlaybackService>,
    layout: FixedHeightLayout,
}

impl CoordinatorHandle {
    pub async fn on_scroll(&self, offset: f32) -> Result<()> {
        self.send(CoordinatorCommand::Scroll { offset }).await
    }

    pub async fn resize_viewport(&self, height: f32) -> Result<()> {
        self.send(CoordinatorCommand::Resize { height }).await
    }

    /// Replace the feed with already positioned items.
    pub async fn set_feed(&self, items: Vec<FeedItem>) -> Result<()> {
        for item in &items {
            item.validate()?;
        }
        self.send(CoordinatorCommand::SetFeed { items }).await
    }

    /// Replace the feed, estimating positions with the fixed-height layout.
    pub async fn set_feed_entries(
        &self,
        entries: Vec<FeedEntry>,
    ) -> Result<Vec<FeedItem>> {
        let items = self.layout.place(entries)?;
        self.send(CoordinatorCommand::SetFeed {
            items: items.clone(),
        })
        .await?;
        Ok(items)
    }

    pub async fn register_handle(
        &self,
        id: impl Into<ItemId>,
        handle: PlaybackHandle,
    ) -> Result<HandleKey> {
        if self.tx.is_closed() {
            return Err(CoordinatorError::Closed);
        }
        let id = id.into();
        let key = self.service.register(id.clone(), handle);
        self.send(CoordinatorCommand::HandleRegistered { id }).await?;
        Ok(key)
    }

    /// Remove the handle for `id`. Safe at any time, including after
    /// shutdown; returns whether a handle was registered.
    pub async fn unregister_handle(&self, id: &ItemId) -> bool {
        let removed = self.service.unregister(id);
        if removed {
            let _ = self
                .send(CoordinatorCommand::HandleUnregistered { id: id.clone() })
                .await;
        }
        removed
    }

    /// Skip the remaining quiet window and evaluate immediately.
    pub async fn evaluate_now(&self) -> Result<()> {
        self.send(CoordinatorCommand::EvaluateNow).await
    }

    pub async fn snapshot(&self) -> Result<CoordinatorSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(CoordinatorCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| CoordinatorError::Closed)
    }

    pub async fn is_playing(&self, id: &ItemId) -> bool {
        self.service.is_playing(id).await
    }

    pub fn layout(&self) -> &FixedHeightLayout {
        &self.layout
    }

    /// Tear down the feed view and wait for the actor to stop. Returns the
    /// final snapshot.
    pub async fn shutdown(&self) -> Result<CoordinatorSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(CoordinatorCommand::Shutdown { reply }).await?;
        rx.await.map_err(|_| CoordinatorError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send(&self, command: CoordinatorCommand) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| CoordinatorError::Closed)
    }
}
