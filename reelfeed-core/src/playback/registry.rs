//! Registry of playback handles keyed by item id.
//!
//! Handles live in a generational arena. Unregistering bumps the slot
//! generation, so a stale [`HandleKey`] held by an in-flight call can never
//! resolve to a handle registered later in the same slot. Each registration
//! also owns a cancellation token that fires when it is removed or replaced.

use std::collections::HashMap;

use reelfeed_model::ItemId;
use tokio_util::sync::CancellationToken;

use super::PlaybackHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleKey {
    slot: u32,
    generation: u32,
}

impl HandleKey {
    pub fn slot(self) -> u32 {
        self.slot
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Owned snapshot of a registration, safe to hold across awaits.
#[derive(Debug, Clone)]
pub struct Registration {
    pub key: HandleKey,
    pub id: ItemId,
    pub handle: PlaybackHandle,
    /// Fires when this registration is removed or replaced.
    pub token: CancellationToken,
}

#[derive(Debug)]
struct Entry {
    id: ItemId,
    handle: PlaybackHandle,
    token: CancellationToken,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Debug, Default)]
pub struct HandleRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    index: HashMap<ItemId, HandleKey>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` for `id`, replacing (and cancelling) any previous
    /// registration of the same id.
    pub fn register(&mut self, id: ItemId, handle: PlaybackHandle) -> HandleKey {
        self.unregister(&id);

        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let entry = &mut self.slots[slot as usize];
        entry.entry = Some(Entry {
            id: id.clone(),
            handle,
            token: CancellationToken::new(),
        });
        let key = HandleKey {
            slot,
            generation: entry.generation,
        };
        self.index.insert(id, key);
        key
    }

    /// Remove the registration for `id`, cancelling calls still bound to it.
    pub fn unregister(&mut self, id: &ItemId) -> Option<HandleKey> {
        let key = self.index.remove(id)?;
        let slot = &mut self.slots[key.slot as usize];
        if let Some(entry) = slot.entry.take() {
            entry.token.cancel();
        }
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.slot);
        Some(key)
    }

    pub fn resolve(&self, id: &ItemId) -> Option<Registration> {
        let key = *self.index.get(id)?;
        self.entry(key).map(|entry| Registration {
            key,
            id: entry.id.clone(),
            handle: entry.handle.clone(),
            token: entry.token.clone(),
        })
    }

    /// Look up by key. Keys from removed registrations resolve to `None`.
    pub fn get(&self, key: HandleKey) -> Option<&PlaybackHandle> {
        self.entry(key).map(|entry| &entry.handle)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn entry(&self, key: HandleKey) -> Option<&Entry> {
        let slot = self.slots.get(key.slot as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.entry.as_ref()
    }
}
