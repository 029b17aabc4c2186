// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Provider to consumer mapping for one link kind.
//!
//! A [`LinkTable`] stores every link twice:
//!
//! - **By consumer**: `(scene, slot) -> link`. A consumer has at most one
//!   provider, so recording a second link for the same consumer replaces the
//!   first.
//! - **By provider**: `provider -> [consumer]` in link creation order, so
//!   teardown of a provider can notify its consumers in a stable order.
//!
//! The table is generic over the provider side: scene slots ([`SceneLink`])
//! and renderer-owned offscreen buffers ([`BufferLink`]) share the same
//! bookkeeping.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use crate::ids::{DataSlotHandle, OffscreenBufferHandle, SceneId};

/// Key of a consumer endpoint.
pub type ConsumerKey = (SceneId, DataSlotHandle);

/// A link stored in a [`LinkTable`].
pub trait Link: Copy + fmt::Debug {
    /// Key identifying the provider endpoint.
    type Provider: Copy + Ord + fmt::Debug;

    /// The provider endpoint.
    fn provider(&self) -> Self::Provider;

    /// Scene owning the provider, or `None` for renderer-owned providers.
    fn provider_scene(&self) -> Option<SceneId>;

    /// The consumer endpoint.
    fn consumer(&self) -> ConsumerKey;
}

/// A link between two scene data slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneLink {
    /// Scene owning the provider slot.
    pub provider_scene: SceneId,
    /// The provider slot.
    pub provider_slot: DataSlotHandle,
    /// Scene owning the consumer slot.
    pub consumer_scene: SceneId,
    /// The consumer slot.
    pub consumer_slot: DataSlotHandle,
}

impl Link for SceneLink {
    type Provider = (SceneId, DataSlotHandle);

    fn provider(&self) -> Self::Provider {
        (self.provider_scene, self.provider_slot)
    }

    fn provider_scene(&self) -> Option<SceneId> {
        Some(self.provider_scene)
    }

    fn consumer(&self) -> ConsumerKey {
        (self.consumer_scene, self.consumer_slot)
    }
}

/// A link from an offscreen buffer to a texture consumer slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferLink {
    /// The providing buffer.
    pub provider_buffer: OffscreenBufferHandle,
    /// Scene owning the consumer slot.
    pub consumer_scene: SceneId,
    /// The consumer slot.
    pub consumer_slot: DataSlotHandle,
}

impl Link for BufferLink {
    type Provider = OffscreenBufferHandle;

    fn provider(&self) -> Self::Provider {
        self.provider_buffer
    }

    fn provider_scene(&self) -> Option<SceneId> {
        None
    }

    fn consumer(&self) -> ConsumerKey {
        (self.consumer_scene, self.consumer_slot)
    }
}

/// Bidirectional provider/consumer link storage.
pub struct LinkTable<L: Link> {
    by_consumer: BTreeMap<ConsumerKey, L>,
    by_provider: BTreeMap<L::Provider, Vec<ConsumerKey>>,
}

impl<L: Link> fmt::Debug for LinkTable<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkTable")
            .field("links", &self.by_consumer.len())
            .finish_non_exhaustive()
    }
}

impl<L: Link> Default for LinkTable<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Range covering every slot of `scene` in a consumer-keyed map.
fn scene_range(scene: SceneId) -> core::ops::RangeInclusive<ConsumerKey> {
    (scene, DataSlotHandle(0))..=(scene, DataSlotHandle(u32::MAX))
}

impl<L: Link> LinkTable<L> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_consumer: BTreeMap::new(),
            by_provider: BTreeMap::new(),
        }
    }

    /// Records `link`, replacing and returning any previous link of the same
    /// consumer.
    pub fn link_slots(&mut self, link: L) -> Option<L> {
        let consumer = link.consumer();
        let replaced = self.unlink_slots(consumer.0, consumer.1);
        self.by_consumer.insert(consumer, link);
        self.by_provider
            .entry(link.provider())
            .or_default()
            .push(consumer);
        replaced
    }

    /// Removes and returns the link of a consumer, if any.
    pub fn unlink_slots(&mut self, scene: SceneId, slot: DataSlotHandle) -> Option<L> {
        let link = self.by_consumer.remove(&(scene, slot))?;
        let provider = link.provider();
        if let Some(consumers) = self.by_provider.get_mut(&provider) {
            consumers.retain(|&c| c != (scene, slot));
            if consumers.is_empty() {
                self.by_provider.remove(&provider);
            }
        }
        Some(link)
    }

    /// Returns `true` if at least one consumer is linked to `provider`.
    #[must_use]
    pub fn has_linked_consumers(&self, provider: L::Provider) -> bool {
        self.by_provider.contains_key(&provider)
    }

    /// Links fed by `provider`, in creation order.
    pub fn linked_consumers(&self, provider: L::Provider) -> impl Iterator<Item = &L> + '_ {
        self.by_provider
            .get(&provider)
            .into_iter()
            .flatten()
            .filter_map(|key| self.by_consumer.get(key))
    }

    /// The link feeding a consumer, if any.
    #[must_use]
    pub fn linked_provider(&self, scene: SceneId, slot: DataSlotHandle) -> Option<&L> {
        self.by_consumer.get(&(scene, slot))
    }

    /// Links whose consumer lives in `scene`, in slot order.
    pub fn links_for_consumer_scene(&self, scene: SceneId) -> impl Iterator<Item = &L> + '_ {
        self.by_consumer.range(scene_range(scene)).map(|(_, l)| l)
    }

    /// Removes every link fed by `provider`, returned in creation order.
    pub fn remove_links_for_provider(&mut self, provider: L::Provider) -> Vec<L> {
        let consumers = self.by_provider.remove(&provider).unwrap_or_default();
        consumers
            .into_iter()
            .filter_map(|key| self.by_consumer.remove(&key))
            .collect()
    }

    /// Removes the link of a consumer, if any.
    pub fn remove_links_for_consumer(&mut self, scene: SceneId, slot: DataSlotHandle) -> Option<L> {
        self.unlink_slots(scene, slot)
    }

    /// Removes every link whose provider lives in `scene`.
    ///
    /// Returned in consumer order.
    pub fn remove_links_for_provider_scene(&mut self, scene: SceneId) -> Vec<L> {
        let doomed: Vec<ConsumerKey> = self
            .by_consumer
            .iter()
            .filter(|(_, l)| l.provider_scene() == Some(scene))
            .map(|(&k, _)| k)
            .collect();
        doomed
            .into_iter()
            .filter_map(|(s, slot)| self.unlink_slots(s, slot))
            .collect()
    }

    /// Removes every link whose consumer lives in `scene`.
    ///
    /// Returned in consumer slot order.
    pub fn remove_links_for_consumer_scene(&mut self, scene: SceneId) -> Vec<L> {
        let doomed: Vec<ConsumerKey> = self
            .by_consumer
            .range(scene_range(scene))
            .map(|(&k, _)| k)
            .collect();
        doomed
            .into_iter()
            .filter_map(|(s, slot)| self.unlink_slots(s, slot))
            .collect()
    }

    /// Removes every link touching `scene`: first those where it provides,
    /// then those where it consumes.
    pub fn remove_links_for_scene(&mut self, scene: SceneId) -> Vec<L> {
        let mut removed = self.remove_links_for_provider_scene(scene);
        removed.extend(self.remove_links_for_consumer_scene(scene));
        removed
    }

    /// Returns `true` if some consumer slot of `scene` is linked to a
    /// provider.
    #[must_use]
    pub fn has_any_links_to_provider(&self, scene: SceneId) -> bool {
        self.by_consumer.range(scene_range(scene)).next().is_some()
    }

    /// Returns `true` if some provider slot of `scene` feeds a consumer.
    #[must_use]
    pub fn has_any_links_to_consumer(&self, scene: SceneId) -> bool {
        self.by_consumer
            .values()
            .any(|l| l.provider_scene() == Some(scene))
    }

    /// Number of links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_consumer.len()
    }

    /// Returns `true` if there are no links.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_consumer.is_empty()
    }

    /// All links, in consumer order.
    pub fn iter(&self) -> impl Iterator<Item = &L> + '_ {
        self.by_consumer.values()
    }
}
