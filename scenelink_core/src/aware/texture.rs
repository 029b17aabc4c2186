// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Texture link behavior: fallback samplers and provider texture changes.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::ids::{DataSlotHandle, TextureSamplerHandle};
use crate::sampler::{SamplerContent, TextureSampler};
use crate::scene::{DataSlot, DataSlotType, SceneStore};

use super::{LinkStrategy, LocalMutation, PendingPropagation};

/// Keeps the complete locally authored sampler of every texture consumer
/// slot.
///
/// The whole sampler is kept, not only its content, because a linked
/// sampler reads a different kind of content than its local one.
#[derive(Clone, Debug, Default)]
pub struct TextureLinkStrategy {
    fallbacks: BTreeMap<DataSlotHandle, TextureSampler>,
    consumer_slots: BTreeMap<TextureSamplerHandle, DataSlotHandle>,
    linked: BTreeMap<TextureSamplerHandle, SamplerContent>,
}

impl TextureLinkStrategy {
    /// The fallback sampler of a consumer slot.
    #[must_use]
    pub fn fallback_sampler(&self, slot: DataSlotHandle) -> Option<TextureSampler> {
        self.fallbacks.get(&slot).copied()
    }

    /// The linked content a sampler currently shows, if any.
    #[must_use]
    pub fn linked_content(&self, sampler: TextureSamplerHandle) -> Option<SamplerContent> {
        self.linked.get(&sampler).copied()
    }

    pub(crate) fn mark_linked(&mut self, sampler: TextureSamplerHandle, content: SamplerContent) {
        self.linked.insert(sampler, content);
    }
}

impl LinkStrategy for TextureLinkStrategy {
    fn on_slot_allocated(&mut self, store: &SceneStore, handle: DataSlotHandle, slot: &DataSlot) {
        if slot.slot_type != DataSlotType::TextureConsumer {
            return;
        }
        let sampler = slot.attached_texture_sampler;
        if store.has_texture_sampler(sampler) {
            self.fallbacks.insert(handle, store.texture_sampler(sampler));
        }
        self.consumer_slots.insert(sampler, handle);
    }

    fn on_slot_released(&mut self, handle: DataSlotHandle, slot: &DataSlot) {
        if slot.slot_type != DataSlotType::TextureConsumer {
            return;
        }
        self.fallbacks.remove(&handle);
        let sampler = slot.attached_texture_sampler;
        if self.consumer_slots.get(&sampler) == Some(&handle) {
            self.consumer_slots.remove(&sampler);
        }
    }

    fn on_local_mutation(
        &mut self,
        store: &mut SceneStore,
        mutation: &mut LocalMutation,
        pending: &mut Vec<PendingPropagation>,
    ) {
        match mutation {
            LocalMutation::TextureSampler(handle, sampler) => {
                let handle = *handle;
                if let Some(&slot) = self.consumer_slots.get(&handle) {
                    self.fallbacks.insert(slot, *sampler);
                }
                if let Some(&content) = self.linked.get(&handle) {
                    sampler.content = content;
                }
            }
            LocalMutation::SlotTexture(handle, _) => {
                let handle = *handle;
                let is_provider = store
                    .data_slot(handle)
                    .is_some_and(|s| s.slot_type == DataSlotType::TextureProvider);
                if is_provider {
                    pending.push(PendingPropagation::TextureChanged(handle));
                }
            }
            _ => {}
        }
    }

    fn on_link_removed(
        &mut self,
        store: &mut SceneStore,
        handle: DataSlotHandle,
        slot: &DataSlot,
        _pending: &mut Vec<PendingPropagation>,
    ) {
        let sampler = slot.attached_texture_sampler;
        if self.linked.remove(&sampler).is_none() {
            return;
        }
        if let Some(&fallback) = self.fallbacks.get(&handle)
            && store.has_texture_sampler(sampler)
        {
            store.set_texture_sampler(sampler, fallback);
        }
    }
}
