// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Texture links, from scene texture providers or offscreen buffers.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::aware::SceneMap;
use crate::config::RelinkPolicy;
use crate::error::LinkError;
use crate::ids::{
    DataSlotHandle, OffscreenBufferHandle, ResourceContentHash, SceneId, TextureSamplerHandle,
};
use crate::sampler::SamplerContent;
use crate::scene::{DataSlot, LinkKind};

use super::{
    BufferLink, DependencyChecker, LinkManager, LinkManagerBase, LinkTable, RemovedLink, SceneLink,
};

/// What a linked sampler currently reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SamplerLink {
    Texture(ResourceContentHash),
    Buffer(OffscreenBufferHandle),
}

/// Links consumer texture samplers to provider textures or offscreen
/// buffers.
///
/// A consumer has at most one link of either source. Linking a scene
/// texture replaces a buffer link on the same consumer and the other way
/// around.
#[derive(Debug)]
pub struct TextureLinkManager {
    base: LinkManagerBase,
    buffer_links: LinkTable<BufferLink>,
    sampler_links: BTreeMap<(SceneId, TextureSamplerHandle), SamplerLink>,
}

impl Default for TextureLinkManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureLinkManager {
    /// Creates a manager without links.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: LinkManagerBase::new(LinkKind::Texture),
            buffer_links: LinkTable::new(),
            sampler_links: BTreeMap::new(),
        }
    }

    /// The scene dependency graph of texture links.
    ///
    /// Buffer links do not take part in it.
    #[must_use]
    pub fn dependencies(&self) -> &DependencyChecker {
        self.base.dependencies()
    }

    /// The offscreen buffer links.
    #[must_use]
    pub fn buffer_links(&self) -> &LinkTable<BufferLink> {
        &self.buffer_links
    }

    /// Links a texture consumer slot to a texture provider slot.
    pub fn create_data_link(
        &mut self,
        scenes: &mut SceneMap,
        link: SceneLink,
        policy: RelinkPolicy,
    ) -> Result<(), LinkError> {
        let (provider, consumer) = self.base.check_link(scenes, &link, policy)?;
        if policy == RelinkPolicy::Reject
            && self
                .buffer_links
                .linked_provider(link.consumer_scene, link.consumer_slot)
                .is_some()
        {
            return Err(LinkError::ConsumerAlreadyLinked {
                scene: link.consumer_scene,
                slot: consumer.id,
            });
        }

        self.buffer_links
            .unlink_slots(link.consumer_scene, link.consumer_slot);
        self.base.record(link);
        self.apply(
            scenes,
            link.consumer_scene,
            &consumer,
            SamplerLink::Texture(provider.texture_resource),
        );
        Ok(())
    }

    /// Links a texture consumer slot to an offscreen buffer.
    ///
    /// The caller checks that the buffer exists.
    pub fn create_buffer_link(
        &mut self,
        scenes: &mut SceneMap,
        buffer: OffscreenBufferHandle,
        consumer_scene: SceneId,
        consumer_slot: DataSlotHandle,
        policy: RelinkPolicy,
    ) -> Result<(), LinkError> {
        if !buffer.is_valid() {
            return Err(LinkError::InvalidOffscreenBuffer(buffer));
        }
        let consumer = self
            .base
            .check_consumer(scenes, consumer_scene, consumer_slot)?;
        if policy == RelinkPolicy::Reject && self.is_consumer_linked(consumer_scene, consumer_slot) {
            return Err(LinkError::ConsumerAlreadyLinked {
                scene: consumer_scene,
                slot: consumer.id,
            });
        }

        self.base
            .remove_links_for_consumer(consumer_scene, consumer_slot);
        self.buffer_links.link_slots(BufferLink {
            provider_buffer: buffer,
            consumer_scene,
            consumer_slot,
        });
        self.apply(scenes, consumer_scene, &consumer, SamplerLink::Buffer(buffer));
        Ok(())
    }

    /// Pushes the texture currently offered by a provider slot to all its
    /// consumers.
    pub fn set_texture_to_consumers(
        &mut self,
        scenes: &mut SceneMap,
        provider_scene: SceneId,
        provider_slot: DataSlotHandle,
    ) {
        let Some(texture) = scenes
            .get(&provider_scene)
            .and_then(|s| s.store().data_slot(provider_slot))
            .map(|s| s.texture_resource)
        else {
            return;
        };
        let consumers: Vec<SceneLink> = self
            .base
            .table()
            .linked_consumers((provider_scene, provider_slot))
            .copied()
            .collect();
        for link in consumers {
            let consumer = scenes
                .get(&link.consumer_scene)
                .and_then(|s| s.store().data_slot(link.consumer_slot))
                .copied();
            if let Some(consumer) = consumer {
                self.apply(
                    scenes,
                    link.consumer_scene,
                    &consumer,
                    SamplerLink::Texture(texture),
                );
            }
        }
    }

    /// Removes every link fed by an offscreen buffer and reverts the
    /// consumers.
    pub fn remove_buffer_links(
        &mut self,
        scenes: &mut SceneMap,
        buffer: OffscreenBufferHandle,
    ) -> Vec<RemovedLink> {
        let removed = self.buffer_links.remove_links_for_provider(buffer);
        self.release_buffer_links(scenes, removed)
    }

    /// Returns `true` if the sampler reads a linked scene texture.
    #[must_use]
    pub fn has_linked_texture(&self, scene: SceneId, sampler: TextureSamplerHandle) -> bool {
        self.linked_texture(scene, sampler).is_some()
    }

    /// The linked scene texture a sampler reads.
    #[must_use]
    pub fn linked_texture(
        &self,
        scene: SceneId,
        sampler: TextureSamplerHandle,
    ) -> Option<ResourceContentHash> {
        match self.sampler_links.get(&(scene, sampler)) {
            Some(SamplerLink::Texture(hash)) => Some(*hash),
            _ => None,
        }
    }

    /// Returns `true` if the sampler reads a linked offscreen buffer.
    #[must_use]
    pub fn has_linked_offscreen_buffer(&self, scene: SceneId, sampler: TextureSamplerHandle) -> bool {
        self.linked_offscreen_buffer(scene, sampler).is_some()
    }

    /// The linked offscreen buffer a sampler reads.
    #[must_use]
    pub fn linked_offscreen_buffer(
        &self,
        scene: SceneId,
        sampler: TextureSamplerHandle,
    ) -> Option<OffscreenBufferHandle> {
        match self.sampler_links.get(&(scene, sampler)) {
            Some(SamplerLink::Buffer(buffer)) => Some(*buffer),
            _ => None,
        }
    }

    fn is_consumer_linked(&self, scene: SceneId, slot: DataSlotHandle) -> bool {
        self.base.table().linked_provider(scene, slot).is_some()
            || self.buffer_links.linked_provider(scene, slot).is_some()
    }

    fn apply(
        &mut self,
        scenes: &mut SceneMap,
        scene: SceneId,
        consumer: &DataSlot,
        link: SamplerLink,
    ) {
        let sampler = consumer.attached_texture_sampler;
        self.sampler_links.insert((scene, sampler), link);
        let content = match link {
            SamplerLink::Texture(hash) => SamplerContent::ClientTexture(hash),
            SamplerLink::Buffer(buffer) => SamplerContent::OffscreenBuffer(buffer),
        };
        if let Some(s) = scenes.get_mut(&scene)
            && s.store().has_texture_sampler(sampler)
        {
            s.set_sampler_content_without_updating_fallback(sampler, content);
        }
    }

    fn release_buffer_links(
        &mut self,
        scenes: &mut SceneMap,
        links: Vec<BufferLink>,
    ) -> Vec<RemovedLink> {
        links
            .into_iter()
            .map(|link| {
                self.release_consumer(scenes, link.consumer_scene, link.consumer_slot);
                RemovedLink::from(link)
            })
            .collect()
    }
}

impl LinkManager for TextureLinkManager {
    fn base(&self) -> &LinkManagerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LinkManagerBase {
        &mut self.base
    }

    fn release_consumer(&mut self, scenes: &mut SceneMap, scene: SceneId, slot: DataSlotHandle) {
        let Some(s) = scenes.get_mut(&scene) else {
            return;
        };
        if let Some(consumer) = s.store().data_slot(slot) {
            self.sampler_links
                .remove(&(scene, consumer.attached_texture_sampler));
        }
        s.restore_fallback(slot);
    }

    fn remove_data_link(
        &mut self,
        scenes: &mut SceneMap,
        scene: SceneId,
        slot: DataSlotHandle,
    ) -> Result<RemovedLink, LinkError> {
        match self.base.unlink(scenes, scene, slot) {
            Ok(link) => {
                self.release_consumer(scenes, scene, slot);
                Ok(link.into())
            }
            Err(LinkError::NoLinkForConsumer { scene: s, slot: id }) => {
                let Some(link) = self.buffer_links.unlink_slots(scene, slot) else {
                    return Err(LinkError::NoLinkForConsumer { scene: s, slot: id });
                };
                self.release_consumer(scenes, scene, slot);
                Ok(link.into())
            }
            Err(e) => Err(e),
        }
    }

    fn remove_links_for_slot(
        &mut self,
        scenes: &mut SceneMap,
        scene: SceneId,
        handle: DataSlotHandle,
        slot: &DataSlot,
    ) -> Vec<RemovedLink> {
        if slot.slot_type.is_provider() {
            let removed = self.base.remove_links_for_provider(scene, handle);
            return self.release_all(scenes, removed);
        }
        let mut removed = Vec::new();
        if let Some(link) = self.base.remove_links_for_consumer(scene, handle) {
            removed.extend(self.release_all(scenes, Vec::from([link])));
        }
        if let Some(link) = self.buffer_links.unlink_slots(scene, handle) {
            removed.extend(self.release_buffer_links(scenes, Vec::from([link])));
        }
        removed
    }

    fn remove_links_for_consumer_scene(
        &mut self,
        scenes: &mut SceneMap,
        scene: SceneId,
    ) -> Vec<RemovedLink> {
        let links = self.base.remove_links_for_consumer_scene(scene);
        let mut removed = self.release_all(scenes, links);
        let buffer_links = self.buffer_links.remove_links_for_consumer_scene(scene);
        removed.extend(self.release_buffer_links(scenes, buffer_links));
        removed
    }
}
