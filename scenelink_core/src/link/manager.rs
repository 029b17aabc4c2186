// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The link facade routing requests to the concrete managers.

use alloc::vec::Vec;

use crate::aware::{PendingPropagation, SceneMap, update_matrix_cache_with_links};
use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::event::{RendererEvent, RendererEventCollector, RendererEventType};
use crate::ids::{DataSlotHandle, DataSlotId, NodeHandle, OffscreenBufferHandle, SceneId};
use crate::scene::{LinkKind, MatrixType};
use crate::transform::Transform3d;

use super::{
    DataReferenceLinkManager, LinkManager, RemovedLink, SceneLink, TextureLinkManager,
    TransformationLinkManager,
};

/// Single entry point for cross-scene linking.
///
/// Requests address slots by their application [`DataSlotId`]. The consumer
/// slot's type selects the transformation, data reference, or texture
/// manager. Every request reports its outcome as an event in the
/// [`RendererEventCollector`] and as a `Result`.
#[derive(Debug, Default)]
pub struct SceneLinksManager {
    transformation: TransformationLinkManager,
    data_reference: DataReferenceLinkManager,
    texture: TextureLinkManager,
    config: LinkConfig,
}

/// Looks up a slot by id in the requested direction.
///
/// A slot that exists only in the other direction is reported as
/// [`LinkError::WrongSlotDirection`].
fn find_slot(
    scenes: &SceneMap,
    scene: SceneId,
    id: DataSlotId,
    provider: bool,
) -> Result<DataSlotHandle, LinkError> {
    let store = scenes
        .get(&scene)
        .ok_or(LinkError::InvalidSceneId(scene))?
        .store();
    let invalid = LinkError::InvalidSlotId { scene, slot: id };
    if !id.is_valid() {
        return Err(invalid);
    }
    if let Some(handle) = store.find_data_slot(id, |s| s.slot_type.is_provider() == provider) {
        return Ok(handle);
    }
    match store.data_slots().find(|(_, s)| s.id == id) {
        Some((_, slot)) => Err(LinkError::WrongSlotDirection {
            scene,
            slot: id,
            found: slot.slot_type,
        }),
        None => Err(invalid),
    }
}

impl SceneLinksManager {
    /// Creates a facade with the given configuration.
    #[must_use]
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> LinkConfig {
        self.config
    }

    /// The transformation link manager.
    #[must_use]
    pub fn transformation_links(&self) -> &TransformationLinkManager {
        &self.transformation
    }

    /// The data reference link manager.
    #[must_use]
    pub fn data_reference_links(&self) -> &DataReferenceLinkManager {
        &self.data_reference
    }

    /// The texture link manager.
    #[must_use]
    pub fn texture_links(&self) -> &TextureLinkManager {
        &self.texture
    }

    /// Links consumer slot `consumer_id` of `consumer_scene` to provider slot
    /// `provider_id` of `provider_scene`.
    ///
    /// Reports `SceneDataLinked` or `SceneDataLinkFailed`.
    pub fn create_data_link(
        &mut self,
        scenes: &mut SceneMap,
        events: &mut RendererEventCollector,
        provider_scene: SceneId,
        provider_id: DataSlotId,
        consumer_scene: SceneId,
        consumer_id: DataSlotId,
    ) -> Result<(), LinkError> {
        let result =
            self.try_create_data_link(scenes, provider_scene, provider_id, consumer_scene, consumer_id);
        let event_type = match &result {
            Ok(()) => RendererEventType::SceneDataLinked,
            Err(e) => {
                log::warn!(
                    "failed to link provider {provider_scene}:{provider_id} to consumer {consumer_scene}:{consumer_id}: {e}"
                );
                RendererEventType::SceneDataLinkFailed
            }
        };
        events.add_data_link_event(event_type, provider_scene, provider_id, consumer_scene, consumer_id);
        result
    }

    fn try_create_data_link(
        &mut self,
        scenes: &mut SceneMap,
        provider_scene: SceneId,
        provider_id: DataSlotId,
        consumer_scene: SceneId,
        consumer_id: DataSlotId,
    ) -> Result<(), LinkError> {
        if !scenes.contains_key(&provider_scene) {
            return Err(LinkError::InvalidSceneId(provider_scene));
        }
        let consumer_slot = find_slot(scenes, consumer_scene, consumer_id, false)?;
        let provider_slot = find_slot(scenes, provider_scene, provider_id, true)?;
        let link = SceneLink {
            provider_scene,
            provider_slot,
            consumer_scene,
            consumer_slot,
        };
        let policy = self.config.relink_policy;
        match self.slot_kind(scenes, consumer_scene, consumer_slot)? {
            LinkKind::Transformation => self.transformation.create_data_link(scenes, link, policy),
            LinkKind::DataReference => self.data_reference.create_data_link(scenes, link, policy),
            LinkKind::Texture => self.texture.create_data_link(scenes, link, policy),
        }
    }

    /// Links texture consumer slot `consumer_id` to an offscreen buffer.
    ///
    /// `buffer_exists` tells whether the buffer is registered with the
    /// renderer. Reports `SceneDataBufferLinked` or
    /// `SceneDataBufferLinkFailed`.
    pub fn create_buffer_link(
        &mut self,
        scenes: &mut SceneMap,
        events: &mut RendererEventCollector,
        buffer: OffscreenBufferHandle,
        buffer_exists: bool,
        consumer_scene: SceneId,
        consumer_id: DataSlotId,
    ) -> Result<(), LinkError> {
        let result = if buffer_exists {
            find_slot(scenes, consumer_scene, consumer_id, false).and_then(|slot| {
                self.texture.create_buffer_link(
                    scenes,
                    buffer,
                    consumer_scene,
                    slot,
                    self.config.relink_policy,
                )
            })
        } else {
            Err(LinkError::InvalidOffscreenBuffer(buffer))
        };
        let event_type = match &result {
            Ok(()) => RendererEventType::SceneDataBufferLinked,
            Err(e) => {
                log::warn!(
                    "failed to link offscreen buffer {buffer:?} to consumer {consumer_scene}:{consumer_id}: {e}"
                );
                RendererEventType::SceneDataBufferLinkFailed
            }
        };
        events.add_buffer_link_event(event_type, buffer, consumer_scene, consumer_id);
        result
    }

    /// Removes the link of consumer slot `consumer_id`.
    ///
    /// Reports `SceneDataUnlinked` with the provider scene of the removed
    /// link, or `SceneDataUnlinkFailed`.
    pub fn remove_data_link(
        &mut self,
        scenes: &mut SceneMap,
        events: &mut RendererEventCollector,
        consumer_scene: SceneId,
        consumer_id: DataSlotId,
    ) -> Result<(), LinkError> {
        let result = self.try_remove_data_link(scenes, consumer_scene, consumer_id);
        match &result {
            Ok(removed) => events.add_data_link_event(
                RendererEventType::SceneDataUnlinked,
                removed.provider_scene,
                DataSlotId::INVALID,
                consumer_scene,
                consumer_id,
            ),
            Err(e) => {
                log::warn!("failed to unlink consumer {consumer_scene}:{consumer_id}: {e}");
                events.add_data_link_event(
                    RendererEventType::SceneDataUnlinkFailed,
                    SceneId::INVALID,
                    DataSlotId::INVALID,
                    consumer_scene,
                    consumer_id,
                );
            }
        }
        result.map(|_| ())
    }

    fn try_remove_data_link(
        &mut self,
        scenes: &mut SceneMap,
        consumer_scene: SceneId,
        consumer_id: DataSlotId,
    ) -> Result<RemovedLink, LinkError> {
        let slot = find_slot(scenes, consumer_scene, consumer_id, false).map_err(|e| match e {
            LinkError::WrongSlotDirection { scene, slot, .. } => {
                LinkError::UnlinkWrongDirection { scene, slot }
            }
            e => e,
        })?;
        let kind = self.slot_kind(scenes, consumer_scene, slot)?;
        self.manager_mut(kind).remove_data_link(scenes, consumer_scene, slot)
    }

    /// Reports a newly allocated slot.
    pub fn handle_data_slot_created(
        &mut self,
        scenes: &SceneMap,
        events: &mut RendererEventCollector,
        scene: SceneId,
        handle: DataSlotHandle,
    ) {
        let Some(slot) = scenes.get(&scene).and_then(|s| s.store().data_slot(handle)) else {
            return;
        };
        let event_type = if slot.slot_type.is_provider() {
            RendererEventType::SceneDataSlotProviderCreated
        } else {
            RendererEventType::SceneDataSlotConsumerCreated
        };
        events.add_slot_event(event_type, scene, slot.id);
    }

    /// Tears down every link touching a slot that is about to be released.
    ///
    /// Reports one `SceneDataUnlinkedAsResultOfClientSceneChange` per removed
    /// link, then the slot's destroyed event. Must run while the slot is
    /// still allocated.
    pub fn handle_data_slot_destroyed(
        &mut self,
        scenes: &mut SceneMap,
        events: &mut RendererEventCollector,
        scene: SceneId,
        handle: DataSlotHandle,
    ) {
        let Some(slot) = scenes
            .get(&scene)
            .and_then(|s| s.store().data_slot(handle))
            .copied()
        else {
            return;
        };
        let removed =
            self.manager_mut(slot.slot_type.kind())
                .remove_links_for_slot(scenes, scene, handle, &slot);
        if !removed.is_empty() {
            log::debug!(
                "slot {}:{} destroyed, removed {} links",
                scene,
                slot.id,
                removed.len()
            );
        }
        report_removed(scenes, events, &removed);

        let event_type = if slot.slot_type.is_provider() {
            RendererEventType::SceneDataSlotProviderDestroyed
        } else {
            RendererEventType::SceneDataSlotConsumerDestroyed
        };
        events.add_slot_event(event_type, scene, slot.id);
    }

    /// Tears down every link touching a scene that is about to be removed,
    /// then reports every slot of the scene as destroyed.
    ///
    /// Must run while the scene is still in `scenes`.
    pub fn handle_scene_removed(
        &mut self,
        scenes: &mut SceneMap,
        events: &mut RendererEventCollector,
        scene: SceneId,
    ) {
        self.tear_down_scene(scenes, events, scene);
        let Some(s) = scenes.get(&scene) else {
            return;
        };
        for (_, slot) in s.store().data_slots() {
            let event_type = if slot.slot_type.is_provider() {
                RendererEventType::SceneDataSlotProviderDestroyed
            } else {
                RendererEventType::SceneDataSlotConsumerDestroyed
            };
            events.add_slot_event(event_type, scene, slot.id);
        }
    }

    /// Tears down every link touching an unmapped scene. Its slots stay.
    pub fn handle_scene_unmapped(
        &mut self,
        scenes: &mut SceneMap,
        events: &mut RendererEventCollector,
        scene: SceneId,
    ) {
        self.tear_down_scene(scenes, events, scene);
    }

    /// Tears down every link fed by an offscreen buffer that is about to be
    /// destroyed.
    pub fn handle_buffer_destroyed(
        &mut self,
        scenes: &mut SceneMap,
        events: &mut RendererEventCollector,
        buffer: OffscreenBufferHandle,
    ) {
        let removed = self.texture.remove_buffer_links(scenes, buffer);
        log::debug!("offscreen buffer {buffer:?} destroyed, removed {} links", removed.len());
        report_removed(scenes, events, &removed);
    }

    /// Applies one item of cross-scene work queued by `scene`.
    pub fn propagate(&mut self, scenes: &mut SceneMap, scene: SceneId, item: PendingPropagation) {
        match item {
            PendingPropagation::TransformDirty(slot) => self
                .transformation
                .propagate_transformation_dirtiness_to_consumers(scenes, scene, slot),
            PendingPropagation::DataChanged(slot) => {
                self.data_reference.push_provider_value(scenes, scene, slot);
            }
            PendingPropagation::TextureChanged(slot) => {
                self.texture.set_texture_to_consumers(scenes, scene, slot);
            }
        }
    }

    /// Resolves a node's matrix through transformation links.
    pub fn resolve_matrix(
        &self,
        scenes: &mut SceneMap,
        matrix_type: MatrixType,
        scene: SceneId,
        node: NodeHandle,
    ) -> Option<Transform3d> {
        update_matrix_cache_with_links(scenes, &self.transformation, matrix_type, scene, node)
    }

    /// Pulls provider values into every data consumer of `scene`.
    pub fn resolve_data_links(&self, scenes: &mut SceneMap, scene: SceneId) {
        self.data_reference
            .resolve_links_for_consumer_scene(scenes, scene);
    }

    fn tear_down_scene(
        &mut self,
        scenes: &mut SceneMap,
        events: &mut RendererEventCollector,
        scene: SceneId,
    ) {
        let mut removed = Vec::new();
        for kind in KINDS {
            removed.extend(
                self.manager_mut(kind)
                    .remove_links_for_provider_scene(scenes, scene),
            );
        }
        for kind in KINDS {
            removed.extend(
                self.manager_mut(kind)
                    .remove_links_for_consumer_scene(scenes, scene),
            );
        }
        log::debug!("scene {scene} torn down, removed {} links", removed.len());
        report_removed(scenes, events, &removed);
    }

    fn slot_kind(
        &self,
        scenes: &SceneMap,
        scene: SceneId,
        handle: DataSlotHandle,
    ) -> Result<LinkKind, LinkError> {
        scenes
            .get(&scene)
            .and_then(|s| s.store().data_slot(handle))
            .map(|s| s.slot_type.kind())
            .ok_or(LinkError::InvalidSlotId {
                scene,
                slot: DataSlotId::INVALID,
            })
    }

    fn manager_mut(&mut self, kind: LinkKind) -> &mut dyn LinkManager {
        match kind {
            LinkKind::Transformation => &mut self.transformation,
            LinkKind::DataReference => &mut self.data_reference,
            LinkKind::Texture => &mut self.texture,
        }
    }
}

const KINDS: [LinkKind; 3] = [
    LinkKind::Transformation,
    LinkKind::DataReference,
    LinkKind::Texture,
];

/// Reports one `SceneDataUnlinkedAsResultOfClientSceneChange` per link.
fn report_removed(scenes: &SceneMap, events: &mut RendererEventCollector, removed: &[RemovedLink]) {
    let slot_id = |scene: SceneId, handle: DataSlotHandle| {
        scenes
            .get(&scene)
            .and_then(|s| s.store().data_slot(handle))
            .map_or(DataSlotId::INVALID, |s| s.id)
    };
    for link in removed {
        let event = RendererEvent {
            event_type: RendererEventType::SceneDataUnlinkedAsResultOfClientSceneChange,
            provider_scene: link.provider_scene,
            provider_data: slot_id(link.provider_scene, link.provider_slot),
            consumer_scene: link.consumer_scene,
            consumer_data: slot_id(link.consumer_scene, link.consumer_slot),
            offscreen_buffer: link.provider_buffer,
        };
        events.add_event(event);
    }
}
