// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The renderer's scene container.
//!
//! [`RendererScenes`] owns every live [`LinkAwareScene`], the
//! [`SceneLinksManager`], the registered offscreen buffers, and the event
//! queue. It is the only place where scenes and link managers meet, so it
//! sequences every operation that crosses a scene boundary:
//!
//! - Slot allocation and release are reported to the link managers. On
//!   release the links are torn down first, while the slot still exists.
//! - Local mutations queue cross-scene work in the mutated scene.
//!   [`flush_link_propagation`](RendererScenes::flush_link_propagation)
//!   carries it out and runs before every link operation and resolution.
//!
//! Single-threaded: callers serialize access.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::aware::{LinkAwareScene, SceneMap};
use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::event::{EventSink, RendererEvent, RendererEventCollector};
use crate::ids::{DataSlotHandle, DataSlotId, NodeHandle, OffscreenBufferHandle, SceneId};
use crate::link::SceneLinksManager;
use crate::scene::{DataSlot, MatrixType};
use crate::transform::Transform3d;

/// All scenes of one renderer and the links between them.
#[derive(Debug, Default)]
pub struct RendererScenes {
    scenes: SceneMap,
    links: SceneLinksManager,
    events: RendererEventCollector,
    buffers: BTreeSet<OffscreenBufferHandle>,
}

impl RendererScenes {
    /// Creates an empty container with the default [`LinkConfig`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty container with the given configuration.
    #[must_use]
    pub fn with_config(config: LinkConfig) -> Self {
        Self {
            links: SceneLinksManager::new(config),
            ..Self::default()
        }
    }

    /// The link managers.
    #[must_use]
    pub fn links(&self) -> &SceneLinksManager {
        &self.links
    }

    // -- Scenes --

    /// Creates an empty scene.
    ///
    /// Returns `false` if the id is invalid or already in use.
    pub fn create_scene(&mut self, id: SceneId) -> bool {
        if !id.is_valid() || self.scenes.contains_key(&id) {
            return false;
        }
        self.scenes.insert(id, LinkAwareScene::new(id));
        true
    }

    /// Returns `true` if the scene exists.
    #[must_use]
    pub fn has_scene(&self, id: SceneId) -> bool {
        self.scenes.contains_key(&id)
    }

    /// A scene.
    #[must_use]
    pub fn scene(&self, id: SceneId) -> Option<&LinkAwareScene> {
        self.scenes.get(&id)
    }

    /// A scene, for local mutations.
    ///
    /// Cross-scene effects of the mutations are applied by the next
    /// [`flush_link_propagation`](Self::flush_link_propagation).
    pub fn scene_mut(&mut self, id: SceneId) -> Option<&mut LinkAwareScene> {
        self.scenes.get_mut(&id)
    }

    /// Ids of all scenes, ascending.
    pub fn scene_ids(&self) -> impl Iterator<Item = SceneId> + '_ {
        self.scenes.keys().copied()
    }

    /// Destroys a scene after tearing down all its links and reporting its
    /// slots as destroyed.
    ///
    /// Returns `false` if the scene does not exist.
    pub fn destroy_scene(&mut self, id: SceneId) -> bool {
        if !self.scenes.contains_key(&id) {
            return false;
        }
        self.flush_link_propagation();
        self.links
            .handle_scene_removed(&mut self.scenes, &mut self.events, id);
        self.scenes.remove(&id);
        self.flush_link_propagation();
        true
    }

    /// Tears down all links of a scene but keeps the scene and its slots.
    ///
    /// Returns `false` if the scene does not exist.
    pub fn unmap_scene(&mut self, id: SceneId) -> bool {
        if !self.scenes.contains_key(&id) {
            return false;
        }
        self.flush_link_propagation();
        self.links
            .handle_scene_unmapped(&mut self.scenes, &mut self.events, id);
        self.flush_link_propagation();
        true
    }

    // -- Offscreen buffers --

    /// Registers an offscreen buffer as a texture link provider.
    ///
    /// Returns `false` if the handle is invalid or already registered.
    pub fn register_offscreen_buffer(&mut self, buffer: OffscreenBufferHandle) -> bool {
        buffer.is_valid() && self.buffers.insert(buffer)
    }

    /// Destroys an offscreen buffer, unlinking every consumer it feeds.
    ///
    /// Returns `false` if the buffer is not registered.
    pub fn destroy_offscreen_buffer(&mut self, buffer: OffscreenBufferHandle) -> bool {
        if !self.buffers.remove(&buffer) {
            return false;
        }
        self.links
            .handle_buffer_destroyed(&mut self.scenes, &mut self.events, buffer);
        self.flush_link_propagation();
        true
    }

    // -- Data slots --

    /// Allocates a data slot in a scene and reports it.
    ///
    /// Returns `None` if the scene does not exist.
    pub fn allocate_data_slot(&mut self, scene: SceneId, slot: DataSlot) -> Option<DataSlotHandle> {
        let handle = self.scenes.get_mut(&scene)?.allocate_data_slot(slot);
        self.links
            .handle_data_slot_created(&self.scenes, &mut self.events, scene, handle);
        Some(handle)
    }

    /// Releases a data slot after tearing down its links.
    ///
    /// Returns the released slot, or `None` if it was not allocated.
    pub fn release_data_slot(&mut self, scene: SceneId, handle: DataSlotHandle) -> Option<DataSlot> {
        if self.scenes.get(&scene)?.store().data_slot(handle).is_none() {
            return None;
        }
        self.flush_link_propagation();
        self.links
            .handle_data_slot_destroyed(&mut self.scenes, &mut self.events, scene, handle);
        let slot = self.scenes.get_mut(&scene)?.release_data_slot(handle);
        self.flush_link_propagation();
        slot
    }

    // -- Links --

    /// Links a consumer slot to a provider slot, see
    /// [`SceneLinksManager::create_data_link`].
    pub fn create_data_link(
        &mut self,
        provider_scene: SceneId,
        provider_id: DataSlotId,
        consumer_scene: SceneId,
        consumer_id: DataSlotId,
    ) -> Result<(), LinkError> {
        self.flush_link_propagation();
        let result = self.links.create_data_link(
            &mut self.scenes,
            &mut self.events,
            provider_scene,
            provider_id,
            consumer_scene,
            consumer_id,
        );
        self.flush_link_propagation();
        result
    }

    /// Links a texture consumer slot to a registered offscreen buffer.
    pub fn create_buffer_link(
        &mut self,
        buffer: OffscreenBufferHandle,
        consumer_scene: SceneId,
        consumer_id: DataSlotId,
    ) -> Result<(), LinkError> {
        self.flush_link_propagation();
        let buffer_exists = self.buffers.contains(&buffer);
        let result = self.links.create_buffer_link(
            &mut self.scenes,
            &mut self.events,
            buffer,
            buffer_exists,
            consumer_scene,
            consumer_id,
        );
        self.flush_link_propagation();
        result
    }

    /// Removes the link of a consumer slot, see
    /// [`SceneLinksManager::remove_data_link`].
    pub fn remove_data_link(
        &mut self,
        consumer_scene: SceneId,
        consumer_id: DataSlotId,
    ) -> Result<(), LinkError> {
        self.flush_link_propagation();
        let result =
            self.links
                .remove_data_link(&mut self.scenes, &mut self.events, consumer_scene, consumer_id);
        self.flush_link_propagation();
        result
    }

    // -- Resolution --

    /// Carries out all cross-scene work queued by local mutations.
    ///
    /// Work may queue further work in consumer scenes; this runs until no
    /// scene has anything queued. The dependency graphs are acyclic, so it
    /// terminates.
    pub fn flush_link_propagation(&mut self) {
        while let Some((id, pending)) = self
            .scenes
            .iter_mut()
            .find(|(_, s)| s.has_pending())
            .map(|(&id, s)| (id, s.take_pending()))
        {
            for item in pending {
                self.links.propagate(&mut self.scenes, id, item);
            }
        }
    }

    /// Resolves a node's matrix, following transformation links.
    ///
    /// Returns `None` if the scene does not exist or the node is not alive.
    pub fn resolve_matrix(
        &mut self,
        matrix_type: MatrixType,
        scene: SceneId,
        node: NodeHandle,
    ) -> Option<Transform3d> {
        self.flush_link_propagation();
        self.links
            .resolve_matrix(&mut self.scenes, matrix_type, scene, node)
    }

    /// Pulls provider values into every data consumer of `scene`.
    pub fn resolve_data_links(&mut self, scene: SceneId) {
        self.flush_link_propagation();
        self.links.resolve_data_links(&mut self.scenes, scene);
        self.flush_link_propagation();
    }

    /// Pulls provider values into every data consumer, providers first.
    pub fn resolve_all_data_links(&mut self) {
        let order = self
            .links
            .data_reference_links()
            .dependencies()
            .dependent_scenes_in_order();
        for scene in order {
            self.resolve_data_links(scene);
        }
    }

    // -- Events --

    /// The queued events.
    #[must_use]
    pub fn events(&self) -> &[RendererEvent] {
        self.events.events()
    }

    /// Takes all queued events.
    pub fn dispatch_events(&mut self) -> Vec<RendererEvent> {
        self.events.dispatch_events()
    }

    /// Forwards all queued events to `sink`.
    pub fn dispatch_events_to(&mut self, sink: &mut dyn EventSink) {
        self.events.dispatch_to(sink);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::config::RelinkPolicy;
    use crate::data::{DataType, DataValue};
    use crate::event::RendererEventType;
    use crate::ids::{DataInstanceHandle, ResourceContentHash, TextureSamplerHandle};
    use crate::link::LinkManager;
    use crate::sampler::{FilterMode, SamplerContent, TextureSampler};

    const P: SceneId = SceneId(1);
    const C: SceneId = SceneId(2);
    const D: SceneId = SceneId(3);

    fn renderer_with(scenes: &[SceneId]) -> RendererScenes {
        let mut renderer = RendererScenes::new();
        for &id in scenes {
            assert!(renderer.create_scene(id));
        }
        renderer
    }

    fn node_at(renderer: &mut RendererScenes, scene: SceneId, translation: [f64; 3]) -> NodeHandle {
        let s = renderer.scene_mut(scene).unwrap();
        let node = s.create_node();
        s.set_translation(node, translation);
        node
    }

    fn data_slot(
        renderer: &mut RendererScenes,
        scene: SceneId,
        id: u32,
        provider: bool,
        value: DataValue,
    ) -> (DataSlotHandle, DataInstanceHandle) {
        let instance = renderer
            .scene_mut(scene)
            .unwrap()
            .allocate_data_instance(value);
        let slot = if provider {
            DataSlot::data_provider(DataSlotId(id), instance)
        } else {
            DataSlot::data_consumer(DataSlotId(id), instance)
        };
        (renderer.allocate_data_slot(scene, slot).unwrap(), instance)
    }

    fn value(renderer: &RendererScenes, scene: SceneId, instance: DataInstanceHandle) -> DataValue {
        renderer.scene(scene).unwrap().store().data_value(instance)
    }

    fn link_event(
        event_type: RendererEventType,
        provider: (SceneId, u32),
        consumer: (SceneId, u32),
    ) -> RendererEvent {
        RendererEvent {
            provider_scene: provider.0,
            provider_data: DataSlotId(provider.1),
            consumer_scene: consumer.0,
            consumer_data: DataSlotId(consumer.1),
            ..RendererEvent::new(event_type)
        }
    }

    fn world(renderer: &mut RendererScenes, scene: SceneId, node: NodeHandle) -> Transform3d {
        renderer
            .resolve_matrix(MatrixType::World, scene, node)
            .unwrap()
    }

    #[test]
    fn provider_release_falls_back_to_local_chain() {
        let (provider_scene, consumer_scene) = (SceneId(3), SceneId(4));
        let mut renderer = renderer_with(&[provider_scene, consumer_scene]);
        let root = node_at(&mut renderer, provider_scene, [1.0, 2.0, 3.0]);
        let child = node_at(&mut renderer, provider_scene, [4.0, 5.0, 6.0]);
        renderer
            .scene_mut(provider_scene)
            .unwrap()
            .add_child(root, child);
        let provider = renderer
            .allocate_data_slot(
                provider_scene,
                DataSlot::transformation_provider(DataSlotId(33), child),
            )
            .unwrap();
        let target = node_at(&mut renderer, consumer_scene, [7.0, 0.0, 0.0]);
        renderer.allocate_data_slot(
            consumer_scene,
            DataSlot::transformation_consumer(DataSlotId(44), target),
        );
        let _ = renderer.dispatch_events();

        renderer
            .create_data_link(provider_scene, DataSlotId(33), consumer_scene, DataSlotId(44))
            .unwrap();
        assert_eq!(
            renderer.dispatch_events(),
            [link_event(
                RendererEventType::SceneDataLinked,
                (provider_scene, 33),
                (consumer_scene, 44)
            )]
        );
        assert_eq!(
            world(&mut renderer, consumer_scene, target),
            Transform3d::from_translation(5.0, 7.0, 9.0)
        );

        assert!(renderer.release_data_slot(provider_scene, provider).is_some());
        let mut destroyed = RendererEvent::new(RendererEventType::SceneDataSlotProviderDestroyed);
        destroyed.provider_scene = provider_scene;
        destroyed.provider_data = DataSlotId(33);
        assert_eq!(
            renderer.dispatch_events(),
            [
                link_event(
                    RendererEventType::SceneDataUnlinkedAsResultOfClientSceneChange,
                    (provider_scene, 33),
                    (consumer_scene, 44)
                ),
                destroyed,
            ]
        );
        assert_eq!(
            world(&mut renderer, consumer_scene, target),
            Transform3d::from_translation(7.0, 0.0, 0.0)
        );
        assert!(renderer.links().transformation_links().dependencies().is_empty());
    }

    #[test]
    fn chained_transformation_links_resolve_and_propagate() {
        let mut renderer = renderer_with(&[P, C, D]);
        let source = node_at(&mut renderer, P, [1.0, 2.0, 3.0]);
        renderer.allocate_data_slot(P, DataSlot::transformation_provider(DataSlotId(1), source));

        let anchor = node_at(&mut renderer, C, [100.0, 0.0, 0.0]);
        let offset = node_at(&mut renderer, C, [4.0, 5.0, 6.0]);
        renderer.scene_mut(C).unwrap().add_child(anchor, offset);
        renderer.allocate_data_slot(C, DataSlot::transformation_consumer(DataSlotId(2), anchor));
        renderer.allocate_data_slot(C, DataSlot::transformation_provider(DataSlotId(3), offset));

        let d_anchor = node_at(&mut renderer, D, [0.0; 3]);
        let d_child = node_at(&mut renderer, D, [0.0, 0.0, 1.0]);
        renderer.scene_mut(D).unwrap().add_child(d_anchor, d_child);
        renderer.allocate_data_slot(D, DataSlot::transformation_consumer(DataSlotId(4), d_anchor));

        renderer.create_data_link(P, DataSlotId(1), C, DataSlotId(2)).unwrap();
        renderer.create_data_link(C, DataSlotId(3), D, DataSlotId(4)).unwrap();

        assert_eq!(
            world(&mut renderer, C, offset),
            Transform3d::from_translation(5.0, 7.0, 9.0)
        );
        assert_eq!(
            world(&mut renderer, D, d_child),
            Transform3d::from_translation(5.0, 7.0, 10.0)
        );

        renderer
            .scene_mut(P)
            .unwrap()
            .set_translation(source, [0.0; 3]);
        renderer.flush_link_propagation();
        assert!(
            renderer
                .scene(D)
                .unwrap()
                .store()
                .is_matrix_dirty(MatrixType::World, d_child),
            "provider change reaches the second hop"
        );
        assert_eq!(
            world(&mut renderer, D, d_child),
            Transform3d::from_translation(4.0, 5.0, 7.0)
        );
    }

    #[test]
    fn object_matrix_follows_link() {
        let mut renderer = renderer_with(&[P, C]);
        let source = node_at(&mut renderer, P, [1.0, 2.0, 3.0]);
        renderer.allocate_data_slot(P, DataSlot::transformation_provider(DataSlotId(1), source));
        let target = node_at(&mut renderer, C, [0.0; 3]);
        renderer.allocate_data_slot(C, DataSlot::transformation_consumer(DataSlotId(2), target));
        renderer.create_data_link(P, DataSlotId(1), C, DataSlotId(2)).unwrap();

        assert_eq!(
            renderer.resolve_matrix(MatrixType::Object, C, target),
            Some(Transform3d::from_translation(-1.0, -2.0, -3.0))
        );
    }

    #[test]
    fn data_fallback_survives_link_cycle() {
        let mut renderer = renderer_with(&[P, C]);
        let (_, source) = data_slot(&mut renderer, P, 10, true, DataValue::Float(1.0));
        let (consumer, target) = data_slot(&mut renderer, C, 20, false, DataValue::Float(5.0));

        renderer.create_data_link(P, DataSlotId(10), C, DataSlotId(20)).unwrap();
        assert_eq!(value(&renderer, C, target), DataValue::Float(1.0));

        renderer
            .scene_mut(C)
            .unwrap()
            .set_data_value(target, DataValue::Float(7.0));
        assert_eq!(
            value(&renderer, C, target),
            DataValue::Float(1.0),
            "a local write does not override the linked value"
        );
        assert_eq!(
            renderer.scene(C).unwrap().data_strategy().fallback_value(consumer),
            Some(DataValue::Float(7.0))
        );

        renderer
            .scene_mut(P)
            .unwrap()
            .set_data_value(source, DataValue::Float(2.0));
        renderer.flush_link_propagation();
        assert_eq!(value(&renderer, C, target), DataValue::Float(2.0));

        renderer.remove_data_link(C, DataSlotId(20)).unwrap();
        assert_eq!(value(&renderer, C, target), DataValue::Float(7.0));
        assert!(!renderer.scene(C).unwrap().data_strategy().is_linked(target));
    }

    #[test]
    fn data_values_pass_through_chained_links() {
        let mut renderer = renderer_with(&[P, C, D]);
        let (_, source) = data_slot(&mut renderer, P, 1, true, DataValue::Int32(1));
        let (_, middle) = data_slot(&mut renderer, C, 2, false, DataValue::Int32(0));
        renderer.allocate_data_slot(C, DataSlot::data_provider(DataSlotId(3), middle));
        let (_, sink) = data_slot(&mut renderer, D, 4, false, DataValue::Int32(0));

        renderer.create_data_link(C, DataSlotId(3), D, DataSlotId(4)).unwrap();
        renderer.create_data_link(P, DataSlotId(1), C, DataSlotId(2)).unwrap();
        assert_eq!(value(&renderer, D, sink), DataValue::Int32(1));

        renderer
            .scene_mut(P)
            .unwrap()
            .set_data_value(source, DataValue::Int32(9));
        renderer.flush_link_propagation();
        assert_eq!(value(&renderer, D, sink), DataValue::Int32(9));
        assert_eq!(
            renderer
                .links()
                .data_reference_links()
                .dependencies()
                .dependent_scenes_in_order(),
            [P, C, D]
        );
    }

    #[test]
    fn resolution_pulls_provider_values() {
        let mut renderer = renderer_with(&[P, C]);
        let (_, source) = data_slot(&mut renderer, P, 1, true, DataValue::Bool(false));
        let (_, target) = data_slot(&mut renderer, C, 2, false, DataValue::Bool(false));
        renderer.create_data_link(P, DataSlotId(1), C, DataSlotId(2)).unwrap();

        // Bypass the link-aware path so only the pull can deliver the value.
        renderer
            .scene_mut(P)
            .unwrap()
            .store_mut()
            .set_data_value(source, DataValue::Bool(true));
        assert_eq!(value(&renderer, C, target), DataValue::Bool(false));
        renderer.resolve_all_data_links();
        assert_eq!(value(&renderer, C, target), DataValue::Bool(true));
    }

    #[test]
    fn texture_link_buffer_link_and_fallback() {
        let mut renderer = renderer_with(&[P, C]);
        let provider = renderer
            .allocate_data_slot(
                P,
                DataSlot::texture_provider(DataSlotId(10), ResourceContentHash(0xAA)),
            )
            .unwrap();
        let local = TextureSampler::new(SamplerContent::ClientTexture(ResourceContentHash(0x11)));
        let sampler = renderer
            .scene_mut(C)
            .unwrap()
            .allocate_texture_sampler(local);
        renderer.allocate_data_slot(C, DataSlot::texture_consumer(DataSlotId(20), sampler));
        let content = |r: &RendererScenes, s: TextureSamplerHandle| {
            r.scene(C).unwrap().store().texture_sampler(s).content
        };

        renderer.create_data_link(P, DataSlotId(10), C, DataSlotId(20)).unwrap();
        assert_eq!(
            content(&renderer, sampler),
            SamplerContent::ClientTexture(ResourceContentHash(0xAA))
        );
        assert_eq!(
            renderer.links().texture_links().linked_texture(C, sampler),
            Some(ResourceContentHash(0xAA))
        );

        renderer
            .scene_mut(P)
            .unwrap()
            .set_data_slot_texture(provider, ResourceContentHash(0xBB));
        renderer.flush_link_propagation();
        assert_eq!(
            content(&renderer, sampler),
            SamplerContent::ClientTexture(ResourceContentHash(0xBB))
        );

        let buffer = OffscreenBufferHandle(7);
        assert!(renderer.register_offscreen_buffer(buffer));
        renderer.create_buffer_link(buffer, C, DataSlotId(20)).unwrap();
        assert_eq!(
            content(&renderer, sampler),
            SamplerContent::OffscreenBuffer(buffer)
        );
        let texture_links = renderer.links().texture_links();
        assert!(!texture_links.has_linked_texture(C, sampler));
        assert_eq!(texture_links.linked_offscreen_buffer(C, sampler), Some(buffer));
        assert!(texture_links.dependencies().is_empty());

        let _ = renderer.dispatch_events();
        assert!(renderer.destroy_offscreen_buffer(buffer));
        let events = renderer.dispatch_events();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].event_type,
            RendererEventType::SceneDataUnlinkedAsResultOfClientSceneChange
        );
        assert_eq!(events[0].offscreen_buffer, buffer);
        assert_eq!(events[0].provider_scene, SceneId::INVALID);
        assert_eq!(events[0].consumer_data, DataSlotId(20));
        assert_eq!(
            renderer.scene(C).unwrap().store().texture_sampler(sampler),
            local
        );
    }

    #[test]
    fn local_sampler_states_apply_while_linked() {
        let mut renderer = renderer_with(&[P, C]);
        renderer.allocate_data_slot(
            P,
            DataSlot::texture_provider(DataSlotId(10), ResourceContentHash(0xAA)),
        );
        let sampler = renderer
            .scene_mut(C)
            .unwrap()
            .allocate_texture_sampler(TextureSampler::default());
        renderer.allocate_data_slot(C, DataSlot::texture_consumer(DataSlotId(20), sampler));
        renderer.create_data_link(P, DataSlotId(10), C, DataSlotId(20)).unwrap();

        let mut local = TextureSampler::new(SamplerContent::ClientTexture(ResourceContentHash(0x22)));
        local.states.min_filter = FilterMode::Nearest;
        renderer
            .scene_mut(C)
            .unwrap()
            .set_texture_sampler(sampler, local);
        let shown = renderer.scene(C).unwrap().store().texture_sampler(sampler);
        assert_eq!(shown.states.min_filter, FilterMode::Nearest);
        assert_eq!(
            shown.content,
            SamplerContent::ClientTexture(ResourceContentHash(0xAA))
        );

        renderer.remove_data_link(C, DataSlotId(20)).unwrap();
        assert_eq!(
            renderer.scene(C).unwrap().store().texture_sampler(sampler),
            local
        );
    }

    #[test]
    fn second_unlink_fails() {
        let mut renderer = renderer_with(&[P, C]);
        data_slot(&mut renderer, P, 10, true, DataValue::Float(0.0));
        data_slot(&mut renderer, C, 20, false, DataValue::Float(0.0));
        renderer.create_data_link(P, DataSlotId(10), C, DataSlotId(20)).unwrap();
        let _ = renderer.dispatch_events();

        assert_eq!(renderer.remove_data_link(C, DataSlotId(20)), Ok(()));
        assert_eq!(
            renderer.remove_data_link(C, DataSlotId(20)),
            Err(LinkError::NoLinkForConsumer {
                scene: C,
                slot: DataSlotId(20)
            })
        );

        let mut unlinked = link_event(RendererEventType::SceneDataUnlinked, (P, 0), (C, 20));
        unlinked.provider_data = DataSlotId::INVALID;
        let failed = link_event(
            RendererEventType::SceneDataUnlinkFailed,
            (SceneId::INVALID, 0),
            (C, 20),
        );
        assert_eq!(renderer.dispatch_events(), [unlinked, failed]);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut renderer = renderer_with(&[P, C]);
        for (scene, base) in [(P, 10), (C, 20)] {
            let node = node_at(&mut renderer, scene, [0.0; 3]);
            renderer.allocate_data_slot(
                scene,
                DataSlot::transformation_provider(DataSlotId(base), node),
            );
            renderer.allocate_data_slot(
                scene,
                DataSlot::transformation_consumer(DataSlotId(base + 1), node),
            );
        }
        renderer.create_data_link(P, DataSlotId(10), C, DataSlotId(21)).unwrap();
        let _ = renderer.dispatch_events();

        assert_eq!(
            renderer.create_data_link(C, DataSlotId(20), P, DataSlotId(11)),
            Err(LinkError::CyclicDependency {
                consumer: P,
                provider: C
            })
        );
        assert_eq!(
            renderer.create_data_link(P, DataSlotId(10), P, DataSlotId(11)),
            Err(LinkError::CyclicDependency {
                consumer: P,
                provider: P
            }),
            "a scene cannot consume from itself"
        );
        let events = renderer.dispatch_events();
        assert!(
            events
                .iter()
                .all(|e| e.event_type == RendererEventType::SceneDataLinkFailed)
        );
        let deps = renderer.links().transformation_links().dependencies();
        assert_eq!(deps.dependency_count(C, P), 1);
        assert_eq!(deps.dependency_count(P, C), 0);
    }

    #[test]
    fn relink_replaces_by_default() {
        let mut renderer = renderer_with(&[P, C, D]);
        data_slot(&mut renderer, P, 10, true, DataValue::Int32(1));
        data_slot(&mut renderer, C, 20, true, DataValue::Int32(2));
        let (_, target) = data_slot(&mut renderer, D, 30, false, DataValue::Int32(0));
        let _ = renderer.dispatch_events();

        renderer.create_data_link(P, DataSlotId(10), D, DataSlotId(30)).unwrap();
        renderer.create_data_link(C, DataSlotId(20), D, DataSlotId(30)).unwrap();
        assert_eq!(value(&renderer, D, target), DataValue::Int32(2));
        assert!(
            renderer
                .dispatch_events()
                .iter()
                .all(|e| e.event_type == RendererEventType::SceneDataLinked),
            "the replaced link is not reported"
        );
        let deps = renderer.links().data_reference_links().dependencies();
        assert_eq!(deps.dependency_count(D, P), 0);
        assert_eq!(deps.dependency_count(D, C), 1);
    }

    #[test]
    fn strict_config_rejects_relink() {
        let mut renderer = RendererScenes::with_config(LinkConfig::strict());
        assert_eq!(renderer.links().config().relink_policy, RelinkPolicy::Reject);
        for id in [P, C, D] {
            renderer.create_scene(id);
        }
        data_slot(&mut renderer, P, 10, true, DataValue::Int32(1));
        data_slot(&mut renderer, C, 20, true, DataValue::Int32(2));
        let (_, target) = data_slot(&mut renderer, D, 30, false, DataValue::Int32(0));

        renderer.create_data_link(P, DataSlotId(10), D, DataSlotId(30)).unwrap();
        assert_eq!(
            renderer.create_data_link(C, DataSlotId(20), D, DataSlotId(30)),
            Err(LinkError::ConsumerAlreadyLinked {
                scene: D,
                slot: DataSlotId(30)
            })
        );
        assert_eq!(value(&renderer, D, target), DataValue::Int32(1));
    }

    fn three_scene_chain() -> RendererScenes {
        let mut renderer = renderer_with(&[P, C, D]);
        data_slot(&mut renderer, P, 10, true, DataValue::Float(0.0));
        let (_, middle) = data_slot(&mut renderer, C, 20, false, DataValue::Float(0.0));
        renderer.allocate_data_slot(C, DataSlot::data_provider(DataSlotId(21), middle));
        data_slot(&mut renderer, D, 30, false, DataValue::Float(0.0));
        renderer.create_data_link(P, DataSlotId(10), C, DataSlotId(20)).unwrap();
        renderer.create_data_link(C, DataSlotId(21), D, DataSlotId(30)).unwrap();
        let _ = renderer.dispatch_events();
        renderer
    }

    #[test]
    fn scene_removal_unlinks_then_destroys_slots() {
        let mut renderer = three_scene_chain();
        assert!(renderer.destroy_scene(C));
        assert!(!renderer.has_scene(C));

        let unlinked = RendererEventType::SceneDataUnlinkedAsResultOfClientSceneChange;
        let mut consumer_destroyed =
            RendererEvent::new(RendererEventType::SceneDataSlotConsumerDestroyed);
        consumer_destroyed.consumer_scene = C;
        consumer_destroyed.consumer_data = DataSlotId(20);
        let mut provider_destroyed =
            RendererEvent::new(RendererEventType::SceneDataSlotProviderDestroyed);
        provider_destroyed.provider_scene = C;
        provider_destroyed.provider_data = DataSlotId(21);
        assert_eq!(
            renderer.dispatch_events(),
            [
                link_event(unlinked, (C, 21), (D, 30)),
                link_event(unlinked, (P, 10), (C, 20)),
                consumer_destroyed,
                provider_destroyed,
            ]
        );
        assert!(renderer.links().data_reference_links().dependencies().is_empty());
    }

    #[test]
    fn scene_unmap_keeps_slots() {
        let mut renderer = three_scene_chain();
        assert!(renderer.unmap_scene(C));
        assert!(renderer.has_scene(C));

        let events = renderer.dispatch_events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| {
            e.event_type == RendererEventType::SceneDataUnlinkedAsResultOfClientSceneChange
        }));
        renderer.create_data_link(P, DataSlotId(10), C, DataSlotId(20)).unwrap();
    }

    #[test]
    fn swapped_arguments_report_wrong_direction() {
        let mut renderer = renderer_with(&[P, C]);
        data_slot(&mut renderer, P, 10, true, DataValue::Float(0.0));
        data_slot(&mut renderer, C, 20, false, DataValue::Float(0.0));

        assert_eq!(
            renderer.create_data_link(C, DataSlotId(20), P, DataSlotId(10)),
            Err(LinkError::WrongSlotDirection {
                scene: P,
                slot: DataSlotId(10),
                found: crate::scene::DataSlotType::DataProvider
            })
        );
        assert_eq!(
            renderer.remove_data_link(P, DataSlotId(10)),
            Err(LinkError::UnlinkWrongDirection {
                scene: P,
                slot: DataSlotId(10)
            })
        );
        assert_eq!(
            renderer.create_data_link(P, DataSlotId(99), C, DataSlotId(20)),
            Err(LinkError::InvalidSlotId {
                scene: P,
                slot: DataSlotId(99)
            })
        );
        assert_eq!(
            renderer.create_data_link(SceneId(42), DataSlotId(10), C, DataSlotId(20)),
            Err(LinkError::InvalidSceneId(SceneId(42)))
        );
    }

    #[test]
    fn mismatched_links_are_rejected() {
        let mut renderer = renderer_with(&[P, C]);
        data_slot(&mut renderer, P, 10, true, DataValue::Float(0.0));
        let (_, target) = data_slot(&mut renderer, C, 20, false, DataValue::Int32(3));
        let node = node_at(&mut renderer, P, [0.0; 3]);
        renderer.allocate_data_slot(P, DataSlot::transformation_provider(DataSlotId(11), node));

        assert_eq!(
            renderer.create_data_link(P, DataSlotId(10), C, DataSlotId(20)),
            Err(LinkError::DataTypeMismatch {
                provider: DataType::Float,
                consumer: DataType::Int32
            })
        );
        assert!(matches!(
            renderer.create_data_link(P, DataSlotId(11), C, DataSlotId(20)),
            Err(LinkError::SlotKindMismatch { .. })
        ));
        assert_eq!(value(&renderer, C, target), DataValue::Int32(3));
        assert!(renderer.links().data_reference_links().dependencies().is_empty());
    }

    #[test]
    fn buffer_link_requires_registered_buffer() {
        let mut renderer = renderer_with(&[C]);
        let sampler = renderer
            .scene_mut(C)
            .unwrap()
            .allocate_texture_sampler(TextureSampler::default());
        renderer.allocate_data_slot(C, DataSlot::texture_consumer(DataSlotId(20), sampler));
        let _ = renderer.dispatch_events();

        let buffer = OffscreenBufferHandle(1);
        assert_eq!(
            renderer.create_buffer_link(buffer, C, DataSlotId(20)),
            Err(LinkError::InvalidOffscreenBuffer(buffer))
        );
        let events = renderer.dispatch_events();
        assert_eq!(
            events[0].event_type,
            RendererEventType::SceneDataBufferLinkFailed
        );
        assert!(!renderer.destroy_offscreen_buffer(buffer));
    }

    #[test]
    fn slot_lifecycle_events() {
        let mut renderer = renderer_with(&[P]);
        let (slot, _) = data_slot(&mut renderer, P, 10, true, DataValue::Float(0.0));
        assert!(renderer.release_data_slot(P, slot).is_some());
        assert!(renderer.release_data_slot(P, slot).is_none());

        let types: Vec<_> = renderer
            .dispatch_events()
            .iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(
            types,
            vec![
                RendererEventType::SceneDataSlotProviderCreated,
                RendererEventType::SceneDataSlotProviderDestroyed,
            ]
        );
    }

    #[test]
    fn scene_ids_are_unique() {
        let mut renderer = renderer_with(&[P]);
        assert!(!renderer.create_scene(P));
        assert!(!renderer.create_scene(SceneId::INVALID));
        assert!(!renderer.destroy_scene(C));
        assert_eq!(renderer.scene_ids().collect::<Vec<_>>(), [P]);
    }

    fn texture_consumer(
        renderer: &mut RendererScenes,
        scene: SceneId,
        id: u32,
    ) -> (TextureSampler, TextureSamplerHandle) {
        let local = TextureSampler::new(SamplerContent::ClientTexture(ResourceContentHash(0x11)));
        let sampler = renderer
            .scene_mut(scene)
            .unwrap()
            .allocate_texture_sampler(local);
        renderer.allocate_data_slot(scene, DataSlot::texture_consumer(DataSlotId(id), sampler));
        (local, sampler)
    }

    #[test]
    fn provider_release_unlinks_every_consumer_in_link_order() {
        const E: SceneId = SceneId(4);
        let mut renderer = renderer_with(&[P, C, D, E]);
        let (provider, _) = data_slot(&mut renderer, P, 10, true, DataValue::Float(1.0));
        let (other_provider, other_source) =
            data_slot(&mut renderer, P, 11, true, DataValue::Float(2.0));
        let (_, c_target) = data_slot(&mut renderer, C, 20, false, DataValue::Float(0.25));
        let (other_consumer, other_target) =
            data_slot(&mut renderer, C, 21, false, DataValue::Float(0.0));
        let (_, d_target) = data_slot(&mut renderer, D, 30, false, DataValue::Float(0.5));
        let (_, e_target) = data_slot(&mut renderer, E, 40, false, DataValue::Float(0.75));

        for (scene, id) in [(D, 30), (E, 40), (C, 20)] {
            renderer
                .create_data_link(P, DataSlotId(10), scene, DataSlotId(id))
                .unwrap();
        }
        renderer.create_data_link(P, DataSlotId(11), C, DataSlotId(21)).unwrap();
        let _ = renderer.dispatch_events();

        assert!(renderer.release_data_slot(P, provider).is_some());
        let unlinked = RendererEventType::SceneDataUnlinkedAsResultOfClientSceneChange;
        let mut destroyed = RendererEvent::new(RendererEventType::SceneDataSlotProviderDestroyed);
        destroyed.provider_scene = P;
        destroyed.provider_data = DataSlotId(10);
        assert_eq!(
            renderer.dispatch_events(),
            [
                link_event(unlinked, (P, 10), (D, 30)),
                link_event(unlinked, (P, 10), (E, 40)),
                link_event(unlinked, (P, 10), (C, 20)),
                destroyed,
            ]
        );
        let fallbacks = [(C, c_target, 0.25), (D, d_target, 0.5), (E, e_target, 0.75)];
        for (scene, target, fallback) in fallbacks {
            assert_eq!(value(&renderer, scene, target), DataValue::Float(fallback));
        }

        let data_links = renderer.links().data_reference_links();
        assert_eq!(
            data_links
                .base()
                .table()
                .linked_provider(C, other_consumer)
                .map(|link| link.provider_slot),
            Some(other_provider)
        );
        let deps = data_links.dependencies();
        assert_eq!(deps.dependency_count(C, P), 1);
        assert_eq!(deps.dependency_count(D, P), 0);
        assert_eq!(deps.dependency_count(E, P), 0);

        renderer
            .scene_mut(P)
            .unwrap()
            .set_data_value(other_source, DataValue::Float(3.0));
        renderer.flush_link_propagation();
        assert_eq!(value(&renderer, C, other_target), DataValue::Float(3.0));
    }

    #[test]
    fn consumers_fall_back_when_provider_scene_is_destroyed() {
        let mut renderer = renderer_with(&[P, C]);
        data_slot(&mut renderer, P, 10, true, DataValue::Int32(1));
        let (_, target) = data_slot(&mut renderer, C, 20, false, DataValue::Int32(5));
        renderer.allocate_data_slot(
            P,
            DataSlot::texture_provider(DataSlotId(11), ResourceContentHash(0xAA)),
        );
        let (local, sampler) = texture_consumer(&mut renderer, C, 21);
        renderer.create_data_link(P, DataSlotId(10), C, DataSlotId(20)).unwrap();
        renderer.create_data_link(P, DataSlotId(11), C, DataSlotId(21)).unwrap();
        assert_eq!(value(&renderer, C, target), DataValue::Int32(1));
        assert!(renderer.links().texture_links().has_linked_texture(C, sampler));

        assert!(renderer.destroy_scene(P));
        assert_eq!(value(&renderer, C, target), DataValue::Int32(5));
        assert!(!renderer.scene(C).unwrap().data_strategy().is_linked(target));
        assert!(!renderer.links().texture_links().has_linked_texture(C, sampler));
        assert_eq!(
            renderer.scene(C).unwrap().store().texture_sampler(sampler),
            local
        );

        renderer
            .scene_mut(C)
            .unwrap()
            .set_data_value(target, DataValue::Int32(6));
        assert_eq!(value(&renderer, C, target), DataValue::Int32(6));
    }

    #[test]
    fn transform_consumer_falls_back_when_its_slot_is_released() {
        let mut renderer = renderer_with(&[P, C]);
        let source = node_at(&mut renderer, P, [1.0, 2.0, 3.0]);
        renderer.allocate_data_slot(P, DataSlot::transformation_provider(DataSlotId(1), source));
        let target = node_at(&mut renderer, C, [7.0, 0.0, 0.0]);
        let consumer = renderer
            .allocate_data_slot(C, DataSlot::transformation_consumer(DataSlotId(2), target))
            .unwrap();
        renderer.create_data_link(P, DataSlotId(1), C, DataSlotId(2)).unwrap();
        assert_eq!(
            world(&mut renderer, C, target),
            Transform3d::from_translation(1.0, 2.0, 3.0)
        );

        assert!(renderer.release_data_slot(C, consumer).is_some());
        assert!(
            !renderer
                .links()
                .transformation_links()
                .node_has_data_link_to_provider(C, target)
        );
        assert_eq!(
            world(&mut renderer, C, target),
            Transform3d::from_translation(7.0, 0.0, 0.0)
        );
    }

    #[test]
    fn texture_consumer_falls_back_when_provider_slot_is_released() {
        let mut renderer = renderer_with(&[P, C]);
        let provider = renderer
            .allocate_data_slot(
                P,
                DataSlot::texture_provider(DataSlotId(10), ResourceContentHash(0xAA)),
            )
            .unwrap();
        let (local, sampler) = texture_consumer(&mut renderer, C, 20);
        renderer.create_data_link(P, DataSlotId(10), C, DataSlotId(20)).unwrap();
        assert_eq!(
            renderer.scene(C).unwrap().store().texture_sampler(sampler).content,
            SamplerContent::ClientTexture(ResourceContentHash(0xAA))
        );

        assert!(renderer.release_data_slot(P, provider).is_some());
        assert_eq!(
            renderer.scene(C).unwrap().store().texture_sampler(sampler),
            local
        );
        assert_eq!(
            renderer.links().texture_links().linked_texture(C, sampler),
            None
        );
        assert_eq!(
            renderer
                .scene(C)
                .unwrap()
                .texture_strategy()
                .linked_content(sampler),
            None
        );
    }

    #[test]
    fn local_writes_reach_consumers_without_a_link() {
        let mut renderer = renderer_with(&[P, C]);
        data_slot(&mut renderer, P, 10, true, DataValue::Float(1.0));
        let (_, target) = data_slot(&mut renderer, C, 20, false, DataValue::Float(0.0));
        renderer.resolve_all_data_links();
        renderer
            .scene_mut(C)
            .unwrap()
            .set_data_value(target, DataValue::Float(2.0));
        assert_eq!(value(&renderer, C, target), DataValue::Float(2.0));
        assert!(!renderer.scene(C).unwrap().data_strategy().is_linked(target));

        renderer.create_data_link(P, DataSlotId(10), C, DataSlotId(20)).unwrap();
        renderer.remove_data_link(C, DataSlotId(20)).unwrap();
        renderer.resolve_all_data_links();
        renderer
            .scene_mut(C)
            .unwrap()
            .set_data_value(target, DataValue::Float(3.0));
        assert_eq!(value(&renderer, C, target), DataValue::Float(3.0));

        renderer.allocate_data_slot(
            P,
            DataSlot::texture_provider(DataSlotId(11), ResourceContentHash(0xAA)),
        );
        let (_, sampler) = texture_consumer(&mut renderer, C, 21);
        renderer.create_data_link(P, DataSlotId(11), C, DataSlotId(21)).unwrap();
        renderer.remove_data_link(C, DataSlotId(21)).unwrap();
        let replaced = TextureSampler::new(SamplerContent::ClientTexture(ResourceContentHash(0x22)));
        renderer
            .scene_mut(C)
            .unwrap()
            .set_texture_sampler(sampler, replaced);
        assert_eq!(
            renderer.scene(C).unwrap().store().texture_sampler(sampler),
            replaced
        );
    }

    #[test]
    fn node_stays_linked_while_any_of_its_consumer_slots_is() {
        let mut renderer = renderer_with(&[P, C, D]);
        let first = node_at(&mut renderer, P, [1.0, 2.0, 3.0]);
        renderer.allocate_data_slot(P, DataSlot::transformation_provider(DataSlotId(1), first));
        let second = node_at(&mut renderer, D, [4.0, 5.0, 6.0]);
        renderer.allocate_data_slot(D, DataSlot::transformation_provider(DataSlotId(3), second));
        let target = node_at(&mut renderer, C, [7.0, 0.0, 0.0]);
        renderer.allocate_data_slot(C, DataSlot::transformation_consumer(DataSlotId(7), target));
        renderer.allocate_data_slot(C, DataSlot::transformation_consumer(DataSlotId(8), target));

        renderer.create_data_link(P, DataSlotId(1), C, DataSlotId(7)).unwrap();
        renderer.create_data_link(D, DataSlotId(3), C, DataSlotId(8)).unwrap();
        assert_eq!(
            world(&mut renderer, C, target),
            Transform3d::from_translation(4.0, 5.0, 6.0),
            "the most recent link wins"
        );

        renderer.remove_data_link(C, DataSlotId(8)).unwrap();
        assert!(
            renderer
                .links()
                .transformation_links()
                .node_has_data_link_to_provider(C, target)
        );
        assert_eq!(
            world(&mut renderer, C, target),
            Transform3d::from_translation(1.0, 2.0, 3.0)
        );

        renderer.remove_data_link(C, DataSlotId(7)).unwrap();
        assert_eq!(
            world(&mut renderer, C, target),
            Transform3d::from_translation(7.0, 0.0, 0.0)
        );
    }
}
