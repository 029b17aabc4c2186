// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Link-aware scene wrapper.
//!
//! A [`LinkAwareScene`] owns one [`SceneStore`] and routes every mutation
//! that may affect a cross-scene link through three independent
//! [`LinkStrategy`] objects before applying it to the store:
//!
//! - [`TransformLinkStrategy`] propagates matrix dirtiness and records which
//!   provider slots were reached, so their consumers in other scenes can be
//!   dirtied too.
//! - [`DataReferenceLinkStrategy`] keeps the fallback value of every data
//!   consumer slot and records provider writes that must be pushed.
//! - [`TextureLinkStrategy`] keeps the fallback sampler of every texture
//!   consumer slot and records provider texture changes.
//!
//! Scenes never reference each other. Work that crosses a scene boundary is
//! queued as [`PendingPropagation`] and carried out by the owning
//! [`RendererScenes`](crate::renderer::RendererScenes), which asks the link
//! managers to apply it to the affected consumer scenes.

mod data_reference;
mod texture;
mod transformation;

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::data::DataValue;
use crate::ids::{
    DataInstanceHandle, DataSlotHandle, NodeHandle, ResourceContentHash, SceneId,
    TextureSamplerHandle,
};
use crate::sampler::{SamplerContent, TextureSampler};
use crate::scene::{DataSlot, LinkKind, SceneChanges, SceneStore};

pub use data_reference::DataReferenceLinkStrategy;
pub use texture::TextureLinkStrategy;
pub use transformation::{TransformLinkStrategy, update_matrix_cache_with_links};

/// All live scenes of a renderer, keyed by id.
pub type SceneMap = BTreeMap<SceneId, LinkAwareScene>;

/// A local mutation about to be applied to a scene store.
///
/// Strategies see the mutation before the store does and may rewrite the
/// value that will be stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocalMutation {
    /// The local matrix or parent of a node changes.
    NodeTransform(NodeHandle),
    /// A data instance is assigned a value.
    DataValue(DataInstanceHandle, DataValue),
    /// A texture sampler is replaced.
    TextureSampler(TextureSamplerHandle, TextureSampler),
    /// A texture provider slot offers a new texture.
    SlotTexture(DataSlotHandle, ResourceContentHash),
    /// A data slot is about to be released.
    ReleaseDataSlot(DataSlotHandle),
}

/// Cross-scene work queued by a scene for its link managers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingPropagation {
    /// The node of a transformation provider slot became dirty.
    TransformDirty(DataSlotHandle),
    /// The data instance of a data provider slot changed value.
    DataChanged(DataSlotHandle),
    /// A texture provider slot offers a new texture.
    TextureChanged(DataSlotHandle),
}

/// One kind of link-dependent behavior plugged into a [`LinkAwareScene`].
///
/// All hooks default to no-ops.
pub trait LinkStrategy {
    /// A data slot was allocated.
    fn on_slot_allocated(&mut self, store: &SceneStore, handle: DataSlotHandle, slot: &DataSlot) {
        _ = (store, handle, slot);
    }

    /// A data slot was released.
    fn on_slot_released(&mut self, handle: DataSlotHandle, slot: &DataSlot) {
        _ = (handle, slot);
    }

    /// A local mutation is about to be applied to `store`.
    fn on_local_mutation(
        &mut self,
        store: &mut SceneStore,
        mutation: &mut LocalMutation,
        pending: &mut Vec<PendingPropagation>,
    ) {
        _ = (store, mutation, pending);
    }

    /// The link of consumer slot `handle` was removed.
    fn on_link_removed(
        &mut self,
        store: &mut SceneStore,
        handle: DataSlotHandle,
        slot: &DataSlot,
        pending: &mut Vec<PendingPropagation>,
    ) {
        _ = (store, handle, slot, pending);
    }
}

/// A scene store wrapped with link-dependent behavior.
#[derive(Debug)]
pub struct LinkAwareScene {
    id: SceneId,
    store: SceneStore,
    transform: TransformLinkStrategy,
    data: DataReferenceLinkStrategy,
    texture: TextureLinkStrategy,
    pending: Vec<PendingPropagation>,
}

impl LinkAwareScene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new(id: SceneId) -> Self {
        Self {
            id,
            store: SceneStore::new(),
            transform: TransformLinkStrategy::default(),
            data: DataReferenceLinkStrategy::default(),
            texture: TextureLinkStrategy::default(),
            pending: Vec::new(),
        }
    }

    /// The scene id.
    #[must_use]
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Read access to the wrapped store.
    #[must_use]
    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    /// The data reference strategy.
    #[must_use]
    pub fn data_strategy(&self) -> &DataReferenceLinkStrategy {
        &self.data
    }

    /// The texture strategy.
    #[must_use]
    pub fn texture_strategy(&self) -> &TextureLinkStrategy {
        &self.texture
    }

    // -- Nodes --

    /// Creates a root node.
    pub fn create_node(&mut self) -> NodeHandle {
        self.store.create_node()
    }

    /// Destroys a childless node.
    ///
    /// See [`SceneStore::destroy_node`].
    pub fn destroy_node(&mut self, node: NodeHandle) {
        self.store.destroy_node(node);
    }

    /// Adds `child` to `parent`, dirtying `child` and everything linked to it.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) {
        self.intercept(LocalMutation::NodeTransform(child));
        self.store.add_child(parent, child);
    }

    /// Detaches `child` from its parent, dirtying `child` and everything
    /// linked to it.
    pub fn remove_from_parent(&mut self, child: NodeHandle) {
        self.intercept(LocalMutation::NodeTransform(child));
        self.store.remove_from_parent(child);
    }

    /// Sets a node's translation.
    pub fn set_translation(&mut self, node: NodeHandle, translation: [f64; 3]) {
        self.intercept(LocalMutation::NodeTransform(node));
        self.store.set_translation(node, translation);
    }

    /// Sets a node's rotation (Euler degrees).
    pub fn set_rotation(&mut self, node: NodeHandle, rotation: [f64; 3]) {
        self.intercept(LocalMutation::NodeTransform(node));
        self.store.set_rotation(node, rotation);
    }

    /// Sets a node's scaling.
    pub fn set_scaling(&mut self, node: NodeHandle, scaling: [f64; 3]) {
        self.intercept(LocalMutation::NodeTransform(node));
        self.store.set_scaling(node, scaling);
    }

    // -- Data instances --

    /// Allocates a data instance.
    pub fn allocate_data_instance(&mut self, value: DataValue) -> DataInstanceHandle {
        self.store.allocate_data_instance(value)
    }

    /// Releases a data instance.
    pub fn release_data_instance(&mut self, instance: DataInstanceHandle) {
        self.store.release_data_instance(instance);
    }

    /// Writes a data instance locally.
    ///
    /// On a linked consumer only the fallback value changes. The linked value
    /// stays visible until the link is removed.
    pub fn set_data_value(&mut self, instance: DataInstanceHandle, value: DataValue) {
        if let LocalMutation::DataValue(instance, value) =
            self.intercept(LocalMutation::DataValue(instance, value))
        {
            self.store.set_data_value(instance, value);
        }
    }

    /// Writes a value pushed by a link without touching the fallback.
    ///
    /// Marks the instance as linked until the link manager reports the
    /// link removed, so only managers holding the link may call this.
    pub(crate) fn set_value_without_updating_fallback(
        &mut self,
        instance: DataInstanceHandle,
        value: DataValue,
    ) {
        self.store.set_data_value(instance, value);
        self.data.mark_linked(instance, &mut self.pending);
    }

    // -- Texture samplers --

    /// Allocates a texture sampler.
    pub fn allocate_texture_sampler(&mut self, sampler: TextureSampler) -> TextureSamplerHandle {
        self.store.allocate_texture_sampler(sampler)
    }

    /// Releases a texture sampler.
    pub fn release_texture_sampler(&mut self, sampler: TextureSamplerHandle) {
        self.store.release_texture_sampler(sampler);
    }

    /// Replaces a texture sampler locally.
    ///
    /// On a linked consumer the new addressing and filtering states apply
    /// immediately but the linked content is kept. The whole sampler becomes
    /// the fallback.
    pub fn set_texture_sampler(&mut self, handle: TextureSamplerHandle, sampler: TextureSampler) {
        if let LocalMutation::TextureSampler(handle, sampler) =
            self.intercept(LocalMutation::TextureSampler(handle, sampler))
        {
            self.store.set_texture_sampler(handle, sampler);
        }
    }

    /// Points a sampler at linked content without touching the fallback.
    ///
    /// Like [`set_value_without_updating_fallback`](Self::set_value_without_updating_fallback),
    /// only for managers holding the link.
    pub(crate) fn set_sampler_content_without_updating_fallback(
        &mut self,
        handle: TextureSamplerHandle,
        content: SamplerContent,
    ) {
        let mut sampler = self.store.texture_sampler(handle);
        sampler.content = content;
        self.store.set_texture_sampler(handle, sampler);
        self.texture.mark_linked(handle, content);
    }

    // -- Data slots --

    /// Allocates a data slot. Use
    /// [`RendererScenes::allocate_data_slot`](crate::renderer::RendererScenes::allocate_data_slot)
    /// to also report it to the link managers.
    pub(crate) fn allocate_data_slot(&mut self, slot: DataSlot) -> DataSlotHandle {
        let handle = self.store.allocate_data_slot(slot);
        let Self {
            store,
            transform,
            data,
            texture,
            ..
        } = self;
        let strategies: [&mut dyn LinkStrategy; 3] = [transform, data, texture];
        for strategy in strategies {
            strategy.on_slot_allocated(store, handle, &slot);
        }
        handle
    }

    /// Releases a data slot after its links were torn down.
    pub(crate) fn release_data_slot(&mut self, handle: DataSlotHandle) -> Option<DataSlot> {
        self.intercept(LocalMutation::ReleaseDataSlot(handle));
        let slot = self.store.release_data_slot(handle)?;
        let strategies: [&mut dyn LinkStrategy; 3] =
            [&mut self.transform, &mut self.data, &mut self.texture];
        for strategy in strategies {
            strategy.on_slot_released(handle, &slot);
        }
        Some(slot)
    }

    /// Changes the texture offered by a texture provider slot.
    ///
    /// Returns `false` if the slot is not allocated.
    pub fn set_data_slot_texture(
        &mut self,
        handle: DataSlotHandle,
        texture: ResourceContentHash,
    ) -> bool {
        if self.store.data_slot(handle).is_none() {
            return false;
        }
        self.intercept(LocalMutation::SlotTexture(handle, texture));
        self.store.set_data_slot_texture(handle, texture)
    }

    // -- Link callbacks --

    /// Dirties a node's matrices and queues propagation to everything linked
    /// below it.
    pub(crate) fn mark_transform_dirty(&mut self, node: NodeHandle) {
        self.intercept(LocalMutation::NodeTransform(node));
    }

    /// Reverts a consumer slot to its local state after its link was removed.
    ///
    /// Transformation consumers are dirtied, data and texture consumers get
    /// their fallback back.
    pub(crate) fn restore_fallback(&mut self, handle: DataSlotHandle) {
        let Some(slot) = self.store.data_slot(handle).copied() else {
            return;
        };
        let Self {
            store,
            transform,
            data,
            texture,
            pending,
            ..
        } = self;
        let strategy: &mut dyn LinkStrategy = match slot.slot_type.kind() {
            LinkKind::Transformation => transform,
            LinkKind::DataReference => data,
            LinkKind::Texture => texture,
        };
        strategy.on_link_removed(store, handle, &slot, pending);
    }

    /// Takes the queued cross-scene work.
    pub(crate) fn take_pending(&mut self) -> Vec<PendingPropagation> {
        core::mem::take(&mut self.pending)
    }

    /// Returns `true` if cross-scene work is queued.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Mutable store access for link resolution.
    pub(crate) fn store_mut(&mut self) -> &mut SceneStore {
        &mut self.store
    }

    /// Drains the change channels of the wrapped store.
    pub fn take_changes(&mut self) -> SceneChanges {
        self.store.take_changes()
    }

    fn intercept(&mut self, mutation: LocalMutation) -> LocalMutation {
        let mut mutation = mutation;
        let Self {
            store,
            transform,
            data,
            texture,
            pending,
            ..
        } = self;
        let strategies: [&mut dyn LinkStrategy; 3] = [transform, data, texture];
        for strategy in strategies {
            strategy.on_local_mutation(store, &mut mutation, pending);
        }
        mutation
    }
}
