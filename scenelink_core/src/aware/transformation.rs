// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transformation link behavior: dirty propagation and linked matrix
//! resolution.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::ids::{DataSlotHandle, NodeHandle, SceneId};
use crate::link::TransformationLinkManager;
use crate::scene::{DataSlot, DataSlotType, LinkKind, MatrixType, SceneStore};
use crate::transform::Transform3d;

use super::{LinkStrategy, LocalMutation, PendingPropagation, SceneMap};

/// Tracks transformation provider slots by node so that dirtying a node
/// reaches the consumers of every provider in its subtree.
#[derive(Clone, Debug, Default)]
pub struct TransformLinkStrategy {
    provider_slots: BTreeMap<NodeHandle, Vec<DataSlotHandle>>,
}

impl TransformLinkStrategy {
    /// Dirties the subtree of `node`, queueing every provider slot reached.
    fn propagate(
        &self,
        store: &mut SceneStore,
        node: NodeHandle,
        pending: &mut Vec<PendingPropagation>,
    ) {
        if !store.is_alive(node) {
            return;
        }
        store.propagate_matrix_dirty(node.index(), |dirtied| {
            log::trace!("matrix cache dirtied: {dirtied:?}");
            if let Some(slots) = self.provider_slots.get(&dirtied) {
                pending.extend(slots.iter().copied().map(PendingPropagation::TransformDirty));
            }
        });
    }
}

impl LinkStrategy for TransformLinkStrategy {
    fn on_slot_allocated(&mut self, _store: &SceneStore, handle: DataSlotHandle, slot: &DataSlot) {
        if slot.slot_type != DataSlotType::TransformationProvider {
            return;
        }
        if let Some(node) = slot.attached_node {
            self.provider_slots.entry(node).or_default().push(handle);
        }
    }

    fn on_slot_released(&mut self, handle: DataSlotHandle, slot: &DataSlot) {
        if slot.slot_type != DataSlotType::TransformationProvider {
            return;
        }
        let Some(node) = slot.attached_node else {
            return;
        };
        if let Some(slots) = self.provider_slots.get_mut(&node) {
            slots.retain(|&h| h != handle);
            if slots.is_empty() {
                self.provider_slots.remove(&node);
            }
        }
    }

    fn on_local_mutation(
        &mut self,
        store: &mut SceneStore,
        mutation: &mut LocalMutation,
        pending: &mut Vec<PendingPropagation>,
    ) {
        let node = match *mutation {
            LocalMutation::NodeTransform(node) => node,
            LocalMutation::ReleaseDataSlot(handle) => {
                let Some(node) = store
                    .data_slot(handle)
                    .filter(|s| s.slot_type.kind() == LinkKind::Transformation)
                    .and_then(|s| s.attached_node)
                else {
                    return;
                };
                node
            }
            _ => return,
        };
        self.propagate(store, node, pending);
    }

    fn on_link_removed(
        &mut self,
        store: &mut SceneStore,
        _handle: DataSlotHandle,
        slot: &DataSlot,
        pending: &mut Vec<PendingPropagation>,
    ) {
        if let Some(node) = slot.attached_node {
            self.propagate(store, node, pending);
        }
    }
}

/// Resolves and caches a node's matrix, following transformation links.
///
/// Scenes that consume no transformation take the plain
/// [`SceneStore::update_matrix_cache`] path. Otherwise the dirty chain from
/// `node` up to the first clean ancestor is resolved top-down: a linked
/// consumer node takes its provider node's resolved matrix verbatim
/// (resolving the provider scene recursively), every other node composes its
/// local transform onto its parent.
///
/// Pending cross-scene propagation must have been flushed first (see
/// [`RendererScenes::flush_link_propagation`](crate::renderer::RendererScenes::flush_link_propagation)).
///
/// Returns `None` if the scene does not exist or the node is not alive.
pub fn update_matrix_cache_with_links(
    scenes: &mut SceneMap,
    links: &TransformationLinkManager,
    matrix_type: MatrixType,
    scene: SceneId,
    node: NodeHandle,
) -> Option<Transform3d> {
    let store = scenes.get_mut(&scene)?.store_mut();
    if !store.is_alive(node) {
        return None;
    }
    if !links.dependencies().has_dependency_as_consumer(scene) {
        return Some(store.update_matrix_cache(matrix_type, node));
    }

    let chain = store.dirty_chain(matrix_type, node.index());
    for &idx in chain.iter().rev() {
        let handle = scenes.get(&scene)?.store().handle_at(idx)?;
        let linked = links
            .linked_provider_node(scene, handle)
            .and_then(|(provider_scene, provider_node)| {
                log::trace!(
                    "resolving {matrix_type:?} matrix of scene {scene} {handle:?} through scene {provider_scene} {provider_node:?}"
                );
                update_matrix_cache_with_links(
                    scenes,
                    links,
                    matrix_type,
                    provider_scene,
                    provider_node,
                )
            });
        let store = scenes.get_mut(&scene)?.store_mut();
        let m = linked.unwrap_or_else(|| store.compose_with_parent(matrix_type, idx));
        store.set_cached_matrix(matrix_type, idx, m);
    }
    Some(scenes.get(&scene)?.store().cached_matrix(matrix_type, node.index()))
}
