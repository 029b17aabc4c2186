// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays scene storage: nodes, data instances, samplers, slots.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker};

use crate::data::DataValue;
use crate::dirty;
use crate::ids::{
    DataInstanceHandle, DataSlotHandle, DataSlotId, INVALID, NodeHandle, ResourceContentHash,
    TextureSamplerHandle,
};
use crate::sampler::TextureSampler;
use crate::transform::Transform3d;

use super::matrix::MatrixType;
use super::slot::DataSlot;
use super::traverse::Children;

/// Storage for one scene.
///
/// Nodes are addressed by generational [`NodeHandle`]s and live in parallel
/// arrays recycled through a free list. Data instances, texture samplers,
/// and data slots are addressed by plain index handles.
///
/// Each node owns a lazily computed matrix cache (world and object) with one
/// dirty bit per matrix type. Mutations that affect a node's matrices mark
/// the node and its whole subtree dirty, stopping at nodes that are already
/// dirty.
#[derive(Debug)]
pub struct SceneStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local transform (set by callers) --
    pub(crate) translation: Vec<[f64; 3]>,
    pub(crate) rotation: Vec<[f64; 3]>,
    pub(crate) scaling: Vec<[f64; 3]>,

    // -- Matrix cache (written by resolution) --
    pub(crate) world_matrix: Vec<Transform3d>,
    pub(crate) object_matrix: Vec<Transform3d>,
    pub(crate) matrix_dirty: Vec<[bool; 2]>,

    // -- Node allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Data, samplers, slots --
    pub(crate) data_instances: Vec<Option<DataValue>>,
    pub(crate) samplers: Vec<Option<TextureSampler>>,
    pub(crate) data_slots: Vec<Option<DataSlot>>,

    // -- Change tracking --
    pub(crate) dirty: DirtyTracker<u32>,
    pub(crate) worklist: Vec<u32>,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneStore {
    /// Creates an empty scene store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            translation: Vec::new(),
            rotation: Vec::new(),
            scaling: Vec::new(),
            world_matrix: Vec::new(),
            object_matrix: Vec::new(),
            matrix_dirty: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            data_instances: Vec::new(),
            samplers: Vec::new(),
            data_slots: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            worklist: Vec::new(),
        }
    }

    // -- Node allocation --

    /// Creates a new root node with an identity local transform.
    ///
    /// The node's matrix cache starts dirty.
    pub fn create_node(&mut self) -> NodeHandle {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.translation[i] = [0.0; 3];
            self.rotation[i] = [0.0; 3];
            self.scaling[i] = [1.0; 3];
            self.world_matrix[i] = Transform3d::IDENTITY;
            self.object_matrix[i] = Transform3d::IDENTITY;
            self.matrix_dirty[i] = [true; 2];
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.translation.push([0.0; 3]);
            self.rotation.push([0.0; 3]);
            self.scaling.push([1.0; 3]);
            self.world_matrix.push(Transform3d::IDENTITY);
            self.object_matrix.push(Transform3d::IDENTITY);
            self.matrix_dirty.push([true; 2]);
            self.generation.push(0);
            idx
        };

        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark(idx, dirty::TRANSFORM);

        NodeHandle {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the node has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_node(&mut self, node: NodeHandle) {
        self.validate(node);
        let idx = node.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }

        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, node: NodeHandle) -> bool {
        (node.idx < self.len)
            && self.generation[node.idx as usize] == node.generation
            && !self.free_list.contains(&node.idx)
    }

    // -- Topology --

    /// Adds `child` as the last child of `parent`.
    ///
    /// Marks the matrix cache of `child`'s subtree dirty.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        self.propagate_matrix_dirty(c, |_| {});
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `child` from its current parent.
    ///
    /// Marks the matrix cache of `child`'s subtree dirty.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeHandle) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "node has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);

        self.propagate_matrix_dirty(c, |_| {});
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.validate(node);
        self.handle_at(self.parent[node.idx as usize])
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, node: NodeHandle) -> Children<'_> {
        self.validate(node);
        Children::new(self, self.first_child[node.idx as usize])
    }

    // -- Local transform --

    /// Returns the local translation of a node.
    #[must_use]
    pub fn translation(&self, node: NodeHandle) -> [f64; 3] {
        self.validate(node);
        self.translation[node.idx as usize]
    }

    /// Returns the local rotation of a node (Euler degrees).
    #[must_use]
    pub fn rotation(&self, node: NodeHandle) -> [f64; 3] {
        self.validate(node);
        self.rotation[node.idx as usize]
    }

    /// Returns the local scaling of a node.
    #[must_use]
    pub fn scaling(&self, node: NodeHandle) -> [f64; 3] {
        self.validate(node);
        self.scaling[node.idx as usize]
    }

    /// Sets the local translation of a node and dirties its subtree.
    pub fn set_translation(&mut self, node: NodeHandle, translation: [f64; 3]) {
        self.validate(node);
        self.translation[node.idx as usize] = translation;
        self.propagate_matrix_dirty(node.idx, |_| {});
    }

    /// Sets the local rotation (Euler degrees) of a node and dirties its
    /// subtree.
    pub fn set_rotation(&mut self, node: NodeHandle, rotation: [f64; 3]) {
        self.validate(node);
        self.rotation[node.idx as usize] = rotation;
        self.propagate_matrix_dirty(node.idx, |_| {});
    }

    /// Sets the local scaling of a node and dirties its subtree.
    pub fn set_scaling(&mut self, node: NodeHandle, scaling: [f64; 3]) {
        self.validate(node);
        self.scaling[node.idx as usize] = scaling;
        self.propagate_matrix_dirty(node.idx, |_| {});
    }

    // -- Data instances --

    /// Allocates a data instance holding `value`.
    pub fn allocate_data_instance(&mut self, value: DataValue) -> DataInstanceHandle {
        let handle = DataInstanceHandle(alloc_index(&mut self.data_instances, value));
        self.dirty.mark(handle.0, dirty::DATA);
        handle
    }

    /// Releases a data instance.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not allocated.
    pub fn release_data_instance(&mut self, instance: DataInstanceHandle) {
        match self.data_instances.get_mut(instance.0 as usize) {
            Some(v) if v.is_some() => *v = None,
            _ => panic!("invalid {instance:?}"),
        }
    }

    /// Returns `true` if the data instance is allocated.
    #[must_use]
    pub fn has_data_instance(&self, instance: DataInstanceHandle) -> bool {
        matches!(self.data_instances.get(instance.0 as usize), Some(Some(_)))
    }

    /// Returns the value of a data instance.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not allocated.
    #[must_use]
    pub fn data_value(&self, instance: DataInstanceHandle) -> DataValue {
        match self.data_instances.get(instance.0 as usize) {
            Some(Some(v)) => *v,
            _ => panic!("invalid {instance:?}"),
        }
    }

    /// Sets the value of a data instance.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not allocated or `value` has a different type
    /// than the current value.
    pub fn set_data_value(&mut self, instance: DataInstanceHandle, value: DataValue) {
        match self.data_instances.get_mut(instance.0 as usize) {
            Some(Some(v)) => {
                assert!(
                    v.data_type() == value.data_type(),
                    "data type mismatch: {:?} cannot hold {:?}",
                    v.data_type(),
                    value.data_type()
                );
                *v = value;
            }
            _ => panic!("invalid {instance:?}"),
        }
        self.dirty.mark(instance.0, dirty::DATA);
    }

    // -- Texture samplers --

    /// Allocates a texture sampler.
    pub fn allocate_texture_sampler(&mut self, sampler: TextureSampler) -> TextureSamplerHandle {
        let handle = TextureSamplerHandle(alloc_index(&mut self.samplers, sampler));
        self.dirty.mark(handle.0, dirty::SAMPLER);
        handle
    }

    /// Releases a texture sampler.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not allocated.
    pub fn release_texture_sampler(&mut self, sampler: TextureSamplerHandle) {
        match self.samplers.get_mut(sampler.0 as usize) {
            Some(s) if s.is_some() => *s = None,
            _ => panic!("invalid {sampler:?}"),
        }
    }

    /// Returns `true` if the sampler is allocated.
    #[must_use]
    pub fn has_texture_sampler(&self, sampler: TextureSamplerHandle) -> bool {
        matches!(self.samplers.get(sampler.0 as usize), Some(Some(_)))
    }

    /// Returns a texture sampler.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not allocated.
    #[must_use]
    pub fn texture_sampler(&self, sampler: TextureSamplerHandle) -> TextureSampler {
        match self.samplers.get(sampler.0 as usize) {
            Some(Some(s)) => *s,
            _ => panic!("invalid {sampler:?}"),
        }
    }

    /// Replaces a texture sampler.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not allocated.
    pub fn set_texture_sampler(&mut self, handle: TextureSamplerHandle, sampler: TextureSampler) {
        match self.samplers.get_mut(handle.0 as usize) {
            Some(Some(s)) => *s = sampler,
            _ => panic!("invalid {handle:?}"),
        }
        self.dirty.mark(handle.0, dirty::SAMPLER);
    }

    // -- Data slots --

    /// Allocates a data slot.
    pub fn allocate_data_slot(&mut self, slot: DataSlot) -> DataSlotHandle {
        DataSlotHandle(alloc_index(&mut self.data_slots, slot))
    }

    /// Releases a data slot, returning it if it was allocated.
    pub fn release_data_slot(&mut self, handle: DataSlotHandle) -> Option<DataSlot> {
        self.data_slots.get_mut(handle.0 as usize)?.take()
    }

    /// Returns a data slot, if allocated.
    #[must_use]
    pub fn data_slot(&self, handle: DataSlotHandle) -> Option<&DataSlot> {
        self.data_slots.get(handle.0 as usize)?.as_ref()
    }

    /// Iterates over all allocated data slots in handle order.
    pub fn data_slots(&self) -> impl Iterator<Item = (DataSlotHandle, &DataSlot)> + '_ {
        self.data_slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| Some((DataSlotHandle(u32::try_from(i).ok()?), s.as_ref()?)))
    }

    /// Finds the first allocated slot with `id` accepted by `filter`.
    pub fn find_data_slot(
        &self,
        id: DataSlotId,
        mut filter: impl FnMut(&DataSlot) -> bool,
    ) -> Option<DataSlotHandle> {
        self.data_slots()
            .find(|(_, s)| s.id == id && filter(s))
            .map(|(h, _)| h)
    }

    /// Changes the texture offered by a texture provider slot.
    ///
    /// Returns `false` if the slot is not allocated.
    pub fn set_data_slot_texture(
        &mut self,
        handle: DataSlotHandle,
        texture: ResourceContentHash,
    ) -> bool {
        match self.data_slots.get_mut(handle.0 as usize) {
            Some(Some(slot)) => {
                slot.texture_resource = texture;
                true
            }
            _ => false,
        }
    }

    // -- Matrix dirtiness --

    /// Returns `true` if the cached `matrix_type` matrix of `node` is stale.
    #[must_use]
    pub fn is_matrix_dirty(&self, matrix_type: MatrixType, node: NodeHandle) -> bool {
        self.validate(node);
        self.matrix_dirty[node.idx as usize][matrix_type.index()]
    }

    /// Marks the matrix cache of `idx` and its subtree dirty.
    ///
    /// Traversal does not descend below nodes that are already dirty for
    /// both matrix types, so every node is visited at most once per call.
    /// `on_dirtied` is invoked for each node that was not fully dirty.
    pub(crate) fn propagate_matrix_dirty(
        &mut self,
        idx: u32,
        mut on_dirtied: impl FnMut(NodeHandle),
    ) {
        let mut worklist = core::mem::take(&mut self.worklist);
        debug_assert!(worklist.is_empty(), "reentrant dirty propagation");
        worklist.push(idx);
        while let Some(n) = worklist.pop() {
            let i = n as usize;
            if self.matrix_dirty[i] == [true; 2] {
                continue;
            }
            self.matrix_dirty[i] = [true; 2];
            self.dirty.mark(n, dirty::TRANSFORM);
            on_dirtied(NodeHandle {
                idx: n,
                generation: self.generation[i],
            });

            let mut child = self.first_child[i];
            while child != INVALID {
                worklist.push(child);
                child = self.next_sibling[child as usize];
            }
        }
        self.worklist = worklist;
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, node: NodeHandle) {
        assert!(
            node.idx < self.len && self.generation[node.idx as usize] == node.generation,
            "stale NodeHandle: {node:?} (current gen: {})",
            if node.idx < self.len {
                self.generation[node.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Converts a raw index into a handle with the current generation.
    pub(crate) fn handle_at(&self, idx: u32) -> Option<NodeHandle> {
        (idx != INVALID).then(|| NodeHandle {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}

/// Stores `value` in the first free entry of `entries` and returns its index.
fn alloc_index<T>(entries: &mut Vec<Option<T>>, value: T) -> u32 {
    let idx = match entries.iter().position(Option::is_none) {
        Some(idx) => {
            entries[idx] = Some(value);
            idx
        }
        None => {
            entries.push(Some(value));
            entries.len() - 1
        }
    };
    u32::try_from(idx).unwrap_or(INVALID)
}
