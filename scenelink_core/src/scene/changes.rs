// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change reports drained from a scene.
//!
//! [`SceneChanges`] uses raw storage indices (`u32`) so that the renderer can
//! index directly into its own per-node, per-instance, and per-sampler GPU
//! state without going through handles.

use alloc::vec::Vec;

use crate::dirty;

use super::store::SceneStore;

/// Everything that changed in a scene since the previous
/// [`SceneStore::take_changes`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneChanges {
    /// Nodes whose matrix cache was invalidated.
    pub transforms: Vec<u32>,
    /// Data instances whose value changed.
    pub data_instances: Vec<u32>,
    /// Texture samplers that changed.
    pub samplers: Vec<u32>,
    /// Whether the node hierarchy changed.
    pub topology_changed: bool,
}

impl SceneChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.data_instances.clear();
        self.samplers.clear();
        self.topology_changed = false;
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.data_instances.is_empty()
            && self.samplers.is_empty()
            && !self.topology_changed
    }
}

impl SceneStore {
    /// Drains all change channels and returns what changed.
    pub fn take_changes(&mut self) -> SceneChanges {
        let mut changes = SceneChanges::default();
        self.take_changes_into(&mut changes);
        changes
    }

    /// Like [`take_changes`](Self::take_changes), but reuses a
    /// caller-provided buffer.
    pub fn take_changes_into(&mut self, changes: &mut SceneChanges) {
        changes.clear();

        changes.transforms = self
            .dirty
            .drain(dirty::TRANSFORM)
            .deterministic()
            .run()
            .collect();

        changes.data_instances = self
            .dirty
            .drain(dirty::DATA)
            .deterministic()
            .run()
            .collect();

        changes.samplers = self
            .dirty
            .drain(dirty::SAMPLER)
            .deterministic()
            .run()
            .collect();

        let topology: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();
        changes.topology_changed = !topology.is_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataValue;
    use crate::sampler::TextureSampler;

    #[test]
    fn changes_are_drained_once() {
        let mut store = SceneStore::new();
        let node = store.create_node();
        let first = store.take_changes();
        assert!(first.topology_changed);
        assert!(first.transforms.contains(&node.idx));

        assert!(store.take_changes().is_empty());
    }

    #[test]
    fn each_channel_reports_its_own_keys() {
        let mut store = SceneStore::new();
        let instance = store.allocate_data_instance(DataValue::Float(1.0));
        let sampler = store.allocate_texture_sampler(TextureSampler::default());
        let _ = store.take_changes();

        store.set_data_value(instance, DataValue::Float(2.0));
        let changes = store.take_changes();
        assert_eq!(changes.data_instances, [instance.0]);
        assert!(changes.samplers.is_empty());

        store.set_texture_sampler(sampler, TextureSampler::default());
        let changes = store.take_changes();
        assert_eq!(changes.samplers, [sampler.0]);
        assert!(!changes.topology_changed);
    }

    #[test]
    fn translation_reports_subtree() {
        let mut store = SceneStore::new();
        let root = store.create_node();
        let child = store.create_node();
        store.add_child(root, child);
        let _ = store.update_matrix_cache(super::super::MatrixType::World, child);
        let _ = store.take_changes();

        store.set_translation(root, [1.0, 0.0, 0.0]);
        let changes = store.take_changes();
        assert_eq!(changes.transforms, [root.idx, child.idx]);
    }
}
