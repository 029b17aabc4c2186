// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transformation links.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::aware::SceneMap;
use crate::config::RelinkPolicy;
use crate::error::LinkError;
use crate::ids::{DataSlotHandle, NodeHandle, SceneId};
use crate::scene::LinkKind;

use super::{DependencyChecker, LinkManager, LinkManagerBase, SceneLink};

/// Links consumer nodes to provider nodes in other scenes.
///
/// A linked consumer node's world and object matrices equal the provider
/// node's resolved matrices. The consumer's own local transform and its
/// ancestors are ignored, and its children compose on top of the provider's
/// matrix.
///
/// Several consumer slots may share one node. The node stays linked while
/// any of them is, and follows the provider of the most recent link.
#[derive(Debug)]
pub struct TransformationLinkManager {
    base: LinkManagerBase,
    consumer_nodes: BTreeMap<(SceneId, NodeHandle), Vec<(DataSlotHandle, ProviderNode)>>,
}

type ProviderNode = (SceneId, NodeHandle);

impl Default for TransformationLinkManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformationLinkManager {
    /// Creates a manager without links.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: LinkManagerBase::new(LinkKind::Transformation),
            consumer_nodes: BTreeMap::new(),
        }
    }

    /// The scene dependency graph of transformation links.
    #[must_use]
    pub fn dependencies(&self) -> &DependencyChecker {
        self.base.dependencies()
    }

    /// Links a transformation consumer slot to a provider slot.
    ///
    /// The consumer node and its subtree are dirtied, along with everything
    /// linked below them.
    pub fn create_data_link(
        &mut self,
        scenes: &mut SceneMap,
        link: SceneLink,
        policy: RelinkPolicy,
    ) -> Result<(), LinkError> {
        let (provider, consumer) = self.base.check_link(scenes, &link, policy)?;
        let (Some(provider_node), Some(consumer_node)) =
            (provider.attached_node, consumer.attached_node)
        else {
            return Err(LinkError::InvalidSlotId {
                scene: link.consumer_scene,
                slot: consumer.id,
            });
        };

        self.base.record(link);
        let entries = self
            .consumer_nodes
            .entry((link.consumer_scene, consumer_node))
            .or_default();
        entries.retain(|&(slot, _)| slot != link.consumer_slot);
        entries.push((link.consumer_slot, (link.provider_scene, provider_node)));
        if let Some(scene) = scenes.get_mut(&link.consumer_scene) {
            scene.mark_transform_dirty(consumer_node);
        }
        Ok(())
    }

    /// Returns `true` if `node` takes its matrices from a provider.
    #[must_use]
    pub fn node_has_data_link_to_provider(&self, scene: SceneId, node: NodeHandle) -> bool {
        self.consumer_nodes.contains_key(&(scene, node))
    }

    /// The provider node feeding a consumer node.
    #[must_use]
    pub fn linked_provider_node(
        &self,
        scene: SceneId,
        node: NodeHandle,
    ) -> Option<(SceneId, NodeHandle)> {
        self.consumer_nodes
            .get(&(scene, node))
            .and_then(|entries| entries.last())
            .map(|&(_, provider)| provider)
    }

    /// Dirties the consumer nodes of every link fed by a provider slot.
    ///
    /// Consumer scenes queue further propagation for providers in the
    /// dirtied subtrees.
    pub fn propagate_transformation_dirtiness_to_consumers(
        &self,
        scenes: &mut SceneMap,
        provider_scene: SceneId,
        provider_slot: DataSlotHandle,
    ) {
        let consumers: Vec<SceneLink> = self
            .base
            .table()
            .linked_consumers((provider_scene, provider_slot))
            .copied()
            .collect();
        for link in consumers {
            let Some(scene) = scenes.get_mut(&link.consumer_scene) else {
                continue;
            };
            let node = scene
                .store()
                .data_slot(link.consumer_slot)
                .and_then(|s| s.attached_node);
            if let Some(node) = node {
                scene.mark_transform_dirty(node);
            }
        }
    }
}

impl LinkManager for TransformationLinkManager {
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
        if let Some(node) = s.store().data_slot(slot).and_then(|s| s.attached_node)
            && let Some(entries) = self.consumer_nodes.get_mut(&(scene, node))
        {
            entries.retain(|&(linked, _)| linked != slot);
            if entries.is_empty() {
                self.consumer_nodes.remove(&(scene, node));
            }
        }
        s.restore_fallback(slot);
    }
}
