// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data reference links.

use alloc::vec::Vec;

use crate::aware::SceneMap;
use crate::config::RelinkPolicy;
use crate::data::DataValue;
use crate::error::LinkError;
use crate::ids::{DataInstanceHandle, DataSlotHandle, SceneId};
use crate::scene::LinkKind;

use super::{DependencyChecker, LinkManager, LinkManagerBase, SceneLink};

/// Links consumer data instances to provider data instances.
///
/// The provider value is pushed into the consumer when the link is created
/// and on every provider write.
/// [`resolve_links_for_consumer_scene`](Self::resolve_links_for_consumer_scene)
/// pulls all provider values of one consumer scene again.
#[derive(Debug)]
pub struct DataReferenceLinkManager {
    base: LinkManagerBase,
}

impl Default for DataReferenceLinkManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Instance attached to an allocated slot, if the instance exists.
fn attached_instance(
    scenes: &SceneMap,
    scene: SceneId,
    slot: DataSlotHandle,
) -> Option<DataInstanceHandle> {
    let store = scenes.get(&scene)?.store();
    let instance = store.data_slot(slot)?.attached_data_reference;
    store.has_data_instance(instance).then_some(instance)
}

impl DataReferenceLinkManager {
    /// Creates a manager without links.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: LinkManagerBase::new(LinkKind::DataReference),
        }
    }

    /// The scene dependency graph of data reference links.
    #[must_use]
    pub fn dependencies(&self) -> &DependencyChecker {
        self.base.dependencies()
    }

    /// Links a data consumer slot to a provider slot and pushes the current
    /// provider value.
    ///
    /// Both instances must hold values of the same type.
    pub fn create_data_link(
        &mut self,
        scenes: &mut SceneMap,
        link: SceneLink,
        policy: RelinkPolicy,
    ) -> Result<(), LinkError> {
        let (provider, consumer) = self.base.check_link(scenes, &link, policy)?;
        let provider_value = Self::provider_value(scenes, link.provider_scene, link.provider_slot)
            .ok_or(LinkError::InvalidSlotId {
                scene: link.provider_scene,
                slot: provider.id,
            })?;
        let consumer_instance = attached_instance(scenes, link.consumer_scene, link.consumer_slot)
            .ok_or(LinkError::InvalidSlotId {
                scene: link.consumer_scene,
                slot: consumer.id,
            })?;
        let consumer_type = scenes
            .get(&link.consumer_scene)
            .map(|s| s.store().data_value(consumer_instance).data_type());
        if consumer_type != Some(provider_value.data_type()) {
            return Err(LinkError::DataTypeMismatch {
                provider: provider_value.data_type(),
                consumer: consumer_type.unwrap_or(provider_value.data_type()),
            });
        }

        self.base.record(link);
        if let Some(scene) = scenes.get_mut(&link.consumer_scene) {
            scene.set_value_without_updating_fallback(consumer_instance, provider_value);
        }
        Ok(())
    }

    /// Pushes the current value of a provider slot to all its consumers.
    pub fn push_provider_value(
        &self,
        scenes: &mut SceneMap,
        provider_scene: SceneId,
        provider_slot: DataSlotHandle,
    ) {
        let Some(value) = Self::provider_value(scenes, provider_scene, provider_slot) else {
            return;
        };
        let consumers: Vec<SceneLink> = self
            .base
            .table()
            .linked_consumers((provider_scene, provider_slot))
            .copied()
            .collect();
        for link in consumers {
            Self::write_consumer(scenes, &link, value);
        }
    }

    /// Pulls the provider value into every linked consumer of `scene`.
    pub fn resolve_links_for_consumer_scene(&self, scenes: &mut SceneMap, scene: SceneId) {
        let links: Vec<SceneLink> = self
            .base
            .table()
            .links_for_consumer_scene(scene)
            .copied()
            .collect();
        for link in links {
            if let Some(value) = Self::provider_value(scenes, link.provider_scene, link.provider_slot)
            {
                Self::write_consumer(scenes, &link, value);
            }
        }
    }

    fn provider_value(
        scenes: &SceneMap,
        scene: SceneId,
        slot: DataSlotHandle,
    ) -> Option<DataValue> {
        let instance = attached_instance(scenes, scene, slot)?;
        Some(scenes.get(&scene)?.store().data_value(instance))
    }

    fn write_consumer(scenes: &mut SceneMap, link: &SceneLink, value: DataValue) {
        let Some(instance) = attached_instance(scenes, link.consumer_scene, link.consumer_slot)
        else {
            return;
        };
        if let Some(scene) = scenes.get_mut(&link.consumer_scene) {
            scene.set_value_without_updating_fallback(instance, value);
        }
    }
}

impl LinkManager for DataReferenceLinkManager {
    fn base(&self) -> &LinkManagerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LinkManagerBase {
        &mut self.base
    }

    fn release_consumer(&mut self, scenes: &mut SceneMap, scene: SceneId, slot: DataSlotHandle) {
        if let Some(s) = scenes.get_mut(&scene) {
            s.restore_fallback(slot);
        }
    }
}
