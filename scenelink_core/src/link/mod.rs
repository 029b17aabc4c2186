// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-scene link managers.
//!
//! Each link kind has its own manager owning one [`LinkTable`] and one
//! [`DependencyChecker`]:
//!
//! - [`TransformationLinkManager`]: a consumer node takes over the matrices
//!   of a provider node. Resolution is lazy (pull), see
//!   [`update_matrix_cache_with_links`](crate::aware::update_matrix_cache_with_links).
//! - [`DataReferenceLinkManager`]: a consumer data instance takes over the
//!   value of a provider data instance. Values are pushed on every provider
//!   write and can be pulled again per frame.
//! - [`TextureLinkManager`]: a consumer sampler reads a provider's texture
//!   or a renderer-owned offscreen buffer. New textures are pushed.
//!
//! [`SceneLinksManager`] composes the three and routes requests by slot
//! type. The managers never own scenes. Every call that touches scene state
//! borrows the [`SceneMap`] owned by the caller.
//!
//! # Validation
//!
//! Link requests are validated completely before anything is recorded, so a
//! rejected request leaves no trace other than its failure event.

mod data_reference;
mod dependency;
mod manager;
mod table;
mod texture;
mod transformation;

use alloc::vec::Vec;

use crate::aware::SceneMap;
use crate::config::RelinkPolicy;
use crate::error::LinkError;
use crate::ids::{DataSlotHandle, DataSlotId, OffscreenBufferHandle, SceneId};
use crate::scene::{DataSlot, LinkKind};

pub use data_reference::DataReferenceLinkManager;
pub use dependency::DependencyChecker;
pub use manager::SceneLinksManager;
pub use table::{BufferLink, ConsumerKey, Link, LinkTable, SceneLink};
pub use texture::TextureLinkManager;
pub use transformation::TransformationLinkManager;

/// A link removed by an unlink request or a teardown cascade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemovedLink {
    /// Provider scene, [`SceneId::INVALID`] for buffer links.
    pub provider_scene: SceneId,
    /// Provider slot, invalid for buffer links.
    pub provider_slot: DataSlotHandle,
    /// Provider buffer, invalid for scene links.
    pub provider_buffer: OffscreenBufferHandle,
    /// Consumer scene.
    pub consumer_scene: SceneId,
    /// Consumer slot.
    pub consumer_slot: DataSlotHandle,
}

impl From<SceneLink> for RemovedLink {
    fn from(link: SceneLink) -> Self {
        Self {
            provider_scene: link.provider_scene,
            provider_slot: link.provider_slot,
            provider_buffer: OffscreenBufferHandle::INVALID,
            consumer_scene: link.consumer_scene,
            consumer_slot: link.consumer_slot,
        }
    }
}

impl From<BufferLink> for RemovedLink {
    fn from(link: BufferLink) -> Self {
        Self {
            provider_scene: SceneId::INVALID,
            provider_slot: DataSlotHandle::INVALID,
            provider_buffer: link.provider_buffer,
            consumer_scene: link.consumer_scene,
            consumer_slot: link.consumer_slot,
        }
    }
}

/// Looks up an allocated slot by handle.
fn slot_at(scenes: &SceneMap, scene: SceneId, handle: DataSlotHandle) -> Result<DataSlot, LinkError> {
    let s = scenes.get(&scene).ok_or(LinkError::InvalidSceneId(scene))?;
    s.store()
        .data_slot(handle)
        .copied()
        .ok_or(LinkError::InvalidSlotId {
            scene,
            slot: DataSlotId::INVALID,
        })
}

/// Link table, dependency graph, and validation shared by the three
/// concrete managers.
#[derive(Debug)]
pub struct LinkManagerBase {
    kind: LinkKind,
    table: LinkTable<SceneLink>,
    dependencies: DependencyChecker,
}

impl LinkManagerBase {
    /// Creates an empty manager base for `kind`.
    #[must_use]
    pub fn new(kind: LinkKind) -> Self {
        Self {
            kind,
            table: LinkTable::new(),
            dependencies: DependencyChecker::new(),
        }
    }

    /// The link kind.
    #[must_use]
    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    /// The scene-to-scene links.
    #[must_use]
    pub fn table(&self) -> &LinkTable<SceneLink> {
        &self.table
    }

    /// The scene dependency graph of this link kind.
    #[must_use]
    pub fn dependencies(&self) -> &DependencyChecker {
        &self.dependencies
    }

    /// Validates a link request and returns the provider and consumer slots.
    ///
    /// Checks, in order: both scenes exist, both slots are allocated, both
    /// slots point in the right direction, both belong to this link kind,
    /// the link does not close a dependency cycle, and the relink policy
    /// allows replacing an existing link.
    pub fn check_link(
        &self,
        scenes: &SceneMap,
        link: &SceneLink,
        policy: RelinkPolicy,
    ) -> Result<(DataSlot, DataSlot), LinkError> {
        let provider = slot_at(scenes, link.provider_scene, link.provider_slot)?;
        let consumer = slot_at(scenes, link.consumer_scene, link.consumer_slot)?;

        if !provider.slot_type.is_provider() {
            return Err(LinkError::WrongSlotDirection {
                scene: link.provider_scene,
                slot: provider.id,
                found: provider.slot_type,
            });
        }
        if !consumer.slot_type.is_consumer() {
            return Err(LinkError::WrongSlotDirection {
                scene: link.consumer_scene,
                slot: consumer.id,
                found: consumer.slot_type,
            });
        }
        if provider.slot_type.kind() != self.kind || consumer.slot_type.kind() != self.kind {
            return Err(LinkError::SlotKindMismatch {
                provider: provider.slot_type,
                consumer: consumer.slot_type,
            });
        }
        if self
            .dependencies
            .would_create_cycle(link.consumer_scene, link.provider_scene)
        {
            return Err(LinkError::CyclicDependency {
                consumer: link.consumer_scene,
                provider: link.provider_scene,
            });
        }
        if policy == RelinkPolicy::Reject
            && self
                .table
                .linked_provider(link.consumer_scene, link.consumer_slot)
                .is_some()
        {
            return Err(LinkError::ConsumerAlreadyLinked {
                scene: link.consumer_scene,
                slot: consumer.id,
            });
        }
        Ok((provider, consumer))
    }

    /// Validates that `handle` is an allocated consumer slot of this kind.
    ///
    /// Used for links whose provider is not a scene slot.
    pub fn check_consumer(
        &self,
        scenes: &SceneMap,
        scene: SceneId,
        handle: DataSlotHandle,
    ) -> Result<DataSlot, LinkError> {
        let slot = slot_at(scenes, scene, handle)?;
        if !slot.slot_type.is_consumer() {
            return Err(LinkError::WrongSlotDirection {
                scene,
                slot: slot.id,
                found: slot.slot_type,
            });
        }
        if slot.slot_type.kind() != self.kind {
            return Err(LinkError::SlotKindMismatch {
                provider: self.kind.provider_type(),
                consumer: slot.slot_type,
            });
        }
        Ok(slot)
    }

    /// Records a validated link and returns the link it replaced.
    pub(crate) fn record(&mut self, link: SceneLink) -> Option<SceneLink> {
        let replaced = self.table.link_slots(link);
        if let Some(old) = replaced {
            self.dependencies
                .remove_dependency(old.consumer_scene, old.provider_scene);
        }
        self.dependencies
            .add_dependency(link.consumer_scene, link.provider_scene);
        replaced
    }

    /// Removes the link of a consumer slot, validating the request.
    pub(crate) fn unlink(
        &mut self,
        scenes: &SceneMap,
        scene: SceneId,
        handle: DataSlotHandle,
    ) -> Result<SceneLink, LinkError> {
        let slot = self
            .check_consumer(scenes, scene, handle)
            .map_err(|e| match e {
                LinkError::WrongSlotDirection { scene, slot, .. } => {
                    LinkError::UnlinkWrongDirection { scene, slot }
                }
                e => e,
            })?;
        self.remove_links_for_consumer(scene, handle)
            .ok_or(LinkError::NoLinkForConsumer {
                scene,
                slot: slot.id,
            })
    }

    /// Removes the link of a consumer slot without validation.
    pub(crate) fn remove_links_for_consumer(
        &mut self,
        scene: SceneId,
        handle: DataSlotHandle,
    ) -> Option<SceneLink> {
        let link = self.table.remove_links_for_consumer(scene, handle)?;
        self.forget(&link);
        Some(link)
    }

    pub(crate) fn remove_links_for_provider(
        &mut self,
        scene: SceneId,
        handle: DataSlotHandle,
    ) -> Vec<SceneLink> {
        let removed = self.table.remove_links_for_provider((scene, handle));
        removed.iter().for_each(|l| self.forget(l));
        removed
    }

    pub(crate) fn remove_links_for_provider_scene(&mut self, scene: SceneId) -> Vec<SceneLink> {
        let removed = self.table.remove_links_for_provider_scene(scene);
        removed.iter().for_each(|l| self.forget(l));
        removed
    }

    pub(crate) fn remove_links_for_consumer_scene(&mut self, scene: SceneId) -> Vec<SceneLink> {
        let removed = self.table.remove_links_for_consumer_scene(scene);
        removed.iter().for_each(|l| self.forget(l));
        removed
    }

    fn forget(&mut self, link: &SceneLink) {
        self.dependencies
            .remove_dependency(link.consumer_scene, link.provider_scene);
    }
}

/// Behavior shared by the three concrete link managers.
///
/// Implementors provide the kind-specific reaction to a consumer losing its
/// link. Teardown cascades are provided on top of it.
pub trait LinkManager {
    /// The shared table and dependency graph.
    fn base(&self) -> &LinkManagerBase;

    /// Mutable access to the shared table and dependency graph.
    fn base_mut(&mut self) -> &mut LinkManagerBase;

    /// Reverts a consumer slot to its local state after its link was
    /// removed.
    fn release_consumer(&mut self, scenes: &mut SceneMap, scene: SceneId, slot: DataSlotHandle);

    /// Removes the link of a consumer slot and reverts the consumer.
    fn remove_data_link(
        &mut self,
        scenes: &mut SceneMap,
        scene: SceneId,
        slot: DataSlotHandle,
    ) -> Result<RemovedLink, LinkError> {
        let link = self.base_mut().unlink(scenes, scene, slot)?;
        self.release_consumer(scenes, scene, slot);
        Ok(link.into())
    }

    /// Removes every link touching a slot that is about to be destroyed.
    ///
    /// A provider slot loses all its consumers, in link creation order.
    fn remove_links_for_slot(
        &mut self,
        scenes: &mut SceneMap,
        scene: SceneId,
        handle: DataSlotHandle,
        slot: &DataSlot,
    ) -> Vec<RemovedLink> {
        let removed = if slot.slot_type.is_provider() {
            self.base_mut().remove_links_for_provider(scene, handle)
        } else {
            self.base_mut()
                .remove_links_for_consumer(scene, handle)
                .into_iter()
                .collect()
        };
        self.release_all(scenes, removed)
    }

    /// Removes every link fed by `scene`.
    fn remove_links_for_provider_scene(
        &mut self,
        scenes: &mut SceneMap,
        scene: SceneId,
    ) -> Vec<RemovedLink> {
        let removed = self.base_mut().remove_links_for_provider_scene(scene);
        self.release_all(scenes, removed)
    }

    /// Removes every link consumed by `scene`.
    fn remove_links_for_consumer_scene(
        &mut self,
        scenes: &mut SceneMap,
        scene: SceneId,
    ) -> Vec<RemovedLink> {
        let removed = self.base_mut().remove_links_for_consumer_scene(scene);
        self.release_all(scenes, removed)
    }

    /// Reverts the consumers of removed links.
    fn release_all(&mut self, scenes: &mut SceneMap, links: Vec<SceneLink>) -> Vec<RemovedLink> {
        links
            .into_iter()
            .map(|link| {
                self.release_consumer(scenes, link.consumer_scene, link.consumer_slot);
                RemovedLink::from(link)
            })
            .collect()
    }
}
