// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Link rejection reasons.

use core::fmt;

use crate::data::DataType;
use crate::ids::{DataSlotId, OffscreenBufferHandle, SceneId};
use crate::scene::DataSlotType;

/// Why a link or unlink request was rejected.
///
/// Rejections never leave partial state behind and are always reported as a
/// failure event as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkError {
    /// The scene does not exist in the renderer.
    InvalidSceneId(SceneId),
    /// The slot id is the invalid sentinel or not allocated in the scene.
    InvalidSlotId {
        /// Scene the slot was looked up in.
        scene: SceneId,
        /// The slot id.
        slot: DataSlotId,
    },
    /// A consumer slot was passed where a provider was expected, or the
    /// other way around.
    WrongSlotDirection {
        /// Scene owning the slot.
        scene: SceneId,
        /// The slot id.
        slot: DataSlotId,
        /// Actual type of the slot.
        found: DataSlotType,
    },
    /// Provider and consumer slots belong to different link kinds.
    SlotKindMismatch {
        /// Provider slot type.
        provider: DataSlotType,
        /// Consumer slot type.
        consumer: DataSlotType,
    },
    /// Provider and consumer data instances hold different value types.
    DataTypeMismatch {
        /// Provider value type.
        provider: DataType,
        /// Consumer value type.
        consumer: DataType,
    },
    /// The link would close a cycle in the scene dependency graph.
    CyclicDependency {
        /// Consumer scene of the rejected link.
        consumer: SceneId,
        /// Provider scene of the rejected link.
        provider: SceneId,
    },
    /// The consumer already has a provider and relinking is disabled.
    ConsumerAlreadyLinked {
        /// Consumer scene.
        scene: SceneId,
        /// Consumer slot id.
        slot: DataSlotId,
    },
    /// Unlink was requested for a consumer without a link.
    NoLinkForConsumer {
        /// Consumer scene.
        scene: SceneId,
        /// Consumer slot id.
        slot: DataSlotId,
    },
    /// Unlink was requested with a provider slot.
    UnlinkWrongDirection {
        /// Scene owning the slot.
        scene: SceneId,
        /// The slot id.
        slot: DataSlotId,
    },
    /// The offscreen buffer is invalid or not registered.
    InvalidOffscreenBuffer(OffscreenBufferHandle),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSceneId(scene) => write!(f, "scene {scene} does not exist"),
            Self::InvalidSlotId { scene, slot } => {
                write!(f, "data slot {slot} is not allocated in scene {scene}")
            }
            Self::WrongSlotDirection { scene, slot, found } => {
                write!(f, "data slot {slot} in scene {scene} has wrong direction ({found:?})")
            }
            Self::SlotKindMismatch { provider, consumer } => {
                write!(f, "provider slot {provider:?} cannot feed consumer slot {consumer:?}")
            }
            Self::DataTypeMismatch { provider, consumer } => {
                write!(f, "provider data type {provider} does not match consumer data type {consumer}")
            }
            Self::CyclicDependency { consumer, provider } => write!(
                f,
                "linking scene {consumer} to provider scene {provider} would create a dependency cycle"
            ),
            Self::ConsumerAlreadyLinked { scene, slot } => {
                write!(f, "consumer slot {slot} in scene {scene} is already linked")
            }
            Self::NoLinkForConsumer { scene, slot } => {
                write!(f, "consumer slot {slot} in scene {scene} has no link")
            }
            Self::UnlinkWrongDirection { scene, slot } => {
                write!(f, "data slot {slot} in scene {scene} is a provider and cannot be unlinked")
            }
            Self::InvalidOffscreenBuffer(buffer) => {
                write!(f, "offscreen buffer {buffer:?} is not known")
            }
        }
    }
}

impl core::error::Error for LinkError {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn display_names_the_offending_ids() {
        let msg = LinkError::CyclicDependency {
            consumer: SceneId(3),
            provider: SceneId(4),
        }
        .to_string();
        assert!(msg.contains("scene 3"), "got: {msg}");
        assert!(msg.contains("provider scene 4"), "got: {msg}");

        let msg = LinkError::InvalidSlotId {
            scene: SceneId(4),
            slot: DataSlotId(44),
        }
        .to_string();
        assert_eq!(msg, "data slot 44 is not allocated in scene 4");
    }
}
