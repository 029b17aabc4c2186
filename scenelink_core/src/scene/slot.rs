// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data slots: the attachment points of cross-scene links.

use crate::ids::{
    DataInstanceHandle, DataSlotId, NodeHandle, ResourceContentHash, TextureSamplerHandle,
};

/// The three independent kinds of cross-scene link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkKind {
    /// A consumer node takes over the provider node's world/object matrices.
    Transformation,
    /// A consumer data instance takes over the provider's value.
    DataReference,
    /// A consumer sampler reads the provider's texture (or an offscreen
    /// buffer).
    Texture,
}

impl LinkKind {
    /// The provider slot type of this kind.
    #[must_use]
    pub const fn provider_type(self) -> DataSlotType {
        match self {
            Self::Transformation => DataSlotType::TransformationProvider,
            Self::DataReference => DataSlotType::DataProvider,
            Self::Texture => DataSlotType::TextureProvider,
        }
    }

    /// The consumer slot type of this kind.
    #[must_use]
    pub const fn consumer_type(self) -> DataSlotType {
        match self {
            Self::Transformation => DataSlotType::TransformationConsumer,
            Self::DataReference => DataSlotType::DataConsumer,
            Self::Texture => DataSlotType::TextureConsumer,
        }
    }
}

/// Type and direction of a [`DataSlot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataSlotType {
    /// Provides a node's transformation.
    TransformationProvider,
    /// Consumes a transformation into a node.
    TransformationConsumer,
    /// Provides a data instance value.
    DataProvider,
    /// Consumes a value into a data instance.
    DataConsumer,
    /// Provides a texture resource.
    TextureProvider,
    /// Consumes a texture into a sampler.
    TextureConsumer,
}

impl DataSlotType {
    /// The link kind this slot participates in.
    #[must_use]
    pub const fn kind(self) -> LinkKind {
        match self {
            Self::TransformationProvider | Self::TransformationConsumer => LinkKind::Transformation,
            Self::DataProvider | Self::DataConsumer => LinkKind::DataReference,
            Self::TextureProvider | Self::TextureConsumer => LinkKind::Texture,
        }
    }

    /// Returns `true` for the three provider types.
    #[must_use]
    pub const fn is_provider(self) -> bool {
        matches!(
            self,
            Self::TransformationProvider | Self::DataProvider | Self::TextureProvider
        )
    }

    /// Returns `true` for the three consumer types.
    #[must_use]
    pub const fn is_consumer(self) -> bool {
        !self.is_provider()
    }
}

/// A provider or consumer endpoint owned by one scene.
///
/// Which attachment field is meaningful depends on [`slot_type`](Self::slot_type):
/// transformation slots use [`attached_node`](Self::attached_node),
/// data slots use [`attached_data_reference`](Self::attached_data_reference),
/// texture consumers use [`attached_texture_sampler`](Self::attached_texture_sampler),
/// and texture providers carry [`texture_resource`](Self::texture_resource).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataSlot {
    /// Type and direction.
    pub slot_type: DataSlotType,
    /// Application-chosen id.
    pub id: DataSlotId,
    /// Node for transformation slots.
    pub attached_node: Option<NodeHandle>,
    /// Data instance for data slots.
    pub attached_data_reference: DataInstanceHandle,
    /// Sampler for texture consumer slots.
    pub attached_texture_sampler: TextureSamplerHandle,
    /// Texture for texture provider slots.
    pub texture_resource: ResourceContentHash,
}

impl DataSlot {
    fn empty(slot_type: DataSlotType, id: DataSlotId) -> Self {
        Self {
            slot_type,
            id,
            attached_node: None,
            attached_data_reference: DataInstanceHandle::INVALID,
            attached_texture_sampler: TextureSamplerHandle::INVALID,
            texture_resource: ResourceContentHash::INVALID,
        }
    }

    /// A transformation provider slot on `node`.
    #[must_use]
    pub fn transformation_provider(id: DataSlotId, node: NodeHandle) -> Self {
        Self {
            attached_node: Some(node),
            ..Self::empty(DataSlotType::TransformationProvider, id)
        }
    }

    /// A transformation consumer slot on `node`.
    #[must_use]
    pub fn transformation_consumer(id: DataSlotId, node: NodeHandle) -> Self {
        Self {
            attached_node: Some(node),
            ..Self::empty(DataSlotType::TransformationConsumer, id)
        }
    }

    /// A data provider slot on `instance`.
    #[must_use]
    pub fn data_provider(id: DataSlotId, instance: DataInstanceHandle) -> Self {
        Self {
            attached_data_reference: instance,
            ..Self::empty(DataSlotType::DataProvider, id)
        }
    }

    /// A data consumer slot on `instance`.
    #[must_use]
    pub fn data_consumer(id: DataSlotId, instance: DataInstanceHandle) -> Self {
        Self {
            attached_data_reference: instance,
            ..Self::empty(DataSlotType::DataConsumer, id)
        }
    }

    /// A texture provider slot offering `texture`.
    #[must_use]
    pub fn texture_provider(id: DataSlotId, texture: ResourceContentHash) -> Self {
        Self {
            texture_resource: texture,
            ..Self::empty(DataSlotType::TextureProvider, id)
        }
    }

    /// A texture consumer slot on `sampler`.
    #[must_use]
    pub fn texture_consumer(id: DataSlotId, sampler: TextureSamplerHandle) -> Self {
        Self {
            attached_texture_sampler: sampler,
            ..Self::empty(DataSlotType::TextureConsumer, id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_and_kind() {
        assert!(DataSlotType::TextureProvider.is_provider());
        assert!(DataSlotType::DataConsumer.is_consumer());
        assert_eq!(
            DataSlotType::TransformationConsumer.kind(),
            DataSlotType::TransformationProvider.kind()
        );
        assert_ne!(
            DataSlotType::DataProvider.kind(),
            DataSlotType::TextureProvider.kind()
        );
        for kind in [LinkKind::Transformation, LinkKind::DataReference, LinkKind::Texture] {
            assert_eq!(kind.provider_type().kind(), kind);
            assert!(kind.consumer_type().is_consumer());
        }
    }

    #[test]
    fn constructors_fill_only_their_attachment() {
        let slot = DataSlot::data_consumer(DataSlotId(44), DataInstanceHandle(5));
        assert_eq!(slot.attached_node, None);
        assert_eq!(slot.attached_data_reference, DataInstanceHandle(5));
        assert!(!slot.attached_texture_sampler.is_valid());
        assert!(!slot.texture_resource.is_valid());
    }
}
