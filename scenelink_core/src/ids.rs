// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene, slot, and resource identity types.
//!
//! Two families of identifiers exist side by side:
//!
//! - **Application ids** ([`SceneId`], [`DataSlotId`]) are chosen by client
//!   code and used on the public linking API. Zero is the invalid sentinel.
//! - **Storage handles** ([`DataSlotHandle`], [`DataInstanceHandle`],
//!   [`TextureSamplerHandle`], [`NodeHandle`]) index into a
//!   [`SceneStore`](crate::scene::SceneStore). [`INVALID`] is the sentinel.

use core::fmt;

/// Sentinel value indicating "no handle" in index fields.
pub const INVALID: u32 = u32::MAX;

/// Identifies a scene across the whole renderer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SceneId(pub u64);

impl SceneId {
    /// The invalid scene id.
    pub const INVALID: Self = Self(0);

    /// Returns `true` unless this is [`SceneId::INVALID`].
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SceneId({})", self.0)
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Application-chosen identifier of a data slot, unique per scene and
/// direction.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DataSlotId(pub u32);

impl DataSlotId {
    /// The invalid slot id.
    pub const INVALID: Self = Self(0);

    /// Returns `true` unless this is [`DataSlotId::INVALID`].
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for DataSlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataSlotId({})", self.0)
    }
}

impl fmt::Display for DataSlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! index_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            /// The invalid handle.
            pub const INVALID: Self = Self(INVALID);

            /// Returns `true` unless this is the invalid handle.
            #[inline]
            #[must_use]
            pub const fn is_valid(self) -> bool {
                self.0 != INVALID
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                } else {
                    f.write_str(concat!(stringify!($name), "(invalid)"))
                }
            }
        }
    };
}

index_handle!(
    /// Storage index of a data slot inside one scene.
    DataSlotHandle
);
index_handle!(
    /// Storage index of a data instance (a single typed value) inside one
    /// scene.
    DataInstanceHandle
);
index_handle!(
    /// Storage index of a texture sampler inside one scene.
    TextureSamplerHandle
);
index_handle!(
    /// Renderer-owned offscreen buffer usable as a texture link provider.
    OffscreenBufferHandle
);
index_handle!(
    /// Renderer-owned render buffer a sampler may read from.
    RenderBufferHandle
);
index_handle!(
    /// Renderer-owned texture buffer a sampler may read from.
    TextureBufferHandle
);

/// Content hash of a client texture resource.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ResourceContentHash(pub u64);

impl ResourceContentHash {
    /// The invalid (empty) hash.
    pub const INVALID: Self = Self(0);

    /// Returns `true` unless this is [`ResourceContentHash::INVALID`].
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for ResourceContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceContentHash({:#018x})", self.0)
    }
}

/// A handle to a node in a [`SceneStore`](crate::scene::SceneStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter, must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl NodeHandle {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHandle({}@gen{})", self.idx, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn zero_ids_are_invalid() {
        assert!(!SceneId(0).is_valid());
        assert!(SceneId(3).is_valid());
        assert!(!DataSlotId::default().is_valid());
        assert!(DataSlotId(44).is_valid());
        assert!(!ResourceContentHash::INVALID.is_valid());
    }

    #[test]
    fn default_handles_are_invalid() {
        assert_eq!(DataSlotHandle::default(), DataSlotHandle::INVALID);
        assert!(!TextureSamplerHandle::default().is_valid());
        assert!(OffscreenBufferHandle(0).is_valid());
    }

    #[test]
    fn debug_formatting() {
        assert_eq!(format!("{:?}", DataSlotHandle(5)), "DataSlotHandle(5)");
        assert_eq!(
            format!("{:?}", DataSlotHandle::INVALID),
            "DataSlotHandle(invalid)"
        );
        let node = NodeHandle {
            idx: 3,
            generation: 1,
        };
        assert_eq!(format!("{node:?}"), "NodeHandle(3@gen1)");
    }
}
