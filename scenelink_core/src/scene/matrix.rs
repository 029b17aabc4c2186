// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazy matrix cache resolution.
//!
//! Resolving a node's matrix walks up from the node to the nearest ancestor
//! whose cache is clean (or past the root), collecting the dirty chain, and
//! then walks back down the chain composing each node onto its already
//! resolved parent:
//!
//! - **World**: `parent_world * local`
//! - **Object**: `local⁻¹ * parent_object` (the inverse of world, built
//!   from inverted local parts)
//!
//! Link-aware resolution (see
//! [`update_matrix_cache_with_links`](crate::aware::update_matrix_cache_with_links))
//! reuses the same chain but substitutes a provider's matrix at linked
//! consumer nodes.

use alloc::vec::Vec;

use crate::ids::{INVALID, NodeHandle};
use crate::transform::Transform3d;

use super::store::SceneStore;

/// Which cached matrix of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatrixType {
    /// Node space to world space.
    World,
    /// World space to node space.
    Object,
}

impl MatrixType {
    /// Both matrix types.
    pub const ALL: [Self; 2] = [Self::World, Self::Object];

    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::World => 0,
            Self::Object => 1,
        }
    }
}

impl SceneStore {
    /// Resolves and caches the `matrix_type` matrix of `node` from local
    /// transforms only.
    pub fn update_matrix_cache(&mut self, matrix_type: MatrixType, node: NodeHandle) -> Transform3d {
        self.validate(node);
        let chain = self.dirty_chain(matrix_type, node.idx);
        for &idx in chain.iter().rev() {
            let m = self.compose_with_parent(matrix_type, idx);
            self.set_cached_matrix(matrix_type, idx, m);
        }
        self.cached_matrix(matrix_type, node.idx)
    }

    /// Returns the cached matrix without resolving it.
    ///
    /// The value is stale while [`is_matrix_dirty`](Self::is_matrix_dirty)
    /// is `true`.
    #[must_use]
    pub fn matrix(&self, matrix_type: MatrixType, node: NodeHandle) -> Transform3d {
        self.validate(node);
        self.cached_matrix(matrix_type, node.idx)
    }

    /// Returns the local matrix `T * R * S` of a node.
    #[must_use]
    pub fn local_matrix(&self, node: NodeHandle) -> Transform3d {
        self.validate(node);
        let i = node.idx as usize;
        Transform3d::from_trs(self.translation[i], self.rotation[i], self.scaling[i])
    }

    /// Dirty nodes from `idx` up to (excluding) the first clean ancestor.
    pub(crate) fn dirty_chain(&self, matrix_type: MatrixType, idx: u32) -> Vec<u32> {
        let mut chain = Vec::new();
        let mut n = idx;
        while n != INVALID && self.matrix_dirty[n as usize][matrix_type.index()] {
            chain.push(n);
            n = self.parent[n as usize];
        }
        chain
    }

    /// Composes the local transform of `idx` with its parent's cached matrix.
    pub(crate) fn compose_with_parent(&self, matrix_type: MatrixType, idx: u32) -> Transform3d {
        let i = idx as usize;
        let parent = self.parent[i];
        match matrix_type {
            MatrixType::World => {
                let local =
                    Transform3d::from_trs(self.translation[i], self.rotation[i], self.scaling[i]);
                if parent == INVALID {
                    local
                } else {
                    self.world_matrix[parent as usize] * local
                }
            }
            MatrixType::Object => {
                let local_inv =
                    Transform3d::inverse_trs(self.translation[i], self.rotation[i], self.scaling[i]);
                if parent == INVALID {
                    local_inv
                } else {
                    local_inv * self.object_matrix[parent as usize]
                }
            }
        }
    }

    pub(crate) fn cached_matrix(&self, matrix_type: MatrixType, idx: u32) -> Transform3d {
        match matrix_type {
            MatrixType::World => self.world_matrix[idx as usize],
            MatrixType::Object => self.object_matrix[idx as usize],
        }
    }

    pub(crate) fn set_cached_matrix(&mut self, matrix_type: MatrixType, idx: u32, m: Transform3d) {
        match matrix_type {
            MatrixType::World => self.world_matrix[idx as usize] = m,
            MatrixType::Object => self.object_matrix[idx as usize] = m,
        }
        self.matrix_dirty[idx as usize][matrix_type.index()] = false;
    }
}
