// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change-tracking channel constants.
//!
//! Each [`SceneStore`](crate::scene::SceneStore) records which of its
//! elements changed since the last
//! [`take_changes`](crate::scene::SceneStore::take_changes) call, using
//! multi-channel dirty tracking via [`understory_dirty`]. Keys are raw
//! storage indices; each channel has its own key space.
//!
//! Matrix-cache invalidation itself is not driven by these channels. The
//! store walks the hierarchy with its own short-circuiting worklist and only
//! *reports* each invalidated node on [`TRANSFORM`]. No channel carries
//! dependency edges, so every drain returns exactly the keys that were
//! marked.

use understory_dirty::Channel;

/// Node matrix cache invalidated (local transform, hierarchy, or link change).
pub const TRANSFORM: Channel = Channel::new(0);

/// Data instance value changed, locally or through a data-reference link.
pub const DATA: Channel = Channel::new(1);

/// Texture sampler changed, locally or through a texture/buffer link.
pub const SAMPLER: Channel = Channel::new(2);

/// Node hierarchy changed (create/destroy node, add/remove child).
pub const TOPOLOGY: Channel = Channel::new(3);
