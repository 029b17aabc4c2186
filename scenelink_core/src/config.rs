// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Link behavior configuration.

/// What happens when a link is requested for a consumer that already has one.
///
/// Passed to the link managers via [`LinkConfig::relink_policy`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RelinkPolicy {
    /// The new link replaces the existing one. The replaced link is not
    /// reported as unlinked.
    #[default]
    Replace,
    /// The request is rejected with
    /// [`ConsumerAlreadyLinked`](crate::LinkError::ConsumerAlreadyLinked).
    Reject,
}

/// Configuration for [`RendererScenes`](crate::renderer::RendererScenes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkConfig {
    /// Behavior for linking an already linked consumer.
    pub relink_policy: RelinkPolicy,
}

impl LinkConfig {
    /// Configuration that rejects relinking a linked consumer.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            relink_policy: RelinkPolicy::Reject,
        }
    }
}
