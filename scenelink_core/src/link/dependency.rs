// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene-level dependency graph with cycle detection.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use crate::ids::SceneId;

/// Directed graph of `consumer -> provider` scene dependencies.
///
/// Edges are reference counted: every link between the same pair of scenes
/// adds one reference, and the edge disappears only when the last link is
/// removed.
///
/// Scene counts are small, so cycle checks run a plain depth-first search
/// over the current edges instead of maintaining an incremental order.
#[derive(Clone, Debug, Default)]
pub struct DependencyChecker {
    edges: BTreeMap<(SceneId, SceneId), u32>,
}

/// Range covering every edge whose consumer is `scene`.
fn consumer_range(scene: SceneId) -> core::ops::RangeInclusive<(SceneId, SceneId)> {
    (scene, SceneId(0))..=(scene, SceneId(u64::MAX))
}

impl DependencyChecker {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one reference to the `consumer -> provider` edge.
    pub fn add_dependency(&mut self, consumer: SceneId, provider: SceneId) {
        *self.edges.entry((consumer, provider)).or_insert(0) += 1;
    }

    /// Drops one reference to the `consumer -> provider` edge.
    ///
    /// Returns `false` if the edge did not exist.
    pub fn remove_dependency(&mut self, consumer: SceneId, provider: SceneId) -> bool {
        let Some(count) = self.edges.get_mut(&(consumer, provider)) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.edges.remove(&(consumer, provider));
        }
        true
    }

    /// Returns `true` if adding `consumer -> provider` would close a cycle.
    ///
    /// A scene depending on itself is a cycle.
    #[must_use]
    pub fn would_create_cycle(&self, consumer: SceneId, provider: SceneId) -> bool {
        if consumer == provider {
            return true;
        }
        let mut visited = BTreeSet::new();
        let mut stack = Vec::from([provider]);
        while let Some(scene) = stack.pop() {
            if scene == consumer {
                return true;
            }
            if !visited.insert(scene) {
                continue;
            }
            stack.extend(self.providers_of(scene));
        }
        false
    }

    /// Returns `true` if `scene` consumes from any other scene.
    #[must_use]
    pub fn has_dependency_as_consumer(&self, scene: SceneId) -> bool {
        self.edges.range(consumer_range(scene)).next().is_some()
    }

    /// Number of links currently backing the `consumer -> provider` edge.
    #[must_use]
    pub fn dependency_count(&self, consumer: SceneId, provider: SceneId) -> u32 {
        self.edges.get(&(consumer, provider)).copied().unwrap_or(0)
    }

    /// Removes every edge touching `scene`.
    pub fn remove_scene(&mut self, scene: SceneId) {
        self.edges.retain(|&(c, p), _| c != scene && p != scene);
    }

    /// Returns `true` if there are no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Every scene taking part in a dependency, ordered so that each
    /// provider comes before all of its consumers.
    ///
    /// Ties are broken by scene id.
    #[must_use]
    pub fn dependent_scenes_in_order(&self) -> Vec<SceneId> {
        let mut pending: BTreeMap<SceneId, usize> = BTreeMap::new();
        for &(consumer, provider) in self.edges.keys() {
            *pending.entry(consumer).or_insert(0) += 1;
            pending.entry(provider).or_insert(0);
        }

        let mut ready: BTreeSet<SceneId> = pending
            .iter()
            .filter(|&(_, &n)| n == 0)
            .map(|(&s, _)| s)
            .collect();
        let mut order = Vec::with_capacity(pending.len());
        while let Some(scene) = ready.pop_first() {
            order.push(scene);
            for &(consumer, provider) in self.edges.keys() {
                if provider != scene {
                    continue;
                }
                if let Some(n) = pending.get_mut(&consumer) {
                    *n -= 1;
                    if *n == 0 {
                        ready.insert(consumer);
                    }
                }
            }
        }
        order
    }

    fn providers_of(&self, scene: SceneId) -> impl Iterator<Item = SceneId> + '_ {
        self.edges.range(consumer_range(scene)).map(|(&(_, p), _)| p)
    }
}
