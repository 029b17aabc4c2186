// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-scene data linking for a scene-graph renderer.
//!
//! `scenelink_core` lets one scene's outputs drive another scene's inputs
//! live: a node's transformation, a typed data value, or a texture. It is
//! `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   RendererScenes ─── owns ───► SceneMap (SceneId ─► LinkAwareScene)
//!        │                              │
//!        │ owns                         │ wraps
//!        ▼                              ▼
//!   SceneLinksManager              SceneStore + link strategies
//!     ├─ TransformationLinkManager        │
//!     ├─ DataReferenceLinkManager         │ local mutations queue
//!     └─ TextureLinkManager               ▼
//!        (LinkTable + DependencyChecker)  PendingPropagation
//!        ▲                                │
//!        └──── flush_link_propagation ◄───┘
//! ```
//!
//! **[`scene`]**: Struct-of-arrays scene storage with generational node
//! handles, lazily resolved world/object matrix caches, data instances,
//! texture samplers, and [`DataSlot`](scene::DataSlot)s.
//!
//! **[`aware`]**: [`LinkAwareScene`](aware::LinkAwareScene) wraps a store and
//! intercepts local mutations with one strategy per link kind: dirty
//! propagation for transformations, fallback values for data references and
//! textures.
//!
//! **[`link`]**: The link tables, the cycle-checking scene dependency graph,
//! the three concrete managers, and the
//! [`SceneLinksManager`](link::SceneLinksManager) facade.
//!
//! **[`renderer`]**: [`RendererScenes`](renderer::RendererScenes), the
//! container that owns scenes and links and sequences every cross-scene
//! operation.
//!
//! **[`event`]**: Renderer events reporting every link outcome.
//!
//! **[`dirty`]**: Change-tracking channels via `understory_dirty`.
//!
//! # Example
//!
//! ```
//! use scenelink_core::ids::{DataSlotId, SceneId};
//! use scenelink_core::renderer::RendererScenes;
//! use scenelink_core::scene::{DataSlot, MatrixType};
//! use scenelink_core::transform::Transform3d;
//!
//! let mut renderer = RendererScenes::new();
//! let (provider, consumer) = (SceneId(3), SceneId(4));
//! renderer.create_scene(provider);
//! renderer.create_scene(consumer);
//!
//! let scene = renderer.scene_mut(provider).unwrap();
//! let source = scene.create_node();
//! scene.set_translation(source, [1.0, 2.0, 3.0]);
//! renderer.allocate_data_slot(provider, DataSlot::transformation_provider(DataSlotId(33), source));
//!
//! let target = renderer.scene_mut(consumer).unwrap().create_node();
//! renderer.allocate_data_slot(consumer, DataSlot::transformation_consumer(DataSlotId(44), target));
//!
//! renderer
//!     .create_data_link(provider, DataSlotId(33), consumer, DataSlotId(44))
//!     .unwrap();
//! assert_eq!(
//!     renderer.resolve_matrix(MatrixType::World, consumer, target),
//!     Some(Transform3d::from_translation(1.0, 2.0, 3.0))
//! );
//! ```
//!
//! # Logging
//!
//! Events are logged through the `log` facade: recorded events at `info`,
//! rejected requests at `warn`, teardown cascades at `debug`, and dirty
//! propagation at `trace`.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod aware;
pub mod config;
pub mod data;
pub mod dirty;
pub mod error;
pub mod event;
pub mod ids;
pub mod link;
pub mod renderer;
pub mod sampler;
pub mod scene;
pub mod transform;

pub use config::{LinkConfig, RelinkPolicy};
pub use data::{DataType, DataValue};
pub use error::LinkError;
pub use ids::{NodeHandle, SceneId};
pub use renderer::RendererScenes;
