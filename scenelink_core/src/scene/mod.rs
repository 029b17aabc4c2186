// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene-graph storage wrapped by the link layer.
//!
//! A [`SceneStore`] holds one scene's:
//!
//! - **Nodes** with a generational [`NodeHandle`](crate::NodeHandle), parent
//!   and sibling links, and a local translation/rotation/scaling.
//! - **Matrix cache** per node and [`MatrixType`], resolved lazily by
//!   [`update_matrix_cache`](SceneStore::update_matrix_cache).
//! - **Data instances** (one typed [`DataValue`](crate::DataValue) each) and
//!   **texture samplers**.
//! - **Data slots** ([`DataSlot`]), the endpoints of cross-scene links.
//!
//! Every mutation is recorded on a change channel (see
//! [`dirty`](crate::dirty)) and reported by
//! [`take_changes`](SceneStore::take_changes).
//!
//! The store knows nothing about links. Link-aware behavior is layered on top
//! by [`LinkAwareScene`](crate::aware::LinkAwareScene).

mod changes;
mod matrix;
mod slot;
mod store;
mod traverse;

pub use changes::SceneChanges;
pub use matrix::MatrixType;
pub use slot::{DataSlot, DataSlotType, LinkKind};
pub use store::SceneStore;
pub use traverse::Children;
