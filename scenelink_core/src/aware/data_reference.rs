// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data reference link behavior: fallback values and provider pushes.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use crate::data::DataValue;
use crate::ids::{DataInstanceHandle, DataSlotHandle};
use crate::scene::{DataSlot, DataSlotType, SceneStore};

use super::{LinkStrategy, LocalMutation, PendingPropagation};

/// Keeps the locally authored value of every data consumer slot.
///
/// The fallback is captured when the slot is allocated and follows every
/// local write. While a consumer is linked, local writes only update the
/// fallback.
#[derive(Clone, Debug, Default)]
pub struct DataReferenceLinkStrategy {
    fallbacks: BTreeMap<DataSlotHandle, DataValue>,
    consumer_slots: BTreeMap<DataInstanceHandle, DataSlotHandle>,
    provider_slots: BTreeMap<DataInstanceHandle, Vec<DataSlotHandle>>,
    linked: BTreeSet<DataInstanceHandle>,
}

impl DataReferenceLinkStrategy {
    /// The fallback value of a consumer slot.
    #[must_use]
    pub fn fallback_value(&self, slot: DataSlotHandle) -> Option<DataValue> {
        self.fallbacks.get(&slot).copied()
    }

    /// Returns `true` if the instance currently shows a linked value.
    #[must_use]
    pub fn is_linked(&self, instance: DataInstanceHandle) -> bool {
        self.linked.contains(&instance)
    }

    /// Records that `instance` shows a linked value and queues pushes for
    /// the providers attached to it.
    pub(crate) fn mark_linked(
        &mut self,
        instance: DataInstanceHandle,
        pending: &mut Vec<PendingPropagation>,
    ) {
        self.linked.insert(instance);
        self.queue_providers(instance, pending);
    }

    fn queue_providers(&self, instance: DataInstanceHandle, pending: &mut Vec<PendingPropagation>) {
        if let Some(slots) = self.provider_slots.get(&instance) {
            pending.extend(slots.iter().copied().map(PendingPropagation::DataChanged));
        }
    }
}

impl LinkStrategy for DataReferenceLinkStrategy {
    fn on_slot_allocated(&mut self, store: &SceneStore, handle: DataSlotHandle, slot: &DataSlot) {
        let instance = slot.attached_data_reference;
        match slot.slot_type {
            DataSlotType::DataConsumer => {
                if store.has_data_instance(instance) {
                    self.fallbacks.insert(handle, store.data_value(instance));
                }
                self.consumer_slots.insert(instance, handle);
            }
            DataSlotType::DataProvider => {
                self.provider_slots.entry(instance).or_default().push(handle);
            }
            _ => {}
        }
    }

    fn on_slot_released(&mut self, handle: DataSlotHandle, slot: &DataSlot) {
        let instance = slot.attached_data_reference;
        match slot.slot_type {
            DataSlotType::DataConsumer => {
                self.fallbacks.remove(&handle);
                if self.consumer_slots.get(&instance) == Some(&handle) {
                    self.consumer_slots.remove(&instance);
                }
            }
            DataSlotType::DataProvider => {
                if let Some(slots) = self.provider_slots.get_mut(&instance) {
                    slots.retain(|&h| h != handle);
                    if slots.is_empty() {
                        self.provider_slots.remove(&instance);
                    }
                }
            }
            _ => {}
        }
    }

    fn on_local_mutation(
        &mut self,
        store: &mut SceneStore,
        mutation: &mut LocalMutation,
        pending: &mut Vec<PendingPropagation>,
    ) {
        let LocalMutation::DataValue(instance, value) = mutation else {
            return;
        };
        let instance = *instance;
        if let Some(&slot) = self.consumer_slots.get(&instance) {
            if let Some(fallback) = self.fallbacks.get_mut(&slot) {
                assert!(
                    fallback.data_type() == value.data_type(),
                    "data type mismatch: {:?} cannot hold {:?}",
                    fallback.data_type(),
                    value.data_type()
                );
                *fallback = *value;
            }
            if self.linked.contains(&instance) {
                *value = store.data_value(instance);
                return;
            }
        }
        self.queue_providers(instance, pending);
    }

    fn on_link_removed(
        &mut self,
        store: &mut SceneStore,
        handle: DataSlotHandle,
        slot: &DataSlot,
        pending: &mut Vec<PendingPropagation>,
    ) {
        let instance = slot.attached_data_reference;
        if !self.linked.remove(&instance) {
            return;
        }
        if let Some(&fallback) = self.fallbacks.get(&handle)
            && store.has_data_instance(instance)
        {
            store.set_data_value(instance, fallback);
            self.queue_providers(instance, pending);
        }
    }
}
