// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer events reporting link and slot state changes.
//!
//! Every link operation reports its outcome as a [`RendererEvent`] queued in
//! a [`RendererEventCollector`]. The queue is drained by the application
//! with [`dispatch_events`](RendererEventCollector::dispatch_events) or
//! forwarded to an [`EventSink`].
//!
//! Every recorded event is also logged at `info` level.

use alloc::vec::Vec;
use core::fmt;

use crate::ids::{DataSlotId, OffscreenBufferHandle, SceneId};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Kind of a [`RendererEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RendererEventType {
    /// A scene link was created.
    SceneDataLinked,
    /// A scene link request was rejected.
    SceneDataLinkFailed,
    /// An offscreen buffer link was created.
    SceneDataBufferLinked,
    /// An offscreen buffer link request was rejected.
    SceneDataBufferLinkFailed,
    /// A link was removed on request.
    SceneDataUnlinked,
    /// An unlink request was rejected.
    SceneDataUnlinkFailed,
    /// A link was removed because one of its endpoints went away.
    SceneDataUnlinkedAsResultOfClientSceneChange,
    /// A provider slot was allocated.
    SceneDataSlotProviderCreated,
    /// A provider slot was released.
    SceneDataSlotProviderDestroyed,
    /// A consumer slot was allocated.
    SceneDataSlotConsumerCreated,
    /// A consumer slot was released.
    SceneDataSlotConsumerDestroyed,
}

impl RendererEventType {
    /// Returns `true` for rejected requests.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(
            self,
            Self::SceneDataLinkFailed | Self::SceneDataBufferLinkFailed | Self::SceneDataUnlinkFailed
        )
    }

    /// Returns `true` for slot allocation and release events.
    #[must_use]
    pub const fn is_slot_event(self) -> bool {
        matches!(
            self,
            Self::SceneDataSlotProviderCreated
                | Self::SceneDataSlotProviderDestroyed
                | Self::SceneDataSlotConsumerCreated
                | Self::SceneDataSlotConsumerDestroyed
        )
    }

    /// Returns `true` for offscreen buffer link events.
    #[must_use]
    pub const fn is_buffer_event(self) -> bool {
        matches!(
            self,
            Self::SceneDataBufferLinked | Self::SceneDataBufferLinkFailed
        )
    }

    /// Returns `true` for events describing a provider slot.
    const fn is_provider_slot_event(self) -> bool {
        matches!(
            self,
            Self::SceneDataSlotProviderCreated | Self::SceneDataSlotProviderDestroyed
        )
    }
}

impl fmt::Display for RendererEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One link or slot state change.
///
/// Fields that do not apply to an event type hold their invalid sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RendererEvent {
    /// Kind of event.
    pub event_type: RendererEventType,
    /// Provider scene.
    pub provider_scene: SceneId,
    /// Provider slot id.
    pub provider_data: DataSlotId,
    /// Consumer scene.
    pub consumer_scene: SceneId,
    /// Consumer slot id.
    pub consumer_data: DataSlotId,
    /// Providing offscreen buffer of buffer link events.
    pub offscreen_buffer: OffscreenBufferHandle,
}

impl RendererEvent {
    /// An event of `event_type` with every field invalid.
    #[must_use]
    pub const fn new(event_type: RendererEventType) -> Self {
        Self {
            event_type,
            provider_scene: SceneId::INVALID,
            provider_data: DataSlotId::INVALID,
            consumer_scene: SceneId::INVALID,
            consumer_data: DataSlotId::INVALID,
            offscreen_buffer: OffscreenBufferHandle::INVALID,
        }
    }
}

impl fmt::Display for RendererEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.event_type)?;
        if self.offscreen_buffer.is_valid() {
            write!(f, " offscreenBuffer={}", self.offscreen_buffer.0)?;
        }
        if self.provider_scene.is_valid() {
            write!(f, " providerSceneId={}", self.provider_scene)?;
        }
        if self.provider_data.is_valid() {
            write!(f, " providerDataId={}", self.provider_data)?;
        }
        if self.consumer_scene.is_valid() {
            write!(f, " consumerSceneId={}", self.consumer_scene)?;
        }
        if self.consumer_data.is_valid() {
            write!(f, " consumerDataId={}", self.consumer_data)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EventSink trait
// ---------------------------------------------------------------------------

/// Receiver of dispatched renderer events.
///
/// All methods default to no-ops.
pub trait EventSink {
    /// Scene link, unlink, and teardown events.
    fn on_link_event(&mut self, e: &RendererEvent) {
        _ = e;
    }

    /// Offscreen buffer link events.
    fn on_buffer_link_event(&mut self, e: &RendererEvent) {
        _ = e;
    }

    /// Slot allocation and release events.
    fn on_slot_event(&mut self, e: &RendererEvent) {
        _ = e;
    }
}

/// A sink that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

/// Ordered queue of renderer events.
#[derive(Clone, Debug, Default)]
pub struct RendererEventCollector {
    events: Vec<RendererEvent>,
}

impl RendererEventCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a scene link event.
    pub fn add_data_link_event(
        &mut self,
        event_type: RendererEventType,
        provider_scene: SceneId,
        provider_data: DataSlotId,
        consumer_scene: SceneId,
        consumer_data: DataSlotId,
    ) {
        self.add_event(RendererEvent {
            provider_scene,
            provider_data,
            consumer_scene,
            consumer_data,
            ..RendererEvent::new(event_type)
        });
    }

    /// Records an offscreen buffer link event.
    pub fn add_buffer_link_event(
        &mut self,
        event_type: RendererEventType,
        buffer: OffscreenBufferHandle,
        consumer_scene: SceneId,
        consumer_data: DataSlotId,
    ) {
        self.add_event(RendererEvent {
            offscreen_buffer: buffer,
            consumer_scene,
            consumer_data,
            ..RendererEvent::new(event_type)
        });
    }

    /// Records a slot event. Provider slot events fill the provider fields,
    /// consumer slot events the consumer fields.
    pub fn add_slot_event(&mut self, event_type: RendererEventType, scene: SceneId, slot: DataSlotId) {
        let mut event = RendererEvent::new(event_type);
        if event_type.is_provider_slot_event() {
            event.provider_scene = scene;
            event.provider_data = slot;
        } else {
            event.consumer_scene = scene;
            event.consumer_data = slot;
        }
        self.add_event(event);
    }

    /// Records an event.
    pub fn add_event(&mut self, event: RendererEvent) {
        log::info!("{event}");
        self.events.push(event);
    }

    /// The queued events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[RendererEvent] {
        &self.events
    }

    /// Returns `true` if no events are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Takes all queued events.
    pub fn dispatch_events(&mut self) -> Vec<RendererEvent> {
        core::mem::take(&mut self.events)
    }

    /// Forwards all queued events to `sink` and clears the queue.
    pub fn dispatch_to(&mut self, sink: &mut dyn EventSink) {
        for event in self.events.drain(..) {
            if event.event_type.is_slot_event() {
                sink.on_slot_event(&event);
            } else if event.event_type.is_buffer_event() {
                sink.on_buffer_link_event(&event);
            } else {
                sink.on_link_event(&event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use super::*;

    #[derive(Default)]
    struct CountingSink {
        link: usize,
        buffer: usize,
        slot: usize,
    }

    impl EventSink for CountingSink {
        fn on_link_event(&mut self, _e: &RendererEvent) {
            self.link += 1;
        }

        fn on_buffer_link_event(&mut self, _e: &RendererEvent) {
            self.buffer += 1;
        }

        fn on_slot_event(&mut self, _e: &RendererEvent) {
            self.slot += 1;
        }
    }

    #[test]
    fn display_lists_valid_fields() {
        let mut events = RendererEventCollector::new();
        events.add_data_link_event(
            RendererEventType::SceneDataLinked,
            SceneId(3),
            DataSlotId(33),
            SceneId(4),
            DataSlotId(44),
        );
        assert_eq!(
            events.events()[0].to_string(),
            "SceneDataLinked providerSceneId=3 providerDataId=33 consumerSceneId=4 consumerDataId=44"
        );
    }

    #[test]
    fn slot_events_fill_their_side() {
        let mut events = RendererEventCollector::new();
        events.add_slot_event(
            RendererEventType::SceneDataSlotProviderDestroyed,
            SceneId(3),
            DataSlotId(33),
        );
        events.add_slot_event(
            RendererEventType::SceneDataSlotConsumerCreated,
            SceneId(4),
            DataSlotId(44),
        );
        let dispatched = events.dispatch_events();
        assert_eq!(dispatched[0].provider_scene, SceneId(3));
        assert_eq!(dispatched[0].consumer_scene, SceneId::INVALID);
        assert_eq!(dispatched[1].consumer_data, DataSlotId(44));
        assert!(events.is_empty());
    }

    #[test]
    fn dispatch_to_routes_by_category() {
        let mut events = RendererEventCollector::new();
        events.add_buffer_link_event(
            RendererEventType::SceneDataBufferLinked,
            OffscreenBufferHandle(1),
            SceneId(4),
            DataSlotId(44),
        );
        events.add_slot_event(
            RendererEventType::SceneDataSlotConsumerDestroyed,
            SceneId(4),
            DataSlotId(44),
        );
        for ty in [
            RendererEventType::SceneDataUnlinked,
            RendererEventType::SceneDataUnlinkFailed,
        ] {
            events.add_data_link_event(ty, SceneId(3), DataSlotId::INVALID, SceneId(4), DataSlotId(44));
        }

        let mut sink = CountingSink::default();
        events.dispatch_to(&mut sink);
        assert_eq!(vec![sink.link, sink.buffer, sink.slot], vec![2, 1, 1]);
        assert!(events.is_empty());
    }
}
