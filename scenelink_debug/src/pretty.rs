// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable event output.
//!
//! [`PrettyPrintSink`] implements [`EventSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Endpoints are
//! printed as `scene:slot`, with `-` for ids an event does not carry.

use std::io::Write;

use scenelink_core::event::{EventSink, RendererEvent};
use scenelink_core::ids::{DataSlotId, SceneId};

/// Writes human-readable event lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn endpoint(scene: SceneId, slot: DataSlotId) -> String {
    match (scene.is_valid(), slot.is_valid()) {
        (true, true) => format!("{scene}:{slot}"),
        (true, false) => format!("{scene}:-"),
        (false, true) => format!("-:{slot}"),
        (false, false) => "-".to_owned(),
    }
}

impl<W: Write> EventSink for PrettyPrintSink<W> {
    fn on_link_event(&mut self, e: &RendererEvent) {
        let provider = if e.offscreen_buffer.is_valid() {
            format!("buffer#{}", e.offscreen_buffer.0)
        } else {
            endpoint(e.provider_scene, e.provider_data)
        };
        let _ = writeln!(
            self.writer,
            "[link] {} provider={provider} consumer={}",
            e.event_type,
            endpoint(e.consumer_scene, e.consumer_data),
        );
    }

    fn on_buffer_link_event(&mut self, e: &RendererEvent) {
        let _ = writeln!(
            self.writer,
            "[buffer] {} buffer={} consumer={}",
            e.event_type,
            e.offscreen_buffer.0,
            endpoint(e.consumer_scene, e.consumer_data),
        );
    }

    fn on_slot_event(&mut self, e: &RendererEvent) {
        let slot = if e.provider_scene.is_valid() {
            endpoint(e.provider_scene, e.provider_data)
        } else {
            endpoint(e.consumer_scene, e.consumer_data)
        };
        let _ = writeln!(self.writer, "[slot] {} slot={slot}", e.event_type);
    }
}

#[cfg(test)]
mod tests {
    use scenelink_core::event::{RendererEventCollector, RendererEventType};
    use scenelink_core::ids::OffscreenBufferHandle;

    use super::*;

    fn printed(events: &mut RendererEventCollector) -> String {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        events.dispatch_to(&mut sink);
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_link() {
        let mut events = RendererEventCollector::new();
        events.add_data_link_event(
            RendererEventType::SceneDataLinked,
            SceneId(3),
            DataSlotId(33),
            SceneId(4),
            DataSlotId(44),
        );
        assert_eq!(
            printed(&mut events),
            "[link] SceneDataLinked provider=3:33 consumer=4:44\n"
        );
    }

    #[test]
    fn pretty_print_buffer_and_slot() {
        let mut events = RendererEventCollector::new();
        events.add_buffer_link_event(
            RendererEventType::SceneDataBufferLinked,
            OffscreenBufferHandle(7),
            SceneId(4),
            DataSlotId(44),
        );
        events.add_slot_event(
            RendererEventType::SceneDataSlotConsumerDestroyed,
            SceneId(4),
            DataSlotId(44),
        );
        events.add_data_link_event(
            RendererEventType::SceneDataUnlinkFailed,
            SceneId::INVALID,
            DataSlotId::INVALID,
            SceneId(4),
            DataSlotId(44),
        );
        let output = printed(&mut events);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(
            lines,
            [
                "[buffer] SceneDataBufferLinked buffer=7 consumer=4:44",
                "[slot] SceneDataSlotConsumerDestroyed slot=4:44",
                "[link] SceneDataUnlinkFailed provider=- consumer=4:44",
            ]
        );
    }
}
