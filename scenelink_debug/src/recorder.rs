// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`EventSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records:
//!
//! ```text
//! tag:u8 type:u8 provider_scene:u64 provider_data:u32
//!                consumer_scene:u64 consumer_data:u32 offscreen_buffer:u32
//! ```
//!
//! The tag names the sink channel the event arrived on. [`decode`] reads the
//! records back as an iterator of [`RecordedEvent`].

use scenelink_core::event::{EventSink, RendererEvent, RendererEventType};
use scenelink_core::ids::{DataSlotId, OffscreenBufferHandle, SceneId};

// ---------------------------------------------------------------------------
// Channel discriminants
// ---------------------------------------------------------------------------

const TAG_LINK: u8 = 1;
const TAG_BUFFER_LINK: u8 = 2;
const TAG_SLOT: u8 = 3;

/// Event types in encoding order. The encoded type byte is the index.
const EVENT_TYPES: [RendererEventType; 11] = [
    RendererEventType::SceneDataLinked,
    RendererEventType::SceneDataLinkFailed,
    RendererEventType::SceneDataBufferLinked,
    RendererEventType::SceneDataBufferLinkFailed,
    RendererEventType::SceneDataUnlinked,
    RendererEventType::SceneDataUnlinkFailed,
    RendererEventType::SceneDataUnlinkedAsResultOfClientSceneChange,
    RendererEventType::SceneDataSlotProviderCreated,
    RendererEventType::SceneDataSlotProviderDestroyed,
    RendererEventType::SceneDataSlotConsumerCreated,
    RendererEventType::SceneDataSlotConsumerDestroyed,
];

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// An [`EventSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_event_type(&mut self, event_type: RendererEventType) {
        let code = EVENT_TYPES
            .iter()
            .position(|&t| t == event_type)
            .and_then(|i| u8::try_from(i).ok())
            .unwrap_or(u8::MAX);
        self.write_u8(code);
    }

    fn record(&mut self, tag: u8, e: &RendererEvent) {
        self.write_u8(tag);
        self.write_event_type(e.event_type);
        self.write_u64(e.provider_scene.0);
        self.write_u32(e.provider_data.0);
        self.write_u64(e.consumer_scene.0);
        self.write_u32(e.consumer_data.0);
        self.write_u32(e.offscreen_buffer.0);
    }
}

impl EventSink for RecorderSink {
    fn on_link_event(&mut self, e: &RendererEvent) {
        self.record(TAG_LINK, e);
    }

    fn on_buffer_link_event(&mut self, e: &RendererEvent) {
        self.record(TAG_BUFFER_LINK, e);
    }

    fn on_slot_event(&mut self, e: &RendererEvent) {
        self.record(TAG_SLOT, e);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording, by the channel it was
/// dispatched on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// Delivered to [`EventSink::on_link_event`].
    Link(RendererEvent),
    /// Delivered to [`EventSink::on_buffer_link_event`].
    BufferLink(RendererEvent),
    /// Delivered to [`EventSink::on_slot_event`].
    Slot(RendererEvent),
}

impl RecordedEvent {
    /// The recorded event.
    #[must_use]
    pub fn event(&self) -> &RendererEvent {
        match self {
            Self::Link(e) | Self::BufferLink(e) | Self::Slot(e) => e,
        }
    }

    /// Short channel name.
    #[must_use]
    pub fn channel(&self) -> &'static str {
        match self {
            Self::Link(_) => "link",
            Self::BufferLink(_) => "buffer",
            Self::Slot(_) => "slot",
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Decoding stops at the first truncated record or unknown tag.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_event(&mut self) -> Option<RendererEvent> {
        let event_type = *EVENT_TYPES.get(usize::from(self.read_u8()?))?;
        Some(RendererEvent {
            event_type,
            provider_scene: SceneId(self.read_u64()?),
            provider_data: DataSlotId(self.read_u32()?),
            consumer_scene: SceneId(self.read_u64()?),
            consumer_data: DataSlotId(self.read_u32()?),
            offscreen_buffer: OffscreenBufferHandle(self.read_u32()?),
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_LINK => self.read_event().map(RecordedEvent::Link),
            TAG_BUFFER_LINK => self.read_event().map(RecordedEvent::BufferLink),
            TAG_SLOT => self.read_event().map(RecordedEvent::Slot),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
