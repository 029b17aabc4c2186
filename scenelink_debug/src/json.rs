// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON exporter for recorded events.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes them as a JSON array, one object per event. Ids an event does
//! not carry are written as `null`.

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::decode;

/// Exports recorded events as a JSON array.
///
/// Each object has the form:
///
/// ```json
/// {
///   "channel": "link",
///   "type": "SceneDataLinked",
///   "provider": { "scene": 3, "slot": 33 },
///   "consumer": { "scene": 4, "slot": 44 },
///   "offscreen_buffer": null
/// }
/// ```
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        let e = recorded.event();
        events.push(json!({
            "channel": recorded.channel(),
            "type": e.event_type.to_string(),
            "provider": {
                "scene": e.provider_scene.is_valid().then_some(e.provider_scene.0),
                "slot": e.provider_data.is_valid().then_some(e.provider_data.0),
            },
            "consumer": {
                "scene": e.consumer_scene.is_valid().then_some(e.consumer_scene.0),
                "slot": e.consumer_data.is_valid().then_some(e.consumer_data.0),
            },
            "offscreen_buffer": e.offscreen_buffer.is_valid().then_some(e.offscreen_buffer.0),
        }));
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use scenelink_core::event::{RendererEventCollector, RendererEventType};
    use scenelink_core::ids::{DataSlotId, OffscreenBufferHandle, SceneId};

    use super::*;
    use crate::recorder::RecorderSink;

    #[test]
    fn export_produces_valid_json() {
        let mut events = RendererEventCollector::new();
        events.add_data_link_event(
            RendererEventType::SceneDataUnlinkedAsResultOfClientSceneChange,
            SceneId(3),
            DataSlotId(33),
            SceneId(4),
            DataSlotId(44),
        );
        events.add_buffer_link_event(
            RendererEventType::SceneDataBufferLinked,
            OffscreenBufferHandle(2),
            SceneId(4),
            DataSlotId(45),
        );
        let mut rec = RecorderSink::new();
        events.dispatch_to(&mut rec);

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 2);

        assert_eq!(parsed[0]["channel"], "link");
        assert_eq!(
            parsed[0]["type"],
            "SceneDataUnlinkedAsResultOfClientSceneChange"
        );
        assert_eq!(parsed[0]["provider"]["scene"], 3);
        assert_eq!(parsed[0]["consumer"]["slot"], 44);
        assert!(parsed[0]["offscreen_buffer"].is_null());

        assert_eq!(parsed[1]["channel"], "buffer");
        assert_eq!(parsed[1]["offscreen_buffer"], 2);
        assert!(parsed[1]["provider"]["scene"].is_null());
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
