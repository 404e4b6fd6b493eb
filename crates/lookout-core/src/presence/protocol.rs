//! JSON frames of the presence push feed.
//!
//! Outbound: `{"op":2,"d":{"subscribe_to_id":...}}` once per connection and
//! `{"op":3}` heartbeats. Inbound: `{"op":1,"d":{"heartbeat_interval":ms}}`
//! and `{"op":0,"t":"INIT_STATE"|"PRESENCE_UPDATE","d":{...}}`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::snapshot::{Activity, ActivityKind, OnlineStatus, PresenceSnapshot, Track};
use crate::error::FeedProtocolError;

pub const OP_HELLO: u8 = 1;
pub const OP_INITIALIZE: u8 = 2;
pub const OP_HEARTBEAT: u8 = 3;

pub const EVENT_INIT_STATE: &str = "INIT_STATE";
pub const EVENT_PRESENCE_UPDATE: &str = "PRESENCE_UPDATE";

/// Frame sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientFrame {
    pub op: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<SubscribePayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribePayload {
    pub subscribe_to_id: String,
}

impl ClientFrame {
    pub fn subscribe(id: impl Into<String>) -> Self {
        Self {
            op: OP_INITIALIZE,
            d: Some(SubscribePayload {
                subscribe_to_id: id.into(),
            }),
        }
    }

    pub fn heartbeat() -> Self {
        Self {
            op: OP_HEARTBEAT,
            d: None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Which presence event carried a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEvent {
    InitState,
    Update,
}

/// A decoded server frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerFrame {
    Hello { heartbeat_interval: Duration },
    Presence {
        event: PresenceEvent,
        snapshot: PresenceSnapshot,
    },
    /// Anything with an unrecognised `op` or `t`.
    Ignored { op: Option<u8>, t: Option<String> },
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(default)]
    op: Option<u8>,
    #[serde(default)]
    t: Option<String>,
    #[serde(default)]
    d: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct HelloPayload {
    heartbeat_interval: u64,
}

#[derive(Debug, Deserialize)]
struct WirePresence {
    discord_status: OnlineStatus,
    #[serde(default)]
    activities: Vec<WireActivity>,
    #[serde(default, alias = "track")]
    spotify: Option<WireTrack>,
}

#[derive(Debug, Deserialize)]
struct WireActivity {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(rename = "type", default)]
    kind: u8,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    timestamps: Option<WireTimestamps>,
}

#[derive(Debug, Deserialize)]
struct WireTrack {
    song: String,
    artist: String,
    #[serde(default)]
    album: Option<String>,
    #[serde(default)]
    track_id: Option<String>,
    #[serde(default)]
    album_art_url: Option<String>,
    #[serde(default)]
    timestamps: Option<WireTimestamps>,
}

#[derive(Debug, Default, Deserialize)]
struct WireTimestamps {
    #[serde(default)]
    start: Option<i64>,
    #[serde(default)]
    end: Option<i64>,
}

impl From<WirePresence> for PresenceSnapshot {
    fn from(wire: WirePresence) -> Self {
        let activities = wire
            .activities
            .into_iter()
            .map(|activity| Activity {
                started_at: activity
                    .timestamps
                    .and_then(|ts| ts.start)
                    .or(activity.created_at),
                id: activity.id,
                name: activity.name,
                kind: ActivityKind::from(activity.kind),
            })
            .collect();
        let track = wire.spotify.map(|track| {
            let timestamps = track.timestamps.unwrap_or_default();
            Track {
                title: track.song,
                artist: track.artist,
                album: track.album,
                external_id: track.track_id,
                album_art_url: track.album_art_url,
                start: timestamps.start,
                end: timestamps.end,
            }
        });
        PresenceSnapshot {
            status: wire.discord_status,
            activities,
            track,
        }
    }
}

/// Decodes one text frame from the feed.
pub fn parse_server_frame(text: &str) -> Result<ServerFrame, FeedProtocolError> {
    let raw: RawFrame = serde_json::from_str(text)?;

    let event = match raw.t.as_deref() {
        Some(EVENT_INIT_STATE) => Some(PresenceEvent::InitState),
        Some(EVENT_PRESENCE_UPDATE) => Some(PresenceEvent::Update),
        _ => None,
    };
    if let Some(event) = event {
        let payload = raw.d.ok_or(FeedProtocolError::MissingPayload(match event {
            PresenceEvent::InitState => EVENT_INIT_STATE,
            PresenceEvent::Update => EVENT_PRESENCE_UPDATE,
        }))?;
        let wire: WirePresence = serde_json::from_value(payload)
            .map_err(|err| FeedProtocolError::Payload(err.to_string()))?;
        return Ok(ServerFrame::Presence {
            event,
            snapshot: wire.into(),
        });
    }

    if raw.op == Some(OP_HELLO) {
        let payload = raw.d.ok_or(FeedProtocolError::MissingPayload("hello"))?;
        let hello: HelloPayload = serde_json::from_value(payload)
            .map_err(|err| FeedProtocolError::Payload(err.to_string()))?;
        return Ok(ServerFrame::Hello {
            heartbeat_interval: Duration::from_millis(hello.heartbeat_interval),
        });
    }

    Ok(ServerFrame::Ignored {
        op: raw.op,
        t: raw.t,
    })
}
