//! Room sync protocol.
//!
//! Peers exchange JSON envelopes of the form
//! `{"type": "chat" | "move", "message": "<JSON string>", "roomId": "..."}`.
//! A `chat` carries a newly completed shape, a `move` carries the replacement
//! for the shape at an index. This module encodes outgoing envelopes and
//! decodes incoming ones; sending and receiving is left to the connection
//! owner.

#[cfg(not(target_arch = "wasm32"))]
mod native;

#[cfg(not(target_arch = "wasm32"))]
pub use native::NativeWebSocket;

use crate::shapes::Shape;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors from the sync layer.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("malformed envelope: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),
    #[error("{kind} envelope has no message")]
    MissingMessage { kind: &'static str },
    #[error("malformed {kind} payload: {source}")]
    InvalidPayload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid WebSocket URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("already connected")]
    AlreadyConnected,
    #[error("not connected")]
    NotConnected,
    #[error("send failed: {0}")]
    SendFailed(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Envelope `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    Chat,
    Move,
    JoinRoom,
    /// Any type this client does not handle.
    #[serde(other)]
    Unknown,
}

impl EnvelopeKind {
    fn name(self) -> &'static str {
        match self {
            EnvelopeKind::Chat => "chat",
            EnvelopeKind::Move => "move",
            EnvelopeKind::JoinRoom => "join_room",
            EnvelopeKind::Unknown => "unknown",
        }
    }
}

/// A frame on the room channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    /// Payload, usually a JSON document encoded as a string. Some relays
    /// forward it already parsed, so any JSON value is accepted here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(rename = "roomId", default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}

impl Envelope {
    fn new(kind: EnvelopeKind, room_id: &str, message: Option<String>) -> Self {
        Self {
            kind,
            message: message.map(Value::String),
            room_id: Some(room_id.to_string()),
        }
    }

    /// Whether this envelope should be applied in `room_id`. Envelopes that
    /// do not name a room are assumed to be routed already.
    pub fn is_for_room(&self, room_id: &str) -> bool {
        self.room_id.as_deref().is_none_or(|room| room == room_id)
    }

    /// Decode the payload into `T`.
    fn payload<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        let kind = self.kind.name();
        let parsed = match &self.message {
            Some(Value::String(text)) => serde_json::from_str(text),
            Some(value) => T::deserialize(value),
            None => return Err(SyncError::MissingMessage { kind }),
        };
        parsed.map_err(|source| SyncError::InvalidPayload { kind, source })
    }
}

/// Payload of a `chat` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPayload {
    pub shape: Shape,
}

/// Payload of a `move` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovePayload {
    pub index: usize,
    #[serde(rename = "newShape", alias = "shape")]
    pub new_shape: Shape,
}

/// A decoded inbound event that applies to this room.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A peer completed a shape.
    Chat(Shape),
    /// A peer moved the shape at `index`.
    Move { index: usize, shape: Shape },
}

/// Encode a `chat` envelope announcing a completed shape.
pub fn encode_chat(room_id: &str, shape: &Shape) -> Result<String> {
    let payload = ChatPayload {
        shape: shape.clone(),
    };
    encode(EnvelopeKind::Chat, room_id, &payload)
}

/// Encode a `move` envelope replacing the shape at `index`.
pub fn encode_move(room_id: &str, index: usize, shape: &Shape) -> Result<String> {
    let payload = MovePayload {
        index,
        new_shape: shape.clone(),
    };
    encode(EnvelopeKind::Move, room_id, &payload)
}

/// Encode the `join_room` handshake sent once the connection opens.
pub fn encode_join(room_id: &str) -> Result<String> {
    serde_json::to_string(&Envelope::new(EnvelopeKind::JoinRoom, room_id, None))
        .map_err(SyncError::Encode)
}

fn encode<T: Serialize>(kind: EnvelopeKind, room_id: &str, payload: &T) -> Result<String> {
    let message = serde_json::to_string(payload).map_err(SyncError::Encode)?;
    serde_json::to_string(&Envelope::new(kind, room_id, Some(message))).map_err(SyncError::Encode)
}

/// Decode an inbound frame for `room_id`.
///
/// Returns `Ok(None)` for frames that are well formed but not actionable:
/// another room's traffic, handshakes and unknown types. Malformed frames
/// are errors.
pub fn decode_inbound(room_id: &str, text: &str) -> Result<Option<Inbound>> {
    let envelope: Envelope = serde_json::from_str(text).map_err(SyncError::InvalidEnvelope)?;

    if !envelope.is_for_room(room_id) {
        log::trace!("Dropping {} for room {:?}", envelope.kind.name(), envelope.room_id);
        return Ok(None);
    }

    match envelope.kind {
        EnvelopeKind::Chat => {
            let ChatPayload { shape } = envelope.payload()?;
            Ok(Some(Inbound::Chat(shape)))
        }
        EnvelopeKind::Move => {
            let MovePayload { index, new_shape } = envelope.payload()?;
            Ok(Some(Inbound::Move {
                index,
                shape: new_shape,
            }))
        }
        EnvelopeKind::JoinRoom | EnvelopeKind::Unknown => {
            log::debug!("Ignoring {} envelope", envelope.kind.name());
            Ok(None)
        }
    }
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Events from a WebSocket client
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// Connected to server
    Connected,
    /// Disconnected from server
    Disconnected,
    /// A text frame arrived
    Message(String),
    /// Error occurred
    Error { message: String },
}

/// Shorten a frame for log output.
pub fn preview(text: &str) -> &str {
    let mut end = text.len().min(100);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
