//! Room history loading.
//!
//! Before live editing starts, a room's shapes are rebuilt from the history
//! service: the chat log yields the shapes in creation order, then recorded
//! moves replace shapes by index.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod http;

#[cfg(target_arch = "wasm32")]
mod fetch;

pub use memory::MemoryHistory;

#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpHistoryLoader;

#[cfg(target_arch = "wasm32")]
pub use fetch::FetchHistoryLoader;

use crate::shapes::Shape;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// History errors.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("malformed history response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("history unavailable: {0}")]
    Unavailable(String),
}

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Source of a room's persisted shapes.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait HistoryLoader: Send + Sync {
    /// Fetch the shapes of `room_id` with recorded moves applied.
    fn load(&self, room_id: &str) -> BoxFuture<'_, HistoryResult<Vec<Shape>>>;
}

/// Source of a room's persisted shapes (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait HistoryLoader {
    /// Fetch the shapes of `room_id` with recorded moves applied.
    fn load(&self, room_id: &str) -> BoxFuture<'_, HistoryResult<Vec<Shape>>>;
}

/// URL of the chat log for a room.
pub fn chats_url(base_url: &str, room_id: &str) -> String {
    format!("{}/chats/{}", base_url.trim_end_matches('/'), room_id)
}

/// URL of the recorded moves for a room.
pub fn movements_url(base_url: &str, room_id: &str) -> String {
    format!("{}/shapeMovements/{}", base_url.trim_end_matches('/'), room_id)
}

#[derive(Debug, Deserialize)]
struct ChatLog {
    #[serde(default)]
    messages: Vec<ChatEntry>,
}

#[derive(Debug, Deserialize)]
struct ChatEntry {
    #[serde(default)]
    message: Value,
}

#[derive(Debug, Deserialize)]
struct MovementLog {
    #[serde(default)]
    movements: Vec<MovementEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovementEntry {
    shape_index: Value,
    #[serde(default)]
    shape_data: Value,
}

/// A recorded move: the shape at `index` became `shape`.
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    pub index: usize,
    pub shape: Shape,
}

#[derive(Debug, Deserialize)]
struct ShapeHolder {
    shape: Shape,
}

/// Decode a value that is either JSON text or an already parsed document.
fn embedded<T: serde::de::DeserializeOwned>(value: &Value) -> serde_json::Result<T> {
    match value {
        Value::String(text) => serde_json::from_str(text),
        other => T::deserialize(other),
    }
}

/// Parse a chat log response into shapes in creation order.
///
/// Entries that do not carry a shape are skipped with a warning; a response
/// that is not a chat log at all is an error.
pub fn parse_chat_history(body: &str) -> HistoryResult<Vec<Shape>> {
    let log: ChatLog = serde_json::from_str(body)?;
    let total = log.messages.len();
    let shapes: Vec<Shape> = log
        .messages
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| match embedded::<ShapeHolder>(&entry.message) {
            Ok(holder) => Some(holder.shape),
            Err(e) => {
                log::warn!("Skipping chat history entry {i}: {e}");
                None
            }
        })
        .collect();
    log::debug!("Parsed {} of {total} chat history entries", shapes.len());
    Ok(shapes)
}

/// Parse a movements response. Malformed entries are skipped with a warning.
pub fn parse_movements(body: &str) -> HistoryResult<Vec<Movement>> {
    let log: MovementLog = serde_json::from_str(body)?;
    Ok(log
        .movements
        .iter()
        .filter_map(|entry| {
            let index = entry.shape_index.as_u64().and_then(|i| usize::try_from(i).ok());
            let Some(index) = index else {
                log::warn!("Skipping movement with index {}", entry.shape_index);
                return None;
            };
            match embedded::<Shape>(&entry.shape_data) {
                Ok(shape) => Some(Movement { index, shape }),
                Err(e) => {
                    log::warn!("Skipping movement for shape {index}: {e}");
                    None
                }
            }
        })
        .collect())
}

/// Apply recorded moves in order. Moves naming an index past the end are
/// ignored.
pub fn apply_movements(shapes: &mut [Shape], movements: Vec<Movement>) {
    for Movement { index, shape } in movements {
        match shapes.get_mut(index) {
            Some(slot) => *slot = shape,
            None => log::debug!("Ignoring movement for missing shape {index}"),
        }
    }
}

/// Combine the two history responses. The chat log is required; a failed or
/// malformed movements response is logged and the unmoved shapes returned.
pub fn assemble(
    chats: HistoryResult<String>,
    movements: HistoryResult<String>,
) -> HistoryResult<Vec<Shape>> {
    let mut shapes = parse_chat_history(&chats?)?;

    match movements.and_then(|body| parse_movements(&body)) {
        Ok(movements) => apply_movements(&mut shapes, movements),
        Err(e) => log::error!("Error fetching shape movements: {e}"),
    }

    Ok(shapes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::DEFAULT_STROKE_COLOR;

    const CHATS: &str = concat!(
        r#"{"messages":["#,
        r#"{"message":"{\"shape\":{\"type\":\"rect\","#,
        r#"\"x\":10,\"y\":10,\"width\":100,\"height\":50}}"},"#,
        r#"{"message":"hello everyone"},"#,
        r#"{"message":"{\"shape\":{\"type\":\"line\","#,
        r##"\"x1\":0,\"y1\":0,\"x2\":5,\"y2\":5,\"color\":\"#FF3333\"}}"}"##,
        "]}",
    );

    const MOVES: &str = concat!(
        r#"{"movements":["#,
        r#"{"shapeIndex":0,"shapeData":"{\"type\":\"rect\","#,
        r#"\"x\":40,\"y\":40,\"width\":100,\"height\":50}"},"#,
        r#"{"shapeIndex":7,"shapeData":"{\"type\":\"rect\","#,
        r#"\"x\":0,\"y\":0,\"width\":1,\"height\":1}"}"#,
        "]}",
    );

    #[test]
    fn test_urls() {
        assert_eq!(chats_url("https://api.example/", "r1"), "https://api.example/chats/r1");
        assert_eq!(
            movements_url("https://api.example", "r1"),
            "https://api.example/shapeMovements/r1"
        );
    }

    #[test]
    fn test_parse_chat_history_skips_non_shapes() {
        let shapes = parse_chat_history(CHATS).unwrap();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].color().as_str(), DEFAULT_STROKE_COLOR);
        assert_eq!(shapes[1].kind(), "line");
        assert_eq!(shapes[1].color().as_str(), "#FF3333");
    }

    #[test]
    fn test_parse_chat_history_rejects_garbage() {
        assert!(matches!(parse_chat_history("<html>"), Err(HistoryError::Decode(_))));
    }

    #[test]
    fn test_assemble_applies_movements() {
        let shapes = assemble(Ok(CHATS.to_string()), Ok(MOVES.to_string())).unwrap();
        assert_eq!(shapes.len(), 2);
        match &shapes[0] {
            Shape::Rect(r) => assert!((r.x - 40.0).abs() < f64::EPSILON),
            other => panic!("expected rect, got {other:?}"),
        }
    }

    #[test]
    fn test_assemble_tolerates_movement_failure() {
        let failed = Err(HistoryError::Status {
            url: "x".to_string(),
            status: 500,
        });
        let shapes = assemble(Ok(CHATS.to_string()), failed).unwrap();
        assert_eq!(shapes.len(), 2);
        match &shapes[0] {
            Shape::Rect(r) => assert!((r.x - 10.0).abs() < f64::EPSILON),
            other => panic!("expected rect, got {other:?}"),
        }
    }

    #[test]
    fn test_assemble_fails_without_chats() {
        let failed = Err(HistoryError::Unavailable("offline".to_string()));
        assert!(assemble(failed, Ok(MOVES.to_string())).is_err());
    }

    #[test]
    fn test_parse_movements_skips_bad_entries() {
        let body = r#"{"movements":[
            {"shapeIndex":-1,"shapeData":"{}"},
            {"shapeIndex":2,"shapeData":"not json"},
            {"shapeIndex":1,"shapeData":{"type":"circle","centerX":1,"centerY":1,"radius":2}}
        ]}"#;
        let movements = parse_movements(body).unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].index, 1);
        assert_eq!(movements[0].shape.kind(), "circle");
    }
}
