//! In-memory history for testing and offline peers.

use super::{BoxFuture, HistoryError, HistoryLoader, HistoryResult};
use crate::shapes::Shape;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory room history. Rooms that were never recorded load as empty.
#[derive(Default)]
pub struct MemoryHistory {
    rooms: RwLock<HashMap<String, Vec<Shape>>>,
}

impl MemoryHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the recorded shapes of `room_id`.
    pub fn insert(&self, room_id: &str, shapes: Vec<Shape>) -> HistoryResult<()> {
        let mut rooms = self
            .rooms
            .write()
            .map_err(|e| HistoryError::Unavailable(format!("Lock error: {e}")))?;
        rooms.insert(room_id.to_string(), shapes);
        Ok(())
    }
}

impl HistoryLoader for MemoryHistory {
    fn load(&self, room_id: &str) -> BoxFuture<'_, HistoryResult<Vec<Shape>>> {
        let room_id = room_id.to_string();
        Box::pin(async move {
            let rooms = self
                .rooms
                .read()
                .map_err(|e| HistoryError::Unavailable(format!("Lock error: {e}")))?;
            Ok(rooms.get(&room_id).cloned().unwrap_or_default())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, StrokeColor};

    #[test]
    fn test_load_recorded_room() {
        let history = MemoryHistory::new();
        let rect = Shape::Rect(Rectangle::new(0.0, 0.0, 10.0, 10.0, StrokeColor::default()));
        history.insert("room", vec![rect.clone()]).unwrap();

        let shapes = pollster::block_on(history.load("room")).unwrap();
        assert_eq!(shapes, vec![rect]);
    }

    #[test]
    fn test_unknown_room_is_empty() {
        let history = MemoryHistory::new();
        let shapes = pollster::block_on(history.load("nowhere")).unwrap();
        assert!(shapes.is_empty());
    }
}
