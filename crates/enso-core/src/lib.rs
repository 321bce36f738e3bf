//! Enso Core Library
//!
//! Platform-agnostic data structures and logic for the Enso collaborative
//! whiteboard: shapes and their geometry, the view camera, the room's shape
//! store, tool state, the room sync protocol and history loading.

pub mod camera;
pub mod history;
pub mod shapes;
pub mod store;
pub mod sync;
pub mod tools;

pub use camera::Camera;
pub use history::{HistoryError, HistoryLoader, HistoryResult, MemoryHistory};
pub use shapes::{HitTolerance, Shape, ShapeTrait, StrokeColor};
pub use store::ShapeStore;
pub use sync::{ConnectionState, Inbound, SyncError, SyncEvent};
pub use tools::{ToolKind, ToolManager, ToolState};

#[cfg(not(target_arch = "wasm32"))]
pub use history::HttpHistoryLoader;
#[cfg(not(target_arch = "wasm32"))]
pub use sync::NativeWebSocket;

#[cfg(target_arch = "wasm32")]
pub use history::FetchHistoryLoader;
