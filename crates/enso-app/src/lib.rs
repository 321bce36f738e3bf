//! Enso Application Library
//!
//! The drawing engine that ties the shape store, camera and tool state to a
//! drawing surface and a sync channel, plus the browser binding.

pub mod config;
pub mod engine;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::EngineConfig;
pub use engine::{Engine, EngineError, EngineResult, PAN_KEY, SyncOutcome};
