//! Enso Render Library
//!
//! Drawing-surface abstraction for Enso, the scene painter, a recording
//! surface and the browser `<canvas>` 2D surface.

pub mod painter;
pub mod recording;
mod renderer;

#[cfg(target_arch = "wasm32")]
mod canvas2d;

pub use painter::{paint_scene, paint_segment, paint_shape};
pub use recording::{DrawCommand, RecordingSurface};
pub use renderer::{
    DEFAULT_BACKGROUND, DEFAULT_STROKE_WIDTH, RenderContext, RenderResult, RendererError, Surface,
    css_color,
};

#[cfg(target_arch = "wasm32")]
pub use canvas2d::Canvas2dSurface;
