//! Drawing surface abstraction.

use kurbo::{Affine, BezPath, Size};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("2D rendering context unavailable: {0}")]
    ContextUnavailable(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Default canvas background.
pub const DEFAULT_BACKGROUND: Color = Color::from_rgba8(0, 0, 0, 255);

/// Default stroke width in world units.
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;

/// Context for a single render frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// World-to-screen transform.
    pub transform: Affine,
    /// Background color.
    pub background_color: Color,
    /// Stroke width in world units.
    pub stroke_width: f64,
}

impl RenderContext {
    /// Create a new render context.
    pub fn new(transform: Affine) -> Self {
        Self {
            transform,
            background_color: DEFAULT_BACKGROUND,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the stroke width.
    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }
}

/// A 2D surface shapes are stroked onto.
///
/// Implementations are immediate mode: every call draws right away and
/// nothing is retained between frames.
pub trait Surface {
    /// Surface size in pixels.
    fn size(&self) -> Size;

    /// Change the surface size. Content is not preserved.
    fn resize(&mut self, size: Size);

    /// Fill the whole surface with `color`, ignoring any transform.
    fn clear(&mut self, color: Color);

    /// Stroke `path`, given in world coordinates, through `transform`.
    fn stroke(&mut self, path: &BezPath, transform: Affine, color: Color, width: f64);
}

/// CSS notation for a color, e.g. `rgba(255, 51, 51, 1)`.
pub fn css_color(color: Color) -> String {
    let c = color.to_rgba8();
    let alpha = f64::from(c.a) / 255.0;
    format!("rgba({}, {}, {}, {})", c.r, c.g, c.b, (alpha * 1000.0).round() / 1000.0)
}
