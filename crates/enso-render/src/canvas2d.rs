//! Browser `<canvas>` surface (WASM).

use crate::renderer::{RenderResult, RendererError, Surface, css_color};
use kurbo::{Affine, BezPath, PathEl, Size};
use peniko::Color;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Draws through a canvas element's 2D context.
pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Canvas2dSurface {
    /// Acquire the 2D context of `canvas`. Fails if the browser will not
    /// provide one (e.g. the canvas already has a WebGL context).
    pub fn from_canvas(canvas: HtmlCanvasElement) -> RenderResult<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| RendererError::ContextUnavailable(format!("{e:?}")))?
            .ok_or_else(|| {
                RendererError::ContextUnavailable("getContext(\"2d\") returned null".to_string())
            })?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RendererError::ContextUnavailable("not a 2D context".to_string()))?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn set_transform(&self, transform: Affine) {
        let [a, b, c, d, e, f] = transform.as_coeffs();
        if let Err(err) = self.ctx.set_transform(a, b, c, d, e, f) {
            log::warn!("setTransform failed: {err:?}");
        }
    }

    fn trace(&self, path: &BezPath) {
        self.ctx.begin_path();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => self.ctx.move_to(p.x, p.y),
                PathEl::LineTo(p) => self.ctx.line_to(p.x, p.y),
                PathEl::QuadTo(p1, p2) => self.ctx.quadratic_curve_to(p1.x, p1.y, p2.x, p2.y),
                PathEl::CurveTo(p1, p2, p3) => {
                    self.ctx.bezier_curve_to(p1.x, p1.y, p2.x, p2.y, p3.x, p3.y)
                }
                PathEl::ClosePath => self.ctx.close_path(),
            }
        }
    }
}

impl Surface for Canvas2dSurface {
    fn size(&self) -> Size {
        Size::new(f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn resize(&mut self, size: Size) {
        self.canvas.set_width(size.width.max(0.0).round() as u32);
        self.canvas.set_height(size.height.max(0.0).round() as u32);
    }

    fn clear(&mut self, color: Color) {
        let size = self.size();
        self.set_transform(Affine::IDENTITY);
        self.ctx.clear_rect(0.0, 0.0, size.width, size.height);
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx.fill_rect(0.0, 0.0, size.width, size.height);
    }

    fn stroke(&mut self, path: &BezPath, transform: Affine, color: Color, width: f64) {
        self.set_transform(transform);
        self.ctx.set_stroke_style_str(&css_color(color));
        self.ctx.set_line_width(width);
        self.trace(path);
        self.ctx.stroke();
    }
}
