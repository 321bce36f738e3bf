//! Scene painting on top of a [`Surface`].

use crate::renderer::{RenderContext, Surface};
use enso_core::shapes::{Shape, StrokeColor};
use kurbo::{BezPath, Point};

/// Clear the surface and stroke every shape in drawing order.
pub fn paint_scene<'a, S>(
    surface: &mut S,
    shapes: impl IntoIterator<Item = &'a Shape>,
    ctx: &RenderContext,
)
where
    S: Surface + ?Sized,
{
    surface.clear(ctx.background_color);
    for shape in shapes {
        paint_shape(surface, shape, ctx);
    }
}

/// Stroke a single shape, e.g. the preview of a drag in progress.
pub fn paint_shape<S: Surface + ?Sized>(surface: &mut S, shape: &Shape, ctx: &RenderContext) {
    surface.stroke(
        &shape.to_path(),
        ctx.transform,
        shape.color().to_color(),
        ctx.stroke_width,
    );
}

/// Stroke just the segment `a`-`b`, used to extend a pencil stroke without a
/// full redraw.
pub fn paint_segment<S: Surface + ?Sized>(
    surface: &mut S,
    a: Point,
    b: Point,
    color: &StrokeColor,
    ctx: &RenderContext,
) {
    let mut path = BezPath::new();
    path.move_to(a);
    path.line_to(b);
    surface.stroke(&path, ctx.transform, color.to_color(), ctx.stroke_width);
}
