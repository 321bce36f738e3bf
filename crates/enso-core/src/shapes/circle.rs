//! Circle shape.

use super::{HitTolerance, ShapeTrait, StrokeColor};
use kurbo::{BezPath, Circle as KurboCircle, Point, Rect, Shape as KurboShape, Size, Vec2};
use serde::{Deserialize, Serialize};

/// A circle. The stored radius may be negative (a drag up or to the left);
/// geometry and rendering always use its absolute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    /// Center x.
    pub center_x: f64,
    /// Center y.
    pub center_y: f64,
    /// Signed radius.
    pub radius: f64,
    /// Stroke color.
    #[serde(default)]
    pub color: StrokeColor,
}

impl Circle {
    /// Create a new circle.
    pub fn new(center_x: f64, center_y: f64, radius: f64, color: StrokeColor) -> Self {
        Self {
            center_x,
            center_y,
            radius,
            color,
        }
    }

    /// Circle inscribed from a drag: the radius is half the larger drag
    /// extent and the center sits one radius from the start on both axes.
    pub fn from_drag(start: Point, end: Point, color: StrokeColor) -> Self {
        let radius = (end.x - start.x).max(end.y - start.y) / 2.0;
        Self::new(start.x + radius, start.y + radius, radius, color)
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }

    /// Non-negative radius used for geometry.
    pub fn effective_radius(&self) -> f64 {
        self.radius.abs()
    }

    pub fn as_kurbo(&self) -> KurboCircle {
        KurboCircle::new(self.center(), self.effective_radius())
    }
}

impl ShapeTrait for Circle {
    fn bounds(&self) -> Rect {
        let diameter = self.effective_radius() * 2.0;
        Rect::from_center_size(self.center(), Size::new(diameter, diameter))
    }

    fn hit_test(&self, point: Point, _tolerance: HitTolerance) -> bool {
        (point - self.center()).hypot() <= self.effective_radius()
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
    }

    fn reference_point(&self) -> Point {
        self.center()
    }

    fn translate(&mut self, delta: Vec2) {
        self.center_x += delta.x;
        self.center_y += delta.y;
    }

    fn color(&self) -> &StrokeColor {
        &self.color
    }

    fn color_mut(&mut self) -> &mut StrokeColor {
        &mut self.color
    }
}
