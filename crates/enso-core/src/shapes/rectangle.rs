//! Rectangle shape.

use super::{HitTolerance, ShapeTrait, StrokeColor, contains_inclusive};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle anchored at the point where the drag started.
///
/// `width` and `height` keep the sign of the drag, so the origin is not
/// necessarily the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Origin x (drag start).
    pub x: f64,
    /// Origin y (drag start).
    pub y: f64,
    /// Signed width.
    pub width: f64,
    /// Signed height.
    pub height: f64,
    /// Stroke color.
    #[serde(default)]
    pub color: StrokeColor,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64, color: StrokeColor) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color,
        }
    }

    /// Create a rectangle spanning a drag from `start` to `end`.
    pub fn from_drag(start: Point, end: Point, color: StrokeColor) -> Self {
        Self::new(start.x, start.y, end.x - start.x, end.y - start.y, color)
    }

    /// The origin (drag start) corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Get the rectangle as a normalized kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height).abs()
    }
}

impl ShapeTrait for Rectangle {
    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, _tolerance: HitTolerance) -> bool {
        contains_inclusive(self.as_rect(), point)
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn reference_point(&self) -> Point {
        self.origin()
    }

    fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    fn color(&self) -> &StrokeColor {
        &self.color
    }

    fn color_mut(&mut self) -> &mut StrokeColor {
        &mut self.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_test() {
        let rect = Rectangle::new(10.0, 10.0, 100.0, 50.0, StrokeColor::default());
        assert!(rect.hit_test(Point::new(50.0, 30.0), HitTolerance::default()));
        assert!(!rect.hit_test(Point::new(200.0, 200.0), HitTolerance::default()));
        assert!(rect.hit_test(Point::new(110.0, 60.0), HitTolerance::default()));
    }

    #[test]
    fn test_reversed_drag_hit_test() {
        let rect = Rectangle::from_drag(
            Point::new(110.0, 60.0),
            Point::new(10.0, 10.0),
            StrokeColor::default(),
        );
        assert!(rect.width < 0.0 && rect.height < 0.0);
        assert!(rect.hit_test(Point::new(50.0, 30.0), HitTolerance::default()));
        assert!(!rect.hit_test(Point::new(5.0, 30.0), HitTolerance::default()));
    }

    #[test]
    fn test_bounds_normalized() {
        let rect = Rectangle::new(10.0, 20.0, -10.0, -20.0, StrokeColor::default());
        let bounds = rect.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_translate_keeps_size() {
        let mut rect = Rectangle::new(0.0, 0.0, 30.0, 40.0, StrokeColor::default());
        rect.translate(Vec2::new(5.0, -5.0));
        assert!((rect.x - 5.0).abs() < f64::EPSILON);
        assert!((rect.y + 5.0).abs() < f64::EPSILON);
        assert!((rect.width - 30.0).abs() < f64::EPSILON);
        assert!((rect.height - 40.0).abs() < f64::EPSILON);
    }
}
