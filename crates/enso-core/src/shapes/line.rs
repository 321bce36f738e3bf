//! Line shape.

use super::{HitTolerance, ShapeTrait, StrokeColor, near_line};
use kurbo::{BezPath, Line as KurboLine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A straight line segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    /// Stroke color.
    #[serde(default)]
    pub color: StrokeColor,
}

impl Line {
    /// Create a new line.
    pub fn new(start: Point, end: Point, color: StrokeColor) -> Self {
        Self {
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
            color,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// Get the length of the line.
    pub fn length(&self) -> f64 {
        (self.end() - self.start()).hypot()
    }

    /// Get the midpoint of the line.
    pub fn midpoint(&self) -> Point {
        self.start().midpoint(self.end())
    }

    /// Get as a kurbo Line.
    pub fn as_kurbo(&self) -> KurboLine {
        KurboLine::new(self.start(), self.end())
    }
}

impl ShapeTrait for Line {
    fn bounds(&self) -> Rect {
        Rect::from_points(self.start(), self.end())
    }

    fn hit_test(&self, point: Point, tolerance: HitTolerance) -> bool {
        near_line(point, self.start(), self.end(), tolerance.stroke)
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start());
        path.line_to(self.end());
        path
    }

    fn reference_point(&self) -> Point {
        self.midpoint()
    }

    fn translate(&mut self, delta: Vec2) {
        self.x1 += delta.x;
        self.y1 += delta.y;
        self.x2 += delta.x;
        self.y2 += delta.y;
    }

    fn color(&self) -> &StrokeColor {
        &self.color
    }

    fn color_mut(&mut self) -> &mut StrokeColor {
        &mut self.color
    }
}
