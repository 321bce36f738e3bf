//! Triangle shape.

use super::{HitTolerance, ShapeTrait, StrokeColor, triangle_area};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A triangle given by its three vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub x3: f64,
    pub y3: f64,
    /// Stroke color.
    #[serde(default)]
    pub color: StrokeColor,
}

impl Triangle {
    /// Create a triangle from three vertices.
    pub fn new(a: Point, b: Point, c: Point, color: StrokeColor) -> Self {
        Self {
            x1: a.x,
            y1: a.y,
            x2: b.x,
            y2: b.y,
            x3: c.x,
            y3: c.y,
            color,
        }
    }

    /// Isosceles triangle filling the drag box: apex at the middle of the
    /// start edge, base corners at the two far corners.
    pub fn from_drag(start: Point, end: Point, color: StrokeColor) -> Self {
        let width = end.x - start.x;
        let height = end.y - start.y;
        Self::new(
            Point::new(start.x + width / 2.0, start.y),
            Point::new(start.x, start.y + height),
            Point::new(start.x + width, start.y + height),
            color,
        )
    }

    pub fn vertices(&self) -> [Point; 3] {
        [
            Point::new(self.x1, self.y1),
            Point::new(self.x2, self.y2),
            Point::new(self.x3, self.y3),
        ]
    }

    pub fn centroid(&self) -> Point {
        Point::new(
            (self.x1 + self.x2 + self.x3) / 3.0,
            (self.y1 + self.y2 + self.y3) / 3.0,
        )
    }
}

impl ShapeTrait for Triangle {
    fn bounds(&self) -> Rect {
        let [a, b, c] = self.vertices();
        Rect::from_points(a, b).union_pt(c)
    }

    fn hit_test(&self, point: Point, tolerance: HitTolerance) -> bool {
        let [a, b, c] = self.vertices();
        let total = triangle_area(a, b, c);
        let parts =
            triangle_area(point, b, c) + triangle_area(a, point, c) + triangle_area(a, b, point);
        (parts - total).abs() <= tolerance.area
    }

    fn to_path(&self) -> BezPath {
        let [a, b, c] = self.vertices();
        let mut path = BezPath::new();
        path.move_to(a);
        path.line_to(b);
        path.line_to(c);
        path.close_path();
        path
    }

    fn reference_point(&self) -> Point {
        self.centroid()
    }

    fn translate(&mut self, delta: Vec2) {
        self.x1 += delta.x;
        self.y1 += delta.y;
        self.x2 += delta.x;
        self.y2 += delta.y;
        self.x3 += delta.x;
        self.y3 += delta.y;
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
    fn test_from_drag_vertices() {
        let tri = Triangle::from_drag(
            Point::new(0.0, 0.0),
            Point::new(100.0, 60.0),
            StrokeColor::default(),
        );
        assert_eq!(
            tri.vertices(),
            [
                Point::new(50.0, 0.0),
                Point::new(0.0, 60.0),
                Point::new(100.0, 60.0)
            ]
        );
    }

    #[test]
    fn test_hit_test() {
        let tri = Triangle::from_drag(
            Point::new(0.0, 0.0),
            Point::new(100.0, 60.0),
            StrokeColor::default(),
        );
        let tol = HitTolerance::default();
        assert!(tri.hit_test(Point::new(50.0, 30.0), tol));
        assert!(tri.hit_test(Point::new(50.0, 0.0), tol));
        assert!(!tri.hit_test(Point::new(5.0, 5.0), tol));
        assert!(!tri.hit_test(Point::new(50.0, 70.0), tol));
    }

    #[test]
    fn test_translate_is_rigid() {
        let mut tri = Triangle::from_drag(
            Point::new(0.0, 0.0),
            Point::new(100.0, 60.0),
            StrokeColor::default(),
        );
        let before = tri.vertices();
        tri.translate(Vec2::new(10.0, -4.0));
        for (old, new) in before.iter().zip(tri.vertices()) {
            assert!((new.x - old.x - 10.0).abs() < f64::EPSILON);
            assert!((new.y - old.y + 4.0).abs() < f64::EPSILON);
        }
    }
}
