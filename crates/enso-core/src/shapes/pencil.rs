//! Freehand pencil stroke.

use super::{HitTolerance, ShapeTrait, StrokeColor, near_line};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A freehand drawing: a polyline that only ever grows while being drawn.
///
/// Decoding rejects a stroke with no points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PencilRecord")]
pub struct Pencil {
    /// Points in the path, in drawing order.
    pub points: Vec<Point>,
    /// Stroke color.
    #[serde(default)]
    pub color: StrokeColor,
}

#[derive(Deserialize)]
struct PencilRecord {
    points: Vec<Point>,
    #[serde(default)]
    color: StrokeColor,
}

impl TryFrom<PencilRecord> for Pencil {
    type Error = &'static str;

    fn try_from(record: PencilRecord) -> Result<Self, Self::Error> {
        if record.points.is_empty() {
            return Err("pencil stroke has no points");
        }
        Ok(Self::from_points(record.points, record.color))
    }
}

impl Pencil {
    /// Start a new stroke at `start`.
    pub fn new(start: Point, color: StrokeColor) -> Self {
        Self {
            points: vec![start],
            color,
        }
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>, color: StrokeColor) -> Self {
        Self { points, color }
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The most recent segment, if the stroke has at least two points.
    pub fn last_segment(&self) -> Option<(Point, Point)> {
        match self.points.as_slice() {
            [.., a, b] => Some((*a, *b)),
            _ => None,
        }
    }
}

impl ShapeTrait for Pencil {
    fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        self.points
            .iter()
            .fold(Rect::from_points(*first, *first), |rect, p| rect.union_pt(*p))
    }

    fn hit_test(&self, point: Point, tolerance: HitTolerance) -> bool {
        if let [only] = self.points.as_slice() {
            return (point - *only).hypot() <= tolerance.stroke;
        }
        self.points
            .windows(2)
            .any(|w| near_line(point, w[0], w[1], tolerance.stroke))
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();

        let Some(first) = self.points.first() else {
            return path;
        };

        path.move_to(*first);
        for point in self.points.iter().skip(1) {
            path.line_to(*point);
        }

        path
    }

    fn reference_point(&self) -> Point {
        self.points.first().copied().unwrap_or(Point::ZERO)
    }

    fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            *point += delta;
        }
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
    fn test_add_points() {
        let mut pencil = Pencil::new(Point::new(0.0, 0.0), StrokeColor::default());
        assert_eq!(pencil.len(), 1);
        assert!(pencil.last_segment().is_none());

        pencil.add_point(Point::new(10.0, 10.0));
        assert_eq!(pencil.len(), 2);
        assert_eq!(
            pencil.last_segment(),
            Some((Point::new(0.0, 0.0), Point::new(10.0, 10.0)))
        );
    }

    #[test]
    fn test_bounds() {
        let pencil = Pencil::from_points(
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 50.0),
                Point::new(50.0, 100.0),
            ],
            StrokeColor::default(),
        );

        let bounds = pencil.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let pencil = Pencil::from_points(
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
            ],
            StrokeColor::default(),
        );
        let tol = HitTolerance::default();
        assert!(pencil.hit_test(Point::new(50.0, 3.0), tol));
        assert!(pencil.hit_test(Point::new(97.0, 60.0), tol));
        assert!(!pencil.hit_test(Point::new(50.0, 50.0), tol));
    }

    #[test]
    fn test_single_point_hit_test() {
        let pencil = Pencil::new(Point::new(10.0, 10.0), StrokeColor::default());
        assert!(pencil.hit_test(Point::new(12.0, 12.0), HitTolerance::default()));
        assert!(!pencil.hit_test(Point::new(20.0, 20.0), HitTolerance::default()));
    }

    #[test]
    fn test_translate_moves_every_point() {
        let mut pencil = Pencil::from_points(
            vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
            StrokeColor::default(),
        );
        pencil.translate(Vec2::new(1.0, 2.0));
        assert_eq!(pencil.points, vec![Point::new(1.0, 2.0), Point::new(6.0, 7.0)]);
        assert_eq!(pencil.reference_point(), Point::new(1.0, 2.0));
    }
}
