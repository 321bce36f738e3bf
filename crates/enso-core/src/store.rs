//! Ordered, index-addressed shape storage for one room.

use crate::shapes::{HitTolerance, Shape, bounding_box};
use kurbo::{Point, Rect};

/// The shapes of a room in drawing order.
///
/// A shape's position is its identity for the session: shapes are appended or
/// replaced in place, never removed, so indices stay stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeStore {
    shapes: Vec<Shape>,
}

impl ShapeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `shapes` in order.
    pub fn from_shapes(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }

    /// Add a shape at the end and return its index.
    pub fn append(&mut self, shape: Shape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    /// Replace the shape at `index`. Out-of-range indices are ignored.
    /// Returns whether a shape was replaced.
    pub fn replace_at(&mut self, index: usize, shape: Shape) -> bool {
        match self.shapes.get_mut(index) {
            Some(slot) => {
                *slot = shape;
                true
            }
            None => {
                log::debug!(
                    "Ignoring replace at index {index}, store has {} shapes",
                    self.shapes.len()
                );
                false
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Shape> {
        self.shapes.get_mut(index)
    }

    /// All shapes in drawing order.
    pub fn all(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Index of the topmost (most recently added) shape containing `point`.
    pub fn topmost_at(&self, point: Point, tolerance: HitTolerance) -> Option<usize> {
        self.shapes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, shape)| shape.hit_test(point, tolerance))
            .map(|(index, _)| index)
    }

    /// Whether a shape structurally equal to `shape` is already stored.
    ///
    /// Shapes are compared by their serialized form.
    pub fn contains_equivalent(&self, shape: &Shape) -> bool {
        let Ok(needle) = serde_json::to_value(shape) else {
            return false;
        };
        self.shapes
            .iter()
            .filter(|stored| stored.kind() == shape.kind())
            .filter_map(|stored| serde_json::to_value(stored).ok())
            .any(|value| value == needle)
    }

    /// Insert `history` before every existing shape. Existing shapes shift up
    /// by `history.len()`; the shift is returned so callers can adjust any
    /// indices they hold.
    pub fn prepend(&mut self, history: Vec<Shape>) -> usize {
        let shift = history.len();
        if shift > 0 {
            self.shapes.splice(0..0, history);
        }
        shift
    }

    /// Bounding box of every stored shape.
    pub fn bounds(&self) -> Option<Rect> {
        bounding_box(&self.shapes)
    }
}

impl<'a> IntoIterator for &'a ShapeStore {
    type Item = &'a Shape;
    type IntoIter = std::slice::Iter<'a, Shape>;

    fn into_iter(self) -> Self::IntoIter {
        self.shapes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Line, Rectangle, StrokeColor};

    fn rect(x: f64, y: f64) -> Shape {
        Shape::Rect(Rectangle::new(x, y, 100.0, 50.0, StrokeColor::default()))
    }

    #[test]
    fn test_append_returns_index() {
        let mut store = ShapeStore::new();
        assert_eq!(store.append(rect(0.0, 0.0)), 0);
        assert_eq!(store.append(rect(10.0, 0.0)), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_replace_out_of_range_is_noop() {
        let mut store = ShapeStore::from_shapes(vec![rect(0.0, 0.0)]);
        let before = store.clone();
        assert!(!store.replace_at(3, rect(99.0, 99.0)));
        assert_eq!(store, before);

        assert!(store.replace_at(0, rect(5.0, 5.0)));
        assert_eq!(store.get(0), Some(&rect(5.0, 5.0)));
    }

    #[test]
    fn test_topmost_at_prefers_latest() {
        let mut store = ShapeStore::new();
        store.append(rect(0.0, 0.0));
        store.append(rect(20.0, 20.0));
        let tol = HitTolerance::default();

        assert_eq!(store.topmost_at(Point::new(30.0, 30.0), tol), Some(1));
        assert_eq!(store.topmost_at(Point::new(5.0, 5.0), tol), Some(0));
        assert_eq!(store.topmost_at(Point::new(500.0, 500.0), tol), None);
    }

    #[test]
    fn test_contains_equivalent() {
        let mut store = ShapeStore::new();
        let line = Shape::Line(Line::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            "#FF3333".into(),
        ));
        assert!(!store.contains_equivalent(&line));
        store.append(line.clone());
        assert!(store.contains_equivalent(&line));

        let mut recolored = line.clone();
        *recolored.color_mut() = "#33FF33".into();
        assert!(!store.contains_equivalent(&recolored));

        // Parsed integers compare equal to the stored floats.
        let from_wire: Shape = serde_json::from_str(
            r##"{"type":"line","x1":0,"y1":0,"x2":10,"y2":10,"color":"#FF3333"}"##,
        )
        .unwrap();
        assert!(store.contains_equivalent(&from_wire));
    }

    #[test]
    fn test_prepend_shifts_existing() {
        let mut store = ShapeStore::from_shapes(vec![rect(1.0, 1.0)]);
        let shift = store.prepend(vec![rect(2.0, 2.0), rect(3.0, 3.0)]);
        assert_eq!(shift, 2);
        assert_eq!(store.get(2), Some(&rect(1.0, 1.0)));
        assert_eq!(store.get(0), Some(&rect(2.0, 2.0)));
    }

    #[test]
    fn test_bounds() {
        let store = ShapeStore::from_shapes(vec![rect(0.0, 0.0), rect(200.0, 100.0)]);
        let bounds = store.bounds().unwrap();
        assert!((bounds.x1 - 300.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 150.0).abs() < f64::EPSILON);
        assert!(ShapeStore::new().bounds().is_none());
    }
}
