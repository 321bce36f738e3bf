//! Shape definitions for the whiteboard.

mod circle;
mod line;
mod pencil;
mod rectangle;
mod triangle;

pub use circle::Circle;
pub use line::Line;
pub use pencil::Pencil;
pub use rectangle::Rectangle;
pub use triangle::Triangle;

use kurbo::{BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Color assigned to shapes that were persisted before strokes carried a color.
pub const DEFAULT_STROKE_COLOR: &str = "#FFFFFF";

/// Preset stroke colors offered by the toolbar.
pub const PALETTE: [&str; 9] = [
    "#FFFFFF", "#FF3333", "#33FF33", "#3333FF", "#FFFF33", "#FF33FF", "#33FFFF", "#FF9933",
    "#9933FF",
];

/// Screen-space distance (in pixels) within which a stroke counts as hit.
pub const STROKE_HIT_PIXELS: f64 = 5.0;

/// Area tolerance for the triangle containment test, in world units at zoom 1.
pub const TRIANGLE_AREA_EPSILON: f64 = 1.0;

/// CSS stroke color as exchanged with peers (e.g. `"#FF3333"`).
///
/// Deserializing a shape without a color yields [`DEFAULT_STROKE_COLOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeColor(String);

impl StrokeColor {
    pub fn new(css: impl Into<String>) -> Self {
        Self(css.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve to a paint color, falling back to the default stroke for
    /// strings that are not understood.
    pub fn to_color(&self) -> Color {
        parse_css_color(&self.0).unwrap_or_else(|| {
            log::warn!("Unrecognized stroke color '{}', using default", self.0);
            Color::from_rgba8(255, 255, 255, 255)
        })
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        Self::new(DEFAULT_STROKE_COLOR)
    }
}

impl From<&str> for StrokeColor {
    fn from(css: &str) -> Self {
        Self::new(css)
    }
}

/// Parse a CSS color string like "#ff0000", "#f00" or "rgba(255, 0, 0, 0.5)".
pub fn parse_css_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (slot, c) in rgb.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 17;
                }
                Some(Color::from_rgba8(rgb[0], rgb[1], rgb[2], 255))
            }
            6 => Some(Color::from_rgba8(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Some(Color::from_rgba8(
                channel(0)?,
                channel(2)?,
                channel(4)?,
                channel(6)?,
            )),
            _ => None,
        };
    }

    let inner = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let rgb = |i: usize| parts.get(i)?.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0) as u8);
    let alpha = match parts.len() {
        3 => 255,
        4 => (parts[3].parse::<f64>().ok()?.clamp(0.0, 1.0) * 255.0).round() as u8,
        _ => return None,
    };
    Some(Color::from_rgba8(rgb(0)?, rgb(1)?, rgb(2)?, alpha))
}

/// Hit-test tolerances in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTolerance {
    /// Maximum distance from a stroke (lines and pencil paths).
    pub stroke: f64,
    /// Slack allowed in the triangle area comparison.
    pub area: f64,
}

impl HitTolerance {
    /// Default tolerances converted to world units for the given zoom.
    pub fn for_zoom(zoom: f64) -> Self {
        Self::with_pixels(STROKE_HIT_PIXELS, zoom)
    }

    /// Tolerances for a custom stroke pixel distance at the given zoom.
    pub fn with_pixels(stroke_pixels: f64, zoom: f64) -> Self {
        Self {
            stroke: stroke_pixels / zoom,
            area: TRIANGLE_AREA_EPSILON / zoom,
        }
    }
}

impl Default for HitTolerance {
    fn default() -> Self {
        Self::for_zoom(1.0)
    }
}

/// Perpendicular distance from a point to the infinite line through `a` and `b`.
pub fn perpendicular_distance(point: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;

    let len_sq = dx * dx + dy * dy;
    if len_sq < f64::EPSILON {
        return (point - a).hypot();
    }

    // Area of triangle * 2 / base = height
    let area2 = ((point.x - a.x) * dy - (point.y - a.y) * dx).abs();
    area2 / len_sq.sqrt()
}

/// Whether a point lies within `tolerance` of the line through `a` and `b`.
/// The line runs past both endpoints.
pub fn near_line(point: Point, a: Point, b: Point, tolerance: f64) -> bool {
    perpendicular_distance(point, a, b) <= tolerance
}

/// Like `Rect::contains`, but the far edges count as inside.
pub fn contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Unsigned area of the triangle `a`, `b`, `c`.
pub fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    ((a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y)) / 2.0).abs()
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in world coordinates) hits this shape.
    fn hit_test(&self, point: Point, tolerance: HitTolerance) -> bool;

    /// Get the path representation for rendering.
    fn to_path(&self) -> BezPath;

    /// Anchor used to keep a dragged shape at a fixed offset from the cursor.
    fn reference_point(&self) -> Point;

    /// Rigidly move every defining point by `delta`.
    fn translate(&mut self, delta: Vec2);

    /// Get the stroke color.
    fn color(&self) -> &StrokeColor;

    /// Get mutable stroke color.
    fn color_mut(&mut self) -> &mut StrokeColor;
}

/// Enum wrapper for all shape types, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rect(Rectangle),
    Circle(Circle),
    Triangle(Triangle),
    Line(Line),
    Pencil(Pencil),
}

impl Shape {
    /// Wire name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Rect(_) => "rect",
            Shape::Circle(_) => "circle",
            Shape::Triangle(_) => "triangle",
            Shape::Line(_) => "line",
            Shape::Pencil(_) => "pencil",
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rect(s) => s.bounds(),
            Shape::Circle(s) => s.bounds(),
            Shape::Triangle(s) => s.bounds(),
            Shape::Line(s) => s.bounds(),
            Shape::Pencil(s) => s.bounds(),
        }
    }

    pub fn hit_test(&self, point: Point, tolerance: HitTolerance) -> bool {
        match self {
            Shape::Rect(s) => s.hit_test(point, tolerance),
            Shape::Circle(s) => s.hit_test(point, tolerance),
            Shape::Triangle(s) => s.hit_test(point, tolerance),
            Shape::Line(s) => s.hit_test(point, tolerance),
            Shape::Pencil(s) => s.hit_test(point, tolerance),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            Shape::Rect(s) => s.to_path(),
            Shape::Circle(s) => s.to_path(),
            Shape::Triangle(s) => s.to_path(),
            Shape::Line(s) => s.to_path(),
            Shape::Pencil(s) => s.to_path(),
        }
    }

    pub fn reference_point(&self) -> Point {
        match self {
            Shape::Rect(s) => s.reference_point(),
            Shape::Circle(s) => s.reference_point(),
            Shape::Triangle(s) => s.reference_point(),
            Shape::Line(s) => s.reference_point(),
            Shape::Pencil(s) => s.reference_point(),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Shape::Rect(s) => s.translate(delta),
            Shape::Circle(s) => s.translate(delta),
            Shape::Triangle(s) => s.translate(delta),
            Shape::Line(s) => s.translate(delta),
            Shape::Pencil(s) => s.translate(delta),
        }
    }

    pub fn color(&self) -> &StrokeColor {
        match self {
            Shape::Rect(s) => s.color(),
            Shape::Circle(s) => s.color(),
            Shape::Triangle(s) => s.color(),
            Shape::Line(s) => s.color(),
            Shape::Pencil(s) => s.color(),
        }
    }

    pub fn color_mut(&mut self) -> &mut StrokeColor {
        match self {
            Shape::Rect(s) => s.color_mut(),
            Shape::Circle(s) => s.color_mut(),
            Shape::Triangle(s) => s.color_mut(),
            Shape::Line(s) => s.color_mut(),
            Shape::Pencil(s) => s.color_mut(),
        }
    }

    /// Get the pencil path if this shape is one.
    pub fn as_pencil_mut(&mut self) -> Option<&mut Pencil> {
        match self {
            Shape::Pencil(p) => Some(p),
            _ => None,
        }
    }
}

/// Bounding box over the defining points of every shape, or `None` when there
/// are no shapes. Pencil strokes without points are skipped.
pub fn bounding_box<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> Option<Rect> {
    shapes
        .into_iter()
        .filter(|shape| !matches!(shape, Shape::Pencil(p) if p.is_empty()))
        .map(Shape::bounds)
        .reduce(|acc, bounds| acc.union(bounds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_wire_format() {
        let shape = Shape::Rect(Rectangle::new(10.0, 10.0, 100.0, 50.0, "#FF3333".into()));
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["type"], "rect");
        assert_eq!(json["width"], 100.0);
        assert_eq!(json["color"], "#FF3333");

        let circle: Shape = serde_json::from_str(
            r##"{"type":"circle","centerX":5,"centerY":6,"radius":7,"color":"#33FF33"}"##,
        )
        .unwrap();
        match circle {
            Shape::Circle(c) => {
                assert!((c.center_x - 5.0).abs() < f64::EPSILON);
                assert!((c.radius - 7.0).abs() < f64::EPSILON);
            }
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_color_defaults() {
        let shape: Shape =
            serde_json::from_str(r#"{"type":"line","x1":0,"y1":0,"x2":1,"y2":1}"#).unwrap();
        assert_eq!(shape.color().as_str(), DEFAULT_STROKE_COLOR);

        let pencil: Shape =
            serde_json::from_str(r#"{"type":"pencil","points":[{"x":1,"y":2}]}"#).unwrap();
        assert_eq!(pencil.color().as_str(), DEFAULT_STROKE_COLOR);
    }

    #[test]
    fn test_empty_pencil_rejected() {
        let result = serde_json::from_str::<Shape>(r#"{"type":"pencil","points":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_bounding_box_skips_empty_pencil() {
        let shapes = vec![
            Shape::Rect(Rectangle::new(40.0, 50.0, 10.0, 10.0, StrokeColor::default())),
            Shape::Pencil(Pencil::from_points(Vec::new(), StrokeColor::default())),
        ];
        let bounds = bounding_box(&shapes).unwrap();
        assert!((bounds.x0 - 40.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result = serde_json::from_str::<Shape>(r#"{"type":"hexagon","x":0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_css_color() {
        let c = parse_css_color("#FF3333").unwrap().to_rgba8();
        assert_eq!((c.r, c.g, c.b, c.a), (255, 51, 51, 255));

        let c = parse_css_color("#fff").unwrap().to_rgba8();
        assert_eq!((c.r, c.g, c.b), (255, 255, 255));

        let c = parse_css_color("rgba(33, 235, 55, 0.5)").unwrap().to_rgba8();
        assert_eq!((c.r, c.g, c.b, c.a), (33, 235, 55, 128));

        assert!(parse_css_color("papayawhip").is_none());
        assert!(parse_css_color("#12345").is_none());
    }

    #[test]
    fn test_perpendicular_distance() {
        let d = perpendicular_distance(
            Point::new(50.0, 10.0),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        );
        assert!((d - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_near_line_includes_extension() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 0.0);
        assert!(near_line(Point::new(50.0, 4.0), a, b, 5.0));
        assert!(near_line(Point::new(150.0, 0.0), a, b, 5.0));
        assert!(near_line(Point::new(-300.0, -4.5), a, b, 5.0));
        assert!(!near_line(Point::new(150.0, 6.0), a, b, 5.0));
    }

    #[test]
    fn test_bounding_box() {
        let shapes = vec![
            Shape::Rect(Rectangle::new(10.0, 10.0, -20.0, 30.0, StrokeColor::default())),
            Shape::Circle(Circle::new(100.0, 100.0, -10.0, StrokeColor::default())),
            Shape::Pencil(Pencil::from_points(
                vec![Point::new(-50.0, 5.0), Point::new(0.0, 200.0)],
                StrokeColor::default(),
            )),
        ];
        let bounds = bounding_box(&shapes).unwrap();
        assert!((bounds.x0 + 50.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 5.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 200.0).abs() < f64::EPSILON);

        assert!(bounding_box(&Vec::<Shape>::new()).is_none());
    }
}
