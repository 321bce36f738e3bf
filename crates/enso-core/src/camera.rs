//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom level a fresh or reset view starts at.
pub const DEFAULT_ZOOM: f64 = 1.0;

/// Default lower zoom bound.
pub const DEFAULT_MIN_ZOOM: f64 = 0.1;

/// Default upper zoom bound.
pub const DEFAULT_MAX_ZOOM: f64 = 10.0;

/// Multiplier applied per wheel notch.
pub const DEFAULT_ZOOM_STEP: f64 = 1.1;

/// Camera manages the view transform for the canvas.
///
/// It handles panning (translation) and zooming (scaling) operations,
/// converting between screen coordinates and world coordinates:
/// `world = (screen - offset) / zoom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current zoom level.
    pub zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: DEFAULT_ZOOM,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with custom zoom bounds.
    pub fn with_bounds(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            zoom: DEFAULT_ZOOM.clamp(min_zoom, max_zoom),
            ..Self::default()
        }
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts world coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling.
    ///
    /// This transform converts screen coordinates to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Whether `zoom` lies within this camera's bounds.
    pub fn accepts_zoom(&self, zoom: f64) -> bool {
        zoom >= self.min_zoom && zoom <= self.max_zoom
    }

    /// Zoom the camera, keeping the given screen point fixed.
    ///
    /// A change that would leave `[min_zoom, max_zoom]` is rejected and the
    /// camera stays as it was. Returns whether the zoom changed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) -> bool {
        let new_zoom = self.zoom * factor;
        if !self.accepts_zoom(new_zoom) {
            log::debug!(
                "Zoom {new_zoom:.3} outside [{}, {}], ignored",
                self.min_zoom,
                self.max_zoom
            );
            return false;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;
        self.offset = screen_point.to_vec2() - world_point.to_vec2() * new_zoom;
        true
    }

    /// Reset camera to default position and zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = DEFAULT_ZOOM.clamp(self.min_zoom, self.max_zoom);
    }

    /// Fit the camera to show the given bounding box centered in the
    /// viewport, leaving `padding` world units around it. The resulting zoom
    /// never exceeds `max_fit_zoom`.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64, max_fit_zoom: f64) {
        let padded = bounds.inflate(padding, padding);
        if padded.width() <= 0.0 || padded.height() <= 0.0 {
            self.reset();
            return;
        }

        let scale_x = viewport.width / padded.width();
        let scale_y = viewport.height / padded.height();
        self.zoom = scale_x
            .min(scale_y)
            .min(max_fit_zoom)
            .clamp(self.min_zoom, self.max_zoom);

        // Center the bounds in the viewport
        let bounds_center = padded.center();
        let viewport_center = Point::new(viewport.width / 2.0, viewport.height / 2.0);

        self.offset = Vec2::new(
            viewport_center.x - bounds_center.x * self.zoom,
            viewport_center.y - bounds_center.y * self.zoom,
        );
    }
}

/// Zoom multiplier for a wheel event: negative `delta_y` zooms in by `step`,
/// positive zooms out by its reciprocal. A zero delta leaves the zoom alone.
pub fn wheel_factor(delta_y: f64, step: f64) -> f64 {
    if delta_y < 0.0 {
        step
    } else if delta_y > 0.0 {
        1.0 / step
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.zoom - DEFAULT_ZOOM).abs() < f64::EPSILON);
        assert!((camera.min_zoom - 0.1).abs() < f64::EPSILON);
        assert!((camera.max_zoom - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_identity() {
        let camera = Camera::new();
        let screen = Point::new(100.0, 200.0);
        let world = camera.screen_to_world(screen);
        assert!((world.x - screen.x).abs() < f64::EPSILON);
        assert!((world.y - screen.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_offset() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(50.0, 100.0);
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_zoom() {
        let mut camera = Camera::new();
        camera.zoom = 2.0;
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        for zoom in [0.1, 0.37, 1.0, 1.5, 4.2, 10.0] {
            let mut camera = Camera::new();
            camera.offset = Vec2::new(30.0, -20.0);
            camera.zoom = zoom;

            let point = Point::new(123.0, 456.0);
            let back = camera.world_to_screen(camera.screen_to_world(point));

            assert!((back.x - point.x).abs() < 1e-9);
            assert!((back.y - point.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zoom_keeps_cursor_fixed() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(12.0, -7.0);
        let cursor = Point::new(300.0, 200.0);
        let before = camera.screen_to_world(cursor);

        assert!(camera.zoom_at(cursor, 1.1));
        let after = camera.screen_to_world(cursor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_rejected_outside_bounds() {
        let mut camera = Camera::new();
        camera.zoom = 9.5;
        assert!(!camera.zoom_at(Point::ZERO, 1.1));
        assert!((camera.zoom - 9.5).abs() < f64::EPSILON);

        camera.zoom = 0.105;
        assert!(!camera.zoom_at(Point::ZERO, 1.0 / 1.1));
        assert!((camera.zoom - 0.105).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wheel_factor() {
        assert!((wheel_factor(-120.0, 1.1) - 1.1).abs() < f64::EPSILON);
        assert!((wheel_factor(53.0, 1.1) - 1.0 / 1.1).abs() < f64::EPSILON);
        assert!((wheel_factor(0.0, 1.1) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pan() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(10.0, 20.0));
        assert!((camera.offset.x - 10.0).abs() < f64::EPSILON);
        assert!((camera.offset.y - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_to_bounds_caps_zoom() {
        let mut camera = Camera::new();
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        camera.fit_to_bounds(bounds, Size::new(1000.0, 1000.0), 100.0, 1.0);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);

        // Content center lands on the viewport center.
        let center = camera.world_to_screen(bounds.center());
        assert!((center.x - 500.0).abs() < 1e-9);
        assert!((center.y - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_to_bounds_zooms_out() {
        let mut camera = Camera::new();
        let bounds = Rect::new(-500.0, 0.0, 1500.0, 800.0);
        camera.fit_to_bounds(bounds, Size::new(800.0, 600.0), 100.0, 1.0);
        // Padded width 2200 → 800 / 2200.
        assert!((camera.zoom - 800.0 / 2200.0).abs() < 1e-12);
        let corner = camera.world_to_screen(Point::new(-600.0, 0.0));
        assert!(corner.x.abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(5.0, 5.0));
        camera.zoom_at(Point::ZERO, 2.0);
        camera.reset();
        assert_eq!(camera, Camera::new());
    }
}
