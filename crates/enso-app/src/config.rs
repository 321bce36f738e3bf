//! Engine configuration.

use enso_core::camera::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_ZOOM_STEP};
use enso_core::shapes::STROKE_HIT_PIXELS;
use enso_render::{DEFAULT_BACKGROUND, DEFAULT_STROKE_WIDTH};
use peniko::Color;

use crate::engine::EngineError;

/// Padding kept around the content by `center_view`, in world units.
pub const DEFAULT_FIT_PADDING: f64 = 100.0;

/// Highest zoom `center_view` will pick, so small drawings are not blown up.
pub const DEFAULT_MAX_FIT_ZOOM: f64 = 1.0;

/// Tunables for an [`Engine`](crate::Engine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lowest zoom the wheel can reach.
    pub min_zoom: f64,
    /// Highest zoom the wheel can reach.
    pub max_zoom: f64,
    /// Zoom multiplier per wheel event.
    pub zoom_step: f64,
    /// Screen distance within which lines and pencil strokes are hit.
    pub hit_tolerance_px: f64,
    /// Stroke width in world units.
    pub stroke_width: f64,
    pub background_color: Color,
    /// Padding around content for `center_view`, in world units.
    pub fit_padding: f64,
    /// Zoom cap for `center_view`.
    pub max_fit_zoom: f64,
    /// Drop inbound shapes that are already in the store. Relays that echo a
    /// sender's own messages back would otherwise duplicate every shape.
    pub suppress_echoes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: DEFAULT_ZOOM_STEP,
            hit_tolerance_px: STROKE_HIT_PIXELS,
            stroke_width: DEFAULT_STROKE_WIDTH,
            background_color: DEFAULT_BACKGROUND,
            fit_padding: DEFAULT_FIT_PADDING,
            max_fit_zoom: DEFAULT_MAX_FIT_ZOOM,
            suppress_echoes: true,
        }
    }
}

impl EngineConfig {
    /// Check that the numbers describe a usable view.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(EngineError::InvalidConfig(format!(
                "zoom bounds [{}, {}] must be positive and ordered",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.zoom_step <= 1.0 {
            return Err(EngineError::InvalidConfig(format!(
                "zoom step {} must be greater than 1",
                self.zoom_step
            )));
        }
        if self.hit_tolerance_px < 0.0 || self.stroke_width <= 0.0 || self.fit_padding < 0.0 {
            return Err(EngineError::InvalidConfig(
                "tolerance, stroke width and padding must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.min_zoom - 0.1).abs() < f64::EPSILON);
        assert!((config.max_zoom - 10.0).abs() < f64::EPSILON);
        assert!((config.zoom_step - 1.1).abs() < f64::EPSILON);
        assert!(config.suppress_echoes);
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let config = EngineConfig {
            min_zoom: 5.0,
            max_zoom: 1.0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_shrinking_step() {
        let config = EngineConfig {
            zoom_step: 0.9,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
