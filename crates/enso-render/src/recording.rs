//! A surface that records draw calls instead of rasterizing them.
//!
//! Used by tests and by the headless peer, where there is nothing to draw
//! on but the sequence of frames is still useful to inspect.

use crate::renderer::Surface;
use kurbo::{Affine, BezPath, Size};
use peniko::Color;

/// One recorded draw call. Colors are stored as 8-bit RGBA.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        rgba: [u8; 4],
    },
    Stroke {
        path: BezPath,
        transform: Affine,
        rgba: [u8; 4],
        width: f64,
    },
}

fn rgba(color: Color) -> [u8; 4] {
    let c = color.to_rgba8();
    [c.r, c.g, c.b, c.a]
}

/// Display-list surface.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: Size,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// Everything drawn since the last [`take_commands`](Self::take_commands).
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of strokes recorded.
    pub fn stroke_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke { .. }))
            .count()
    }

    /// Commands since the most recent clear, i.e. the current frame.
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear { .. }))
            .unwrap_or(0);
        &self.commands[start..]
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn resize(&mut self, size: Size) {
        self.size = size;
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear { rgba: rgba(color) });
    }

    fn stroke(&mut self, path: &BezPath, transform: Affine, color: Color, width: f64) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            transform,
            rgba: rgba(color),
            width,
        });
    }
}
