//! Tool system for the whiteboard.

use crate::shapes::{Circle, Line, Rectangle, Shape, StrokeColor, Triangle};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    #[serde(rename = "rect")]
    Rectangle,
    Circle,
    Triangle,
    Line,
    Pencil,
    Move,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Triangle,
        ToolKind::Line,
        ToolKind::Pencil,
        ToolKind::Move,
    ];

    /// Name used by UI layers to select the tool.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Rectangle => "rect",
            ToolKind::Circle => "circle",
            ToolKind::Triangle => "triangle",
            ToolKind::Line => "line",
            ToolKind::Pencil => "pencil",
            ToolKind::Move => "move",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a tool name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool '{0}'")]
pub struct ParseToolError(pub String);

impl FromStr for ToolKind {
    type Err = ParseToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rect" | "rectangle" => Ok(ToolKind::Rectangle),
            "circle" => Ok(ToolKind::Circle),
            "triangle" => Ok(ToolKind::Triangle),
            "line" => Ok(ToolKind::Line),
            "pencil" => Ok(ToolKind::Pencil),
            "move" => Ok(ToolKind::Move),
            _ => Err(ParseToolError(s.to_string())),
        }
    }
}

/// Build the shape a drag tool produces for a drag from `start` to `end`.
/// Returns `None` for tools that do not construct from a drag.
pub fn construct(tool: ToolKind, start: Point, end: Point, color: StrokeColor) -> Option<Shape> {
    match tool {
        ToolKind::Rectangle => Some(Shape::Rect(Rectangle::from_drag(start, end, color))),
        ToolKind::Circle => Some(Shape::Circle(Circle::from_drag(start, end, color))),
        ToolKind::Triangle => Some(Shape::Triangle(Triangle::from_drag(start, end, color))),
        ToolKind::Line => Some(Shape::Line(Line::new(start, end, color))),
        ToolKind::Pencil | ToolKind::Move => None,
    }
}

/// State of a pointer interaction. Reset to `Idle` on pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ToolState {
    /// No pointer is down.
    #[default]
    Idle,
    /// A drag tool is previewing a shape from `start` to `current`.
    Drawing { start: Point, current: Point },
    /// A pencil stroke is growing at `index` in the store.
    Sketching { index: usize },
    /// The move tool grabbed the shape at `index`; `grab_offset` is the cursor
    /// position minus the shape's reference point at grab time.
    Dragging { index: usize, grab_offset: Vec2 },
    /// The move tool was pressed over empty canvas.
    Missed,
}

impl ToolState {
    /// Whether a pointer interaction is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self, ToolState::Idle)
    }

    /// Store index held by this state, if any.
    pub fn index(&self) -> Option<usize> {
        match self {
            ToolState::Sketching { index } | ToolState::Dragging { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Shift a held store index after shapes were inserted before it.
    pub fn shift_indices(&mut self, shift: usize) {
        match self {
            ToolState::Sketching { index } | ToolState::Dragging { index, .. } => *index += shift,
            _ => {}
        }
    }
}

/// Space-drag panning.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanState {
    /// Whether the pan key is held.
    pub engaged: bool,
    /// Last screen point of an active pan drag.
    pub last: Option<Point>,
}

impl PanState {
    /// Screen delta since the previous pan point, advancing to `point`.
    pub fn advance(&mut self, point: Point) -> Option<Vec2> {
        let last = self.last.replace(point)?;
        Some(point - last)
    }

    pub fn release(&mut self) {
        self.engaged = false;
        self.last = None;
    }
}

/// Manages the current tool, color and interaction state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    /// Stroke color applied to new shapes.
    pub current_color: StrokeColor,
    /// Space-drag panning state.
    pub pan: PanState,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool. Any interaction in progress is abandoned.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = ToolState::Idle;
    }

    /// Set the stroke color for subsequently created shapes.
    pub fn set_color(&mut self, color: StrokeColor) {
        self.current_color = color;
    }

    /// Check if a tool interaction is active.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Shape for the drag in progress, not yet committed.
    pub fn preview_shape(&self) -> Option<Shape> {
        match self.state {
            ToolState::Drawing { start, current } => {
                construct(self.current_tool, start, current, self.current_color.clone())
            }
            _ => None,
        }
    }

    /// End the current interaction and return the state it was in.
    pub fn finish(&mut self) -> ToolState {
        std::mem::take(&mut self.state)
    }
}
