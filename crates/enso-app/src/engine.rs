//! The drawing engine: owns a room's shapes, the view and the surface, turns
//! pointer input into shapes and keeps peers in sync.

use enso_core::camera::{Camera, wheel_factor};
use enso_core::history::{HistoryError, HistoryLoader, HistoryResult};
use enso_core::shapes::{HitTolerance, Pencil, Shape, StrokeColor};
use enso_core::store::ShapeStore;
use enso_core::sync::{self, Inbound, SyncError};
use enso_core::tools::{ToolKind, ToolManager, ToolState, construct};
use enso_render::{RenderContext, RendererError, Surface, paint_scene, paint_segment, paint_shape};
use kurbo::{Point, Size};
use thiserror::Error;

use crate::config::EngineConfig;

/// Engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("history load failed: {0}")]
    History(#[from] HistoryError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Key that engages panning while held.
pub const PAN_KEY: &str = " ";

/// What an inbound frame did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A shape was appended at this index.
    Appended(usize),
    /// The shape at this index was replaced.
    Replaced(usize),
    /// The frame was dropped (other room, unknown type, echo, stale index or
    /// malformed).
    Ignored,
}

/// Collaborative drawing engine for one room.
pub struct Engine<S: Surface> {
    room_id: String,
    surface: S,
    config: EngineConfig,
    camera: Camera,
    store: ShapeStore,
    tools: ToolManager,
    /// Encoded envelopes waiting to be sent.
    outgoing: Vec<String>,
}

impl<S: Surface> Engine<S> {
    /// Create an engine drawing on `surface`, with an empty store, and paint
    /// the first frame.
    pub fn new(room_id: impl Into<String>, surface: S, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let room_id = room_id.into();
        log::info!("Starting drawing engine for room {room_id}");

        let mut engine = Self {
            room_id,
            surface,
            camera: Camera::with_bounds(config.min_zoom, config.max_zoom),
            config,
            store: ShapeStore::new(),
            tools: ToolManager::new(),
            outgoing: Vec::new(),
        };
        engine.redraw();
        Ok(engine)
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn color(&self) -> &StrokeColor {
        &self.tools.current_color
    }

    pub fn interaction(&self) -> ToolState {
        self.tools.state
    }

    /// Whether the pan key is held.
    pub fn is_panning(&self) -> bool {
        self.tools.pan.engaged
    }

    // --- Controls ---

    /// Switch tools. A gesture in progress is ended: a preview is discarded,
    /// while a pencil stroke or a drag, which already changed the store, is
    /// announced to peers.
    pub fn set_tool(&mut self, tool: ToolKind) {
        match self.tools.finish() {
            ToolState::Drawing { .. } => self.redraw(),
            ToolState::Sketching { index } => self.emit_chat(index),
            ToolState::Dragging { index, .. } => self.emit_move(index),
            ToolState::Idle | ToolState::Missed => {}
        }
        log::debug!("Tool: {tool}");
        self.tools.set_tool(tool);
    }

    /// Color for shapes drawn from now on.
    pub fn set_color(&mut self, color: impl Into<StrokeColor>) {
        self.tools.set_color(color.into());
    }

    /// Back to zoom 1 with no pan.
    pub fn reset_view(&mut self) {
        self.camera.reset();
        self.redraw();
    }

    /// Fit every shape into the surface. An empty room resets the view.
    pub fn center_view(&mut self) {
        match self.store.bounds() {
            Some(bounds) => self.camera.fit_to_bounds(
                bounds,
                self.surface.size(),
                self.config.fit_padding,
                self.config.max_fit_zoom,
            ),
            None => self.camera.reset(),
        }
        self.redraw();
    }

    /// The surface changed size.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.surface.resize(Size::new(width, height));
        self.redraw();
    }

    // --- Rendering ---

    fn render_context(&self) -> RenderContext {
        RenderContext::new(self.camera.transform())
            .with_background(self.config.background_color)
            .with_stroke_width(self.config.stroke_width)
    }

    /// Clear the surface and stroke every shape.
    pub fn redraw(&mut self) {
        let ctx = self.render_context();
        paint_scene(&mut self.surface, self.store.iter(), &ctx);
    }

    fn hit_tolerance(&self) -> HitTolerance {
        HitTolerance::with_pixels(self.config.hit_tolerance_px, self.camera.zoom)
    }

    // --- Pointer input (screen coordinates) ---

    /// A press made while the pan key is held starts a pan drag, which owns
    /// the pointer until release. A tool gesture keeps the pointer until
    /// release even if the pan key goes down during it.
    pub fn pointer_down(&mut self, screen: Point) {
        if self.tools.is_active() || self.tools.pan.last.is_some() {
            return;
        }
        if self.tools.pan.engaged {
            self.tools.pan.last = Some(screen);
            return;
        }

        let world = self.camera.screen_to_world(screen);
        let tool = self.tools.current_tool;
        self.tools.state = match tool {
            ToolKind::Pencil => {
                let pencil = Pencil::new(world, self.tools.current_color.clone());
                let index = self.store.append(Shape::Pencil(pencil));
                ToolState::Sketching { index }
            }
            ToolKind::Move => match self.store.topmost_at(world, self.hit_tolerance()) {
                Some(index) => {
                    let reference = self
                        .store
                        .get(index)
                        .map_or(world, Shape::reference_point);
                    log::debug!("Grabbed shape {index}");
                    ToolState::Dragging {
                        index,
                        grab_offset: world - reference,
                    }
                }
                None => ToolState::Missed,
            },
            _ => ToolState::Drawing {
                start: world,
                current: world,
            },
        };
    }

    pub fn pointer_move(&mut self, screen: Point) {
        if self.tools.pan.last.is_some() {
            if let Some(delta) = self.tools.pan.advance(screen) {
                self.camera.pan(delta);
                self.redraw();
            }
            return;
        }

        let world = self.camera.screen_to_world(screen);
        match self.tools.state {
            ToolState::Drawing { start, .. } => {
                self.tools.state = ToolState::Drawing {
                    start,
                    current: world,
                };
                self.redraw();
                if let Some(preview) = self.tools.preview_shape() {
                    let ctx = self.render_context();
                    paint_shape(&mut self.surface, &preview, &ctx);
                }
            }
            ToolState::Sketching { index } => {
                let ctx = self.render_context();
                let Some(pencil) = self.store.get_mut(index).and_then(Shape::as_pencil_mut) else {
                    log::warn!("Pencil stroke {index} vanished mid-draw");
                    self.tools.state = ToolState::Idle;
                    return;
                };
                pencil.add_point(world);
                if let Some((a, b)) = pencil.last_segment() {
                    paint_segment(&mut self.surface, a, b, &pencil.color, &ctx);
                }
            }
            ToolState::Dragging { index, grab_offset } => {
                if let Some(shape) = self.store.get_mut(index) {
                    let target = world - grab_offset;
                    shape.translate(target - shape.reference_point());
                    self.redraw();
                }
            }
            ToolState::Idle | ToolState::Missed => {}
        }
    }

    pub fn pointer_up(&mut self, screen: Point) {
        if self.tools.pan.last.take().is_some() {
            return;
        }

        let world = self.camera.screen_to_world(screen);
        match self.tools.finish() {
            ToolState::Drawing { start, .. } => {
                let color = self.tools.current_color.clone();
                let Some(shape) = construct(self.tools.current_tool, start, world, color) else {
                    return;
                };
                let index = self.store.append(shape);
                self.redraw();
                self.emit_chat(index);
            }
            ToolState::Sketching { index } => self.emit_chat(index),
            ToolState::Dragging { index, .. } => self.emit_move(index),
            ToolState::Idle | ToolState::Missed => {}
        }
    }

    /// Zoom around the cursor. Negative `delta_y` zooms in. Returns whether
    /// the zoom changed.
    pub fn wheel(&mut self, screen: Point, delta_y: f64) -> bool {
        let factor = wheel_factor(delta_y, self.config.zoom_step);
        let changed = self.camera.zoom_at(screen, factor);
        if changed {
            self.redraw();
        }
        changed
    }

    /// Returns whether the key was handled.
    pub fn key_down(&mut self, key: &str) -> bool {
        if key == PAN_KEY {
            self.tools.pan.engaged = true;
            return true;
        }
        false
    }

    /// Returns whether the key was handled.
    pub fn key_up(&mut self, key: &str) -> bool {
        if key == PAN_KEY {
            self.tools.pan.release();
            return true;
        }
        false
    }

    // --- Sync ---

    fn queue(&mut self, encoded: Result<String, SyncError>) {
        match encoded {
            Ok(text) => self.outgoing.push(text),
            Err(e) => log::error!("Failed to encode outgoing message: {e}"),
        }
    }

    fn emit_chat(&mut self, index: usize) {
        let Some(shape) = self.store.get(index) else {
            return;
        };
        let encoded = sync::encode_chat(&self.room_id, shape);
        self.queue(encoded);
    }

    fn emit_move(&mut self, index: usize) {
        let Some(shape) = self.store.get(index) else {
            return;
        };
        let encoded = sync::encode_move(&self.room_id, index, shape);
        self.queue(encoded);
    }

    /// Drain envelopes produced by local gestures, oldest first.
    pub fn take_outgoing(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outgoing)
    }

    /// Apply a frame received on the room channel.
    pub fn handle_sync_text(&mut self, text: &str) -> SyncOutcome {
        let inbound = match sync::decode_inbound(&self.room_id, text) {
            Ok(Some(inbound)) => inbound,
            Ok(None) => return SyncOutcome::Ignored,
            Err(e) => {
                log::warn!("Dropping inbound message ({e}): {}", sync::preview(text));
                return SyncOutcome::Ignored;
            }
        };

        match inbound {
            Inbound::Chat(shape) => {
                if self.config.suppress_echoes && self.store.contains_equivalent(&shape) {
                    log::debug!("Ignoring echo of a stored {}", shape.kind());
                    return SyncOutcome::Ignored;
                }
                let index = self.store.append(shape);
                self.redraw();
                SyncOutcome::Appended(index)
            }
            Inbound::Move { index, shape } => {
                if !self.store.replace_at(index, shape) {
                    return SyncOutcome::Ignored;
                }
                self.redraw();
                SyncOutcome::Replaced(index)
            }
        }
    }

    // --- History ---

    /// Install the result of a history load. History goes in front of
    /// anything drawn or received meanwhile, so indices held by a gesture in
    /// progress are shifted. A failed load leaves the store untouched and is
    /// returned to the caller.
    pub fn apply_history(&mut self, result: HistoryResult<Vec<Shape>>) -> EngineResult<usize> {
        match result {
            Ok(shapes) => {
                let count = self.store.prepend(shapes);
                self.tools.state.shift_indices(count);
                log::info!("Loaded {count} shapes for room {}", self.room_id);
                self.redraw();
                Ok(count)
            }
            Err(e) => {
                log::error!("Failed to load history for room {}: {e}", self.room_id);
                Err(e.into())
            }
        }
    }

    /// Load the room's history from `loader` and install it.
    pub async fn load_history<L: HistoryLoader + ?Sized>(
        &mut self,
        loader: &L,
    ) -> EngineResult<usize> {
        let result = loader.load(&self.room_id).await;
        self.apply_history(result)
    }
}
