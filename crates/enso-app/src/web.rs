//! WebAssembly entry point: mounts an [`Engine`] on a page's canvas and
//! socket.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use enso_core::history::{FetchHistoryLoader, HistoryLoader};
use enso_core::tools::ToolKind;
use enso_render::Canvas2dSurface;
use kurbo::Point;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MessageEvent,
    MouseEvent, WebSocket, WheelEvent,
};

use crate::config::EngineConfig;
use crate::engine::Engine;

/// `localStorage` key holding the session token for the history service.
const TOKEN_KEY: &str = "token";

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second initialization only fails because a logger is already set.
    let _ = console_log::init_with_level(log::Level::Info);
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn stored_token() -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    storage.get_item(TOKEN_KEY).ok()?
}

fn offset_point(event: &MouseEvent) -> Point {
    Point::new(f64::from(event.offset_x()), f64::from(event.offset_y()))
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// State shared between the handle and the registered callbacks.
struct Binding {
    engine: RefCell<Engine<Canvas2dSurface>>,
    socket: WebSocket,
    listeners: RefCell<Vec<Listener>>,
    detached: Cell<bool>,
}

impl Binding {
    /// Run `f` on the engine, then send whatever it queued.
    fn with_engine<R>(&self, f: impl FnOnce(&mut Engine<Canvas2dSurface>) -> R) -> R {
        let mut engine = self.engine.borrow_mut();
        let result = f(&mut engine);
        for text in engine.take_outgoing() {
            if let Err(e) = self.socket.send_with_str(&text) {
                log::warn!("Failed to send on room socket: {e:?}");
            }
        }
        result
    }

    fn listen<E, F>(
        self: &Rc<Self>,
        target: &EventTarget,
        event: &'static str,
        passive: bool,
        handler: F,
    ) -> Result<(), JsValue>
    where
        E: JsCast + 'static,
        F: Fn(&Binding, E) + 'static,
    {
        let weak: Weak<Binding> = Rc::downgrade(self);
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(binding) = weak.upgrade() else {
                return;
            };
            if binding.detached.get() {
                return;
            }
            if let Ok(event) = event.dyn_into::<E>() {
                handler(&binding, event);
            }
        });

        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            callback.as_ref().unchecked_ref(),
            &options,
        )?;

        self.listeners.borrow_mut().push(Listener {
            target: target.clone(),
            event,
            callback,
        });
        Ok(())
    }

    /// Unregister every callback. The socket stays open; it belongs to the
    /// page.
    fn detach(&self) {
        if self.detached.replace(true) {
            return;
        }
        for listener in self.listeners.borrow_mut().drain(..) {
            if let Err(e) = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.callback.as_ref().unchecked_ref(),
            ) {
                log::warn!("Failed to remove {} listener: {e:?}", listener.event);
            }
        }
        log::info!("Detached engine for room {}", self.engine.borrow().room_id());
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.detach();
    }
}

/// A mounted drawing engine.
#[wasm_bindgen]
pub struct EnsoHandle {
    binding: Rc<Binding>,
}

/// Mount a drawing engine on `canvas`, exchanging shapes for `room_id` over
/// `socket` and loading the room's history from `api_url`.
///
/// The socket is expected to have joined the room already.
#[wasm_bindgen]
pub fn mount(
    canvas: HtmlCanvasElement,
    socket: WebSocket,
    room_id: String,
    api_url: String,
) -> Result<EnsoHandle, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let surface = Canvas2dSurface::from_canvas(canvas.clone()).map_err(to_js)?;
    let engine = Engine::new(room_id.clone(), surface, EngineConfig::default()).map_err(to_js)?;

    let binding = Rc::new(Binding {
        engine: RefCell::new(engine),
        socket: socket.clone(),
        listeners: RefCell::new(Vec::new()),
        detached: Cell::new(false),
    });

    binding.listen(&canvas, "mousedown", true, |b, e: MouseEvent| {
        b.with_engine(|engine| engine.pointer_down(offset_point(&e)));
    })?;
    binding.listen(&canvas, "mousemove", true, |b, e: MouseEvent| {
        b.with_engine(|engine| engine.pointer_move(offset_point(&e)));
    })?;
    binding.listen(&canvas, "mouseup", true, |b, e: MouseEvent| {
        b.with_engine(|engine| engine.pointer_up(offset_point(&e)));
    })?;
    binding.listen(&canvas, "wheel", false, |b, e: WheelEvent| {
        e.prevent_default();
        b.with_engine(|engine| engine.wheel(offset_point(&e), e.delta_y()));
    })?;
    binding.listen(&window, "keydown", true, |b, e: KeyboardEvent| {
        b.with_engine(|engine| engine.key_down(&e.key()));
    })?;
    binding.listen(&window, "keyup", true, |b, e: KeyboardEvent| {
        b.with_engine(|engine| engine.key_up(&e.key()));
    })?;
    binding.listen(&socket, "message", true, |b, e: MessageEvent| match e.data().as_string() {
        Some(text) => {
            b.with_engine(|engine| engine.handle_sync_text(&text));
        }
        None => log::debug!("Ignoring non-text socket frame"),
    })?;

    let weak = Rc::downgrade(&binding);
    let loader = FetchHistoryLoader::new(api_url).with_token(stored_token());
    wasm_bindgen_futures::spawn_local(async move {
        let result = loader.load(&room_id).await;
        let Some(binding) = weak.upgrade() else {
            return;
        };
        if binding.detached.get() {
            return;
        }
        // Failures are logged by the engine; the room stays usable.
        let _ = binding.with_engine(|engine| engine.apply_history(result));
    });

    log::info!("Mounted engine on canvas for room {}", binding.engine.borrow().room_id());
    Ok(EnsoHandle { binding })
}

#[wasm_bindgen]
impl EnsoHandle {
    /// Select a tool by name: rect, circle, triangle, line, pencil or move.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&self, name: &str) -> Result<(), JsValue> {
        let tool: ToolKind = name.parse().map_err(to_js)?;
        self.binding.with_engine(|engine| engine.set_tool(tool));
        Ok(())
    }

    /// Set the stroke color for new shapes, as a CSS color string.
    #[wasm_bindgen(js_name = setColor)]
    pub fn set_color(&self, color: &str) {
        self.binding.with_engine(|engine| engine.set_color(color));
    }

    #[wasm_bindgen(js_name = resetView)]
    pub fn reset_view(&self) {
        self.binding.with_engine(|engine| engine.reset_view());
    }

    #[wasm_bindgen(js_name = centerView)]
    pub fn center_view(&self) {
        self.binding.with_engine(|engine| engine.center_view());
    }

    /// Resize the canvas backing store and repaint.
    pub fn resize(&self, width: f64, height: f64) {
        self.binding.with_engine(|engine| engine.resize(width, height));
    }

    /// Unregister all listeners. The socket is left open.
    pub fn destroy(&self) {
        self.binding.detach();
    }
}
