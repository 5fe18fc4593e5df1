//! Browser host
//!
//! Mounts one runtime on a canvas: requestAnimationFrame drives the loop,
//! DOM events feed the input sampler, and losing focus or visibility pauses
//! the game.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent, VisibilityState};

use super::driver::{FrameHandle, FrameScheduler, LoopDriver};
use crate::bridge::DomEventSink;
use crate::engine::Runtime;
use crate::games;
use crate::persistence::{KeyValueStore, LocalStorage, MemoryStore};
use crate::renderer::{CanvasSurface, Surface};
use crate::sim::input::to_logical;

/// Why a game could not be mounted
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("no browser window")]
    NoWindow,

    #[error("canvas #{id} not found")]
    CanvasNotFound { id: String },

    #[error("canvas has no 2d context")]
    NoContext,

    #[error("unknown game: {id}")]
    UnknownGame { id: String },
}

impl From<MountError> for JsValue {
    fn from(e: MountError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// requestAnimationFrame behind the `FrameScheduler` trait
pub struct RafScheduler {
    window: web_sys::Window,
    next: FrameHandle,
    /// Our token and the browser's request id for the one outstanding frame
    outstanding: Option<(FrameHandle, i32)>,
    on_frame: Rc<dyn Fn(FrameHandle)>,
}

impl FrameScheduler for RafScheduler {
    fn request(&mut self) -> FrameHandle {
        self.next = self.next.wrapping_add(1);
        let token = self.next;
        let on_frame = self.on_frame.clone();
        let closure = Closure::once(move |_time: f64| on_frame(token));
        match self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
        {
            Ok(id) => self.outstanding = Some((token, id)),
            Err(e) => log::warn!("requestAnimationFrame failed: {e:?}"),
        }
        closure.forget();
        token
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if let Some((token, id)) = self.outstanding {
            if token == handle {
                let _ = self.window.cancel_animation_frame(id);
                self.outstanding = None;
            }
        }
    }
}

/// One mounted game
pub struct WebHost {
    runtime: Box<dyn Runtime>,
    surface: CanvasSurface,
    driver: LoopDriver<RafScheduler>,
}

impl WebHost {
    fn tick(&mut self, handle: FrameHandle) {
        let surface = if self.surface.is_connected() {
            Some(&mut self.surface as &mut dyn Surface)
        } else {
            None
        };
        self.driver.on_frame(handle, self.runtime.as_mut(), surface);
    }

    pub fn runtime(&mut self) -> &mut dyn Runtime {
        self.runtime.as_mut()
    }

    pub fn start(&mut self) {
        self.driver.start();
    }

    pub fn stop(&mut self) {
        self.driver.stop();
    }

    /// Client coordinates to logical canvas coordinates
    fn logical(&self, client_x: i32, client_y: i32) -> Vec2 {
        let rect = self.surface.canvas().get_bounding_client_rect();
        to_logical(
            Vec2::new(client_x as f32, client_y as f32),
            Vec2::new(rect.left() as f32, rect.top() as f32),
            Vec2::new(rect.width() as f32, rect.height() as f32),
            self.runtime.size(),
        )
    }
}

fn open_store() -> Box<dyn KeyValueStore> {
    match LocalStorage::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("{e}; scores will not persist");
            Box::new(MemoryStore::new())
        }
    }
}

/// Mount `game_id` on the canvas with element id `canvas_id` and start it
pub fn mount(
    canvas_id: &str,
    game_id: &str,
    seed: u64,
) -> Result<Rc<RefCell<WebHost>>, MountError> {
    let window = web_sys::window().ok_or(MountError::NoWindow)?;
    let document = window.document().ok_or(MountError::NoWindow)?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        .ok_or_else(|| MountError::CanvasNotFound {
            id: canvas_id.to_string(),
        })?;

    let runtime = games::launch(game_id, seed, open_store(), Box::new(DomEventSink))
        .ok_or_else(|| MountError::UnknownGame {
            id: game_id.to_string(),
        })?;
    let size = runtime.size();
    let surface = CanvasSurface::new(canvas, size.x as u32, size.y as u32)
        .ok_or(MountError::NoContext)?;

    let host = Rc::new_cyclic(|weak: &Weak<RefCell<WebHost>>| {
        let weak = weak.clone();
        let on_frame: Rc<dyn Fn(FrameHandle)> = Rc::new(move |handle| {
            if let Some(host) = weak.upgrade() {
                host.borrow_mut().tick(handle);
            }
        });
        RefCell::new(WebHost {
            runtime,
            surface,
            driver: LoopDriver::new(RafScheduler {
                window: window.clone(),
                next: 0,
                outstanding: None,
                on_frame,
            }),
        })
    });

    setup_input_handlers(&host)?;
    setup_auto_pause(&host)?;
    host.borrow_mut().start();
    log::info!("Mounted {game_id} on #{canvas_id}");
    Ok(host)
}

fn setup_input_handlers(host: &Rc<RefCell<WebHost>>) -> Result<(), MountError> {
    let window = web_sys::window().ok_or(MountError::NoWindow)?;
    let canvas = host.borrow().surface.canvas().clone();

    // Keyboard
    {
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let key = event.key();
            if matches!(key.as_str(), " " | "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight") {
                event.prevent_default();
            }
            host.borrow_mut().runtime.input().key_down(&key, event.repeat());
        });
        let _ = window
            .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
    {
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            host.borrow_mut().runtime.input().key_up(&event.key());
        });
        let _ = window
            .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Mouse
    {
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let mut h = host.borrow_mut();
            let pos = h.logical(event.client_x(), event.client_y());
            h.runtime.input().pointer_move(pos);
        });
        let _ = canvas
            .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
        closure.forget();
    }
    {
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let mut h = host.borrow_mut();
            let pos = h.logical(event.client_x(), event.client_y());
            h.runtime.input().press(Some(pos));
        });
        let _ = canvas
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Touch acts as a pointer
    {
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
            event.prevent_default();
            if let Some(touch) = event.touches().get(0) {
                let mut h = host.borrow_mut();
                let pos = h.logical(touch.client_x(), touch.client_y());
                h.runtime.input().press(Some(pos));
            }
        });
        let _ = canvas
            .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
        closure.forget();
    }
    {
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
            event.prevent_default();
            if let Some(touch) = event.touches().get(0) {
                let mut h = host.borrow_mut();
                let pos = h.logical(touch.client_x(), touch.client_y());
                h.runtime.input().pointer_move(pos);
            }
        });
        let _ = canvas
            .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    Ok(())
}

fn setup_auto_pause(host: &Rc<RefCell<WebHost>>) -> Result<(), MountError> {
    let window = web_sys::window().ok_or(MountError::NoWindow)?;
    let document = window.document().ok_or(MountError::NoWindow)?;

    // Visibility change (tab switch, minimize)
    {
        let host = host.clone();
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if doc.visibility_state() == VisibilityState::Hidden {
                host.borrow_mut().runtime.suspend();
                log::info!("Auto-paused (tab hidden)");
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Window blur (click outside)
    {
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            host.borrow_mut().runtime.suspend();
            log::info!("Auto-paused (window blur)");
        });
        let _ = window
            .add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    Ok(())
}
