//! WebAssembly entry point and canvas binding.

use scribble_core::{Brush, Listeners, PointerEvent, Sketchpad};
use scribble_render::CanvasSurface;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, EventTarget, HtmlCanvasElement, MouseEvent};

type Pad = Sketchpad<CanvasSurface>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// A sketchpad bound to a `<canvas>` element.
///
/// Mouse input is routed from the DOM into the sketchpad's listener registry,
/// and `requestAnimationFrame` drives the stage until the canvas leaves the
/// document or [`WebSketchpad::dispose`] is called.
#[wasm_bindgen]
pub struct WebSketchpad {
    pad: Rc<RefCell<Pad>>,
    dom_lifetime: web_sys::AbortController,
    _on_mouse: Vec<Closure<dyn FnMut(MouseEvent)>>,
}

#[wasm_bindgen]
impl WebSketchpad {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebSketchpad, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{}", canvas_id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("#{} is not a canvas", canvas_id)))?;

        let surface = CanvasSurface::new(canvas.clone()).map_err(to_js)?;
        let pad = Rc::new(RefCell::new(Sketchpad::new(surface, Brush::new())));

        let listeners = Rc::new(RefCell::new(Listeners::new()));
        Sketchpad::attach(&pad, &mut listeners.borrow_mut());

        let dom_lifetime = web_sys::AbortController::new()?;
        let options = AddEventListenerOptions::new();
        options.set_signal(&dom_lifetime.signal());

        let bindings: [(&EventTarget, &str, fn(f64, f64) -> PointerEvent); 3] = [
            (document.as_ref(), "mousemove", |x, y| PointerEvent::Move { x, y }),
            (canvas.as_ref(), "mousedown", |x, y| PointerEvent::Down { x, y }),
            (document.as_ref(), "mouseup", |x, y| PointerEvent::Up { x, y }),
        ];

        let mut on_mouse = Vec::with_capacity(bindings.len());
        for (target, kind, to_event) in bindings {
            let listeners = listeners.clone();
            let closure = Closure::wrap(Box::new(move |e: MouseEvent| {
                let event = to_event(f64::from(e.client_x()), f64::from(e.client_y()));
                listeners.borrow_mut().dispatch(&event);
            }) as Box<dyn FnMut(MouseEvent)>);

            target.add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                closure.as_ref().unchecked_ref(),
                &options,
            )?;
            on_mouse.push(closure);
        }

        start_frame_loop(pad.clone())?;
        log::info!("Sketchpad bound to #{}", canvas_id);

        Ok(Self {
            pad,
            dom_lifetime,
            _on_mouse: on_mouse,
        })
    }

    #[wasm_bindgen(js_name = setBrushSize)]
    pub fn set_brush_size(&self, size: i32) {
        self.pad.borrow_mut().brush_mut().set_size(i64::from(size));
    }

    #[wasm_bindgen(js_name = setBrushOpacity)]
    pub fn set_brush_opacity(&self, opacity: f64) {
        self.pad.borrow_mut().brush_mut().set_opacity(opacity);
    }

    /// Set the brush color from `#rgb` or `#rrggbb`.
    #[wasm_bindgen(js_name = setBrushColor)]
    pub fn set_brush_color(&self, hex: &str) -> Result<(), JsValue> {
        self.pad.borrow_mut().brush_mut().set_color_hex(hex).map_err(to_js)
    }

    /// PNG data URL of the drawing, without the cursor ring.
    #[wasm_bindgen(js_name = toDataUrl)]
    pub fn to_data_url(&self) -> Result<String, JsValue> {
        self.pad
            .borrow_mut()
            .export_with(|surface| surface.to_data_url())
            .map_err(to_js)
    }

    /// Remove the DOM listeners and stop the frame loop.
    pub fn dispose(&self) {
        self.dom_lifetime.abort();
        self.pad.borrow().dispose();
        log::debug!("Sketchpad disposed");
    }
}

fn request_frame(callback: &FrameCallback) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    if let Some(cb) = callback.borrow().as_ref() {
        window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    }
    Ok(())
}

/// Tick the pad once per animation frame until it reports detachment.
fn start_frame_loop(pad: Rc<RefCell<Pad>>) -> Result<(), JsValue> {
    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let next = callback.clone();

    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        let keep_going = pad.borrow_mut().frame();
        if keep_going {
            match request_frame(&next) {
                Ok(()) => return,
                Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
            }
        }
        // Break the callback's reference to itself so it can be freed.
        let _ = next.borrow_mut().take();
    }) as Box<dyn FnMut(f64)>));

    request_frame(&callback)
}

/// Initialize panic reporting and logging for the WASM module.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Info).is_err() {
        // A logger is already installed by the host page.
        return;
    }
    log::info!("Starting Scribble (WASM)");
}
