use std::cell::Cell;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement};
use crate::config::SceneSettings;
use crate::error::SceneError;

/// The canvas the scene paints into, attached under the host element.
///
/// The backing store is `resolution` times the logical size while the CSS size stays
/// logical, so drawing code works in CSS pixels.
pub struct Surface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: Cell<f64>,
    height: Cell<f64>,
    resolution: Cell<f64>,
}

impl Surface {
    pub fn create(host: &HtmlElement, settings: &SceneSettings, smoothing: bool) -> Result<Self, SceneError> {
        let document = web_sys::window()
            .ok_or(SceneError::NoWindow)?
            .document()
            .ok_or(SceneError::NoDocument)?;

        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(SceneError::canvas)?
            .dyn_into()
            .map_err(|_| SceneError::CanvasCreation("element is not a canvas".into()))?;

        // Opaque, low-latency 2d context; the background is repainted every frame.
        let attrs = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&attrs, &"alpha".into(), &JsValue::FALSE);
        let _ = js_sys::Reflect::set(&attrs, &"desynchronized".into(), &JsValue::TRUE);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context_with_context_options("2d", &attrs)
            .map_err(SceneError::canvas)?
            .ok_or(SceneError::ContextUnavailable)?
            .dyn_into()
            .map_err(|_| SceneError::ContextUnavailable)?;
        ctx.set_image_smoothing_enabled(smoothing);

        let style = canvas.style();
        let _ = style.set_property("display", "block");
        let _ = style.set_property("position", "absolute");
        let _ = style.set_property("inset", "0");
        let _ = style.set_property("pointer-events", "none");

        host.append_child(&canvas).map_err(SceneError::attach)?;

        let surface = Self {
            canvas,
            ctx,
            width: Cell::new(0.0),
            height: Cell::new(0.0),
            resolution: Cell::new(1.0),
        };
        surface.resize(settings);
        Ok(surface)
    }

    pub fn resize(&self, settings: &SceneSettings) {
        let (w, h, res) = (settings.width.max(0.0), settings.height.max(0.0), settings.resolution);
        self.canvas.set_width((w * res).round() as u32);
        self.canvas.set_height((h * res).round() as u32);
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", w));
        let _ = style.set_property("height", &format!("{}px", h));
        self.width.set(w);
        self.height.set(h);
        self.resolution.set(res);
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width.get(), self.height.get())
    }

    pub fn resolution(&self) -> f64 {
        self.resolution.get()
    }

    /// Detaches the canvas and drops its backing store.
    pub fn dispose(&self) {
        self.canvas.remove();
        self.canvas.set_width(0);
        self.canvas.set_height(0);
    }
}
