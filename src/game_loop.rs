use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use crate::error::SceneError;

/// rAF timestamps jitter by a fraction of a millisecond.
const FRAME_SLACK_MS: f64 = 1.0;

/// Drops animation frames that arrive faster than `max_fps`.
///
/// `gate` is the phase-aligned point the next frame is measured against; `accepted`
/// is the timestamp of the last frame handed out, so reported times sum to wall clock.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    min_interval_ms: f64,
    gate: f64,
    accepted: Option<f64>,
}

impl FrameLimiter {
    pub fn new(max_fps: u32) -> Self {
        Self { min_interval_ms: 1000.0 / max_fps.max(1) as f64, gate: 0.0, accepted: None }
    }

    /// Milliseconds since the last accepted frame, or `None` when this one should be skipped.
    /// The first frame is accepted with zero elapsed time.
    pub fn accept(&mut self, timestamp: f64) -> Option<f64> {
        let accepted = match self.accepted {
            Some(t) if timestamp >= t => t,
            _ => {
                let first = self.accepted.is_none();
                self.gate = timestamp;
                self.accepted = Some(timestamp);
                return if first { Some(0.0) } else { None };
            }
        };
        let since_gate = timestamp - self.gate;
        if since_gate + FRAME_SLACK_MS < self.min_interval_ms {
            return None;
        }
        // Keep the remainder in the gate so a 60 Hz display settles on an even cadence.
        let carry = if since_gate >= self.min_interval_ms { since_gate % self.min_interval_ms } else { 0.0 };
        self.gate = timestamp - carry;
        self.accepted = Some(timestamp);
        Some(timestamp - accepted)
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A requestAnimationFrame loop that can be stopped from outside.
pub struct FrameLoop {
    running: Rc<Cell<bool>>,
    handle: Rc<Cell<Option<i32>>>,
    callback: FrameCallback,
}

impl FrameLoop {
    pub fn start(max_fps: u32, mut on_frame: impl FnMut(f64) + 'static) -> Result<Self, SceneError> {
        let window = web_sys::window().ok_or(SceneError::NoWindow)?;
        let running = Rc::new(Cell::new(true));
        let handle = Rc::new(Cell::new(None));
        let f: FrameCallback = Rc::new(RefCell::new(None));
        let g = f.clone();

        let mut limiter = FrameLimiter::new(max_fps);
        let (run, next) = (running.clone(), handle.clone());
        *g.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            if !run.get() {
                return;
            }
            if let Some(elapsed) = limiter.accept(timestamp) {
                on_frame(elapsed);
            }
            if !run.get() {
                return;
            }

            // Request next frame
            if let (Some(window), Some(cb)) = (web_sys::window(), f.borrow().as_ref()) {
                if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    next.set(Some(id));
                }
            }
        }) as Box<dyn FnMut(f64)>));

        if let Some(cb) = g.borrow().as_ref() {
            let id = window
                .request_animation_frame(cb.as_ref().unchecked_ref())
                .map_err(SceneError::attach)?;
            handle.set(Some(id));
        }

        Ok(Self { running, handle, callback: g })
    }

    /// Cancels the pending frame and releases the callback. Must not be called from inside `on_frame`.
    pub fn stop(&self) {
        self.running.set(false);
        if let Some(id) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        self.callback.borrow_mut().take();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
