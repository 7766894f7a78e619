use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;
use crate::canvas::Surface;
use crate::config::{DeviceProfile, SceneOptions, SceneSettings};
use crate::debounce::Debouncer;
use crate::error::SceneError;
use crate::game_loop::FrameLoop;
use crate::renderer;
use crate::rng::Rng;
use crate::scene::{Scene, SharedScene};

/// Attribute on the mount element holding `SceneOptions` as JSON.
pub const CONFIG_ATTRIBUTE: &str = "data-rocket-config";

const VIEWPORT_EVENTS: [&str; 2] = ["resize", "orientationchange"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Unmounted,
    Initializing,
    Active,
    Resizing,
    TornDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Mount,
    Ready,
    Failed,
    Resize,
    Settled,
    Unmount,
}

impl Lifecycle {
    /// Events that make no sense in the current state leave it unchanged.
    pub fn on(self, event: LifecycleEvent) -> Lifecycle {
        use Lifecycle::*;
        use LifecycleEvent::*;
        match (self, event) {
            (TornDown, _) => TornDown,
            (_, Unmount) => TornDown,
            (Unmounted, Mount) => Initializing,
            (Initializing, Ready) => Active,
            (Initializing, Failed) => TornDown,
            (Active, Resize) | (Resizing, Resize) => Resizing,
            (Resizing, Settled) => Active,
            (state, _) => state,
        }
    }

    /// Whether resize work may touch the scene.
    pub fn is_live(self) -> bool {
        matches!(self, Lifecycle::Active | Lifecycle::Resizing)
    }
}

/// Shared between the host and its listener/timer callbacks.
struct Shared {
    state: Cell<Lifecycle>,
    scene: SharedScene,
    surface: Surface,
    options: SceneOptions,
}

impl Shared {
    fn apply(&self, event: LifecycleEvent) {
        self.state.set(self.state.get().on(event));
    }

    fn rebuild(&self, profile: &DeviceProfile) {
        let settings = SceneSettings::resolve(profile, &self.options);
        self.surface.resize(&settings);
        match self.scene.try_borrow_mut() {
            Ok(mut scene) => {
                scene.rebuild(settings);
                log::debug!(
                    "scene rebuilt at {}x{}: {} rockets, {} nodes, {} particles max",
                    profile.width,
                    profile.height,
                    scene.rockets().len(),
                    scene.graph().len(),
                    scene.budget().max()
                );
            }
            Err(_) => log::warn!("scene busy, skipping rebuild"),
        }
    }

    fn settings(&self) -> SceneSettings {
        self.scene.borrow().settings().clone()
    }
}

/// Handle to a running background. Dropping it tears the scene down.
pub struct SceneHost {
    shared: Rc<Shared>,
    frame_loop: FrameLoop,
    debouncer: Rc<RefCell<Debouncer>>,
    listener: Option<Closure<dyn FnMut(web_sys::Event)>>,
}

impl SceneHost {
    /// Mounts under `container`, reading overrides from its config attribute.
    /// A malformed attribute is logged and ignored.
    pub fn mount(container: &HtmlElement) -> Result<Self, SceneError> {
        let options = match container.get_attribute(CONFIG_ATTRIBUTE) {
            Some(json) => SceneOptions::from_json(&json).unwrap_or_else(|err| {
                log::warn!("{}; using defaults", err);
                SceneOptions::default()
            }),
            None => SceneOptions::default(),
        };
        Self::mount_with(container, options)
    }

    pub fn mount_with(container: &HtmlElement, options: SceneOptions) -> Result<Self, SceneError> {
        let state = Lifecycle::Unmounted.on(LifecycleEvent::Mount);
        match Self::init(container, options, state) {
            Ok(host) => {
                host.shared.apply(LifecycleEvent::Ready);
                let s = host.shared.settings();
                log::info!(
                    "rocket background up: {}x{} {:?}, {} rockets, {} particles max, {} fps",
                    s.width, s.height, s.tier, s.rocket_count, s.max_particles, s.max_fps
                );
                Ok(host)
            }
            Err(err) => {
                let state = state.on(LifecycleEvent::Failed);
                log::error!("rocket background failed to start ({:?}): {}", state, err);
                Err(err)
            }
        }
    }

    fn init(container: &HtmlElement, mut options: SceneOptions, state: Lifecycle) -> Result<Self, SceneError> {
        let window = web_sys::window().ok_or(SceneError::NoWindow)?;
        let profile = DeviceProfile::detect(&window, Some(container));
        let settings = SceneSettings::resolve(&profile, &options);
        // Rebuilds keep the tier picked at mount.
        options.force_tier = Some(settings.tier);

        let surface = Surface::create(container, &settings, !profile.is_mobile())?;
        let rng = options.seed.map(Rng::new).unwrap_or_else(Rng::from_js);
        let max_fps = settings.max_fps;
        let scene = Rc::new(RefCell::new(Scene::new(settings, rng)));

        let shared = Rc::new(Shared { state: Cell::new(state), scene, surface, options });
        let debouncer = Rc::new(RefCell::new(Debouncer::new(shared.options.debounce_delay())));

        let frame_loop = {
            let weak = Rc::downgrade(&shared);
            FrameLoop::start(max_fps, move |elapsed| {
                if let Some(shared) = weak.upgrade() {
                    draw_frame(&shared, elapsed);
                }
            })
        };
        let frame_loop = match frame_loop {
            Ok(l) => l,
            Err(err) => {
                shared.surface.dispose();
                return Err(err);
            }
        };

        let listener = on_viewport_change(Rc::downgrade(&shared), debouncer.clone(), container.clone());
        for event in VIEWPORT_EVENTS {
            if let Err(err) = window.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref()) {
                frame_loop.stop();
                remove_listeners(&listener);
                shared.surface.dispose();
                return Err(SceneError::attach(err));
            }
        }

        Ok(Self { shared, frame_loop, debouncer, listener: Some(listener) })
    }

    pub fn state(&self) -> Lifecycle {
        self.shared.state.get()
    }

    /// Rebuilds immediately at the given size, bypassing the debounce.
    pub fn resize(&self, width: f64, height: f64) {
        if !self.state().is_live() {
            return;
        }
        self.debouncer.borrow_mut().cancel();
        let mut profile = match web_sys::window() {
            Some(window) => DeviceProfile::detect(&window, None),
            None => return,
        };
        profile.width = width;
        profile.height = height;
        self.shared.apply(LifecycleEvent::Resize);
        self.shared.rebuild(&profile);
        self.shared.apply(LifecycleEvent::Settled);
    }

    pub fn destroy(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.state() == Lifecycle::TornDown {
            return;
        }
        self.shared.apply(LifecycleEvent::Unmount);
        self.debouncer.borrow_mut().cancel();
        if let Some(listener) = self.listener.take() {
            remove_listeners(&listener);
        }
        self.frame_loop.stop();
        match self.shared.scene.try_borrow_mut() {
            Ok(mut scene) => scene.teardown(),
            Err(_) => log::warn!("scene busy during teardown"),
        }
        self.shared.surface.dispose();
        log::info!("rocket background torn down");
    }
}

impl Drop for SceneHost {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn draw_frame(shared: &Shared, elapsed: f64) {
    if !shared.state.get().is_live() {
        return;
    }
    let mut scene = match shared.scene.try_borrow_mut() {
        Ok(s) => s,
        Err(_) => return,
    };
    if !scene.is_active() {
        return;
    }
    scene.tick(elapsed);
    renderer::render(
        shared.surface.context(),
        scene.graph(),
        shared.surface.size(),
        shared.surface.resolution(),
        scene.settings().background,
    );
}

/// Resize/orientation listener: marks the host as resizing and schedules one rebuild
/// after the quiet period. Callbacks that outlive the host do nothing.
fn on_viewport_change(
    shared: Weak<Shared>,
    debouncer: Rc<RefCell<Debouncer>>,
    container: HtmlElement,
) -> Closure<dyn FnMut(web_sys::Event)> {
    Closure::wrap(Box::new(move |_: web_sys::Event| {
        let Some(host) = shared.upgrade() else { return };
        if !host.state.get().is_live() {
            return;
        }
        host.apply(LifecycleEvent::Resize);

        let weak = shared.clone();
        let container = container.clone();
        debouncer.borrow_mut().schedule(move || {
            let Some(host) = weak.upgrade() else { return };
            if host.state.get() != Lifecycle::Resizing {
                return;
            }
            if let Some(window) = web_sys::window() {
                let profile = DeviceProfile::detect(&window, Some(&container));
                host.rebuild(&profile);
            }
            host.apply(LifecycleEvent::Settled);
        });
    }) as Box<dyn FnMut(web_sys::Event)>)
}

fn remove_listeners(listener: &Closure<dyn FnMut(web_sys::Event)>) {
    if let Some(window) = web_sys::window() {
        for event in VIEWPORT_EVENTS {
            let _ = window.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
        }
    }
}
