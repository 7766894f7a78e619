use std::cell::RefCell;
use std::rc::Rc;
use leptos::prelude::*;
use crate::host::SceneHost;

#[component]
pub fn App() -> impl IntoView {
    view! { <RocketBackground /> }
}

/// Full-viewport animated rocket backdrop rendered behind `children`.
///
/// `config` is passed through to the mount element as `data-rocket-config` JSON.
/// When `size` is given the scene follows it instead of the viewport.
#[component]
pub fn RocketBackground(
    #[prop(optional)] children: Option<Children>,
    #[prop(optional, into)] class: String,
    #[prop(optional, into)] config: Option<String>,
    #[prop(optional, into)] size: Option<Signal<(f64, f64)>>,
) -> impl IntoView {
    let container = NodeRef::<leptos::html::Div>::new();
    let host: Rc<RefCell<Option<SceneHost>>> = Rc::new(RefCell::new(None));

    let host_mount = send_wrapper::SendWrapper::new(host.clone());
    Effect::new(move |_| {
        let Some(el) = container.get() else { return };
        let mut slot = host_mount.borrow_mut();
        if slot.is_some() {
            return;
        }
        // Failures are already logged; the page just goes without a background.
        if let Ok(h) = SceneHost::mount(&el) {
            *slot = Some(h);
        }
    });

    if let Some(size) = size {
        let host_resize = send_wrapper::SendWrapper::new(host.clone());
        Effect::new(move |_| {
            let (width, height) = size.get();
            if let Some(h) = host_resize.borrow().as_ref() {
                h.resize(width, height);
            }
        });
    }

    let host_cleanup = send_wrapper::SendWrapper::new(host);
    on_cleanup(move || {
        if let Some(h) = host_cleanup.borrow_mut().take() {
            h.destroy();
        }
    });

    view! {
        <div class="relative w-full min-h-screen">
            <div
                node_ref=container
                class=format!("fixed inset-0 -z-10 {}", class)
                data-rocket-config=config
                style="width: 100vw; height: 100vh; max-height: 100vh; overflow: hidden; pointer-events: none;"
            ></div>
            {children.map(|c| c())}
        </div>
    }
}
