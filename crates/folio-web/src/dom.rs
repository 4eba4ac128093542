//! DOM helpers shared by the component bindings.

use core::time::Duration;

use folio_core::clock::MonotonicClock;
use folio_core::{Result, SiteError};
use js_sys::{Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement, Window};
use web_time::Instant;

pub(crate) fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| SiteError::dom("no global window"))
}

pub(crate) fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| SiteError::dom("window has no document"))
}

/// `<html>` as an `HtmlElement`.
pub(crate) fn root(document: &Document) -> Result<HtmlElement> {
    document
        .document_element()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| SiteError::missing("html"))
}

/// Render a thrown JS value for logs and errors.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}

pub(crate) fn js_err(value: JsValue) -> SiteError {
    SiteError::dom(describe(&value))
}

pub(crate) fn set_js(obj: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value);
}

pub(crate) fn has_global(name: &str) -> bool {
    Reflect::has(&js_sys::global(), &JsValue::from_str(name)).unwrap_or(false)
}

pub(crate) fn query(root: &Document, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

/// Elements matching `selector`, in document order. An invalid selector
/// matches nothing.
pub(crate) fn query_all(root: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub(crate) fn by_id(document: &Document, id: &str) -> Option<Element> {
    document.get_element_by_id(id)
}

// ---------------------------------------------------------------------------
// Listeners and scheduling
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Listen {
    pub passive: bool,
    pub once: bool,
}

impl Listen {
    pub const NORMAL: Self = Self {
        passive: false,
        once: false,
    };
    pub const PASSIVE: Self = Self {
        passive: true,
        once: false,
    };
    pub const ONCE: Self = Self {
        passive: false,
        once: true,
    };
}

/// Attach a listener for the lifetime of the page.
pub(crate) fn listen(
    target: &EventTarget,
    event: &str,
    mode: Listen,
    handler: impl FnMut(Event) + 'static,
) -> Result<()> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(mode.passive);
    options.set_once(mode.once);
    target
        .add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(js_err)?;
    closure.forget();
    Ok(())
}

pub(crate) fn request_frame(window: &Window, callback: impl FnOnce() + 'static) -> Result<i32> {
    let callback = Closure::once_into_js(callback);
    window
        .request_animation_frame(callback.unchecked_ref())
        .map_err(js_err)
}

pub(crate) fn set_timeout(
    window: &Window,
    delay: Duration,
    callback: impl FnOnce() + 'static,
) -> Result<i32> {
    let callback = Closure::once_into_js(callback);
    let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        .map_err(js_err)
}

pub(crate) fn clear_timeout(window: &Window, handle: i32) {
    window.clear_timeout_with_handle(handle);
}

/// Element an event was dispatched to.
pub(crate) fn event_element(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

/// Closest ancestor-or-self of the event target matching `selector`.
pub(crate) fn closest(event: &Event, selector: &str) -> Option<Element> {
    event_element(event)?.closest(selector).ok().flatten()
}

pub(crate) fn prefers_reduced_motion(window: &Window) -> bool {
    window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .is_some_and(|mql| mql.matches())
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Monotonic time since the module started.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WebClock {
    origin: Instant,
}

impl WebClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl MonotonicClock for WebClock {
    fn now_mono(&self) -> Duration {
        self.origin.elapsed()
    }
}
