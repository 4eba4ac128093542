//! Active navigation tracking over the live DOM.

use std::cell::RefCell;
use std::rc::Rc;

use core::time::Duration;

use folio_core::clock::MonotonicClock;
use folio_core::config::NavConfig;
use folio_core::header::HEADER_OFFSET_VAR;
use folio_core::href::{PageLocation, is_blog_href};
use folio_core::scroll_spy::{ActiveNavTracker, NavEffect, NavLink, NavSurface};
use folio_core::Result;
use js_sys::{Promise, Reflect};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlElement, Window};

use crate::chrome::publish_header_offset;
use crate::dom::{self, Listen, WebClock};

const NAV_ANCHORS: &str = ".site-nav a[href*=\"#\"]";
const REWRITABLE_HASH_LINKS: &str = ".site-nav a[href^=\"#\"], .mobile-menu-link[href^=\"#\"]";
const SITE_NAV_LINKS: &str = ".site-nav a[href]";

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

pub(crate) struct DomNavSurface {
    window: Window,
    document: Document,
    root: HtmlElement,
    anchors: Vec<Element>,
}

impl NavSurface for DomNavSurface {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn header_offset_var(&self) -> Option<String> {
        self.window
            .get_computed_style(&self.root)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value(HEADER_OFFSET_VAR).ok())
    }

    fn section_offset_top(&self, id: &str) -> Option<f64> {
        dom::by_id(&self.document, id).map(|el| {
            el.dyn_ref::<HtmlElement>()
                .map_or(0.0, |html| f64::from(html.offset_top()))
        })
    }

    fn section_viewport_top(&self, id: &str) -> Option<f64> {
        dom::by_id(&self.document, id).map(|el| el.get_bounding_client_rect().top())
    }

    fn set_link_current(&mut self, link: &NavLink, current: bool) {
        let Some(anchor) = self.anchors.get(link.anchor) else {
            return;
        };
        let _ = if current {
            anchor.set_attribute("aria-current", "page")
        } else {
            anchor.remove_attribute("aria-current")
        };
    }

    fn refresh_header_offset(&mut self) {
        publish_header_offset(&self.document, &self.root);
    }
}

// ---------------------------------------------------------------------------
// Host loop
// ---------------------------------------------------------------------------

struct NavHost {
    tracker: ActiveNavTracker,
    surface: DomNavSurface,
    clock: WebClock,
    settle_handle: Option<i32>,
}

type SharedNav = Rc<RefCell<NavHost>>;

/// Run one tracker entry point, then schedule whatever it asked for.
fn drive(shared: &SharedNav, f: impl FnOnce(&mut ActiveNavTracker, &mut DomNavSurface, Duration)) {
    let effects = {
        let mut guard = shared.borrow_mut();
        let host = &mut *guard;
        let now = host.clock.now_mono();
        f(&mut host.tracker, &mut host.surface, now);
        host.tracker.drain_effects()
    };
    for effect in effects {
        schedule(shared, effect);
    }
}

fn schedule(shared: &SharedNav, effect: NavEffect) {
    let window = shared.borrow().surface.window.clone();
    match effect {
        NavEffect::RequestFrame => {
            let next = Rc::clone(shared);
            let requested = dom::request_frame(&window, move || {
                drive(&next, |tracker, surface, now| {
                    tracker.on_animation_frame(surface, now);
                });
            });
            if let Err(err) = requested {
                warn!(error = %err, "animation frame unavailable, running inference inline");
                drive(shared, |tracker, surface, now| {
                    tracker.on_animation_frame(surface, now);
                });
            }
        }
        NavEffect::ArmSettleTimer { delay, token } => {
            if let Some(previous) = shared.borrow_mut().settle_handle.take() {
                dom::clear_timeout(&window, previous);
            }
            let next = Rc::clone(shared);
            match dom::set_timeout(&window, delay, move || {
                next.borrow_mut().settle_handle = None;
                drive(&next, |tracker, surface, _| {
                    tracker.on_settle_timer(surface, token);
                });
            }) {
                Ok(handle) => shared.borrow_mut().settle_handle = Some(handle),
                Err(err) => warn!(error = %err, "settle timer unavailable"),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Page preparation
// ---------------------------------------------------------------------------

/// Point bare `#x` nav links at the home page when not on it.
fn rewrite_hash_links(document: &Document, location: &PageLocation) {
    for link in dom::query_all(document, REWRITABLE_HASH_LINKS) {
        let Some(href) = link.get_attribute("href") else {
            continue;
        };
        if let Some(rewritten) = location.rewrite_hash_link(&href) {
            let _ = link.set_attribute("href", &rewritten);
        }
    }
}

/// On blog pages, mark the nav link to the blog current.
fn mark_blog_link(document: &Document, location: &PageLocation) {
    if !location.is_blog_page() {
        return;
    }
    let blog = dom::query_all(document, SITE_NAV_LINKS)
        .into_iter()
        .find(|a| a.get_attribute("href").is_some_and(|h| is_blog_href(&h)));
    if let Some(link) = blog {
        let _ = link.set_attribute("aria-current", "page");
    }
}

fn fonts_ready(document: &Document) -> Option<Promise> {
    let fonts = Reflect::get(document, &JsValue::from_str("fonts")).ok()?;
    if fonts.is_undefined() || fonts.is_null() {
        return None;
    }
    Reflect::get(&fonts, &JsValue::from_str("ready"))
        .ok()?
        .dyn_into::<Promise>()
        .ok()
}

// ---------------------------------------------------------------------------
// Boot
// ---------------------------------------------------------------------------

pub(crate) fn boot(config: &NavConfig) -> Result<bool> {
    let window = dom::window()?;
    let document = dom::document()?;
    let root = dom::root(&document)?;
    let href = window.location().href().map_err(dom::js_err)?;
    let location = PageLocation::parse(&href)?;

    rewrite_hash_links(&document, &location);
    mark_blog_link(&document, &location);

    let anchors = dom::query_all(&document, NAV_ANCHORS);
    if anchors.is_empty() {
        return Ok(false);
    }
    let hrefs: Vec<Option<String>> = anchors.iter().map(|a| a.get_attribute("href")).collect();
    let surface = DomNavSurface {
        window: window.clone(),
        document: document.clone(),
        root,
        anchors,
    };
    let tracker = ActiveNavTracker::build(
        hrefs.iter().map(Option::as_deref),
        &location,
        &surface,
        config.clone(),
    );
    if tracker.is_empty() {
        return Ok(false);
    }

    let link_anchors: Vec<(usize, usize)> = tracker
        .links()
        .iter()
        .enumerate()
        .map(|(idx, link)| (idx, link.anchor))
        .collect();
    let click_targets: Vec<Element> = link_anchors
        .iter()
        .filter_map(|(_, anchor)| surface.anchors.get(*anchor).cloned())
        .collect();

    let shared: SharedNav = Rc::new(RefCell::new(NavHost {
        tracker,
        surface,
        clock: WebClock::new(),
        settle_handle: None,
    }));

    let initial = location.hash_id();
    drive(&shared, |tracker, surface, now| {
        tracker.start(surface, initial.as_deref(), now);
    });

    if let Some(ready) = fonts_ready(&document) {
        let next = Rc::clone(&shared);
        wasm_bindgen_futures::spawn_local(async move {
            if JsFuture::from(ready).await.is_ok() {
                debug!("fonts ready, re-measuring sections");
                drive(&next, |tracker, surface, _| tracker.on_fonts_ready(surface));
            }
        });
    }

    let next = Rc::clone(&shared);
    dom::listen(&window, "resize", Listen::PASSIVE, move |_| {
        drive(&next, |tracker, surface, _| tracker.on_resize(surface));
    })?;

    let next = Rc::clone(&shared);
    dom::listen(&window, "scroll", Listen::PASSIVE, move |_| {
        drive(&next, |tracker, _, _| tracker.on_scroll());
    })?;

    let next = Rc::clone(&shared);
    let hash_window = window.clone();
    dom::listen(&window, "hashchange", Listen::PASSIVE, move |_| {
        let hash = hash_window.location().hash().unwrap_or_default();
        drive(&next, |tracker, surface, now| {
            tracker.on_hash_change(surface, &hash, now);
        });
    })?;

    for ((link, _), anchor) in link_anchors.into_iter().zip(click_targets) {
        let next = Rc::clone(&shared);
        dom::listen(&anchor, "click", Listen::PASSIVE, move |_| {
            drive(&next, |tracker, surface, now| {
                tracker.on_link_click(surface, link, now);
            });
        })?;
    }

    Ok(true)
}
