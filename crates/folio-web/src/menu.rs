//! Mobile menu bindings.

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::config::MenuConfig;
use folio_core::href::PageLocation;
use folio_core::menu::{MenuLinkAction, MenuSurface, MobileMenu};
use folio_core::Result;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window};

use crate::dom::{self, Listen};

const BUTTON: &str = ".mobile-menu-btn";
const OVERLAY: &str = ".mobile-menu-overlay";
const CLOSE: &str = ".mobile-menu-close";
const LINKS: &str = ".mobile-menu-link";
const CURRENT_NAV: &str = ".site-nav a[aria-current=\"page\"]";
const ACTIVE_CLASS: &str = "active";

pub(crate) struct DomMenuSurface {
    document: Document,
    body: Option<HtmlElement>,
    button: Element,
    overlay: Element,
    links: Vec<Element>,
}

impl MenuSurface for DomMenuSurface {
    fn render_open(&mut self, open: bool) {
        let _ = self
            .button
            .set_attribute("aria-expanded", if open { "true" } else { "false" });
        let _ = self
            .overlay
            .set_attribute("aria-hidden", if open { "false" } else { "true" });
        if let Some(body) = &self.body {
            let _ = body
                .style()
                .set_property("overflow", if open { "hidden" } else { "" });
        }
    }

    fn current_nav_href(&self) -> Option<String> {
        dom::query(&self.document, CURRENT_NAV)?.get_attribute("href")
    }

    fn menu_link_hrefs(&self) -> Vec<Option<String>> {
        self.links.iter().map(|l| l.get_attribute("href")).collect()
    }

    fn set_menu_link_active(&mut self, index: usize, active: bool) {
        if let Some(link) = self.links.get(index) {
            let _ = link.class_list().toggle_with_force(ACTIVE_CLASS, active);
        }
    }

    fn has_section(&self, id: &str) -> bool {
        dom::by_id(&self.document, id).is_some()
    }
}

struct MenuHost {
    menu: MobileMenu,
    surface: DomMenuSurface,
}

type SharedMenu = Rc<RefCell<MenuHost>>;

fn with_menu<T>(shared: &SharedMenu, f: impl FnOnce(&mut MobileMenu, &mut DomMenuSurface) -> T) -> T {
    let mut guard = shared.borrow_mut();
    let host = &mut *guard;
    f(&mut host.menu, &mut host.surface)
}

/// Scroll the section into view and record its hash in history.
fn scroll_to_section(window: &Window, document: &Document, target_id: &str, hash: &str) {
    let Some(section) = dom::by_id(document, target_id) else {
        return;
    };
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    options.set_block(ScrollLogicalPosition::Start);
    section.scroll_into_view_with_scroll_into_view_options(&options);

    let pushed = window
        .history()
        .and_then(|history| history.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(hash)));
    if pushed.is_err() {
        let _ = window.location().set_hash(hash);
    }
}

pub(crate) fn boot(config: &MenuConfig) -> Result<bool> {
    let window = dom::window()?;
    let document = dom::document()?;
    let (Some(button), Some(overlay)) = (dom::query(&document, BUTTON), dom::query(&document, OVERLAY)) else {
        return Ok(false);
    };
    let links = dom::query_all(&document, LINKS);
    let shared: SharedMenu = Rc::new(RefCell::new(MenuHost {
        menu: MobileMenu::new(config.clone()),
        surface: DomMenuSurface {
            document: document.clone(),
            body: document.body(),
            button: button.clone(),
            overlay: overlay.clone(),
            links: links.clone(),
        },
    }));

    let next = Rc::clone(&shared);
    dom::listen(&button, "click", Listen::NORMAL, move |_| {
        with_menu(&next, |menu, surface| menu.toggle(surface));
    })?;

    if let Some(close) = dom::query(&document, CLOSE) {
        let next = Rc::clone(&shared);
        dom::listen(&close, "click", Listen::NORMAL, move |_| {
            with_menu(&next, |menu, surface| menu.close(surface));
        })?;
    }

    let next = Rc::clone(&shared);
    let backdrop = overlay.clone();
    dom::listen(&overlay, "click", Listen::NORMAL, move |event| {
        let on_backdrop = dom::event_element(&event).is_some_and(|el| el == backdrop);
        with_menu(&next, |menu, surface| menu.on_overlay_click(surface, on_backdrop));
    })?;

    for link in links {
        let next = Rc::clone(&shared);
        let anchor = link.clone();
        let window = window.clone();
        let document = document.clone();
        dom::listen(&link, "click", Listen::NORMAL, move |event| {
            let Ok(href) = window.location().href() else {
                return;
            };
            let Ok(location) = PageLocation::parse(&href) else {
                return;
            };
            let target = anchor.get_attribute("href");
            let action = with_menu(&next, |menu, surface| {
                menu.on_link_click(surface, &location, target.as_deref())
            });
            match action {
                MenuLinkAction::Navigate => {}
                MenuLinkAction::Closed => event.prevent_default(),
                MenuLinkAction::ScrollTo {
                    target_id,
                    hash,
                    delay,
                } => {
                    event.prevent_default();
                    let scroll_window = window.clone();
                    let document = document.clone();
                    let _ = dom::set_timeout(&window, delay, move || {
                        scroll_to_section(&scroll_window, &document, &target_id, &hash);
                    });
                }
            }
        })?;
    }

    let next = Rc::clone(&shared);
    dom::listen(&document, "keydown", Listen::NORMAL, move |event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
            return;
        };
        with_menu(&next, |menu, surface| menu.on_key(surface, &key));
    })?;

    let next = Rc::clone(&shared);
    dom::listen(&window, "scroll", Listen::PASSIVE, move |_| {
        with_menu(&next, |menu, surface| menu.on_scroll(surface));
    })?;

    Ok(true)
}
