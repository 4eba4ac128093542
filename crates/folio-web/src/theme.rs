//! Theme switcher bindings: root attributes, option buttons and storage.

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::config::ThemeConfig;
use folio_core::theme::{Accent, FadePhase, PreferenceStore, Theme, ThemeEffect, ThemeSurface, ThemeSwitcher};
use folio_core::{Result, SiteError};
use tracing::warn;
use web_sys::{Document, HtmlElement, Storage, Window};

use crate::dom::{self, Listen};

const THEME_OPTION: &str = "[data-theme-option]";
const ACCENT_OPTION: &str = "[data-accent-option]";
const FADE_ATTR: &str = "data-theme-fade";

/// `localStorage`, or nothing when storage is blocked.
pub(crate) struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    pub(crate) fn open(window: &Window) -> Self {
        Self {
            storage: window.local_storage().ok().flatten(),
        }
    }
}

impl PreferenceStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| SiteError::storage("localStorage unavailable"))?;
        storage
            .set_item(key, value)
            .map_err(|err| SiteError::storage(dom::describe(&err)))
    }
}

pub(crate) struct DomThemeSurface {
    window: Window,
    document: Document,
    root: HtmlElement,
}

impl DomThemeSurface {
    fn sync_buttons(&self, selector: &str, attr: &str, selected: &str) {
        for button in dom::query_all(&self.document, selector) {
            let pressed = button.get_attribute(attr).as_deref() == Some(selected);
            let _ = button.set_attribute("aria-pressed", if pressed { "true" } else { "false" });
        }
    }
}

impl ThemeSurface for DomThemeSurface {
    fn theme_attr(&self) -> Option<String> {
        self.root.get_attribute("data-theme")
    }

    fn accent_attr(&self) -> Option<String> {
        self.root.get_attribute("data-accent")
    }

    fn set_theme_attr(&mut self, theme: Theme) {
        let _ = self.root.set_attribute("data-theme", theme.as_str());
    }

    fn set_accent_attr(&mut self, accent: Accent) {
        let _ = self.root.set_attribute("data-accent", accent.as_str());
    }

    fn sync_theme_buttons(&mut self, theme: Theme) {
        self.sync_buttons(THEME_OPTION, "data-theme-option", theme.as_str());
    }

    fn sync_accent_buttons(&mut self, accent: Accent) {
        self.sync_buttons(ACCENT_OPTION, "data-accent-option", accent.as_str());
    }

    fn prefers_reduced_motion(&self) -> bool {
        dom::prefers_reduced_motion(&self.window)
    }

    fn set_fade_phase(&mut self, phase: Option<FadePhase>) {
        let _ = match phase {
            Some(phase) => self.root.set_attribute(FADE_ATTR, phase.as_str()),
            None => self.root.remove_attribute(FADE_ATTR),
        };
    }
}

struct ThemeHost {
    switcher: ThemeSwitcher,
    surface: DomThemeSurface,
    store: LocalStore,
    fade_handle: Option<i32>,
}

type SharedTheme = Rc<RefCell<ThemeHost>>;

fn drive(shared: &SharedTheme, f: impl FnOnce(&mut ThemeSwitcher, &mut DomThemeSurface, &mut LocalStore)) {
    let effects = {
        let mut guard = shared.borrow_mut();
        let host = &mut *guard;
        f(&mut host.switcher, &mut host.surface, &mut host.store);
        host.switcher.drain_effects()
    };
    for effect in effects {
        schedule(shared, effect);
    }
}

fn schedule(shared: &SharedTheme, effect: ThemeEffect) {
    let window = shared.borrow().surface.window.clone();
    match effect {
        ThemeEffect::RequestFrame { generation } => {
            let next = Rc::clone(shared);
            if let Err(err) = dom::request_frame(&window, move || {
                drive(&next, |switcher, surface, _| switcher.on_fade_frame(surface, generation));
            }) {
                warn!(error = %err, "fade frame unavailable");
                drive(shared, |switcher, surface, _| switcher.on_fade_frame(surface, generation));
            }
        }
        ThemeEffect::ArmFadeTimer { delay, generation } => {
            if let Some(previous) = shared.borrow_mut().fade_handle.take() {
                dom::clear_timeout(&window, previous);
            }
            let next = Rc::clone(shared);
            match dom::set_timeout(&window, delay, move || {
                next.borrow_mut().fade_handle = None;
                drive(&next, |switcher, surface, _| switcher.on_fade_timer(surface, generation));
            }) {
                Ok(handle) => shared.borrow_mut().fade_handle = Some(handle),
                Err(err) => warn!(error = %err, "fade timer unavailable"),
            }
        }
    }
}

/// Boot the switcher. Inert on pages without theme option buttons.
pub(crate) fn boot(config: &ThemeConfig) -> Result<bool> {
    let window = dom::window()?;
    let document = dom::document()?;
    if dom::query(&document, THEME_OPTION).is_none() {
        return Ok(false);
    }
    let root = dom::root(&document)?;
    let shared: SharedTheme = Rc::new(RefCell::new(ThemeHost {
        switcher: ThemeSwitcher::new(config.clone()),
        surface: DomThemeSurface {
            window: window.clone(),
            document: document.clone(),
            root,
        },
        store: LocalStore::open(&window),
        fade_handle: None,
    }));

    drive(&shared, |switcher, surface, store| switcher.init(surface, store));

    let next = Rc::clone(&shared);
    dom::listen(&document, "click", Listen::NORMAL, move |event| {
        let theme = dom::closest(&event, THEME_OPTION).and_then(|b| b.get_attribute("data-theme-option"));
        let accent = dom::closest(&event, ACCENT_OPTION).and_then(|b| b.get_attribute("data-accent-option"));
        if theme.is_none() && accent.is_none() {
            return;
        }
        drive(&next, |switcher, surface, store| {
            switcher.on_click(surface, store, theme.as_deref(), accent.as_deref());
        });
    })?;
    Ok(true)
}
