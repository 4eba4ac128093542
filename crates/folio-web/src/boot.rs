//! Module start, the component loader and the exported init functions.

use std::cell::OnceCell;

use folio_core::chrome::{BootReport, Component, ReadyState};
use folio_core::{Result, SiteConfig};
use tracing::warn;
use wasm_bindgen::prelude::*;

use crate::dom::{self, Listen};
use crate::settings::{self, CONFIG_SELECTOR};
use crate::{back_to_top, chrome, contact, lazy, logging, menu, nav, theme};

thread_local! {
    static CONFIG: OnceCell<SiteConfig> = const { OnceCell::new() };
}

/// Read the page's config block. Problems are logged, so the subscriber
/// should already be installed when this runs after `start`.
fn read_page_config() -> settings::LoadedConfig {
    let raw = dom::document()
        .ok()
        .and_then(|doc| dom::query(&doc, CONFIG_SELECTOR))
        .and_then(|el| el.text_content());
    settings::load(raw.as_deref())
}

fn config() -> SiteConfig {
    CONFIG.with(|cell| {
        cell.get_or_init(|| {
            let loaded = read_page_config();
            log_problems(&loaded.problems);
            loaded.config
        })
        .clone()
    })
}

fn log_problems(problems: &[String]) {
    for problem in problems {
        warn!(%problem, "site config rejected, using defaults");
    }
}

fn boot_component(component: Component, config: &SiteConfig) -> Result<bool> {
    let document = dom::document()?;
    match component {
        Component::FooterYear => Ok(chrome::update_current_year(&document)),
        Component::HeaderOffset => {
            let root = dom::root(&document)?;
            Ok(chrome::publish_header_offset(&document, &root) > 0)
        }
        Component::Loader => chrome::init_loader(&document, &dom::root(&document)?),
        Component::ActiveNav => nav::boot(&config.nav),
        Component::MobileMenu => menu::boot(&config.menu),
        Component::BackToTop => back_to_top::boot(&config.back_to_top),
        Component::FormValidation => contact::boot_validation(&config.contact),
        Component::ThemeSwitcher => theme::boot(&config.theme),
        Component::LazyImages => lazy::boot(&config.lazy),
        Component::SkipLink => chrome::init_skip_link(&document),
        Component::ContactForm => contact::boot_form(&config.contact),
    }
}

fn boot_all(report: &mut BootReport, components: &[Component], config: &SiteConfig) {
    for &component in components {
        report.record(component, boot_component(component, config));
    }
}

fn run_component_loader(config: &SiteConfig) {
    let mut report = BootReport::new();
    boot_all(&mut report, &Component::BOOT_ORDER, config);
    if let Ok(root) = dom::document().and_then(|doc| dom::root(&doc)) {
        chrome::mark_loaded(&root);
    }
    report.log_summary();
}

#[wasm_bindgen(start)]
pub fn start() {
    logging::install_panic_hook();
    let loaded = read_page_config();
    logging::init(loaded.config.log_level);
    log_problems(&loaded.problems);
    let config = CONFIG.with(|cell| cell.get_or_init(|| loaded.config).clone());

    let mut report = BootReport::new();
    boot_all(&mut report, &Component::INDEPENDENT, &config);
    report.log_summary();

    let Ok(document) = dom::document() else {
        warn!("no document, component loader skipped");
        return;
    };
    if ReadyState::parse(&document.ready_state()).dom_ready() {
        run_component_loader(&config);
        return;
    }
    let deferred = config.clone();
    if let Err(err) = dom::listen(&document, "DOMContentLoaded", Listen::ONCE, move |_| {
        run_component_loader(&deferred);
    }) {
        warn!(error = %err, "DOMContentLoaded unavailable, booting now");
        run_component_loader(&config);
    }
}

// ---------------------------------------------------------------------------
// Exported entry points
// ---------------------------------------------------------------------------

fn export(component: Component) {
    let mut report = BootReport::new();
    report.record(component, boot_component(component, &config()));
}

#[wasm_bindgen(js_name = updateCurrentYear)]
pub fn update_current_year() {
    export(Component::FooterYear);
}

#[wasm_bindgen(js_name = setHeaderOffsetCssVar)]
pub fn set_header_offset_css_var() {
    export(Component::HeaderOffset);
}

#[wasm_bindgen(js_name = initLoader)]
pub fn init_loader() {
    export(Component::Loader);
}

#[wasm_bindgen(js_name = initActiveNav)]
pub fn init_active_nav() {
    export(Component::ActiveNav);
}

#[wasm_bindgen(js_name = initMobileMenu)]
pub fn init_mobile_menu() {
    export(Component::MobileMenu);
}

#[wasm_bindgen(js_name = initBackToTop)]
pub fn init_back_to_top() {
    export(Component::BackToTop);
}

#[wasm_bindgen(js_name = initFormValidation)]
pub fn init_form_validation() {
    export(Component::FormValidation);
}

#[wasm_bindgen(js_name = initThemeSwitcher)]
pub fn init_theme_switcher() {
    export(Component::ThemeSwitcher);
}
