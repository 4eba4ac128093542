//! Footer year, header offset publication, loader and skip link.

use folio_core::Result;
use folio_core::chrome::{
    LOADED_ATTR, LOADER_SELECTOR, LoaderAction, ReadyState, SKIP_LINK_SELECTOR, YEAR_ID,
    skip_target_id, year_text,
};
use folio_core::header::{HEADER_OFFSET_VAR, header_offset_css_value};
use tracing::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, FocusOptions, HtmlElement};

use crate::dom::{self, Listen};

const HEADER_SELECTOR: &str = ".site-header";

pub(crate) fn update_current_year(document: &Document) -> bool {
    let Some(el) = dom::by_id(document, YEAR_ID) else {
        return false;
    };
    let year = js_sys::Date::new_0().get_full_year();
    el.set_text_content(Some(&year_text(year)));
    true
}

/// Measure the site header and publish its height on the root.
/// Returns the published pixel height, `0` without a header.
pub(crate) fn publish_header_offset(document: &Document, root: &HtmlElement) -> u32 {
    let Some(header) = dom::query(document, HEADER_SELECTOR) else {
        return 0;
    };
    let (px, css_value) = header_offset_css_value(header.get_bounding_client_rect().height());
    if root.style().set_property(HEADER_OFFSET_VAR, &css_value).is_ok() {
        debug!(header_offset = px, "header offset published");
    }
    px
}

fn hide_loader(document: &Document, root: &HtmlElement) {
    let _ = root.set_attribute(LOADED_ATTR, "true");
    if let Some(loader) = dom::query(document, LOADER_SELECTOR) {
        loader.remove();
    }
}

pub(crate) fn init_loader(document: &Document, root: &HtmlElement) -> Result<bool> {
    match LoaderAction::for_state(ReadyState::parse(&document.ready_state())) {
        LoaderAction::HideNow => hide_loader(document, root),
        LoaderAction::HideOnLoad => {
            let window = dom::window()?;
            let document = document.clone();
            let root = root.clone();
            dom::listen(&window, "load", Listen::ONCE, move |_| {
                hide_loader(&document, &root);
            })?;
        }
    }
    Ok(true)
}

/// Mark the root loaded once the component loader has run.
pub(crate) fn mark_loaded(root: &HtmlElement) {
    let _ = root.set_attribute(LOADED_ATTR, "true");
}

pub(crate) fn init_skip_link(document: &Document) -> Result<bool> {
    let Some(link) = dom::query(document, SKIP_LINK_SELECTOR) else {
        return Ok(false);
    };
    let doc = document.clone();
    let anchor = link.clone();
    dom::listen(&link, "click", Listen::NORMAL, move |_| {
        let href = anchor.get_attribute("href");
        let Some(id) = skip_target_id(href.as_deref()) else {
            return;
        };
        let Some(target) = dom::by_id(&doc, &id).and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let _ = target.set_attribute("tabindex", "-1");
        let options = FocusOptions::new();
        options.set_prevent_scroll(true);
        let _ = target.focus_with_options(&options);
        let blurred = target.clone();
        let _ = dom::listen(&target, "blur", Listen::ONCE, move |_| {
            let _ = blurred.remove_attribute("tabindex");
        });
    })?;
    Ok(true)
}
