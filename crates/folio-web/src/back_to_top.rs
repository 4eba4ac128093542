//! Back-to-top button bindings.

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::Result;
use folio_core::back_to_top::{BUTTON_ID, BackToTop, BackToTopSurface};
use folio_core::config::BackToTopConfig;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, ScrollBehavior, ScrollToOptions, Window};

use crate::dom::{self, Listen};

struct DomBackToTop {
    window: Window,
    button: HtmlElement,
}

impl BackToTopSurface for DomBackToTop {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.button.set_hidden(hidden);
    }

    fn scroll_to_top(&mut self) {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}

pub(crate) fn boot(config: &BackToTopConfig) -> Result<bool> {
    let window = dom::window()?;
    let document = dom::document()?;
    let Some(button) = dom::by_id(&document, BUTTON_ID).and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return Ok(false);
    };

    let shared = Rc::new(RefCell::new((
        BackToTop::new(config),
        DomBackToTop {
            window: window.clone(),
            button: button.clone(),
        },
    )));

    let next = Rc::clone(&shared);
    dom::listen(&button, "click", Listen::NORMAL, move |_| {
        let mut guard = next.borrow_mut();
        let (control, surface) = &mut *guard;
        control.on_click(surface);
    })?;

    let next = Rc::clone(&shared);
    dom::listen(&window, "scroll", Listen::PASSIVE, move |_| {
        let mut guard = next.borrow_mut();
        let (control, surface) = &mut *guard;
        control.update(surface);
    })?;

    {
        let mut guard = shared.borrow_mut();
        let (control, surface) = &mut *guard;
        control.update(surface);
    }
    Ok(true)
}
