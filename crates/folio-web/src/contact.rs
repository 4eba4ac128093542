//! Contact form bindings and the EmailJS relay.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use folio_core::config::ContactConfig;
use folio_core::contact::{
    ContactEffect, ContactForm, EmailRelay, FieldId, FormSurface, RelayPayload, StatusTone,
    SubmitDecision,
};
use folio_core::{Result, SiteError};
use js_sys::{Array, Function, Promise, Reflect};
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlTextAreaElement,
};

use crate::dom::{self, Listen};

const FORM: &str = "[data-contact-form]";
const STATUS: &str = "[data-form-status]";
const SUBMIT_BUTTON: &str = "button[type=\"submit\"]";
const HONEYPOT: &str = "input[name=\"website\"]";
const INVALID_CLASS: &str = "is-invalid";

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

/// The page's `emailjs` global.
#[derive(Debug, Clone)]
pub(crate) struct EmailJsRelay {
    service_id: String,
    template_id: String,
    user_id: String,
    ready: bool,
}

fn emailjs_method(name: &str) -> Result<(JsValue, Function)> {
    let emailjs = Reflect::get(&js_sys::global(), &JsValue::from_str("emailjs")).map_err(dom::js_err)?;
    let method = Reflect::get(&emailjs, &JsValue::from_str(name))
        .map_err(dom::js_err)?
        .dyn_into::<Function>()
        .map_err(|_| SiteError::relay(format!("emailjs.{name} is not a function")))?;
    Ok((emailjs, method))
}

impl EmailJsRelay {
    /// Initialise the relay when the `emailjs` global is present.
    pub(crate) fn connect(config: &ContactConfig) -> Self {
        let ready = dom::has_global("emailjs")
            && emailjs_method("init")
                .and_then(|(emailjs, init)| {
                    init.call1(&emailjs, &JsValue::from_str(&config.user_id))
                        .map_err(dom::js_err)
                })
                .is_ok();
        debug!(ready, "email relay connected");
        Self {
            service_id: config.service_id.clone(),
            template_id: config.template_id.clone(),
            user_id: config.user_id.clone(),
            ready,
        }
    }

    fn start_send(&self, payload: &RelayPayload) -> Result<Promise> {
        let params = js_sys::JSON::parse(&serde_json::to_string(payload)?).map_err(dom::js_err)?;
        let (emailjs, send) = emailjs_method("send")?;
        let args = Array::of4(
            &JsValue::from_str(&self.service_id),
            &JsValue::from_str(&self.template_id),
            &params,
            &JsValue::from_str(&self.user_id),
        );
        send.apply(&emailjs, &args)
            .map_err(|err| SiteError::relay(dom::describe(&err)))?
            .dyn_into::<Promise>()
            .map_err(|_| SiteError::relay("emailjs.send did not return a promise"))
    }
}

impl EmailRelay for EmailJsRelay {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn send(&self, payload: &RelayPayload) -> impl Future<Output = Result<()>> {
        let started = self.start_send(payload);
        async move {
            JsFuture::from(started?)
                .await
                .map(|_| ())
                .map_err(|err| SiteError::relay(dom::describe(&err)))
        }
    }
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

pub(crate) struct DomFormSurface {
    document: Document,
    form: Option<HtmlFormElement>,
    status: Option<Element>,
}

impl DomFormSurface {
    fn locate(document: &Document) -> Self {
        Self {
            document: document.clone(),
            form: dom::query(document, FORM).and_then(|el| el.dyn_into::<HtmlFormElement>().ok()),
            status: dom::query(document, STATUS),
        }
    }

    fn has_any_field(&self) -> bool {
        FieldId::ALL
            .iter()
            .any(|field| dom::by_id(&self.document, field.element_id()).is_some())
    }
}

fn control_value(el: &Element) -> Option<String> {
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    el.dyn_ref::<HtmlTextAreaElement>().map(HtmlTextAreaElement::value)
}

impl FormSurface for DomFormSurface {
    fn field_value(&self, field: FieldId) -> Option<String> {
        control_value(&dom::by_id(&self.document, field.element_id())?)
    }

    fn honeypot_value(&self) -> Option<String> {
        let input = self.form.as_ref()?.query_selector(HONEYPOT).ok().flatten()?;
        control_value(&input)
    }

    fn has_status(&self) -> bool {
        self.status.is_some()
    }

    fn show_field_error(&mut self, field: FieldId, message: Option<&str>) {
        let (Some(input), Some(span)) = (
            dom::by_id(&self.document, field.element_id()),
            dom::by_id(&self.document, field.error_id()),
        ) else {
            return;
        };
        match message {
            Some(message) => {
                let _ = input.class_list().add_1(INVALID_CLASS);
                span.set_text_content(Some(message));
                let _ = span.set_attribute("aria-live", "polite");
            }
            None => {
                let _ = input.class_list().remove_1(INVALID_CLASS);
                span.set_text_content(Some(""));
            }
        }
    }

    fn set_status(&mut self, text: &str, tone: Option<StatusTone>) {
        let Some(status) = &self.status else {
            return;
        };
        status.set_text_content(Some(text));
        if let Some(tone) = tone
            && let Some(el) = status.dyn_ref::<HtmlElement>()
        {
            let _ = el.style().set_property("color", tone.css_color());
        }
    }

    fn set_submitting(&mut self, submitting: bool) {
        let button = self
            .form
            .as_ref()
            .and_then(|form| form.query_selector(SUBMIT_BUTTON).ok().flatten())
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok());
        if let Some(button) = button {
            button.set_disabled(submitting);
        }
    }

    fn reset(&mut self) {
        if let Some(form) = &self.form {
            form.reset();
        }
    }
}

// ---------------------------------------------------------------------------
// Shared controller
// ---------------------------------------------------------------------------

struct FormHost {
    form: ContactForm,
    surface: DomFormSurface,
}

type SharedForm = Rc<RefCell<FormHost>>;

thread_local! {
    static FORM_HOST: RefCell<Option<SharedForm>> = const { RefCell::new(None) };
}

/// The page's one form controller, shared by live validation and
/// submission so both see the same invalid markers.
fn shared_form(config: &ContactConfig) -> Result<SharedForm> {
    if let Some(existing) = FORM_HOST.with(|cell| cell.borrow().clone()) {
        return Ok(existing);
    }
    let document = dom::document()?;
    let shared = Rc::new(RefCell::new(FormHost {
        form: ContactForm::new(config.clone()),
        surface: DomFormSurface::locate(&document),
    }));
    FORM_HOST.with(|cell| *cell.borrow_mut() = Some(Rc::clone(&shared)));
    Ok(shared)
}

fn drive(shared: &SharedForm, f: impl FnOnce(&mut ContactForm, &mut DomFormSurface)) {
    let effects = {
        let mut guard = shared.borrow_mut();
        let host = &mut *guard;
        f(&mut host.form, &mut host.surface);
        host.form.drain_effects()
    };
    for effect in effects {
        match effect {
            ContactEffect::ArmStatusClear { delay, generation } => {
                let Ok(window) = dom::window() else {
                    continue;
                };
                let next = Rc::clone(shared);
                let _ = dom::set_timeout(&window, delay, move || {
                    drive(&next, |form, surface| form.on_status_clear(surface, generation));
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Boot
// ---------------------------------------------------------------------------

/// Live blur/input validation of the three contact fields.
pub(crate) fn boot_validation(config: &ContactConfig) -> Result<bool> {
    let shared = shared_form(config)?;
    if !shared.borrow().surface.has_any_field() {
        return Ok(false);
    }
    let document = dom::document()?;
    for field in FieldId::ALL {
        let Some(input) = dom::by_id(&document, field.element_id()) else {
            continue;
        };
        let next = Rc::clone(&shared);
        dom::listen(&input, "blur", Listen::NORMAL, move |_| {
            drive(&next, |form, surface| form.on_blur(surface, field));
        })?;
        let next = Rc::clone(&shared);
        dom::listen(&input, "input", Listen::NORMAL, move |_| {
            drive(&next, |form, surface| form.on_input(surface, field));
        })?;
    }
    Ok(true)
}

/// Submission through the relay.
pub(crate) fn boot_form(config: &ContactConfig) -> Result<bool> {
    let shared = shared_form(config)?;
    let Some(form_el) = shared.borrow().surface.form.clone() else {
        return Ok(false);
    };
    let relay = EmailJsRelay::connect(config);

    let next = Rc::clone(&shared);
    dom::listen(&form_el, "submit", Listen::NORMAL, move |event| {
        event.prevent_default();
        let decision = {
            let mut guard = next.borrow_mut();
            let host = &mut *guard;
            host.form.begin_submit(&mut host.surface, relay.is_ready())
        };
        let payload = match decision {
            SubmitDecision::Send(payload) => payload,
            other => {
                debug!(decision = ?other, "contact submission not sent");
                return;
            }
        };
        let next = Rc::clone(&next);
        let relay = relay.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = relay.send(&payload).await;
            drive(&next, |form, surface| form.finish_submit(surface, outcome));
        });
    })?;
    Ok(true)
}
