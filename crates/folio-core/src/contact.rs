#![forbid(unsafe_code)]

//! Contact form validation and submission.
//!
//! Three fields are validated live (on blur, and on input while already
//! invalid) and again on submit. Submission is split in two halves so the
//! host can await the relay without holding the form borrowed:
//!
//! 1. [`ContactForm::begin_submit`] validates, checks the honeypot and the
//!    relay, and returns a [`SubmitDecision`].
//! 2. On [`SubmitDecision::Send`] the host hands the payload to its
//!    [`EmailRelay`], then reports the outcome through
//!    [`ContactForm::finish_submit`].
//!
//! [`submit`] runs both halves for hosts where the borrow is not a concern.

use core::fmt;
use core::future::Future;
use core::time::Duration;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ContactConfig;
use crate::error::{Result, SiteError};

// ---------------------------------------------------------------------------
// Fields and rules
// ---------------------------------------------------------------------------

/// How a field's value is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Textarea,
}

/// The validated contact form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    Name,
    Email,
    Message,
}

impl FieldId {
    pub const ALL: [Self; 3] = [Self::Name, Self::Email, Self::Message];

    /// Element id of the input.
    #[must_use]
    pub const fn element_id(self) -> &'static str {
        match self {
            Self::Name => "contact-name",
            Self::Email => "contact-email",
            Self::Message => "contact-message",
        }
    }

    /// Element id of the error span.
    #[must_use]
    pub const fn error_id(self) -> &'static str {
        match self {
            Self::Name => "contact-name-error",
            Self::Email => "contact-email-error",
            Self::Message => "contact-message-error",
        }
    }

    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Name => FieldKind::Text,
            Self::Email => FieldKind::Email,
            Self::Message => FieldKind::Textarea,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Name => 0,
            Self::Email => 1,
            Self::Message => 2,
        }
    }
}

pub const REQUIRED: &str = "This field is required";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const TEXT_TOO_SHORT: &str = "Please enter at least 2 characters";
pub const MESSAGE_TOO_SHORT: &str = "Please enter at least 10 characters in your message";

const EMAIL_PATTERN: &str = r"(?i)^[^\s@]+@[^\s@]+\.[^\s@]+$|^[A-Za-z0-9_.-]+@([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]{2,4}$";

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());

#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(value))
}

/// Length as a browser reports it for form values (UTF-16 code units).
fn input_length(value: &str) -> usize {
    value.encode_utf16().count()
}

/// First rule `value` breaks, if any.
#[must_use]
pub fn validate_field(kind: FieldKind, value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        return Some(REQUIRED);
    }
    match kind {
        FieldKind::Email if !is_valid_email(value) => Some(INVALID_EMAIL),
        FieldKind::Text if input_length(value) < 2 => Some(TEXT_TOO_SHORT),
        FieldKind::Textarea if input_length(value.trim()) < 10 => Some(MESSAGE_TOO_SHORT),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

/// Color of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Error,
    Muted,
    Warning,
    Success,
}

impl StatusTone {
    /// CSS color value.
    #[must_use]
    pub const fn css_color(self) -> &'static str {
        match self {
            Self::Error => "var(--color-red-500, #dc2626)",
            Self::Muted => "var(--color-text-muted)",
            Self::Warning => "var(--color-orange-500, #ff8c42)",
            Self::Success => "var(--color-green-500, #16a34a)",
        }
    }
}

pub const STATUS_FIX_ERRORS: &str = "Please fix the errors above";
pub const STATUS_BLOCKED: &str = "Form submission blocked. Please try again.";
pub const STATUS_SENDING: &str = "Sending...";
pub const STATUS_UNCONFIGURED: &str = "Email service not configured. Please contact directly.";
pub const STATUS_SENT: &str = "✓ Message sent successfully! I'll get back to you soon.";
pub const STATUS_FAILED: &str = "✗ Failed to send message. Try again.";

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

/// Template parameters handed to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayPayload {
    pub from_name: String,
    pub reply_to: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_email: Option<String>,
}

/// Outbound email service.
pub trait EmailRelay {
    /// Whether the service is loaded and initialized.
    fn is_ready(&self) -> bool;

    /// Deliver one message.
    fn send(&self, payload: &RelayPayload) -> impl Future<Output = Result<()>>;
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// The form's inputs, error spans and status line.
pub trait FormSurface {
    /// Current value of a field, `None` when the input is missing.
    fn field_value(&self, field: FieldId) -> Option<String>;

    /// Value of the `website` honeypot input, if present.
    fn honeypot_value(&self) -> Option<String>;

    /// Whether the status output element exists.
    fn has_status(&self) -> bool;

    /// Render or clear (`None`) a field's error: `is-invalid` on the input,
    /// text and `aria-live="polite"` on the error span.
    fn show_field_error(&mut self, field: FieldId, message: Option<&str>);

    /// Write the status line. `None` keeps the current color.
    fn set_status(&mut self, text: &str, tone: Option<StatusTone>);

    /// Disable or re-enable the submit button.
    fn set_submitting(&mut self, submitting: bool);

    /// Reset every form control.
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// Form state machine
// ---------------------------------------------------------------------------

/// Result of the first half of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    /// A required element is missing; nothing happened.
    Incomplete,
    /// A send is already in flight.
    Busy,
    /// At least one field failed validation.
    Rejected,
    /// The honeypot was filled; the form was reset.
    Blocked,
    /// No relay available.
    Unavailable,
    /// Hand this payload to the relay, then call `finish_submit`.
    Send(RelayPayload),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEffect {
    /// Call [`ContactForm::on_status_clear`] with `generation` after `delay`.
    ArmStatusClear { delay: Duration, generation: u64 },
}

#[derive(Debug, Clone)]
pub struct ContactForm {
    config: ContactConfig,
    invalid: [bool; 3],
    sending: bool,
    status_generation: u64,
    effects: Vec<ContactEffect>,
}

impl ContactForm {
    #[must_use]
    pub fn new(config: ContactConfig) -> Self {
        Self {
            config,
            invalid: [false; 3],
            sending: false,
            status_generation: 0,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_invalid(&self, field: FieldId) -> bool {
        self.invalid[field.index()]
    }

    #[must_use]
    pub const fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn drain_effects(&mut self) -> Vec<ContactEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Validate one field and render its error. Returns whether it passed.
    pub fn validate<S: FormSurface>(&mut self, surface: &mut S, field: FieldId, value: &str) -> bool {
        let error = validate_field(field.kind(), value);
        self.invalid[field.index()] = error.is_some();
        surface.show_field_error(field, error);
        error.is_none()
    }

    pub fn on_blur<S: FormSurface>(&mut self, surface: &mut S, field: FieldId) {
        if let Some(value) = surface.field_value(field) {
            self.validate(surface, field, &value);
        }
    }

    /// Re-validate on input only while the field is marked invalid.
    pub fn on_input<S: FormSurface>(&mut self, surface: &mut S, field: FieldId) {
        if !self.is_invalid(field) {
            return;
        }
        if let Some(value) = surface.field_value(field) {
            self.validate(surface, field, &value);
        }
    }

    /// First half of a submission.
    pub fn begin_submit<S: FormSurface>(&mut self, surface: &mut S, relay_ready: bool) -> SubmitDecision {
        let (Some(name), Some(email), Some(message)) = (
            surface.field_value(FieldId::Name),
            surface.field_value(FieldId::Email),
            surface.field_value(FieldId::Message),
        ) else {
            return SubmitDecision::Incomplete;
        };
        if !surface.has_status() {
            return SubmitDecision::Incomplete;
        }
        if self.sending {
            return SubmitDecision::Busy;
        }
        // A new submission supersedes any pending status clear.
        self.status_generation = self.status_generation.wrapping_add(1);

        let name_ok = self.validate(surface, FieldId::Name, &name);
        let email_ok = self.validate(surface, FieldId::Email, &email);
        let message_ok = self.validate(surface, FieldId::Message, &message);
        if !(name_ok && email_ok && message_ok) {
            surface.set_status(STATUS_FIX_ERRORS, Some(StatusTone::Error));
            debug!(name_ok, email_ok, message_ok, "contact form rejected");
            return SubmitDecision::Rejected;
        }

        if surface.honeypot_value().is_some_and(|v| !v.trim().is_empty()) {
            surface.set_status(STATUS_BLOCKED, None);
            surface.reset();
            debug!("contact form honeypot tripped");
            return SubmitDecision::Blocked;
        }

        surface.set_status(STATUS_SENDING, Some(StatusTone::Muted));
        if !relay_ready {
            surface.set_status(STATUS_UNCONFIGURED, Some(StatusTone::Warning));
            warn!("email relay unavailable");
            return SubmitDecision::Unavailable;
        }

        self.sending = true;
        surface.set_submitting(true);
        SubmitDecision::Send(RelayPayload {
            from_name: name,
            reply_to: email,
            message,
            to_email: self.config.to_email.clone(),
        })
    }

    /// Second half of a submission: report the relay outcome.
    pub fn finish_submit<S: FormSurface, E: fmt::Display>(
        &mut self,
        surface: &mut S,
        outcome: core::result::Result<(), E>,
    ) {
        self.sending = false;
        surface.set_submitting(false);
        match outcome {
            Ok(()) => {
                surface.set_status(STATUS_SENT, Some(StatusTone::Success));
                surface.reset();
                for field in FieldId::ALL {
                    self.invalid[field.index()] = false;
                    surface.show_field_error(field, None);
                }
                self.status_generation = self.status_generation.wrapping_add(1);
                self.effects.push(ContactEffect::ArmStatusClear {
                    delay: self.config.status_clear(),
                    generation: self.status_generation,
                });
                debug!("contact message sent");
            }
            Err(err) => {
                warn!(error = %err, "email relay failed");
                surface.set_status(STATUS_FAILED, Some(StatusTone::Error));
            }
        }
    }

    /// Status clear timer fired.
    pub fn on_status_clear<S: FormSurface>(&mut self, surface: &mut S, generation: u64) {
        if generation == self.status_generation {
            surface.set_status("", None);
        }
    }
}

/// Run a whole submission against `relay`.
pub async fn submit<S, R>(form: &mut ContactForm, surface: &mut S, relay: &R) -> SubmitDecision
where
    S: FormSurface,
    R: EmailRelay,
{
    let decision = form.begin_submit(surface, relay.is_ready());
    if let SubmitDecision::Send(payload) = &decision {
        let outcome = relay.send(payload).await;
        form.finish_submit::<S, SiteError>(surface, outcome);
    }
    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    #[derive(Default)]
    struct FakeForm {
        values: [Option<String>; 3],
        honeypot: Option<String>,
        status_present: bool,
        errors: [Option<String>; 3],
        status: Vec<(String, Option<StatusTone>)>,
        submitting: Vec<bool>,
        resets: usize,
    }

    impl FakeForm {
        fn filled(name: &str, email: &str, message: &str) -> Self {
            Self {
                values: [Some(name.into()), Some(email.into()), Some(message.into())],
                honeypot: Some(String::new()),
                status_present: true,
                ..Self::default()
            }
        }

        fn last_status(&self) -> Option<(&str, Option<StatusTone>)> {
            self.status.last().map(|(t, c)| (t.as_str(), *c))
        }
    }

    impl FormSurface for FakeForm {
        fn field_value(&self, field: FieldId) -> Option<String> {
            self.values[field.index()].clone()
        }
        fn honeypot_value(&self) -> Option<String> {
            self.honeypot.clone()
        }
        fn has_status(&self) -> bool {
            self.status_present
        }
        fn show_field_error(&mut self, field: FieldId, message: Option<&str>) {
            self.errors[field.index()] = message.map(str::to_owned);
        }
        fn set_status(&mut self, text: &str, tone: Option<StatusTone>) {
            self.status.push((text.into(), tone));
        }
        fn set_submitting(&mut self, submitting: bool) {
            self.submitting.push(submitting);
        }
        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    struct FakeRelay {
        ready: bool,
        fail: bool,
    }

    impl EmailRelay for FakeRelay {
        fn is_ready(&self) -> bool {
            self.ready
        }
        fn send(&self, _payload: &RelayPayload) -> impl Future<Output = Result<()>> {
            let outcome = if self.fail {
                Err(SiteError::relay("status 500"))
            } else {
                Ok(())
            };
            std::future::ready(outcome)
        }
    }

    fn run<F: Future>(future: F) -> F::Output {
        let mut future = pin!(future);
        let mut cx = Context::from_waker(Waker::noop());
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(out) => out,
            Poll::Pending => panic!("relay future should be ready"),
        }
    }

    fn valid_form() -> FakeForm {
        FakeForm::filled("Ada", "ada@example.com", "Hello there, nice site!")
    }

    #[test]
    fn rules_apply_in_order() {
        assert_eq!(validate_field(FieldKind::Text, "   "), Some(REQUIRED));
        assert_eq!(validate_field(FieldKind::Email, ""), Some(REQUIRED));
        assert_eq!(validate_field(FieldKind::Email, "ada@"), Some(INVALID_EMAIL));
        assert_eq!(validate_field(FieldKind::Text, "A"), Some(TEXT_TOO_SHORT));
        assert_eq!(validate_field(FieldKind::Textarea, "  ten chars!  "), None);
        assert_eq!(validate_field(FieldKind::Textarea, "  short  "), Some(MESSAGE_TOO_SHORT));
        assert_eq!(validate_field(FieldKind::Text, "Ada"), None);
    }

    #[test]
    fn text_length_counts_untrimmed_value() {
        assert_eq!(validate_field(FieldKind::Text, "A "), None);
    }

    #[test]
    fn lengths_count_utf16_units() {
        // One astral character is two code units.
        assert_eq!(validate_field(FieldKind::Text, "\u{1F600}"), None);
        assert_eq!(validate_field(FieldKind::Text, "é"), Some(TEXT_TOO_SHORT));
        assert_eq!(validate_field(FieldKind::Textarea, "\u{1F600}\u{1F600}\u{1F600}\u{1F600}\u{1F600}"), None);
        assert_eq!(validate_field(FieldKind::Textarea, "\u{1F600}\u{1F600}\u{1F600}\u{1F600}"), Some(MESSAGE_TOO_SHORT));
    }

    #[test]
    fn email_pattern_compiles_and_matches() {
        assert!(EMAIL_RE.is_some());
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("ADA.L@Mail.Example.ORG"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada lovelace@example.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn blur_validates_and_input_revalidates_only_when_invalid() {
        let mut surface = FakeForm::filled("A", "ada@example.com", "Hello there!");
        let mut form = ContactForm::new(ContactConfig::default());

        form.on_input(&mut surface, FieldId::Name);
        assert_eq!(surface.errors[0], None);

        form.on_blur(&mut surface, FieldId::Name);
        assert!(form.is_invalid(FieldId::Name));
        assert_eq!(surface.errors[0].as_deref(), Some(TEXT_TOO_SHORT));

        surface.values[0] = Some("Ad".into());
        form.on_input(&mut surface, FieldId::Name);
        assert!(!form.is_invalid(FieldId::Name));
        assert_eq!(surface.errors[0], None);
    }

    #[test]
    fn missing_element_is_a_no_op() {
        let mut surface = valid_form();
        surface.values[2] = None;
        let mut form = ContactForm::new(ContactConfig::default());
        assert_eq!(form.begin_submit(&mut surface, true), SubmitDecision::Incomplete);
        assert!(surface.status.is_empty());

        let mut surface = valid_form();
        surface.status_present = false;
        assert_eq!(form.begin_submit(&mut surface, true), SubmitDecision::Incomplete);
    }

    #[test]
    fn every_field_reports_on_rejection() {
        let mut surface = FakeForm::filled("", "nope", "short");
        let mut form = ContactForm::new(ContactConfig::default());
        assert_eq!(form.begin_submit(&mut surface, true), SubmitDecision::Rejected);
        assert_eq!(surface.errors[0].as_deref(), Some(REQUIRED));
        assert_eq!(surface.errors[1].as_deref(), Some(INVALID_EMAIL));
        assert_eq!(surface.errors[2].as_deref(), Some(MESSAGE_TOO_SHORT));
        assert_eq!(
            surface.last_status(),
            Some((STATUS_FIX_ERRORS, Some(StatusTone::Error)))
        );
    }

    #[test]
    fn honeypot_blocks_and_resets() {
        let mut surface = valid_form();
        surface.honeypot = Some("http://spam.example".into());
        let mut form = ContactForm::new(ContactConfig::default());
        assert_eq!(form.begin_submit(&mut surface, true), SubmitDecision::Blocked);
        assert_eq!(surface.last_status(), Some((STATUS_BLOCKED, None)));
        assert_eq!(surface.resets, 1);
    }

    #[test]
    fn unavailable_relay_warns() {
        let mut surface = valid_form();
        let mut form = ContactForm::new(ContactConfig::default());
        let decision = run(submit(&mut form, &mut surface, &FakeRelay { ready: false, fail: false }));
        assert_eq!(decision, SubmitDecision::Unavailable);
        assert_eq!(
            surface.status,
            vec![
                (STATUS_SENDING.to_owned(), Some(StatusTone::Muted)),
                (STATUS_UNCONFIGURED.to_owned(), Some(StatusTone::Warning)),
            ]
        );
        assert!(surface.submitting.is_empty());
    }

    #[test]
    fn successful_send_resets_and_schedules_clear() {
        let mut surface = valid_form();
        let mut form = ContactForm::new(ContactConfig::default());
        form.invalid = [true; 3];
        let decision = run(submit(&mut form, &mut surface, &FakeRelay { ready: true, fail: false }));

        assert!(matches!(decision, SubmitDecision::Send(_)));
        assert_eq!(surface.last_status(), Some((STATUS_SENT, Some(StatusTone::Success))));
        assert_eq!(surface.resets, 1);
        assert_eq!(surface.submitting, vec![true, false]);
        assert!(FieldId::ALL.iter().all(|f| !form.is_invalid(*f)));

        let effects = form.drain_effects();
        let [ContactEffect::ArmStatusClear { delay, generation }] = effects[..] else {
            panic!("expected one status clear, got {effects:?}");
        };
        assert_eq!(delay, Duration::from_millis(5000));
        form.on_status_clear(&mut surface, generation);
        assert_eq!(surface.last_status(), Some(("", None)));
    }

    #[test]
    fn failed_send_reports_error() {
        let mut surface = valid_form();
        let mut form = ContactForm::new(ContactConfig::default());
        run(submit(&mut form, &mut surface, &FakeRelay { ready: true, fail: true }));
        assert_eq!(surface.last_status(), Some((STATUS_FAILED, Some(StatusTone::Error))));
        assert_eq!(surface.resets, 0);
        assert!(!form.is_sending());
        assert!(form.drain_effects().is_empty());
    }

    #[test]
    fn new_submission_cancels_pending_clear() {
        let mut surface = valid_form();
        let mut form = ContactForm::new(ContactConfig::default());
        run(submit(&mut form, &mut surface, &FakeRelay { ready: true, fail: false }));
        let [ContactEffect::ArmStatusClear { generation, .. }] = form.drain_effects()[..] else {
            panic!("expected one status clear");
        };

        form.begin_submit(&mut surface, false);
        let before = surface.status.len();
        form.on_status_clear(&mut surface, generation);
        assert_eq!(surface.status.len(), before);
    }

    #[test]
    fn in_flight_submission_is_busy() {
        let mut surface = valid_form();
        let mut form = ContactForm::new(ContactConfig::default());
        assert!(matches!(form.begin_submit(&mut surface, true), SubmitDecision::Send(_)));
        assert_eq!(form.begin_submit(&mut surface, true), SubmitDecision::Busy);
    }

    #[test]
    fn payload_omits_missing_recipient() {
        let payload = RelayPayload {
            from_name: "Ada".into(),
            reply_to: "ada@example.com".into(),
            message: "Hello there!".into(),
            to_email: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "from_name": "Ada",
                "reply_to": "ada@example.com",
                "message": "Hello there!",
            })
        );
    }

    #[test]
    fn payload_carries_configured_recipient() {
        let mut surface = valid_form();
        let config = ContactConfig {
            to_email: Some("owner@example.com".into()),
            ..ContactConfig::default()
        };
        let mut form = ContactForm::new(config);
        let SubmitDecision::Send(payload) = form.begin_submit(&mut surface, true) else {
            panic!("expected send");
        };
        assert_eq!(payload.to_email.as_deref(), Some("owner@example.com"));
        assert_eq!(payload.from_name, "Ada");
    }
}
