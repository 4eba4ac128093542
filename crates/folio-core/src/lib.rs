#![forbid(unsafe_code)]

//! `folio-core` holds the interactive behaviors of the folio portfolio site as
//! platform-independent state machines.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (browser glue or a test
//!   fake) pushes events and reads/writes page state through small surface
//!   traits ([`scroll_spy::NavSurface`], [`theme::ThemeSurface`], ...).
//! - **Deterministic time**: every time-dependent operation takes the
//!   current monotonic time from the host; timers are requested as effects
//!   and delivered back with a generation token.
//! - **No JS/WASM types**: `folio-web` wraps these machines with
//!   `wasm-bindgen`, everything here is testable natively.
//!
//! # Components
//!
//! - [`scroll_spy`] - active navigation link tracking under a fixed header
//! - [`href`] - same-page hash resolution and hash-link rewriting
//! - [`header`] - the `--header-offset` CSS variable
//! - [`theme`] - theme/accent selection with persisted preference
//! - [`menu`] - mobile slide-out menu
//! - [`lazy_image`] - deferred image loading
//! - [`back_to_top`] - back-to-top control
//! - [`contact`] - contact form validation and relay submission
//! - [`chrome`] - footer year, loading indicator, skip link, boot order
//! - [`config`] - tuning constants as data

pub mod back_to_top;
pub mod chrome;
pub mod clock;
pub mod config;
pub mod contact;
pub mod error;
pub mod header;
pub mod href;
pub mod lazy_image;
pub mod menu;
pub mod scroll_spy;
pub mod theme;

pub use clock::{DeterministicClock, MonotonicClock};
pub use config::SiteConfig;
pub use error::{Result, SiteError};
pub use scroll_spy::{ActiveNavTracker, NavEffect, NavSurface, PendingTarget};
pub use contact::{ContactForm, EmailRelay, FormSurface, SubmitDecision};
pub use menu::{MenuSurface, MobileMenu};
pub use theme::{PreferenceStore, ThemeSurface, ThemeSwitcher};
