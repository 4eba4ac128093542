#![forbid(unsafe_code)]

//! Browser bindings for the folio site behaviors.
//!
//! Everything interactive lives in `folio-core` as host-driven state
//! machines. This crate is the host: it implements the core's surface
//! traits over the DOM, turns their effects into `requestAnimationFrame`
//! and `setTimeout` calls, binds the EmailJS global as the contact relay,
//! and boots every component from the module's `start` function.
//!
//! The exported entry points mirror the page's component loader:
//! `initActiveNav`, `initMobileMenu`, `initBackToTop`, `initFormValidation`,
//! `initThemeSwitcher`, `initLoader`, `updateCurrentYear` and
//! `setHeaderOffsetCssVar`.
//!
//! On non-wasm targets only the configuration loader is compiled.

pub mod settings;

#[cfg(target_arch = "wasm32")]
mod back_to_top;
#[cfg(target_arch = "wasm32")]
mod boot;
#[cfg(target_arch = "wasm32")]
mod chrome;
#[cfg(target_arch = "wasm32")]
mod contact;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod lazy;
#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod menu;
#[cfg(target_arch = "wasm32")]
mod nav;
#[cfg(target_arch = "wasm32")]
mod theme;

#[cfg(target_arch = "wasm32")]
pub use boot::{
    init_active_nav, init_back_to_top, init_form_validation, init_loader, init_mobile_menu,
    init_theme_switcher, set_header_offset_css_var, update_current_year,
};
