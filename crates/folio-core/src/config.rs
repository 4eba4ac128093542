#![forbid(unsafe_code)]

//! Site behavior configuration as data.
//!
//! Captures every tuning constant and relay identifier as a single
//! [`SiteConfig`] that the page can override with an inline JSON blob:
//!
//! ```json
//! { "nav": { "settle_delay_ms": 180 }, "log_level": "debug" }
//! ```
//!
//! Every section is `serde(default)`, so a partial document only overrides
//! what it names. `SiteConfig::default()` reproduces the built-in behavior.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};

// ---------------------------------------------------------------------------
// Top-level SiteConfig
// ---------------------------------------------------------------------------

/// Top-level configuration for all site behaviors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Active-navigation tracker thresholds.
    pub nav: NavConfig,
    /// Theme switcher keys and fade timing.
    pub theme: ThemeConfig,
    /// Mobile menu timing.
    pub menu: MenuConfig,
    /// Back-to-top visibility.
    pub back_to_top: BackToTopConfig,
    /// Lazy image observer options.
    pub lazy: LazyImageConfig,
    /// Contact form relay identifiers and timing.
    pub contact: ContactConfig,
    /// Console log level (`error`, `warn`, `info`, `debug`, `trace`). Default: `info`.
    pub log_level: LogLevel,
}

impl SiteConfig {
    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.nav.settle_delay_ms == 0 {
            errors.push("nav.settle_delay_ms must be > 0".into());
        }
        if self.nav.pending_timeout_ms == 0 {
            errors.push("nav.pending_timeout_ms must be > 0".into());
        }
        if self.nav.pending_timeout_ms < self.nav.settle_delay_ms {
            errors.push(format!(
                "nav.pending_timeout_ms ({}) must be >= nav.settle_delay_ms ({})",
                self.nav.pending_timeout_ms, self.nav.settle_delay_ms
            ));
        }

        if self.theme.theme_key.is_empty() {
            errors.push("theme.theme_key must not be empty".into());
        }
        if self.theme.accent_key.is_empty() {
            errors.push("theme.accent_key must not be empty".into());
        }
        if self.theme.theme_key == self.theme.accent_key {
            errors.push("theme.theme_key and theme.accent_key must differ".into());
        }

        if !(0.0..=1.0).contains(&self.lazy.threshold) {
            errors.push(format!(
                "lazy.threshold must be in [0, 1], got {}",
                self.lazy.threshold
            ));
        }

        for (name, value) in [
            ("contact.service_id", &self.contact.service_id),
            ("contact.template_id", &self.contact.template_id),
            ("contact.user_id", &self.contact.user_id),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{name} must not be empty"));
            }
        }
        if self.contact.status_clear_ms == 0 {
            errors.push("contact.status_clear_ms must be > 0".into());
        }

        errors
    }

    /// Validate and return `self`, or every problem as [`SiteError::Validation`].
    pub fn into_validated(self) -> Result<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(SiteError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Section configs
// ---------------------------------------------------------------------------

/// Active-navigation tracker thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Quiet period after the last scroll before the settle check (ms). Default: 140.
    pub settle_delay_ms: u64,
    /// Hard expiry of a pending navigation target (ms). Default: 4000.
    pub pending_timeout_ms: u64,
    /// Slack when deciding a pending target has reached the header (px). Default: 2.
    pub reach_tolerance_px: f64,
    /// Added to the scroll cursor so a section exactly at the header counts (px). Default: 1.
    pub cursor_epsilon_px: f64,
}

impl NavConfig {
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    #[must_use]
    pub fn pending_timeout(&self) -> Duration {
        Duration::from_millis(self.pending_timeout_ms)
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 140,
            pending_timeout_ms: 4000,
            reach_tolerance_px: 2.0,
            cursor_epsilon_px: 1.0,
        }
    }
}

/// Theme switcher storage keys and fade timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Storage key for the theme. Default: `preferred-theme`.
    pub theme_key: String,
    /// Storage key for the accent. Default: `preferred-accent`.
    pub accent_key: String,
    /// Fade attribute lifetime after the second phase (ms). Default: 220.
    pub fade_ms: u64,
}

impl ThemeConfig {
    #[must_use]
    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            theme_key: "preferred-theme".into(),
            accent_key: "preferred-accent".into(),
            fade_ms: 220,
        }
    }
}

/// Mobile menu timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Delay between closing the menu and scrolling to the section (ms). Default: 100.
    pub scroll_delay_ms: u64,
}

impl MenuConfig {
    #[must_use]
    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            scroll_delay_ms: 100,
        }
    }
}

/// Back-to-top visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackToTopConfig {
    /// The button shows once `scrollY` exceeds this (px). Default: 50.
    pub threshold_px: f64,
}

impl Default for BackToTopConfig {
    fn default() -> Self {
        Self { threshold_px: 50.0 }
    }
}

/// Lazy image observer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LazyImageConfig {
    /// Intersection observer root margin. Default: `50px`.
    pub root_margin: String,
    /// Intersection ratio that counts as visible. Default: 0.01.
    pub threshold: f64,
}

impl Default for LazyImageConfig {
    fn default() -> Self {
        Self {
            root_margin: "50px".into(),
            threshold: 0.01,
        }
    }
}

/// Contact form relay identifiers and timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Relay service identifier. Default: `service_default`.
    pub service_id: String,
    /// Relay template identifier. Default: `template_default`.
    pub template_id: String,
    /// Relay user (public key). Default: `user_default`.
    pub user_id: String,
    /// Recipient forwarded to the template, if the template needs one. Default: none.
    pub to_email: Option<String>,
    /// Success status lifetime (ms). Default: 5000.
    pub status_clear_ms: u64,
}

impl ContactConfig {
    #[must_use]
    pub fn status_clear(&self) -> Duration {
        Duration::from_millis(self.status_clear_ms)
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            service_id: "service_default".into(),
            template_id: "template_default".into(),
            user_id: "user_default".into(),
            to_email: None,
            status_clear_ms: 5000,
        }
    }
}

/// Console log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    #[must_use]
    pub const fn to_tracing(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
