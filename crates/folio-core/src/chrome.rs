#![forbid(unsafe_code)]

//! Page chrome: boot sequencing, loader, footer year and skip link.

use core::fmt;

use tracing::{debug, info, warn};

use crate::error::SiteError;
use crate::href::decode_fragment;

/// Root attribute set once components have booted.
pub const LOADED_ATTR: &str = "data-app-loaded";
/// Loading indicator removed once the page has loaded.
pub const LOADER_SELECTOR: &str = "[data-app-loader]";
/// Footer element whose text is the current year.
pub const YEAR_ID: &str = "currentyear";
pub const SKIP_LINK_SELECTOR: &str = ".skip-link";

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// A bootable page behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    FooterYear,
    HeaderOffset,
    Loader,
    ActiveNav,
    MobileMenu,
    BackToTop,
    FormValidation,
    ThemeSwitcher,
    LazyImages,
    SkipLink,
    ContactForm,
}

impl Component {
    /// Order the component loader boots in once the DOM is ready.
    pub const BOOT_ORDER: [Self; 7] = [
        Self::FooterYear,
        Self::HeaderOffset,
        Self::Loader,
        Self::ActiveNav,
        Self::MobileMenu,
        Self::BackToTop,
        Self::FormValidation,
    ];

    /// Booted on their own as soon as the script runs.
    pub const INDEPENDENT: [Self; 4] = [
        Self::LazyImages,
        Self::SkipLink,
        Self::ContactForm,
        Self::ThemeSwitcher,
    ];

    /// Name the init function is exported under.
    #[must_use]
    pub const fn export_name(self) -> &'static str {
        match self {
            Self::FooterYear => "updateCurrentYear",
            Self::HeaderOffset => "setHeaderOffsetCssVar",
            Self::Loader => "initLoader",
            Self::ActiveNav => "initActiveNav",
            Self::MobileMenu => "initMobileMenu",
            Self::BackToTop => "initBackToTop",
            Self::FormValidation => "initFormValidation",
            Self::ThemeSwitcher => "initThemeSwitcher",
            Self::LazyImages => "initLazyImages",
            Self::SkipLink => "initSkipLink",
            Self::ContactForm => "initContactForm",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.export_name())
    }
}

// ---------------------------------------------------------------------------
// Boot report
// ---------------------------------------------------------------------------

/// Outcome of one component boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    /// Registered its listeners.
    Started,
    /// Its elements are absent; nothing to do.
    Inert,
    /// Failed; the other components still boot.
    Failed(String),
}

/// Tally of a boot pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootReport {
    entries: Vec<(Component, BootOutcome)>,
}

impl BootReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a boot result. `Ok(false)` means the component found nothing
    /// to attach to.
    pub fn record(&mut self, component: Component, result: Result<bool, SiteError>) {
        let outcome = match result {
            Ok(true) => {
                debug!(component = %component, "component started");
                BootOutcome::Started
            }
            Ok(false) => {
                debug!(component = %component, "component inert");
                BootOutcome::Inert
            }
            Err(err) => {
                warn!(component = %component, error = %err, "component failed to boot");
                BootOutcome::Failed(err.to_string())
            }
        };
        self.entries.push((component, outcome));
    }

    #[must_use]
    pub fn outcome(&self, component: Component) -> Option<&BootOutcome> {
        self.entries
            .iter()
            .rev()
            .find(|(c, _)| *c == component)
            .map(|(_, o)| o)
    }

    #[must_use]
    pub fn entries(&self) -> &[(Component, BootOutcome)] {
        &self.entries
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, o)| matches!(o, BootOutcome::Failed(_)))
            .count()
    }

    /// Log a one-line summary.
    pub fn log_summary(&self) {
        let started = self
            .entries
            .iter()
            .filter(|(_, o)| *o == BootOutcome::Started)
            .count();
        info!(
            started,
            inert = self.entries.len() - started - self.failed(),
            failed = self.failed(),
            "page components booted"
        );
    }
}

// ---------------------------------------------------------------------------
// Document readiness and loader
// ---------------------------------------------------------------------------

/// `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Unknown values are treated as still loading.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "complete" => Self::Complete,
            "interactive" => Self::Interactive,
            _ => Self::Loading,
        }
    }

    /// Whether `DOMContentLoaded` has already fired.
    #[must_use]
    pub const fn dom_ready(self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// What the loader should do at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderAction {
    /// The page has loaded; hide the loader now.
    HideNow,
    /// Hide once the window `load` event fires.
    HideOnLoad,
}

impl LoaderAction {
    #[must_use]
    pub const fn for_state(state: ReadyState) -> Self {
        match state {
            ReadyState::Complete => Self::HideNow,
            ReadyState::Loading | ReadyState::Interactive => Self::HideOnLoad,
        }
    }
}

// ---------------------------------------------------------------------------
// Footer year and skip link
// ---------------------------------------------------------------------------

/// Footer text for a calendar year.
#[must_use]
pub fn year_text(year: u32) -> String {
    year.to_string()
}

/// Id of a skip link's target, from its `href`.
///
/// The fragment is percent-decoded and looked up by id, so any id the
/// document uses can be a target.
#[must_use]
pub fn skip_target_id(href: Option<&str>) -> Option<String> {
    let id = href?.trim().strip_prefix('#')?;
    if id.is_empty() {
        return None;
    }
    decode_fragment(id)
}
