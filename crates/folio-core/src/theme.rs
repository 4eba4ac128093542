#![forbid(unsafe_code)]

//! Theme and accent switching with persisted preference.
//!
//! The root element carries `data-theme` (`light`, `dark`, `system`) and
//! `data-accent` (`orange`, `neon`). Option buttons mirror the selection in
//! `aria-pressed`. A change starts a short two-phase fade marked by
//! `data-theme-fade`, skipped when the user prefers reduced motion.

use core::fmt;
use core::str::FromStr;
use core::time::Duration;

use tracing::{debug, warn};

use crate::config::ThemeConfig;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub const ALL: [Self; 3] = [Self::Light, Self::Dark, Self::System];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accent {
    #[default]
    Orange,
    Neon,
}

impl Accent {
    pub const ALL: [Self; 2] = [Self::Orange, Self::Neon];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Orange => "orange",
            Self::Neon => "neon",
        }
    }
}

/// A value outside the known theme or accent set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOption(pub String);

impl fmt::Display for UnknownOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown option: {:?}", self.0)
    }
}

impl std::error::Error for UnknownOption {}

impl FromStr for Theme {
    type Err = UnknownOption;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownOption(s.to_owned()))
    }
}

impl FromStr for Accent {
    type Err = UnknownOption;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownOption(s.to_owned()))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Accent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Host seams
// ---------------------------------------------------------------------------

/// Key-value preference storage (`localStorage`).
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Fade marker values for `data-theme-fade`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadePhase {
    /// `"1"`: transitions armed.
    Start,
    /// `"2"`: transitions running.
    Run,
}

impl FadePhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "1",
            Self::Run => "2",
        }
    }
}

/// Root element attributes and option buttons.
pub trait ThemeSurface {
    /// Current `data-theme` of the root element.
    fn theme_attr(&self) -> Option<String>;
    /// Current `data-accent` of the root element.
    fn accent_attr(&self) -> Option<String>;
    fn set_theme_attr(&mut self, theme: Theme);
    fn set_accent_attr(&mut self, accent: Accent);
    /// Set `aria-pressed` on every `[data-theme-option]` button.
    fn sync_theme_buttons(&mut self, theme: Theme);
    /// Set `aria-pressed` on every `[data-accent-option]` button.
    fn sync_accent_buttons(&mut self, accent: Accent);
    /// `prefers-reduced-motion: reduce`.
    fn prefers_reduced_motion(&self) -> bool;
    /// Set or remove `data-theme-fade`.
    fn set_fade_phase(&mut self, phase: Option<FadePhase>);
}

/// Scheduling request for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeEffect {
    /// Call [`ThemeSwitcher::on_fade_frame`] on the next frame.
    RequestFrame { generation: u64 },
    /// Call [`ThemeSwitcher::on_fade_timer`] after `delay`.
    ArmFadeTimer { delay: Duration, generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FadeState {
    Idle,
    AwaitingFrame,
    Running,
}

// ---------------------------------------------------------------------------
// Switcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ThemeSwitcher {
    config: ThemeConfig,
    fade: FadeState,
    generation: u64,
    effects: Vec<ThemeEffect>,
}

impl ThemeSwitcher {
    #[must_use]
    pub fn new(config: ThemeConfig) -> Self {
        Self {
            config,
            fade: FadeState::Idle,
            generation: 0,
            effects: Vec::new(),
        }
    }

    /// Apply the stored (or default) theme and accent.
    ///
    /// Theme falls back to `system`; accent falls back to the document's
    /// current `data-accent`, then `orange`. Unknown stored values are
    /// ignored.
    pub fn init<S: ThemeSurface, P: PreferenceStore>(&mut self, surface: &mut S, store: &mut P) {
        let theme = store
            .get(&self.config.theme_key)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| Theme::default().as_str().to_owned());
        self.select_theme(surface, store, &theme);

        let accent = store
            .get(&self.config.accent_key)
            .filter(|v| !v.is_empty())
            .or_else(|| surface.accent_attr().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| Accent::default().as_str().to_owned());
        self.select_accent(surface, store, &accent);
    }

    /// Delegated click. `theme_option`/`accent_option` are the
    /// `data-*-option` values of the closest option button, if any.
    pub fn on_click<S: ThemeSurface, P: PreferenceStore>(
        &mut self,
        surface: &mut S,
        store: &mut P,
        theme_option: Option<&str>,
        accent_option: Option<&str>,
    ) {
        if let Some(theme) = theme_option {
            self.select_theme(surface, store, theme);
        } else if let Some(accent) = accent_option {
            self.select_accent(surface, store, accent);
        }
    }

    /// Apply a theme by name. Returns whether anything changed.
    pub fn select_theme<S: ThemeSurface, P: PreferenceStore>(
        &mut self,
        surface: &mut S,
        store: &mut P,
        name: &str,
    ) -> bool {
        let Ok(theme) = name.parse::<Theme>() else {
            debug!(value = name, "ignoring unknown theme");
            return false;
        };
        if surface.theme_attr().as_deref() == Some(theme.as_str()) {
            return false;
        }
        surface.set_theme_attr(theme);
        surface.sync_theme_buttons(theme);
        persist(store, &self.config.theme_key, theme.as_str());
        debug!(%theme, "theme applied");
        self.run_fade(surface);
        true
    }

    /// Apply an accent by name. Returns whether anything changed.
    pub fn select_accent<S: ThemeSurface, P: PreferenceStore>(
        &mut self,
        surface: &mut S,
        store: &mut P,
        name: &str,
    ) -> bool {
        let Ok(accent) = name.parse::<Accent>() else {
            debug!(value = name, "ignoring unknown accent");
            return false;
        };
        if surface.accent_attr().as_deref() == Some(accent.as_str()) {
            return false;
        }
        surface.set_accent_attr(accent);
        surface.sync_accent_buttons(accent);
        persist(store, &self.config.accent_key, accent.as_str());
        debug!(%accent, "accent applied");
        self.run_fade(surface);
        true
    }

    /// The frame requested for phase two arrived.
    pub fn on_fade_frame<S: ThemeSurface>(&mut self, surface: &mut S, generation: u64) {
        if generation != self.generation || self.fade != FadeState::AwaitingFrame {
            return;
        }
        surface.set_fade_phase(Some(FadePhase::Run));
        self.fade = FadeState::Running;
        self.effects.push(ThemeEffect::ArmFadeTimer {
            delay: self.config.fade(),
            generation,
        });
    }

    /// The fade timer fired.
    pub fn on_fade_timer<S: ThemeSurface>(&mut self, surface: &mut S, generation: u64) {
        if generation != self.generation || self.fade != FadeState::Running {
            return;
        }
        surface.set_fade_phase(None);
        self.fade = FadeState::Idle;
    }

    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.fade != FadeState::Idle
    }

    pub fn drain_effects(&mut self) -> Vec<ThemeEffect> {
        std::mem::take(&mut self.effects)
    }

    fn run_fade<S: ThemeSurface>(&mut self, surface: &mut S) {
        if surface.prefers_reduced_motion() {
            return;
        }
        // A newer generation invalidates the previous frame and timer.
        self.generation = self.generation.wrapping_add(1);
        surface.set_fade_phase(Some(FadePhase::Start));
        self.fade = FadeState::AwaitingFrame;
        self.effects.push(ThemeEffect::RequestFrame {
            generation: self.generation,
        });
    }
}

fn persist<P: PreferenceStore>(store: &mut P, key: &str, value: &str) {
    if let Err(err) = store.set(key, value) {
        warn!(key, error = %err, "preference not persisted");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
