#![forbid(unsafe_code)]

//! Back-to-top button visibility.

use crate::config::BackToTopConfig;

/// Button id.
pub const BUTTON_ID: &str = "back-to-top-btn";

pub trait BackToTopSurface {
    fn scroll_y(&self) -> f64;
    fn set_hidden(&mut self, hidden: bool);
    /// Smooth-scroll the window to the top.
    fn scroll_to_top(&mut self);
}

/// Tracks the button's `hidden` state and writes only on change.
#[derive(Debug, Clone)]
pub struct BackToTop {
    threshold: f64,
    hidden: Option<bool>,
}

impl BackToTop {
    #[must_use]
    pub fn new(config: &BackToTopConfig) -> Self {
        Self {
            threshold: config.threshold_px,
            hidden: None,
        }
    }

    /// Last written `hidden` state, `None` before the first update.
    #[must_use]
    pub const fn hidden(&self) -> Option<bool> {
        self.hidden
    }

    /// Re-evaluate visibility. Called at init and on every scroll.
    pub fn update<S: BackToTopSurface>(&mut self, surface: &mut S) {
        let hidden = surface.scroll_y() <= self.threshold;
        if self.hidden != Some(hidden) {
            self.hidden = Some(hidden);
            surface.set_hidden(hidden);
        }
    }

    pub fn on_click<S: BackToTopSurface>(&self, surface: &mut S) {
        surface.scroll_to_top();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeWindow {
        scroll_y: f64,
        writes: Vec<bool>,
        scrolled_to_top: bool,
    }

    impl BackToTopSurface for FakeWindow {
        fn scroll_y(&self) -> f64 {
            self.scroll_y
        }
        fn set_hidden(&mut self, hidden: bool) {
            self.writes.push(hidden);
        }
        fn scroll_to_top(&mut self) {
            self.scrolled_to_top = true;
        }
    }

    #[test]
    fn hidden_at_threshold_shown_past_it() {
        let mut window = FakeWindow::default();
        let mut button = BackToTop::new(&BackToTopConfig::default());

        window.scroll_y = 50.0;
        button.update(&mut window);
        assert_eq!(button.hidden(), Some(true));

        window.scroll_y = 50.5;
        button.update(&mut window);
        assert_eq!(button.hidden(), Some(false));
        assert_eq!(window.writes, vec![true, false]);
    }

    #[test]
    fn unchanged_state_is_not_rewritten() {
        let mut window = FakeWindow::default();
        let mut button = BackToTop::new(&BackToTopConfig::default());
        for y in [400.0, 600.0, 900.0] {
            window.scroll_y = y;
            button.update(&mut window);
        }
        assert_eq!(window.writes, vec![false]);
    }

    #[test]
    fn click_scrolls_to_top() {
        let mut window = FakeWindow::default();
        BackToTop::new(&BackToTopConfig::default()).on_click(&mut window);
        assert!(window.scrolled_to_top);
    }
}
