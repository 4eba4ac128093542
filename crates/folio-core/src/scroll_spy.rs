#![forbid(unsafe_code)]

//! Scroll-driven active navigation link tracking.
//!
//! [`ActiveNavTracker`] decides which navigation link corresponds to the
//! section currently under the fixed header and marks exactly that link
//! with `aria-current="page"`.
//!
//! # Design
//!
//! - Links are resolved once at build time ([`ActiveNavTracker::build`]).
//!   Anchors whose fragment does not name a section on the page are dropped.
//!   Sections are ordered by their initial `offsetTop`; inference reads live
//!   offsets in that order.
//! - Explicit navigation (a link click, a hash change, the initial URL hash)
//!   installs a [`PendingTarget`]. While it is live, scroll inference is
//!   suppressed so a smooth-scroll animation that starts above the target
//!   does not flash the links it passes over. The lease ends when the target
//!   reaches the header, when the settle check after scrolling stops sees it
//!   there, or when it expires.
//! - Inference passes are coalesced to one per animation frame. The tracker
//!   never touches host timers itself: it emits [`NavEffect`]s that the host
//!   drains and turns into `requestAnimationFrame`/`setTimeout` calls, then
//!   delivers back through [`ActiveNavTracker::on_animation_frame`] and
//!   [`ActiveNavTracker::on_settle_timer`].
//!
//! ```
//! use core::time::Duration;
//! use folio_core::config::NavConfig;
//! use folio_core::href::PageLocation;
//! use folio_core::scroll_spy::{ActiveNavTracker, NavEffect, NavLink, NavSurface};
//!
//! struct Page { scroll_y: f64, current: Option<String> }
//!
//! impl NavSurface for Page {
//!     fn scroll_y(&self) -> f64 { self.scroll_y }
//!     fn header_offset_var(&self) -> Option<String> { Some("80px".into()) }
//!     fn section_offset_top(&self, id: &str) -> Option<f64> {
//!         match id { "intro" => Some(0.0), "work" => Some(800.0), _ => None }
//!     }
//!     fn section_viewport_top(&self, id: &str) -> Option<f64> {
//!         self.section_offset_top(id).map(|top| top - self.scroll_y)
//!     }
//!     fn set_link_current(&mut self, link: &NavLink, current: bool) {
//!         if current { self.current = Some(link.id.clone()); }
//!     }
//!     fn refresh_header_offset(&mut self) {}
//! }
//!
//! let location = PageLocation::parse("https://example.com/").unwrap();
//! let mut page = Page { scroll_y: 0.0, current: None };
//! let mut tracker = ActiveNavTracker::build(
//!     ["#intro", "#work"].map(Some),
//!     &location,
//!     &page,
//!     NavConfig::default(),
//! );
//! tracker.start(&mut page, None, Duration::ZERO);
//! assert_eq!(page.current.as_deref(), Some("intro"));
//!
//! page.scroll_y = 750.0;
//! tracker.on_scroll();
//! assert_eq!(tracker.drain_effects(), vec![NavEffect::RequestFrame]);
//! tracker.on_animation_frame(&mut page, Duration::from_millis(32));
//! assert_eq!(page.current.as_deref(), Some("work"));
//! ```

use core::time::Duration;
use std::collections::HashMap;

use tracing::{debug, trace};

use crate::config::NavConfig;
use crate::header::parse_header_offset;
use crate::href::{PageLocation, decode_fragment};

// ---------------------------------------------------------------------------
// Page access
// ---------------------------------------------------------------------------

/// Read access to page geometry and write access to link markers.
///
/// All lengths are CSS pixels.
pub trait NavSurface {
    /// Current vertical scroll of the window (`scrollY`).
    fn scroll_y(&self) -> f64;

    /// Raw value of the `--header-offset` custom property, if set.
    fn header_offset_var(&self) -> Option<String>;

    /// Document-relative top of the section with this id (`offsetTop`).
    fn section_offset_top(&self, id: &str) -> Option<f64>;

    /// Viewport-relative top of the section with this id
    /// (`getBoundingClientRect().top`).
    fn section_viewport_top(&self, id: &str) -> Option<f64>;

    /// Set or clear `aria-current="page"` on a tracked link.
    fn set_link_current(&mut self, link: &NavLink, current: bool);

    /// Re-measure the header and republish the `--header-offset` variable.
    fn refresh_header_offset(&mut self);
}

/// A navigation anchor tracked against a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    /// Decoded id of the target section.
    pub id: String,
    /// Position of the anchor in the sequence passed to
    /// [`ActiveNavTracker::build`].
    pub anchor: usize,
}

// ---------------------------------------------------------------------------
// Pending target lease
// ---------------------------------------------------------------------------

/// Navigation-triggered override of scroll inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingTarget {
    /// Scroll position decides.
    #[default]
    Idle,
    /// `link` stays active until its section reaches the header or the
    /// lease expires.
    Pending {
        /// Index into [`ActiveNavTracker::links`].
        link: usize,
        /// Monotonic time after which the lease no longer applies.
        expires_at: Duration,
    },
}

impl PendingTarget {
    /// Link held by a lease that has not expired at `now`.
    #[must_use]
    pub fn live_at(self, now: Duration) -> Option<usize> {
        match self {
            Self::Pending { link, expires_at } if now < expires_at => Some(link),
            _ => None,
        }
    }

    /// Link held by any lease, expired or not.
    #[must_use]
    pub fn link(self) -> Option<usize> {
        match self {
            Self::Pending { link, .. } => Some(link),
            Self::Idle => None,
        }
    }

    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// Scheduling request for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEffect {
    /// Call [`ActiveNavTracker::on_animation_frame`] on the next frame.
    /// Emitted at most once until that frame is delivered.
    RequestFrame,
    /// Cancel any previous settle timer and call
    /// [`ActiveNavTracker::on_settle_timer`] with `token` after `delay`.
    ArmSettleTimer { delay: Duration, token: u64 },
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Active navigation link tracker for one page.
#[derive(Debug, Clone)]
pub struct ActiveNavTracker {
    config: NavConfig,
    links: Vec<NavLink>,
    by_id: HashMap<String, usize>,
    /// Link indexes in ascending initial section offset.
    sections: Vec<usize>,
    pending: PendingTarget,
    active: Option<usize>,
    frame_requested: bool,
    settle_token: u64,
    effects: Vec<NavEffect>,
}

impl ActiveNavTracker {
    /// Resolve navigation anchors against the page.
    ///
    /// `hrefs` are the anchors' `href` attributes in document order. Anchors
    /// that are not same-page hash links, or whose target section does not
    /// exist, are skipped. When several anchors name the same section the
    /// last one is tracked.
    pub fn build<'a, I>(
        hrefs: I,
        location: &PageLocation,
        surface: &impl NavSurface,
        config: NavConfig,
    ) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut links: Vec<NavLink> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();
        let mut skipped = 0usize;

        for (anchor, href) in hrefs.into_iter().enumerate() {
            let Some(id) = location.hash_target(href) else {
                skipped += 1;
                continue;
            };
            if surface.section_offset_top(&id).is_none() {
                skipped += 1;
                continue;
            }
            match by_id.get(&id) {
                Some(&idx) => links[idx].anchor = anchor,
                None => {
                    by_id.insert(id.clone(), links.len());
                    links.push(NavLink { id, anchor });
                }
            }
        }

        let mut sections: Vec<(usize, f64)> = links
            .iter()
            .enumerate()
            .map(|(idx, link)| {
                let top = surface.section_offset_top(&link.id).unwrap_or(0.0);
                (idx, top)
            })
            .collect();
        sections.sort_by(|a, b| a.1.total_cmp(&b.1));

        debug!(
            tracked = links.len(),
            skipped, "active nav tracker built"
        );

        Self {
            config,
            links,
            by_id,
            sections: sections.into_iter().map(|(idx, _)| idx).collect(),
            pending: PendingTarget::Idle,
            active: None,
            frame_requested: false,
            settle_token: 0,
            effects: Vec::new(),
        }
    }

    /// Tracked links, in first-seen order.
    #[must_use]
    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    /// Section ids in ascending initial offset.
    pub fn section_order(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections.iter().map(|&idx| self.links[idx].id.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Index of the link with this (decoded) id.
    #[must_use]
    pub fn link_index(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Id of the link currently marked active.
    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.active.map(|idx| self.links[idx].id.as_str())
    }

    #[must_use]
    pub const fn pending(&self) -> PendingTarget {
        self.pending
    }

    #[must_use]
    pub const fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    /// Take the scheduling requests accumulated since the last drain.
    pub fn drain_effects(&mut self) -> Vec<NavEffect> {
        std::mem::take(&mut self.effects)
    }

    // -- entry points -------------------------------------------------------

    /// Initial pass on page load.
    ///
    /// `initial_hash` is the page's decoded fragment. A fragment naming a
    /// tracked section becomes the pending target; otherwise inference runs
    /// immediately.
    pub fn start<S: NavSurface>(&mut self, surface: &mut S, initial_hash: Option<&str>, now: Duration) {
        match initial_hash.and_then(|id| self.link_index(id)) {
            Some(link) => self.set_pending(surface, link, now),
            None => self.pick_by_scroll_position(surface, now),
        }
    }

    /// A tracked link was clicked.
    pub fn on_link_click<S: NavSurface>(&mut self, surface: &mut S, link: usize, now: Duration) {
        if link < self.links.len() {
            self.set_pending(surface, link, now);
        }
    }

    /// The location hash changed. `hash` may include the leading `#`.
    ///
    /// A fragment naming a tracked section becomes the pending target.
    /// Anything else leaves the active link alone and schedules a plain
    /// inference pass.
    pub fn on_hash_change<S: NavSurface>(&mut self, surface: &mut S, hash: &str, now: Duration) {
        let raw = hash.strip_prefix('#').unwrap_or(hash);
        let link = (!raw.is_empty())
            .then(|| decode_fragment(raw))
            .flatten()
            .and_then(|id| self.link_index(&id));
        match link {
            Some(link) => self.set_pending(surface, link, now),
            None => self.schedule_pick(),
        }
    }

    /// The window scrolled.
    ///
    /// Schedules inference and, while a target is pending, re-arms the
    /// settle check so it fires once scrolling goes quiet.
    pub fn on_scroll(&mut self) {
        self.schedule_pick();
        if self.pending.is_pending() {
            self.settle_token = self.settle_token.wrapping_add(1);
            self.effects.push(NavEffect::ArmSettleTimer {
                delay: self.config.settle_delay(),
                token: self.settle_token,
            });
        }
    }

    /// The window resized: header height may have changed.
    pub fn on_resize<S: NavSurface>(&mut self, surface: &mut S) {
        if self.is_empty() {
            return;
        }
        surface.refresh_header_offset();
        self.schedule_pick();
    }

    /// Custom fonts finished loading: section offsets may have shifted.
    pub fn on_fonts_ready<S: NavSurface>(&mut self, surface: &mut S) {
        if self.is_empty() {
            return;
        }
        surface.refresh_header_offset();
        self.schedule_pick();
    }

    /// The frame requested by [`NavEffect::RequestFrame`] arrived.
    pub fn on_animation_frame<S: NavSurface>(&mut self, surface: &mut S, now: Duration) {
        if !self.frame_requested {
            return;
        }
        self.frame_requested = false;
        self.pick_by_scroll_position(surface, now);
    }

    /// The settle timer armed by [`NavEffect::ArmSettleTimer`] fired.
    ///
    /// Stale tokens (superseded by a later scroll) are ignored.
    pub fn on_settle_timer<S: NavSurface>(&mut self, surface: &mut S, token: u64) {
        if token != self.settle_token {
            return;
        }
        if self.pending.is_pending() {
            let header = self.header_offset(surface);
            if self.is_pending_target_reached(surface, header) {
                if let Some(link) = self.pending.link() {
                    debug!(target_id = %self.links[link].id, "pending nav target settled");
                }
                self.pending = PendingTarget::Idle;
            }
        }
        self.schedule_pick();
    }

    // -- core operations ----------------------------------------------------

    /// Request a navigation-driven active link.
    ///
    /// Replaces any previous lease, marks the link active right away and
    /// schedules an inference pass to confirm it.
    pub fn set_pending<S: NavSurface>(&mut self, surface: &mut S, link: usize, now: Duration) {
        if link >= self.links.len() {
            return;
        }
        self.pending = PendingTarget::Pending {
            link,
            expires_at: now.saturating_add(self.config.pending_timeout()),
        };
        debug!(target_id = %self.links[link].id, "nav target pending");
        surface.refresh_header_offset();
        self.set_active(surface, link);
        self.schedule_pick();
    }

    /// Mark the link for the section under the header active.
    pub fn pick_by_scroll_position<S: NavSurface>(&mut self, surface: &mut S, now: Duration) {
        if self.is_empty() {
            self.pending = PendingTarget::Idle;
            return;
        }

        let header = self.header_offset(surface);
        let scroll_y = surface.scroll_y();
        let cursor = scroll_y + header + self.config.cursor_epsilon_px;

        if let Some(link) = self.pending.live_at(now) {
            if !self.is_pending_target_reached(surface, header) {
                trace!(target_id = %self.links[link].id, "inference suppressed by pending target");
                self.set_active(surface, link);
                return;
            }
            debug!(target_id = %self.links[link].id, "pending nav target reached");
        } else if let Some(link) = self.pending.link() {
            debug!(target_id = %self.links[link].id, "pending nav target expired");
        }
        self.pending = PendingTarget::Idle;

        let mut current = self.sections[0];
        for &idx in &self.sections {
            match surface.section_offset_top(&self.links[idx].id) {
                Some(top) if top <= cursor => current = idx,
                _ => break,
            }
        }
        trace!(
            scroll_y,
            header_offset = header,
            cursor,
            section = %self.links[current].id,
            "scroll inference"
        );
        self.set_active(surface, current);
    }

    // -- internals ----------------------------------------------------------

    fn header_offset(&self, surface: &impl NavSurface) -> f64 {
        surface
            .header_offset_var()
            .map_or(0, |raw| parse_header_offset(&raw))
            .into()
    }

    fn is_pending_target_reached(&self, surface: &impl NavSurface, header: f64) -> bool {
        let Some(link) = self.pending.link() else {
            return true;
        };
        match surface.section_viewport_top(&self.links[link].id) {
            Some(top) => top <= header + self.config.reach_tolerance_px,
            None => true,
        }
    }

    fn schedule_pick(&mut self) {
        if self.frame_requested || self.is_empty() {
            return;
        }
        self.frame_requested = true;
        self.effects.push(NavEffect::RequestFrame);
    }

    fn set_active<S: NavSurface>(&mut self, surface: &mut S, active: usize) {
        if self.active != Some(active) {
            debug!(active = %self.links[active].id, "active nav link changed");
        }
        self.active = Some(active);
        for (idx, link) in self.links.iter().enumerate() {
            surface.set_link_current(link, idx == active);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Page fake: sections at fixed document offsets, a scroll position, and
    /// the `aria-current` state of each anchor.
    struct FakePage {
        scroll_y: f64,
        header: Option<String>,
        sections: Vec<(&'static str, f64)>,
        current: HashMap<usize, bool>,
        header_refreshes: usize,
    }

    impl FakePage {
        fn new(sections: &[(&'static str, f64)]) -> Self {
            Self {
                scroll_y: 0.0,
                header: Some("80px".into()),
                sections: sections.to_vec(),
                current: HashMap::new(),
                header_refreshes: 0,
            }
        }

        fn current_anchors(&self) -> Vec<usize> {
            let mut v: Vec<usize> = self
                .current
                .iter()
                .filter(|(_, on)| **on)
                .map(|(a, _)| *a)
                .collect();
            v.sort_unstable();
            v
        }
    }

    impl NavSurface for FakePage {
        fn scroll_y(&self) -> f64 {
            self.scroll_y
        }
        fn header_offset_var(&self) -> Option<String> {
            self.header.clone()
        }
        fn section_offset_top(&self, id: &str) -> Option<f64> {
            self.sections.iter().find(|(s, _)| *s == id).map(|(_, t)| *t)
        }
        fn section_viewport_top(&self, id: &str) -> Option<f64> {
            self.section_offset_top(id).map(|t| t - self.scroll_y)
        }
        fn set_link_current(&mut self, link: &NavLink, current: bool) {
            self.current.insert(link.anchor, current);
        }
        fn refresh_header_offset(&mut self) {
            self.header_refreshes += 1;
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn home() -> PageLocation {
        PageLocation::parse("https://example.com/").unwrap()
    }

    fn three_sections() -> (FakePage, ActiveNavTracker) {
        let page = FakePage::new(&[("intro", 0.0), ("work", 800.0), ("contact", 1600.0)]);
        let tracker = ActiveNavTracker::build(
            ["#intro", "#work", "#contact"].map(Some),
            &home(),
            &page,
            NavConfig::default(),
        );
        (page, tracker)
    }

    fn run_frame(tracker: &mut ActiveNavTracker, page: &mut FakePage, now: Duration) {
        tracker.drain_effects();
        tracker.on_animation_frame(page, now);
    }

    // -- build --

    #[test]
    fn build_drops_unresolvable_anchors() {
        let page = FakePage::new(&[("intro", 0.0), ("work", 800.0)]);
        let tracker = ActiveNavTracker::build(
            [
                Some("#intro"),
                Some("#missing"),
                None,
                Some("./blog.html"),
                Some("#work"),
            ],
            &home(),
            &page,
            NavConfig::default(),
        );
        let ids: Vec<&str> = tracker.links().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "work"]);
        assert_eq!(tracker.links()[1].anchor, 4);
    }

    #[test]
    fn build_orders_sections_by_offset() {
        let page = FakePage::new(&[("a", 900.0), ("b", 10.0), ("c", 400.0)]);
        let tracker = ActiveNavTracker::build(
            ["#a", "#b", "#c"].map(Some),
            &home(),
            &page,
            NavConfig::default(),
        );
        let order: Vec<&str> = tracker.section_order().collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn duplicate_anchors_track_the_last() {
        let page = FakePage::new(&[("intro", 0.0)]);
        let tracker = ActiveNavTracker::build(
            ["#intro", "./index.html#intro"].map(Some),
            &home(),
            &page,
            NavConfig::default(),
        );
        assert_eq!(tracker.links().len(), 1);
        assert_eq!(tracker.links()[0].anchor, 1);
    }

    // -- inference --

    #[test]
    fn initial_pass_without_hash_picks_first_section() {
        let (mut page, mut tracker) = three_sections();
        tracker.start(&mut page, None, Duration::ZERO);
        assert_eq!(tracker.active_id(), Some("intro"));
        assert_eq!(page.current_anchors(), vec![0]);
    }

    #[test]
    fn cursor_includes_header_and_epsilon() {
        let (mut page, mut tracker) = three_sections();
        page.scroll_y = 750.0; // 750 + 80 + 1 = 831 >= 800
        tracker.pick_by_scroll_position(&mut page, Duration::ZERO);
        assert_eq!(tracker.active_id(), Some("work"));
        assert_eq!(page.current_anchors(), vec![1]);
    }

    #[test]
    fn section_just_below_cursor_is_not_active() {
        let (mut page, mut tracker) = three_sections();
        page.scroll_y = 718.0; // 718 + 80 + 1 = 799 < 800
        tracker.pick_by_scroll_position(&mut page, Duration::ZERO);
        assert_eq!(tracker.active_id(), Some("intro"));
    }

    #[test]
    fn unparsable_header_counts_as_zero() {
        let (mut page, mut tracker) = three_sections();
        page.header = Some("auto".into());
        page.scroll_y = 798.0; // 798 + 0 + 1 = 799
        tracker.pick_by_scroll_position(&mut page, Duration::ZERO);
        assert_eq!(tracker.active_id(), Some("intro"));
        page.scroll_y = 799.0;
        tracker.pick_by_scroll_position(&mut page, Duration::ZERO);
        assert_eq!(tracker.active_id(), Some("work"));
    }

    #[test]
    fn inference_uses_live_offsets() {
        let (mut page, mut tracker) = three_sections();
        page.scroll_y = 900.0;
        tracker.pick_by_scroll_position(&mut page, Duration::ZERO);
        assert_eq!(tracker.active_id(), Some("work"));
        // Late font load pushes "work" down below the cursor.
        page.sections[1].1 = 1200.0;
        tracker.pick_by_scroll_position(&mut page, Duration::ZERO);
        assert_eq!(tracker.active_id(), Some("intro"));
    }

    // -- scheduling --

    #[test]
    fn scrolls_coalesce_into_one_frame() {
        let (mut page, mut tracker) = three_sections();
        tracker.start(&mut page, None, Duration::ZERO);
        tracker.on_scroll();
        tracker.on_scroll();
        tracker.on_scroll();
        assert_eq!(tracker.drain_effects(), vec![NavEffect::RequestFrame]);
        assert!(tracker.frame_requested());

        tracker.on_animation_frame(&mut page, ms(16));
        assert!(!tracker.frame_requested());
        tracker.on_scroll();
        assert_eq!(tracker.drain_effects(), vec![NavEffect::RequestFrame]);
    }

    #[test]
    fn unrequested_frame_is_ignored() {
        let (mut page, mut tracker) = three_sections();
        page.scroll_y = 900.0;
        tracker.on_animation_frame(&mut page, ms(16));
        assert_eq!(tracker.active_id(), None);
    }

    #[test]
    fn scroll_without_pending_does_not_arm_settle_timer() {
        let (mut page, mut tracker) = three_sections();
        tracker.start(&mut page, None, Duration::ZERO);
        tracker.on_scroll();
        assert!(
            tracker
                .drain_effects()
                .iter()
                .all(|e| matches!(e, NavEffect::RequestFrame))
        );
    }

    #[test]
    fn resize_refreshes_header_then_schedules() {
        let (mut page, mut tracker) = three_sections();
        tracker.on_resize(&mut page);
        assert_eq!(page.header_refreshes, 1);
        assert_eq!(tracker.drain_effects(), vec![NavEffect::RequestFrame]);
    }

    #[test]
    fn fonts_ready_triggers_fresh_pass_without_scroll() {
        let (mut page, mut tracker) = three_sections();
        page.scroll_y = 900.0;
        tracker.start(&mut page, None, Duration::ZERO);
        assert_eq!(tracker.active_id(), Some("work"));

        page.sections[1].1 = 1000.0;
        tracker.on_fonts_ready(&mut page);
        assert_eq!(page.header_refreshes, 1);
        run_frame(&mut tracker, &mut page, ms(16));
        assert_eq!(tracker.active_id(), Some("intro"));
    }

    // -- pending target --

    #[test]
    fn click_marks_link_immediately() {
        let (mut page, mut tracker) = three_sections();
        tracker.start(&mut page, None, Duration::ZERO);
        tracker.on_link_click(&mut page, 2, ms(10));
        assert_eq!(tracker.active_id(), Some("contact"));
        assert_eq!(page.current_anchors(), vec![2]);
        assert_eq!(page.header_refreshes, 1);
        assert!(matches!(
            tracker.pending(),
            PendingTarget::Pending { link: 2, expires_at } if expires_at == ms(4010)
        ));
    }

    #[test]
    fn pending_suppresses_inference_during_animation() {
        let (mut page, mut tracker) = three_sections();
        tracker.start(&mut page, None, Duration::ZERO);
        tracker.on_link_click(&mut page, 2, ms(0));

        // Smooth scroll passes over "work".
        page.scroll_y = 900.0;
        tracker.on_scroll();
        run_frame(&mut tracker, &mut page, ms(116));
        assert_eq!(tracker.active_id(), Some("contact"));
        assert_eq!(page.current_anchors(), vec![2]);
    }

    #[test]
    fn pending_clears_on_arrival_within_tolerance() {
        let (mut page, mut tracker) = three_sections();
        tracker.on_link_click(&mut page, 1, ms(0));
        // viewport top = 800 - 718 = 82 <= 80 + 2
        page.scroll_y = 718.0;
        run_frame(&mut tracker, &mut page, ms(16));
        assert_eq!(tracker.pending(), PendingTarget::Idle);
        // Inference: 718 + 81 = 799 < 800, so plain inference lands on intro.
        assert_eq!(tracker.active_id(), Some("intro"));
    }

    #[test]
    fn pending_holds_just_outside_tolerance() {
        let (mut page, mut tracker) = three_sections();
        tracker.on_link_click(&mut page, 1, ms(0));
        page.scroll_y = 717.0; // viewport top 83 > 82
        run_frame(&mut tracker, &mut page, ms(16));
        assert!(tracker.pending().is_pending());
        assert_eq!(tracker.active_id(), Some("work"));
    }

    #[test]
    fn pending_expires_after_timeout() {
        let (mut page, mut tracker) = three_sections();
        tracker.on_link_click(&mut page, 2, ms(0));
        page.scroll_y = 900.0;
        tracker.pick_by_scroll_position(&mut page, ms(3999));
        assert_eq!(tracker.active_id(), Some("contact"));
        tracker.pick_by_scroll_position(&mut page, ms(4000));
        assert_eq!(tracker.pending(), PendingTarget::Idle);
        assert_eq!(tracker.active_id(), Some("work"));
    }

    #[test]
    fn settle_timer_clears_reached_target() {
        let (mut page, mut tracker) = three_sections();
        tracker.on_link_click(&mut page, 1, ms(0));
        tracker.drain_effects();

        page.scroll_y = 720.0;
        tracker.on_scroll();
        let effects = tracker.drain_effects();
        let token = effects
            .iter()
            .find_map(|e| match e {
                NavEffect::ArmSettleTimer { delay, token } => {
                    assert_eq!(*delay, ms(140));
                    Some(*token)
                }
                NavEffect::RequestFrame => None,
            })
            .expect("settle timer armed");

        tracker.on_animation_frame(&mut page, ms(60));
        tracker.on_settle_timer(&mut page, token);
        assert_eq!(tracker.pending(), PendingTarget::Idle);
    }

    #[test]
    fn stale_settle_timer_is_ignored() {
        let (mut page, mut tracker) = three_sections();
        tracker.on_link_click(&mut page, 1, ms(0));
        page.scroll_y = 720.0;
        tracker.on_scroll();
        tracker.on_scroll();
        let tokens: Vec<u64> = tracker
            .drain_effects()
            .into_iter()
            .filter_map(|e| match e {
                NavEffect::ArmSettleTimer { token, .. } => Some(token),
                NavEffect::RequestFrame => None,
            })
            .collect();
        assert_eq!(tokens.len(), 2);

        tracker.on_settle_timer(&mut page, tokens[0]);
        assert!(tracker.pending().is_pending());
        tracker.on_settle_timer(&mut page, tokens[1]);
        assert_eq!(tracker.pending(), PendingTarget::Idle);
    }

    #[test]
    fn settle_timer_keeps_unreached_target() {
        let (mut page, mut tracker) = three_sections();
        tracker.on_link_click(&mut page, 2, ms(0));
        page.scroll_y = 300.0;
        tracker.on_scroll();
        let token = tracker
            .drain_effects()
            .into_iter()
            .find_map(|e| match e {
                NavEffect::ArmSettleTimer { token, .. } => Some(token),
                NavEffect::RequestFrame => None,
            })
            .unwrap();
        tracker.on_settle_timer(&mut page, token);
        assert!(tracker.pending().is_pending());
    }

    #[test]
    fn new_request_supersedes_old() {
        let (mut page, mut tracker) = three_sections();
        tracker.on_link_click(&mut page, 2, ms(0));
        tracker.on_link_click(&mut page, 1, ms(500));
        assert_eq!(
            tracker.pending(),
            PendingTarget::Pending {
                link: 1,
                expires_at: ms(4500)
            }
        );
        assert_eq!(page.current_anchors(), vec![1]);
    }

    #[test]
    fn initial_hash_becomes_pending() {
        let (mut page, mut tracker) = three_sections();
        tracker.start(&mut page, Some("contact"), Duration::ZERO);
        assert_eq!(tracker.active_id(), Some("contact"));
        assert!(tracker.pending().is_pending());
        assert_eq!(tracker.drain_effects(), vec![NavEffect::RequestFrame]);
    }

    #[test]
    fn unknown_initial_hash_runs_inference() {
        let (mut page, mut tracker) = three_sections();
        page.scroll_y = 1700.0;
        tracker.start(&mut page, Some("nowhere"), Duration::ZERO);
        assert_eq!(tracker.active_id(), Some("contact"));
        assert_eq!(tracker.pending(), PendingTarget::Idle);
    }

    #[test]
    fn known_hash_change_sets_pending() {
        let (mut page, mut tracker) = three_sections();
        tracker.start(&mut page, None, Duration::ZERO);
        tracker.on_hash_change(&mut page, "#work", ms(5));
        assert_eq!(tracker.active_id(), Some("work"));
        assert!(tracker.pending().is_pending());
    }

    #[test]
    fn unknown_hash_change_leaves_active_and_schedules() {
        let (mut page, mut tracker) = three_sections();
        tracker.start(&mut page, None, Duration::ZERO);
        tracker.drain_effects();
        tracker.on_hash_change(&mut page, "#elsewhere", ms(5));
        assert_eq!(tracker.active_id(), Some("intro"));
        assert_eq!(tracker.pending(), PendingTarget::Idle);
        assert_eq!(tracker.drain_effects(), vec![NavEffect::RequestFrame]);
        assert_eq!(page.header_refreshes, 0);
    }

    #[test]
    fn hash_change_decodes_fragment() {
        let mut page = FakePage::new(&[("work history", 0.0)]);
        let mut tracker = ActiveNavTracker::build(
            [Some("#work%20history")],
            &home(),
            &page,
            NavConfig::default(),
        );
        tracker.on_hash_change(&mut page, "#work%20history", ms(0));
        assert_eq!(tracker.active_id(), Some("work history"));
    }

    #[test]
    fn vanished_pending_section_counts_as_reached() {
        let (mut page, mut tracker) = three_sections();
        tracker.on_link_click(&mut page, 2, ms(0));
        page.sections.retain(|(id, _)| *id != "contact");
        tracker.pick_by_scroll_position(&mut page, ms(16));
        assert_eq!(tracker.pending(), PendingTarget::Idle);
        assert_eq!(tracker.active_id(), Some("intro"));
    }

    // -- empty set --

    #[test]
    fn empty_tracker_is_inert() {
        let mut page = FakePage::new(&[]);
        let mut tracker = ActiveNavTracker::build(
            ["#intro", "#work"].map(Some),
            &home(),
            &page,
            NavConfig::default(),
        );
        assert!(tracker.is_empty());
        tracker.start(&mut page, Some("intro"), Duration::ZERO);
        tracker.on_scroll();
        tracker.on_resize(&mut page);
        tracker.on_fonts_ready(&mut page);
        tracker.on_hash_change(&mut page, "#intro", ms(2));
        tracker.on_link_click(&mut page, 0, ms(3));
        tracker.on_animation_frame(&mut page, ms(4));
        tracker.on_settle_timer(&mut page, 0);
        assert!(tracker.drain_effects().is_empty());
        assert_eq!(tracker.active_id(), None);
        assert!(page.current.is_empty());
        assert_eq!(page.header_refreshes, 0);
    }

    #[test]
    fn out_of_range_click_is_ignored() {
        let (mut page, mut tracker) = three_sections();
        tracker.on_link_click(&mut page, 99, ms(0));
        assert_eq!(tracker.pending(), PendingTarget::Idle);
        assert_eq!(tracker.active_id(), None);
    }

    // -- pending lease --

    #[test]
    fn lease_is_live_until_expiry() {
        let lease = PendingTarget::Pending {
            link: 3,
            expires_at: ms(100),
        };
        assert_eq!(lease.live_at(ms(99)), Some(3));
        assert_eq!(lease.live_at(ms(100)), None);
        assert_eq!(lease.link(), Some(3));
        assert_eq!(PendingTarget::Idle.live_at(ms(0)), None);
    }
}
