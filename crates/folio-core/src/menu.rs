#![forbid(unsafe_code)]

//! Mobile slide-out menu.

use core::time::Duration;

use tracing::debug;

use crate::config::MenuConfig;
use crate::href::{PageLocation, decode_fragment};

/// Menu button, overlay and menu links.
pub trait MenuSurface {
    /// Reflect the open state: `aria-expanded` on the button, `aria-hidden`
    /// on the overlay, and `overflow: hidden` on the body while open.
    fn render_open(&mut self, open: bool);

    /// `href` of the desktop nav link currently marked `aria-current`.
    fn current_nav_href(&self) -> Option<String>;

    /// `href` of each menu link, in document order.
    fn menu_link_hrefs(&self) -> Vec<Option<String>>;

    /// Add or remove the `active` class on a menu link.
    fn set_menu_link_active(&mut self, index: usize, active: bool);

    /// Whether a section with this id exists.
    fn has_section(&self, id: &str) -> bool;
}

/// What to do with a menu link click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuLinkAction {
    /// Not a same-page hash; let the browser navigate.
    Navigate,
    /// Default prevented and menu closed; the target section is missing.
    Closed,
    /// Default prevented and menu closed; after `delay`, smooth-scroll
    /// `target_id` into view and push `hash` onto history.
    ScrollTo {
        target_id: String,
        hash: String,
        delay: Duration,
    },
}

#[derive(Debug, Clone)]
pub struct MobileMenu {
    config: MenuConfig,
    open: bool,
}

impl MobileMenu {
    #[must_use]
    pub fn new(config: MenuConfig) -> Self {
        Self {
            config,
            open: false,
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub fn open<S: MenuSurface>(&mut self, surface: &mut S) {
        self.open = true;
        surface.render_open(true);
        self.sync_active_link(surface);
        debug!("mobile menu opened");
    }

    pub fn close<S: MenuSurface>(&mut self, surface: &mut S) {
        self.open = false;
        surface.render_open(false);
        debug!("mobile menu closed");
    }

    /// Menu button click.
    pub fn toggle<S: MenuSurface>(&mut self, surface: &mut S) {
        if self.open {
            self.close(surface);
        } else {
            self.open(surface);
        }
    }

    /// Click on the overlay. Only a click on the backdrop itself closes.
    pub fn on_overlay_click<S: MenuSurface>(&mut self, surface: &mut S, on_backdrop: bool) {
        if on_backdrop {
            self.close(surface);
        }
    }

    /// Document keydown. `Escape` closes an open menu.
    pub fn on_key<S: MenuSurface>(&mut self, surface: &mut S, key: &str) {
        if key == "Escape" && self.open {
            self.close(surface);
        }
    }

    /// Window scroll. Keeps the active marker current while open.
    pub fn on_scroll<S: MenuSurface>(&mut self, surface: &mut S) {
        if self.open {
            self.sync_active_link(surface);
        }
    }

    /// Click on a menu link with `href`.
    pub fn on_link_click<S: MenuSurface>(
        &mut self,
        surface: &mut S,
        location: &PageLocation,
        href: Option<&str>,
    ) -> MenuLinkAction {
        let Some(hash) = location.same_page_hash(href) else {
            return MenuLinkAction::Navigate;
        };
        self.close(surface);

        match decode_fragment(&hash[1..]).filter(|id| surface.has_section(id)) {
            Some(target_id) => MenuLinkAction::ScrollTo {
                target_id,
                hash,
                delay: self.config.scroll_delay(),
            },
            None => MenuLinkAction::Closed,
        }
    }

    /// Mirror the desktop nav's `aria-current` link onto menu links.
    pub fn sync_active_link<S: MenuSurface>(&self, surface: &mut S) {
        let Some(current) = surface.current_nav_href() else {
            return;
        };
        let hrefs = surface.menu_link_hrefs();
        for (index, href) in hrefs.iter().enumerate() {
            surface.set_menu_link_active(index, href.as_deref() == Some(current.as_str()));
        }
    }
}
