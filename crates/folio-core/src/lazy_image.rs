#![forbid(unsafe_code)]

//! Deferred image loading.
//!
//! Candidate images carry their real source in `data-src`. With an
//! intersection observer available, each image is swapped in once it comes
//! within the root margin. Without one, every candidate loads immediately.

use tracing::{debug, trace};

use crate::config::LazyImageConfig;

/// Selector for candidate images.
pub const LAZY_IMAGE_SELECTOR: &str = ".lazy-image[data-src]";

/// Class added once an observed image has been swapped in.
pub const LOADED_CLASS: &str = "lazy-loaded";

/// One candidate image.
pub trait LazyImage {
    /// Current `data-src`, if still present.
    fn data_src(&self) -> Option<String>;

    /// Set `src` and remove `data-src`.
    fn load(&mut self, src: &str);

    /// Add a class to the image.
    fn add_class(&mut self, class: &str);
}

/// Options handed to the host's intersection observer.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverOptions {
    pub root_margin: String,
    pub threshold: f64,
}

impl From<&LazyImageConfig> for ObserverOptions {
    fn from(config: &LazyImageConfig) -> Self {
        Self {
            root_margin: config.root_margin.clone(),
            threshold: config.threshold,
        }
    }
}

/// Outcome of one intersection notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intersection {
    /// Not intersecting; keep observing.
    Outside,
    /// Swapped in; stop observing.
    Loaded,
    /// Intersecting but `data-src` is missing or empty; keep observing.
    NoSource,
}

impl Intersection {
    /// Whether the host should stop observing the image.
    #[must_use]
    pub const fn unobserve(self) -> bool {
        matches!(self, Self::Loaded)
    }
}

/// Swap `data-src` into `src` if present and non-empty.
fn swap_in<I: LazyImage + ?Sized>(image: &mut I) -> bool {
    match image.data_src().filter(|src| !src.is_empty()) {
        Some(src) => {
            image.load(&src);
            true
        }
        None => false,
    }
}

/// Handle an intersection observer entry for `image`.
pub fn on_intersection<I: LazyImage + ?Sized>(image: &mut I, intersecting: bool) -> Intersection {
    if !intersecting {
        return Intersection::Outside;
    }
    if swap_in(image) {
        image.add_class(LOADED_CLASS);
        trace!("lazy image loaded");
        Intersection::Loaded
    } else {
        Intersection::NoSource
    }
}

/// Load every candidate immediately. Returns how many were loaded.
pub fn load_eagerly<'a, I, It>(images: It) -> usize
where
    I: LazyImage + ?Sized + 'a,
    It: IntoIterator<Item = &'a mut I>,
{
    let mut loaded = 0_usize;
    for image in images {
        if swap_in(image) {
            loaded += 1;
        }
    }
    debug!(loaded, "intersection observer unavailable, loaded images eagerly");
    loaded
}
