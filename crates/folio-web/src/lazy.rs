//! Lazy image loading through `IntersectionObserver`.

use folio_core::Result;
use folio_core::config::LazyImageConfig;
use folio_core::lazy_image::{LAZY_IMAGE_SELECTOR, LazyImage, ObserverOptions, load_eagerly, on_intersection};
use js_sys::Array;
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::dom;

/// An `<img>` (or any element) carrying `data-src`.
pub(crate) struct DomImage(Element);

impl LazyImage for DomImage {
    fn data_src(&self) -> Option<String> {
        self.0.get_attribute("data-src")
    }

    fn load(&mut self, src: &str) {
        let _ = self.0.set_attribute("src", src);
        let _ = self.0.remove_attribute("data-src");
    }

    fn add_class(&mut self, class: &str) {
        let _ = self.0.class_list().add_1(class);
    }
}

fn on_entries(entries: Array, observer: IntersectionObserver) {
    for entry in entries.iter() {
        let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
            continue;
        };
        let target = entry.target();
        let mut image = DomImage(target.clone());
        if on_intersection(&mut image, entry.is_intersecting()).unobserve() {
            observer.unobserve(&target);
        }
    }
}

pub(crate) fn boot(config: &LazyImageConfig) -> Result<bool> {
    let document = dom::document()?;
    let images = dom::query_all(&document, LAZY_IMAGE_SELECTOR);
    if images.is_empty() {
        return Ok(false);
    }

    if !dom::has_global("IntersectionObserver") {
        let mut images: Vec<DomImage> = images.into_iter().map(DomImage).collect();
        load_eagerly(images.iter_mut());
        return Ok(true);
    }

    let options = ObserverOptions::from(config);
    let init = IntersectionObserverInit::new();
    init.set_root_margin(&options.root_margin);
    init.set_threshold(&JsValue::from_f64(options.threshold));

    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(on_entries);
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
        .map_err(dom::js_err)?;
    callback.forget();

    for image in &images {
        observer.observe(image);
    }
    debug!(observed = images.len(), "lazy images observed");
    Ok(true)
}
