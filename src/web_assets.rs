use crate::sprite::{AssetCatalog, ImageId, ImageInfo, VerticalTrim};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// The declared sprite images and what is known about them so far. Loading
/// is asynchronous; the catalog fills in as images decode and render paths
/// fall back to shapes for anything still missing.
pub struct WebAssets {
    images: Vec<(ImageId, HtmlImageElement)>,
    catalog: RefCell<AssetCatalog>,
}

impl WebAssets {
    pub fn load() -> Result<Self, JsValue> {
        let mut images = Vec::with_capacity(ImageId::ALL.len());
        for id in ImageId::ALL {
            let img = HtmlImageElement::new()?;
            img.set_src(id.path());
            images.push((id, img));
        }
        Ok(Self {
            images,
            catalog: RefCell::new(AssetCatalog::new()),
        })
    }

    pub fn image(&self, id: ImageId) -> Option<&HtmlImageElement> {
        self.images
            .iter()
            .find(|(image_id, _)| *image_id == id)
            .map(|(_, img)| img)
    }

    /// Pull any newly decoded images into the catalog. Cheap once everything
    /// has settled; failed images (complete but zero-sized) never enter.
    pub fn refresh(&self) {
        let mut catalog = self.catalog.borrow_mut();
        for (id, img) in &self.images {
            if catalog.contains(*id) || !img.complete() || img.natural_width() == 0 {
                continue;
            }
            let trim = if id.wants_trim() {
                extract_trim(img)
            } else {
                None
            };
            catalog.insert(
                *id,
                ImageInfo {
                    width: img.natural_width(),
                    height: img.natural_height(),
                    trim,
                },
            );
        }
    }

    pub fn snapshot(&self) -> AssetCatalog {
        self.refresh();
        self.catalog.borrow().clone()
    }

    /// Run `done` once every declared image has finished loading or erroring,
    /// or after `timeout_ms` regardless, so a stalled download can't keep a
    /// game from starting.
    pub fn when_settled(&self, timeout_ms: i32, done: impl FnOnce() + 'static) {
        let pending: Vec<HtmlImageElement> = self
            .images
            .iter()
            .filter(|(_, img)| !img.complete())
            .map(|(_, img)| img.clone())
            .collect();

        let done = Rc::new(RefCell::new(Some(Box::new(done) as Box<dyn FnOnce()>)));
        if pending.is_empty() {
            if let Some(f) = done.borrow_mut().take() {
                f();
            }
            return;
        }

        let remaining = Rc::new(Cell::new(pending.len()));
        for img in &pending {
            let remaining = remaining.clone();
            let done = done.clone();
            let settled = Closure::wrap(Box::new(move || {
                if remaining.get() == 0 {
                    return; // timeout already fired
                }
                remaining.set(remaining.get() - 1);
                if remaining.get() == 0 {
                    if let Some(f) = done.borrow_mut().take() {
                        f();
                    }
                }
            }) as Box<dyn FnMut()>);
            for event in ["load", "error"] {
                let _ = img
                    .add_event_listener_with_callback(event, settled.as_ref().unchecked_ref());
            }
            settled.forget();
        }

        let timed_out = Closure::wrap(Box::new(move || {
            remaining.set(0);
            if let Some(f) = done.borrow_mut().take() {
                f();
            }
        }) as Box<dyn FnMut()>);
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                timed_out.as_ref().unchecked_ref(),
                timeout_ms,
            );
        }
        timed_out.forget();
    }
}

/// Read the image's opaque row bounds by drawing it to a scratch canvas.
/// Any failure (tainted canvas, no 2d context) just means no trim.
fn extract_trim(img: &HtmlImageElement) -> Option<VerticalTrim> {
    let w = img.natural_width();
    let h = img.natural_height();
    if w == 0 || h == 0 {
        return None;
    }
    let document = web_sys::window()?.document()?;
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .ok()?
        .dyn_into()
        .ok()?;
    canvas.set_width(w);
    canvas.set_height(h);
    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .ok()??
        .dyn_into()
        .ok()?;
    context
        .draw_image_with_html_image_element(img, 0.0, 0.0)
        .ok()?;
    let data = context
        .get_image_data(0.0, 0.0, w as f64, h as f64)
        .ok()?;
    let pixels = data.data();
    VerticalTrim::from_rgba(&pixels, w, h)
}
