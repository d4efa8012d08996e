use crate::renderer::Input;
use crate::scene::{DrawCmd, Scene};
use crate::web_assets::WebAssets;
use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Element, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent,
    TouchEvent,
};

/// DOM element ids a game's HUD writes to. Missing elements are tolerated.
#[derive(Debug, Clone, Copy)]
pub struct HudIds {
    pub score: &'static str,
    pub best: &'static str,
    pub final_score: &'static str,
    pub game_over: &'static str,
}

pub const FLAPPY_HUD: HudIds = HudIds {
    score: "flappyScore",
    best: "flappyBest",
    final_score: "flappyFinalScore",
    game_over: "flappyGameOver",
};

pub const DINO_HUD: HudIds = HudIds {
    score: "dinoScore",
    best: "dinoBest",
    final_score: "dinoFinalScore",
    game_over: "dinoGameOver",
};

/// Detachable input listeners for a single run. Dropping these without
/// calling `detach` would leak them onto the DOM, so the Dino driver stores
/// and explicitly removes them on teardown.
pub struct InputHandles {
    key: Closure<dyn FnMut(KeyboardEvent)>,
    mouse: Closure<dyn FnMut(MouseEvent)>,
    touch: Closure<dyn FnMut(TouchEvent)>,
}

/// Canvas 2D backend: executes scene draw commands and mirrors HUD values
/// into the page's text elements.
pub struct WebRenderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    assets: Rc<WebAssets>,
    score_el: Option<Element>,
    best_el: Option<Element>,
    final_score_el: Option<Element>,
    game_over_el: Option<HtmlElement>,
    pending_input: Rc<RefCell<Option<Input>>>,
    last_hud_over: bool,
}

impl WebRenderer {
    pub fn new(canvas_id: &str, hud: HudIds, assets: Rc<WebAssets>) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let context = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        // Crisp pixels for the sprite art
        context.set_image_smoothing_enabled(false);

        Ok(Self {
            canvas,
            context,
            assets,
            score_el: document.get_element_by_id(hud.score),
            best_el: document.get_element_by_id(hud.best),
            final_score_el: document.get_element_by_id(hud.final_score),
            game_over_el: document
                .get_element_by_id(hud.game_over)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok()),
            pending_input: Rc::new(RefCell::new(None)),
            last_hud_over: false,
        })
    }

    pub fn poll_input(&self) -> Option<Input> {
        self.pending_input.borrow_mut().take()
    }

    /// Attach click/Space/touch listeners for the page's lifetime. The
    /// Flappy container stays live across runs, so these are never removed.
    pub fn attach_persistent_input(&self) {
        let handles = self.build_input_handles();
        self.register(&handles);
        let InputHandles { key, mouse, touch } = handles;
        key.forget();
        mouse.forget();
        touch.forget();
    }

    /// Attach listeners for one Dino run; the caller keeps the handles and
    /// detaches them when the run dies.
    pub fn attach_input(&self) -> InputHandles {
        let handles = self.build_input_handles();
        self.register(&handles);
        handles
    }

    pub fn detach_input(&self, handles: InputHandles) {
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            let _ = document.remove_event_listener_with_callback(
                "keydown",
                handles.key.as_ref().unchecked_ref(),
            );
        }
        let _ = self
            .canvas
            .remove_event_listener_with_callback("mousedown", handles.mouse.as_ref().unchecked_ref());
        let _ = self
            .canvas
            .remove_event_listener_with_callback("touchstart", handles.touch.as_ref().unchecked_ref());
    }

    fn build_input_handles(&self) -> InputHandles {
        let pending = self.pending_input.clone();
        let key = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            if event.code() == "Space" || event.key() == " " {
                event.prevent_default();
                *pending.borrow_mut() = Some(Input::Flap);
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let pending = self.pending_input.clone();
        let mouse = Closure::wrap(Box::new(move |_event: MouseEvent| {
            *pending.borrow_mut() = Some(Input::Flap);
        }) as Box<dyn FnMut(MouseEvent)>);

        let pending = self.pending_input.clone();
        let touch = Closure::wrap(Box::new(move |event: TouchEvent| {
            event.prevent_default();
            *pending.borrow_mut() = Some(Input::Flap);
        }) as Box<dyn FnMut(TouchEvent)>);

        InputHandles { key, mouse, touch }
    }

    fn register(&self, handles: &InputHandles) {
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            let _ = document.add_event_listener_with_callback(
                "keydown",
                handles.key.as_ref().unchecked_ref(),
            );
        }
        let _ = self
            .canvas
            .add_event_listener_with_callback("mousedown", handles.mouse.as_ref().unchecked_ref());
        let _ = self
            .canvas
            .add_event_listener_with_callback("touchstart", handles.touch.as_ref().unchecked_ref());
    }

    pub fn render(&mut self, scene: &Scene) -> Result<(), JsValue> {
        if self.canvas.width() != scene.width as u32 || self.canvas.height() != scene.height as u32
        {
            self.canvas.set_width(scene.width as u32);
            self.canvas.set_height(scene.height as u32);
            // resizing resets the context state
            self.context.set_image_smoothing_enabled(false);
        }

        for cmd in &scene.cmds {
            self.draw(cmd, scene)?;
        }
        self.update_hud(scene);
        Ok(())
    }

    fn draw(&self, cmd: &DrawCmd, scene: &Scene) -> Result<(), JsValue> {
        let ctx = &self.context;
        match cmd {
            DrawCmd::Clear => {
                ctx.clear_rect(0.0, 0.0, scene.width, scene.height);
            }
            DrawCmd::FillRect { rect, color } => {
                ctx.set_fill_style_str(color.0);
                ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
            }
            DrawCmd::StrokeRect { rect, color, line_width } => {
                ctx.set_stroke_style_str(color.0);
                ctx.set_line_width(*line_width);
                ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
            }
            DrawCmd::FillCircle { cx, cy, r, color } => {
                ctx.set_fill_style_str(color.0);
                ctx.begin_path();
                ctx.arc(*cx, *cy, *r, 0.0, PI * 2.0)?;
                ctx.fill();
            }
            DrawCmd::Gradient { rect, stops } => {
                let gradient =
                    ctx.create_linear_gradient(0.0, rect.y, 0.0, rect.bottom());
                for (offset, color) in *stops {
                    gradient.add_color_stop(*offset as f32, color)?;
                }
                ctx.set_fill_style_canvas_gradient(&gradient);
                ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
            }
            DrawCmd::Sprite { image, src, dst, flip_y } => {
                let img = match self.assets.image(*image) {
                    Some(img) if img.complete() && img.natural_width() > 0 => img,
                    _ => return Ok(()), // decoded state changed under us; skip
                };
                if *flip_y {
                    ctx.save();
                    ctx.translate(dst.x, dst.y + dst.h)?;
                    ctx.scale(1.0, -1.0)?;
                }
                let (dx, dy) = if *flip_y { (0.0, 0.0) } else { (dst.x, dst.y) };
                match src {
                    Some(s) => {
                        ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                            img, s.x, s.y, s.w, s.h, dx, dy, dst.w, dst.h,
                        )?;
                    }
                    None => {
                        ctx.draw_image_with_html_image_element_and_dw_and_dh(
                            img, dx, dy, dst.w, dst.h,
                        )?;
                    }
                }
                if *flip_y {
                    ctx.restore();
                }
            }
            DrawCmd::Text { text, x, y, color, font } => {
                ctx.set_fill_style_str(color.0);
                ctx.set_font(font);
                ctx.set_text_align("left");
                ctx.set_text_baseline("alphabetic");
                ctx.fill_text(text, *x, *y)?;
            }
        }
        Ok(())
    }

    fn update_hud(&mut self, scene: &Scene) {
        if let Some(el) = &self.score_el {
            el.set_text_content(Some(&scene.hud.score.to_string()));
        }
        if let Some(el) = &self.best_el {
            el.set_text_content(Some(&scene.hud.best.to_string()));
        }
        if scene.hud.over != self.last_hud_over {
            self.last_hud_over = scene.hud.over;
            if scene.hud.over {
                if let Some(el) = &self.final_score_el {
                    el.set_text_content(Some(&scene.hud.score.to_string()));
                }
            }
            if let Some(el) = &self.game_over_el {
                let display = if scene.hud.over { "block" } else { "none" };
                let _ = el.style().set_property("display", display);
            }
        }
    }
}
