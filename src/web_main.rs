use crate::dino::DinoGame;
use crate::flappy::FlappyGame;
use crate::hub::{AttachGuard, GameId, Hub};
use crate::scores::{BestScores, ScoreStore};
use crate::sprite::{ImageId, SpriteMetrics};
use crate::web_assets::WebAssets;
use crate::web_renderer::{InputHandles, WebRenderer, DINO_HUD, FLAPPY_HUD};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

// Wait this long for sprite downloads before starting the Dino run anyway
const ASSET_TIMEOUT_MS: i32 = 5_000;
const DINO_TICK_MS: i32 = 16; // ~60/sec

const FLAPPY_CONTAINER: &str = "flappy-game-container";
const DINO_CONTAINER: &str = "dino-game-container";
const HUB_SECTION: &str = ".games-section";

/// Best scores live in the browser's localStorage. A blocked or full store
/// degrades to session-only bests.
pub struct LocalScoreStore;

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

impl ScoreStore for LocalScoreStore {
    fn read(&self, key: &str) -> Option<String> {
        storage()?.get_item(key).ok().flatten()
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Some(storage) = storage() {
            let _ = storage.set_item(key, value);
        }
    }
}

struct FlappyDriver {
    game: FlappyGame,
    renderer: WebRenderer,
    assets: Rc<WebAssets>,
    scores: BestScores<LocalScoreStore>,
}

impl FlappyDriver {
    fn frame(&mut self) {
        if let Some(input) = self.renderer.poll_input() {
            self.game.handle_input(input);
        }
        self.game.tick(&mut rand::thread_rng());
        self.scores.record(GameId::Flappy, self.game.score);

        let catalog = self.assets.snapshot();
        let scene = self.game.scene(&catalog, self.scores.best(GameId::Flappy));
        if let Err(e) = self.renderer.render(&scene) {
            web_sys::console::error_1(&e);
        }
    }
}

struct DinoDriver {
    game: DinoGame,
    renderer: WebRenderer,
    assets: Rc<WebAssets>,
    scores: BestScores<LocalScoreStore>,
    guard: AttachGuard,
    handles: Option<InputHandles>,
    interval_id: Option<i32>,
    _tick_closure: Option<Closure<dyn FnMut()>>,
}

impl DinoDriver {
    /// One interval callback. Returns true once the death frame has been
    /// rendered, at which point the caller tears the loop down.
    fn frame(&mut self) -> bool {
        if let Some(input) = self.renderer.poll_input() {
            self.game.handle_input(input);
        }
        self.game.tick(&mut rand::thread_rng());
        self.scores.record(GameId::Dino, self.game.score);

        let catalog = self.assets.snapshot();
        let scene = self.game.scene(&catalog, self.scores.best(GameId::Dino));
        if let Err(e) = self.renderer.render(&scene) {
            web_sys::console::error_1(&e);
        }
        self.game.dead
    }

    fn stop(&mut self) {
        if let Some(id) = self.interval_id.take() {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(id);
            }
        }
        self._tick_closure = None;
        if let Some(handles) = self.handles.take() {
            self.renderer.detach_input(handles);
        }
        self.guard.release();
    }
}

thread_local! {
    static HUB: RefCell<Hub> = RefCell::new(Hub::new());
    static ASSETS: RefCell<Option<Rc<WebAssets>>> = RefCell::new(None);
    static FLAPPY: RefCell<Option<Rc<RefCell<FlappyDriver>>>> = RefCell::new(None);
    static DINO: RefCell<Option<Rc<RefCell<DinoDriver>>>> = RefCell::new(None);
}

fn shared_assets() -> Result<Rc<WebAssets>, JsValue> {
    ASSETS.with(|cell| {
        let mut slot = cell.borrow_mut();
        if let Some(assets) = slot.as_ref() {
            return Ok(assets.clone());
        }
        let assets = Rc::new(WebAssets::load()?);
        *slot = Some(assets.clone());
        Ok(assets)
    })
}

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn set_displayed(document: &Document, id: &str, shown: bool) {
    if let Some(el) = document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    {
        let display = if shown { "block" } else { "none" };
        let _ = el.style().set_property("display", display);
    }
}

/// Toggle which game's container is visible; `None` returns to the hub menu.
fn show_game(game: Option<GameId>) {
    HUB.with(|hub| match game {
        Some(id) => hub.borrow_mut().show(id),
        None => hub.borrow_mut().close(),
    });

    let Some(document) = document() else {
        return;
    };
    set_displayed(&document, FLAPPY_CONTAINER, game == Some(GameId::Flappy));
    set_displayed(&document, DINO_CONTAINER, game == Some(GameId::Dino));
    if let Ok(Some(hub_el)) = document.query_selector(HUB_SECTION) {
        if let Ok(hub_el) = hub_el.dyn_into::<HtmlElement>() {
            let display = if game.is_none() { "block" } else { "none" };
            let _ = hub_el.style().set_property("display", display);
        }
    }
}

fn on_click(document: &Document, id: &str, mut action: impl FnMut() + 'static) {
    if let Some(el) = document.get_element_by_id(id) {
        let closure = Closure::wrap(Box::new(move || action()) as Box<dyn FnMut()>);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// Entry point: wire the hub cards. Called once from the page.
#[wasm_bindgen]
pub fn start_hub() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let document = document().ok_or("no document")?;
    on_click(&document, "flappy-card", || {
        show_game(Some(GameId::Flappy));
        if let Err(e) = start_flappy() {
            web_sys::console::error_1(&e);
        }
    });
    on_click(&document, "dino-card", || {
        show_game(Some(GameId::Dino));
        if let Err(e) = start_dino() {
            web_sys::console::error_1(&e);
        }
    });
    Ok(())
}

/// Back to the hub menu. Running games keep their own lifecycles.
#[wasm_bindgen]
pub fn show_hub() {
    show_game(None);
}

/// Start (or restart) the Flappy loop. The render loop itself is only ever
/// created once; a second call just resets the run.
#[wasm_bindgen]
pub fn start_flappy() -> Result<(), JsValue> {
    let existing = FLAPPY.with(|cell| cell.borrow().clone());
    if let Some(driver) = existing {
        driver.borrow_mut().game.reset();
        return Ok(());
    }

    let assets = shared_assets()?;
    let renderer = WebRenderer::new("flappyCanvas", FLAPPY_HUD, assets.clone())?;
    // the flappy canvas answers clicks forever; over-state clicks restart
    renderer.attach_persistent_input();

    let driver = Rc::new(RefCell::new(FlappyDriver {
        game: FlappyGame::new(),
        renderer,
        assets,
        scores: BestScores::load(LocalScoreStore),
    }));
    FLAPPY.with(|cell| *cell.borrow_mut() = Some(driver.clone()));

    // Self-rescheduling animation frame chain; renders every frame, the
    // game freezes itself while over.
    let window = web_sys::window().ok_or("no window")?;
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        driver.borrow_mut().frame();

        let window = web_sys::window().unwrap();
        window
            .request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref())
            .unwrap();
    }) as Box<dyn FnMut()>));

    window
        .request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref())
        .unwrap();
    Ok(())
}

#[wasm_bindgen]
pub fn restart_flappy() {
    FLAPPY.with(|cell| {
        if let Some(driver) = cell.borrow().as_ref() {
            driver.borrow_mut().game.reset();
        }
    });
}

/// Start a Dino run once every declared image has settled, so sprites and
/// ground don't pop in mid-run. A start while the loop is live is a no-op.
#[wasm_bindgen]
pub fn start_dino() -> Result<(), JsValue> {
    let running = DINO.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|driver| driver.borrow().interval_id.is_some())
            .unwrap_or(false)
    });
    if running {
        return Ok(());
    }

    let assets = shared_assets()?;
    let assets_for_run = assets.clone();
    assets.when_settled(ASSET_TIMEOUT_MS, move || {
        if let Err(e) = begin_dino_run(assets_for_run) {
            web_sys::console::error_1(&e);
        }
    });
    Ok(())
}

/// Explicit restart; a dead Dino loop never revives on its own.
#[wasm_bindgen]
pub fn restart_dino() -> Result<(), JsValue> {
    start_dino()
}

fn begin_dino_run(assets: Rc<WebAssets>) -> Result<(), JsValue> {
    // obstacle metrics freeze here for the whole run
    let catalog = assets.snapshot();
    let cactus = SpriteMetrics::resolve(&catalog, ImageId::Cactus);

    let driver = DINO.with(|cell| -> Result<Rc<RefCell<DinoDriver>>, JsValue> {
        let mut slot = cell.borrow_mut();
        if let Some(driver) = slot.as_ref() {
            return Ok(driver.clone());
        }
        let renderer = WebRenderer::new("dinoCanvas", DINO_HUD, assets.clone())?;
        let driver = Rc::new(RefCell::new(DinoDriver {
            game: DinoGame::new(cactus, &mut rand::thread_rng()),
            renderer,
            assets: assets.clone(),
            scores: BestScores::load(LocalScoreStore),
            guard: AttachGuard::new(),
            handles: None,
            interval_id: None,
            _tick_closure: None,
        }));
        *slot = Some(driver.clone());
        Ok(driver)
    })?;

    {
        let mut drv = driver.borrow_mut();
        if drv.interval_id.is_some() {
            // two queued starts raced through the settle callback
            return Ok(());
        }
        drv.game = DinoGame::new(cactus, &mut rand::thread_rng());
        // re-arm input each start, but never attach twice
        if drv.guard.acquire() {
            drv.handles = Some(drv.renderer.attach_input());
        }
    }

    let window = web_sys::window().ok_or("no window")?;
    let tick_driver = driver.clone();
    let callback = Closure::wrap(Box::new(move || {
        let finished = tick_driver.borrow_mut().frame();
        if finished {
            tick_driver.borrow_mut().stop();
        }
    }) as Box<dyn FnMut()>);
    let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
        callback.as_ref().unchecked_ref(),
        DINO_TICK_MS,
    )?;

    let mut drv = driver.borrow_mut();
    drv.interval_id = Some(id);
    drv._tick_closure = Some(callback);
    Ok(())
}
