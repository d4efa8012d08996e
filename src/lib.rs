pub mod dino;
pub mod flappy;
pub mod geom;
pub mod hub;
pub mod renderer;
pub mod scene;
pub mod scores;
pub mod sprite;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli_renderer;

#[cfg(target_arch = "wasm32")]
pub mod web_assets;
#[cfg(target_arch = "wasm32")]
pub mod web_main;
#[cfg(target_arch = "wasm32")]
pub mod web_renderer;

pub use dino::DinoGame;
pub use flappy::FlappyGame;
pub use hub::{GameId, Hub};
pub use renderer::{Input, Renderer};
pub use scene::{DrawCmd, Scene};
pub use scores::{BestScores, ScoreStore};
pub use sprite::{AssetCatalog, ImageId};

#[cfg(not(target_arch = "wasm32"))]
pub use cli_renderer::CliRenderer;
