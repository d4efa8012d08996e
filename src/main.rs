use minicade::scores::FileScoreStore;
use minicade::{
    AssetCatalog, BestScores, CliRenderer, DinoGame, FlappyGame, GameId, Input, Renderer,
};
use std::io;
use std::time::{Duration, Instant};

// Simulation rate (both games tick at ~60/sec)
const TICK_RATE: Duration = Duration::from_millis(16);

fn main() -> io::Result<()> {
    env_logger::init();

    let game = match std::env::args().nth(1).as_deref() {
        None | Some("flappy") => GameId::Flappy,
        Some("dino") => GameId::Dino,
        Some(other) => {
            eprintln!("unknown game {other:?}; expected \"flappy\" or \"dino\"");
            std::process::exit(2);
        }
    };

    let mut scores = BestScores::load(FileScoreStore::open()?);
    log::info!("starting {game:?}, best so far {}", scores.best(game));

    let mut renderer = CliRenderer::new();
    renderer.init()?;
    let result = match game {
        GameId::Flappy => run_flappy(&mut renderer, &mut scores),
        GameId::Dino => run_dino(&mut renderer, &mut scores),
    };
    renderer.cleanup()?;
    result
}

fn run_flappy(
    renderer: &mut CliRenderer,
    scores: &mut BestScores<FileScoreStore>,
) -> io::Result<()> {
    // the terminal never has images, so scenes always take the fallback paths
    let assets = AssetCatalog::new();
    let mut game = FlappyGame::new();
    let mut rng = rand::thread_rng();
    let mut last_tick = Instant::now();

    loop {
        if let Some(input) = renderer.poll_input()? {
            match input {
                Input::Quit => break,
                other => game.handle_input(other),
            }
        }

        // fixed-rate update; the game freezes itself while over but the
        // scene keeps rendering, same as the canvas frontend
        if last_tick.elapsed() >= TICK_RATE {
            game.tick(&mut rng);
            scores.record(GameId::Flappy, game.score);
            last_tick = Instant::now();
        }

        renderer.render(&game.scene(&assets, scores.best(GameId::Flappy)))?;
    }
    Ok(())
}

fn run_dino(
    renderer: &mut CliRenderer,
    scores: &mut BestScores<FileScoreStore>,
) -> io::Result<()> {
    let assets = AssetCatalog::new();
    let mut rng = rand::thread_rng();
    let mut game = DinoGame::new(None, &mut rng);
    let mut last_tick = Instant::now();

    loop {
        if let Some(input) = renderer.poll_input()? {
            match input {
                Input::Quit => break,
                // a dead run stays down until an explicit restart
                Input::Restart => game = DinoGame::new(None, &mut rng),
                Input::Flap => game.handle_input(Input::Flap),
            }
        }

        if !game.dead && last_tick.elapsed() >= TICK_RATE {
            game.tick(&mut rng);
            scores.record(GameId::Dino, game.score);
            last_tick = Instant::now();
        }

        renderer.render(&game.scene(&assets, scores.best(GameId::Dino)))?;
    }
    Ok(())
}
