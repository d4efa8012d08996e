use crate::hub::GameId;
use std::collections::HashMap;

/// Key-value backend for the persisted best scores. localStorage on the web,
/// a file per key on the CLI, a map in tests.
pub trait ScoreStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str);
}

/// Missing or unparseable stored values count as zero.
pub fn parse_best(raw: Option<String>) -> u32 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

/// Both games' best scores. Read once at startup; written only when a run's
/// score exceeds the stored best, so the persisted value never decreases.
pub struct BestScores<S: ScoreStore> {
    store: S,
    flappy: u32,
    dino: u32,
}

impl<S: ScoreStore> BestScores<S> {
    pub fn load(store: S) -> Self {
        let flappy = parse_best(store.read(GameId::Flappy.best_score_key()));
        let dino = parse_best(store.read(GameId::Dino.best_score_key()));
        Self { store, flappy, dino }
    }

    pub fn best(&self, game: GameId) -> u32 {
        match game {
            GameId::Flappy => self.flappy,
            GameId::Dino => self.dino,
        }
    }

    /// Record a run's current score. Persists and returns true only when it
    /// beats the stored best.
    pub fn record(&mut self, game: GameId, score: u32) -> bool {
        if score <= self.best(game) {
            return false;
        }
        match game {
            GameId::Flappy => self.flappy = score,
            GameId::Dino => self.dino = score,
        }
        self.store.write(game.best_score_key(), &score.to_string());
        true
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

/// In-memory store backing tests.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    entries: HashMap<String, String>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }
}

impl ScoreStore for MemoryScoreStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::FileScoreStore;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::ScoreStore;
    use directories::ProjectDirs;
    use std::fs;
    use std::io;
    use std::path::PathBuf;

    /// One small file per score key in the platform data directory.
    pub struct FileScoreStore {
        dir: PathBuf,
    }

    impl FileScoreStore {
        pub fn open() -> io::Result<Self> {
            let dirs = ProjectDirs::from("", "", "minicade").ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "no home directory")
            })?;
            let dir = dirs.data_dir().to_path_buf();
            fs::create_dir_all(&dir)?;
            Ok(Self { dir })
        }
    }

    impl ScoreStore for FileScoreStore {
        fn read(&self, key: &str) -> Option<String> {
            fs::read_to_string(self.dir.join(key)).ok()
        }

        fn write(&mut self, key: &str, value: &str) {
            if let Err(e) = fs::write(self.dir.join(key), value) {
                log::warn!("failed to persist best score {key}: {e}");
            }
        }
    }
}
