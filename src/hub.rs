/// The two mini-games the hub can launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameId {
    Flappy,
    Dino,
}

impl GameId {
    /// Persisted best-score key, distinct per game.
    pub fn best_score_key(self) -> &'static str {
        match self {
            GameId::Flappy => "flappyBestScore",
            GameId::Dino => "dinoBestScore",
        }
    }
}

/// Which game's container is visible. `None` means the hub menu itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hub {
    active: Option<GameId>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, game: GameId) {
        self.active = Some(game);
    }

    /// Back to the hub menu.
    pub fn close(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<GameId> {
        self.active
    }

    pub fn is_visible(&self, game: GameId) -> bool {
        self.active == Some(game)
    }
}

/// Guards a start routine against double-registering input listeners when it
/// runs twice without an intervening stop.
#[derive(Debug, Default)]
pub struct AttachGuard {
    attached: bool,
}

impl AttachGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true exactly once until `release` is called; callers only
    /// attach listeners on a true return.
    pub fn acquire(&mut self) -> bool {
        if self.attached {
            return false;
        }
        self.attached = true;
        true
    }

    pub fn release(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_shows_one_game_at_a_time() {
        let mut hub = Hub::new();
        assert_eq!(hub.active(), None);

        hub.show(GameId::Flappy);
        assert!(hub.is_visible(GameId::Flappy));
        assert!(!hub.is_visible(GameId::Dino));

        hub.show(GameId::Dino);
        assert!(hub.is_visible(GameId::Dino));
        assert!(!hub.is_visible(GameId::Flappy));

        hub.close();
        assert_eq!(hub.active(), None);
    }

    #[test]
    fn test_score_keys_are_distinct() {
        assert_ne!(
            GameId::Flappy.best_score_key(),
            GameId::Dino.best_score_key()
        );
    }

    #[test]
    fn test_attach_guard_acquires_once() {
        let mut guard = AttachGuard::new();
        assert!(guard.acquire());
        assert!(!guard.acquire());
        assert!(!guard.acquire());
        assert!(guard.is_attached());

        guard.release();
        assert!(!guard.is_attached());
        assert!(guard.acquire());
    }
}
