use crate::geom::Rect;
use crate::renderer::Input;
use crate::scene::{Color, DrawCmd, Hud, Scene, SrcRect};
use crate::sprite::{AssetCatalog, ImageId};
use rand::Rng;

pub const CANVAS_W: f64 = 480.0;
pub const CANVAS_H: f64 = 640.0;

const GRAVITY: f64 = 0.5;
const JUMP_IMPULSE: f64 = -9.0;
const CEILING_Y: f64 = -20.0;

const BIRD_X: f64 = 80.0;
const BIRD_SIZE: f64 = 56.0;
// hitbox shrinks inward by this fraction of width/height per side
const HITBOX_INSET: f64 = 0.38;
const WING_FRAMES: u64 = 3;
const WING_FRAME_TICKS: u64 = 6;

pub const PIPE_W: f64 = 80.0;
pub const PIPE_GAP: f64 = 220.0;
const PIPE_SPEED: f64 = 3.5;
const SPAWN_INTERVAL: u64 = 90;
const DESPAWN_X: f64 = -200.0;
pub const GAP_TOP_MIN: f64 = 60.0;
pub const BOTTOM_CLEARANCE: f64 = 80.0;

const GROUND_H: f64 = 24.0;
const BG_SCROLL: f64 = 1.2;

const SKY_STOPS: &[(f64, &str)] = &[
    (0.0, "#87CEEB"),
    (0.7, "#98FB98"),
    (1.0, "#90EE90"),
];
const CLOUD_COLOR: Color = Color("rgba(255, 255, 255, 0.8)");
const BIRD_COLOR: Color = Color("#FFD700");
const PIPE_FILL: Color = Color("#228B22");
const PIPE_STROKE: Color = Color("#006400");
const PIPE_CAP: Color = Color("#32CD32");
const GROUND_COLOR: Color = Color("#DEB887");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Playing,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bird {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub vy: f64,
}

impl Bird {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Deflated collision rect. The visual sprite is much larger than the
    /// bird's body, so the hitbox shrinks 38% per side.
    pub fn hitbox(&self) -> Rect {
        let dx = (self.w * HITBOX_INSET).round();
        let dy = (self.h * HITBOX_INSET).round();
        self.rect().deflate(dx, dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipe {
    pub x: f64,
    /// Bottom edge of the top pipe.
    pub top: f64,
    /// Top edge of the bottom pipe (`top + PIPE_GAP`).
    pub bottom: f64,
    pub passed: bool,
}

impl Pipe {
    fn span(&self) -> Rect {
        Rect::new(self.x, 0.0, PIPE_W, 0.0)
    }
}

pub struct FlappyGame {
    pub width: f64,
    pub height: f64,
    pub bird: Bird,
    pub pipes: Vec<Pipe>,
    pub frame: u64,
    pub score: u32,
    pub state: RunState,
    /// Visual scroll offsets; advanced during playing ticks, never read by
    /// physics or collision.
    pub ground_offset: f64,
    pub bg_offset: f64,
}

impl FlappyGame {
    pub fn new() -> Self {
        Self::with_size(CANVAS_W, CANVAS_H)
    }

    pub fn with_size(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            bird: Bird {
                x: BIRD_X,
                y: height / 2.0 - BIRD_SIZE / 2.0,
                w: BIRD_SIZE,
                h: BIRD_SIZE,
                vy: 0.0,
            },
            pipes: Vec::new(),
            frame: 0,
            score: 0,
            state: RunState::Playing,
            ground_offset: 0.0,
            bg_offset: 0.0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::with_size(self.width, self.height);
    }

    /// Ground line the bird dies on. Fixed relative to the canvas so a
    /// missing ground image never moves the physics floor.
    pub fn floor_y(&self) -> f64 {
        self.height - 2.0
    }

    /// Jump sets velocity to the impulse outright; it never accumulates.
    pub fn flap(&mut self) {
        if self.state == RunState::Playing {
            self.bird.vy = JUMP_IMPULSE;
        }
    }

    /// While over, flap input restarts the run (the click target stays live).
    pub fn handle_input(&mut self, input: Input) {
        match input {
            Input::Flap => {
                if self.state == RunState::Over {
                    self.reset();
                }
                self.flap();
            }
            Input::Restart => self.reset(),
            Input::Quit => {}
        }
    }

    /// One simulation step. A no-op while over, so the scene freezes but
    /// keeps rendering.
    pub fn tick(&mut self, rng: &mut impl Rng) {
        if self.state == RunState::Over {
            return;
        }
        self.frame += 1;

        self.bird.vy += GRAVITY;
        self.bird.y += self.bird.vy;

        if self.frame % SPAWN_INTERVAL == 0 {
            self.spawn_pipe(rng);
        }
        self.advance_pipes();
        self.bg_offset += BG_SCROLL;
        self.ground_offset += PIPE_SPEED;

        self.check_collisions();
    }

    fn spawn_pipe(&mut self, rng: &mut impl Rng) {
        let max_top = self.height - PIPE_GAP - BOTTOM_CLEARANCE;
        let top = rng.gen_range(GAP_TOP_MIN..max_top).floor();
        self.pipes.push(Pipe {
            x: self.width,
            top,
            bottom: top + PIPE_GAP,
            passed: false,
        });
    }

    fn advance_pipes(&mut self) {
        let bird_x = self.bird.x;
        for pipe in &mut self.pipes {
            pipe.x -= PIPE_SPEED;
            if !pipe.passed && pipe.x + PIPE_W < bird_x {
                pipe.passed = true;
                self.score += 1;
            }
        }
        self.pipes.retain(|p| p.x > DESPAWN_X);
    }

    fn check_collisions(&mut self) {
        if self.bird.rect().bottom() > self.floor_y() {
            self.state = RunState::Over;
            return;
        }
        if self.bird.y < CEILING_Y {
            self.bird.y = CEILING_Y;
            self.bird.vy = 0.0;
        }

        let hitbox = self.bird.hitbox();
        for pipe in &self.pipes {
            if hitbox.overlaps_x(&pipe.span())
                && (hitbox.y < pipe.top || hitbox.bottom() > pipe.bottom)
            {
                self.state = RunState::Over;
                return;
            }
        }
    }

    /// Build the frame's draw list. Pure: depends only on game state and the
    /// asset catalog, substituting primitive shapes for any missing image.
    pub fn scene(&self, assets: &AssetCatalog, best: u32) -> Scene {
        let mut scene = Scene::new(
            self.width,
            self.height,
            Hud {
                score: self.score,
                best,
                over: self.state == RunState::Over,
            },
        );

        self.draw_background(assets, &mut scene);
        for pipe in &self.pipes {
            self.draw_pipe(assets, &mut scene, pipe);
        }
        self.draw_bird(assets, &mut scene);
        self.draw_ground(assets, &mut scene);
        scene
    }

    fn draw_background(&self, assets: &AssetCatalog, scene: &mut Scene) {
        if let Some(bg) = assets.get(ImageId::FlappyBackground) {
            // tile horizontally, stretched to canvas height, scrolling slower
            // than the pipes for parallax
            scene.tile_x(
                ImageId::FlappyBackground,
                bg.width as f64,
                0.0,
                self.height,
                self.bg_offset,
            );
            return;
        }

        scene.push(DrawCmd::Gradient {
            rect: Rect::new(0.0, 0.0, self.width, self.height),
            stops: SKY_STOPS,
        });
        // drifting clouds keyed off the frame counter
        for i in 0..5 {
            let x = (self.frame as f64 / 2.0 + i as f64 * 120.0)
                % (self.width + 60.0)
                - 30.0;
            let y = 50.0 + i as f64 * 30.0;
            for (dx, r) in [(0.0, 20.0), (25.0, 30.0), (50.0, 20.0)] {
                scene.push(DrawCmd::FillCircle {
                    cx: x + dx,
                    cy: y,
                    r,
                    color: CLOUD_COLOR,
                });
            }
        }
    }

    fn draw_pipe(&self, assets: &AssetCatalog, scene: &mut Scene, pipe: &Pipe) {
        if let Some(img) = assets.get(ImageId::Pipe) {
            // draw only the trimmed slice so the pipe mouth sits flush with
            // the gap edge; the top pipe is flipped to point downward
            let src = Some(SrcRect {
                x: 0.0,
                y: img.src_top() as f64,
                w: img.width as f64,
                h: img.src_height() as f64,
            });
            scene.push(DrawCmd::Sprite {
                image: ImageId::Pipe,
                src,
                dst: Rect::new(pipe.x, 0.0, PIPE_W, pipe.top),
                flip_y: true,
            });
            scene.push(DrawCmd::Sprite {
                image: ImageId::Pipe,
                src,
                dst: Rect::new(pipe.x, pipe.bottom, PIPE_W, self.height - pipe.bottom),
                flip_y: false,
            });
            return;
        }

        let top_rect = Rect::new(pipe.x, 0.0, PIPE_W, pipe.top);
        let bottom_rect = Rect::new(pipe.x, pipe.bottom, PIPE_W, self.height - pipe.bottom);
        for rect in [top_rect, bottom_rect] {
            scene.push(DrawCmd::FillRect { rect, color: PIPE_FILL });
            scene.push(DrawCmd::StrokeRect {
                rect,
                color: PIPE_STROKE,
                line_width: 3.0,
            });
        }
        scene.push(DrawCmd::FillRect {
            rect: Rect::new(pipe.x - 5.0, pipe.top - 20.0, PIPE_W + 10.0, 20.0),
            color: PIPE_CAP,
        });
        scene.push(DrawCmd::FillRect {
            rect: Rect::new(pipe.x - 5.0, pipe.bottom, PIPE_W + 10.0, 20.0),
            color: PIPE_CAP,
        });
    }

    fn draw_bird(&self, assets: &AssetCatalog, scene: &mut Scene) {
        if let Some(img) = assets.get(ImageId::FlappyBird) {
            // horizontal strip of 3 wing frames
            let sw = img.width as f64 / WING_FRAMES as f64;
            let frame = (self.frame / WING_FRAME_TICKS) % WING_FRAMES;
            scene.push(DrawCmd::Sprite {
                image: ImageId::FlappyBird,
                src: Some(SrcRect {
                    x: frame as f64 * sw,
                    y: 0.0,
                    w: sw,
                    h: img.height as f64,
                }),
                dst: self.bird.rect(),
                flip_y: false,
            });
            return;
        }

        scene.push(DrawCmd::FillCircle {
            cx: self.bird.x + self.bird.w / 2.0,
            cy: self.bird.y + self.bird.h / 2.0,
            r: self.bird.w / 2.0,
            color: BIRD_COLOR,
        });
    }

    fn draw_ground(&self, assets: &AssetCatalog, scene: &mut Scene) {
        // ground draws last so it overlaps the bird's lower edge
        if let Some(img) = assets.get(ImageId::FlappyGround) {
            let gh = img.height as f64;
            scene.tile_x(
                ImageId::FlappyGround,
                img.width as f64,
                self.height - gh,
                gh,
                self.ground_offset,
            );
            return;
        }

        scene.push(DrawCmd::FillRect {
            rect: Rect::new(0.0, self.height - GROUND_H, self.width, GROUND_H),
            color: GROUND_COLOR,
        });
    }
}

impl Default for FlappyGame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    /// A game far from walls and pipes, for isolated physics checks.
    fn airborne_game() -> FlappyGame {
        let mut game = FlappyGame::new();
        game.bird.y = 100.0;
        game
    }

    #[test]
    fn test_gravity_integration_sequence() {
        let mut game = airborne_game();
        let y0 = game.bird.y;
        let mut rng = rng();

        game.tick(&mut rng);
        assert_eq!(game.bird.vy, 0.5);
        assert_eq!(game.bird.y, y0 + 0.5);

        game.tick(&mut rng);
        assert_eq!(game.bird.vy, 1.0);
        assert_eq!(game.bird.y, y0 + 1.5);

        game.tick(&mut rng);
        assert_eq!(game.bird.vy, 1.5);
        assert_eq!(game.bird.y, y0 + 3.0);
    }

    #[test]
    fn test_jump_sets_velocity_not_additive() {
        let mut game = airborne_game();
        game.bird.vy = 3.2;
        game.flap();
        assert_eq!(game.bird.vy, -9.0);

        game.bird.vy = -20.0;
        game.flap();
        assert_eq!(game.bird.vy, -9.0);
    }

    #[test]
    fn test_flap_has_no_effect_while_over() {
        let mut game = airborne_game();
        game.state = RunState::Over;
        game.bird.vy = 2.0;
        game.flap();
        assert_eq!(game.bird.vy, 2.0);
    }

    #[test]
    fn test_ceiling_clamps_and_zeroes_velocity() {
        let mut game = airborne_game();
        game.bird.y = -18.0;
        game.bird.vy = -9.0;
        game.tick(&mut rng());
        assert_eq!(game.bird.y, -20.0);
        assert_eq!(game.bird.vy, 0.0);
        assert_eq!(game.state, RunState::Playing);
    }

    #[test]
    fn test_floor_breach_ends_run() {
        let mut game = airborne_game();
        game.bird.y = game.floor_y() - game.bird.h;
        game.bird.vy = 5.0;
        game.tick(&mut rng());
        assert_eq!(game.state, RunState::Over);
    }

    #[test]
    fn test_pipe_spawns_every_90_ticks() {
        let mut game = FlappyGame::new();
        let mut rng = rng();
        // hold the bird mid-air so the run survives long enough
        for i in 1..=180u64 {
            if game.bird.vy > 0.0 {
                game.flap();
            }
            game.tick(&mut rng);
            let expected = (i / 90) as usize;
            assert_eq!(game.pipes.len(), expected, "tick {i}");
        }
    }

    #[test]
    fn test_gap_spawn_bounds_hold_over_many_draws() {
        let mut game = FlappyGame::new();
        let mut rng = rng();
        for _ in 0..10_000 {
            game.spawn_pipe(&mut rng);
        }
        for pipe in &game.pipes {
            assert!(pipe.top >= GAP_TOP_MIN, "top {} below minimum", pipe.top);
            assert!(
                pipe.top + PIPE_GAP <= game.height - BOTTOM_CLEARANCE,
                "bottom pipe too short: top {}",
                pipe.top
            );
            assert_eq!(pipe.bottom, pipe.top + PIPE_GAP);
        }
    }

    #[test]
    fn test_passing_a_pipe_scores_once() {
        let mut game = FlappyGame::new();
        game.pipes.push(Pipe {
            // one tick from clearing the bird's x
            x: game.bird.x - PIPE_W + 2.0,
            top: 300.0,
            bottom: 300.0 + PIPE_GAP,
            passed: false,
        });
        game.advance_pipes();
        assert_eq!(game.score, 1);
        assert!(game.pipes[0].passed);

        game.advance_pipes();
        assert_eq!(game.score, 1);
    }

    #[test]
    fn test_pipes_despawn_past_left_threshold() {
        let mut game = FlappyGame::new();
        game.pipes.push(Pipe { x: DESPAWN_X + PIPE_SPEED, top: 300.0, bottom: 520.0, passed: true });
        game.advance_pipes();
        assert!(game.pipes.is_empty());
    }

    fn game_with_pipe_at_bird() -> FlappyGame {
        let mut game = FlappyGame::new();
        game.pipes.push(Pipe {
            x: game.bird.x,
            top: 200.0,
            bottom: 200.0 + PIPE_GAP,
            passed: false,
        });
        game
    }

    #[test]
    fn test_bird_inside_gap_survives() {
        let mut game = game_with_pipe_at_bird();
        // center the hitbox inside the gap
        game.bird.y = 250.0;
        game.check_collisions();
        assert_eq!(game.state, RunState::Playing);
    }

    #[test]
    fn test_bird_at_gap_edges_survives() {
        // hitbox top exactly on the gap top edge is still safe
        let mut game = game_with_pipe_at_bird();
        let inset = (BIRD_SIZE * HITBOX_INSET).round();
        game.bird.y = 200.0 - inset;
        assert_eq!(game.bird.hitbox().y, 200.0);
        game.check_collisions();
        assert_eq!(game.state, RunState::Playing);
    }

    #[test]
    fn test_bird_one_pixel_above_gap_collides() {
        let mut game = game_with_pipe_at_bird();
        let inset = (BIRD_SIZE * HITBOX_INSET).round();
        game.bird.y = 200.0 - inset - 1.0;
        assert_eq!(game.bird.hitbox().y, 199.0);
        game.check_collisions();
        assert_eq!(game.state, RunState::Over);
    }

    #[test]
    fn test_bird_one_pixel_below_gap_collides() {
        let mut game = game_with_pipe_at_bird();
        let inset = (BIRD_SIZE * HITBOX_INSET).round();
        // hitbox bottom at gap bottom + 1
        game.bird.y = game.pipes[0].bottom - (BIRD_SIZE - inset) + 1.0;
        game.check_collisions();
        assert_eq!(game.state, RunState::Over);
    }

    #[test]
    fn test_no_collision_without_horizontal_overlap() {
        let mut game = game_with_pipe_at_bird();
        game.pipes[0].x = game.bird.x + 300.0;
        game.bird.y = 0.0; // well outside the gap vertically
        game.check_collisions();
        assert_eq!(game.state, RunState::Playing);
    }

    #[test]
    fn test_over_freezes_pipes_and_bird() {
        let mut game = game_with_pipe_at_bird();
        game.state = RunState::Over;
        let pipes_before = game.pipes.clone();
        let bird_before = game.bird;
        let frame_before = game.frame;

        let mut rng = rng();
        for _ in 0..30 {
            game.tick(&mut rng);
        }
        assert_eq!(game.pipes, pipes_before);
        assert_eq!(game.bird, bird_before);
        assert_eq!(game.frame, frame_before);
    }

    #[test]
    fn test_flap_while_over_restarts() {
        let mut game = FlappyGame::new();
        let mut rng = rng();
        game.score = 4;
        game.state = RunState::Over;

        game.handle_input(Input::Flap);
        assert_eq!(game.state, RunState::Playing);
        assert_eq!(game.score, 0);
        // and the same input already flapped the fresh bird
        assert_eq!(game.bird.vy, -9.0);
        game.tick(&mut rng);
        assert_eq!(game.frame, 1);
    }

    #[test]
    fn test_restart_matches_fresh_start() {
        let mut game = FlappyGame::new();
        let mut rng = rng();
        // play a while, then let the bird drop until the run ends
        for i in 0..300 {
            if i % 25 == 0 {
                game.handle_input(Input::Flap);
            }
            game.tick(&mut rng);
        }
        let mut safety = 0;
        while game.state != RunState::Over {
            game.tick(&mut rng);
            safety += 1;
            assert!(safety < 2_000, "run never ended");
        }

        game.reset();
        let fresh = FlappyGame::new();
        assert_eq!(game.bird, fresh.bird);
        assert_eq!(game.pipes, fresh.pipes);
        assert_eq!(game.frame, fresh.frame);
        assert_eq!(game.score, fresh.score);
        assert_eq!(game.state, fresh.state);
        assert_eq!(game.ground_offset, fresh.ground_offset);
        assert_eq!(game.bg_offset, fresh.bg_offset);
    }

    #[test]
    fn test_scene_falls_back_to_shapes_without_assets() {
        let mut game = game_with_pipe_at_bird();
        game.frame = 12;
        let scene = game.scene(&AssetCatalog::new(), 3);
        assert!(matches!(scene.cmds[0], DrawCmd::Clear));
        assert!(scene
            .cmds
            .iter()
            .any(|c| matches!(c, DrawCmd::Gradient { .. })));
        assert!(scene
            .cmds
            .iter()
            .any(|c| matches!(c, DrawCmd::FillCircle { color, .. } if *color == BIRD_COLOR)));
        assert!(!scene
            .cmds
            .iter()
            .any(|c| matches!(c, DrawCmd::Sprite { .. })));
        assert_eq!(scene.hud.score, 0);
        assert_eq!(scene.hud.best, 3);
    }

    #[test]
    fn test_scene_uses_sprites_when_ready() {
        use crate::sprite::{ImageInfo, VerticalTrim};
        let mut catalog = AssetCatalog::new();
        catalog.insert(
            ImageId::Pipe,
            ImageInfo { width: 52, height: 320, trim: Some(VerticalTrim { top: 4, bottom: 315 }) },
        );
        let game = game_with_pipe_at_bird();
        let scene = game.scene(&catalog, 0);

        let pipe_sprites: Vec<&DrawCmd> = scene
            .cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::Sprite { image: ImageId::Pipe, .. }))
            .collect();
        assert_eq!(pipe_sprites.len(), 2);
        // top half flipped, bottom half not
        assert!(matches!(
            pipe_sprites[0],
            DrawCmd::Sprite { flip_y: true, src: Some(src), .. } if src.y == 4.0 && src.h == 312.0
        ));
        assert!(matches!(pipe_sprites[1], DrawCmd::Sprite { flip_y: false, .. }));
    }

    proptest! {
        /// With no input the bird's velocity grows by exactly the gravity
        /// constant per airborne tick. The starting window keeps the bird
        /// clear of both the ceiling clamp and the floor for the whole run.
        #[test]
        fn prop_velocity_grows_by_gravity(start_vy in -8.0f64..8.0, ticks in 1usize..20) {
            let mut game = airborne_game();
            game.bird.y = 60.0;
            game.bird.vy = start_vy;
            let mut rng = ChaCha8Rng::seed_from_u64(11);

            let mut expected = start_vy;
            let mut expected_y = game.bird.y;
            for _ in 0..ticks {
                game.tick(&mut rng);
                expected += GRAVITY;
                expected_y += expected;
                prop_assert_eq!(game.bird.vy, expected);
                prop_assert_eq!(game.bird.y, expected_y);
            }
        }

        /// Within one run the score only moves up, by at most one per tick.
        #[test]
        fn prop_score_is_monotonic(seed in 0u64..64, flap_every in 10u64..40) {
            let mut game = FlappyGame::new();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut prev = 0u32;
            for i in 0..800u64 {
                if game.state == RunState::Over {
                    break;
                }
                if i % flap_every == 0 {
                    game.flap();
                }
                game.tick(&mut rng);
                prop_assert!(game.score >= prev);
                prop_assert!(game.score - prev <= 1);
                prev = game.score;
            }
        }

        /// Every pipe a long run produces respects the gap bounds.
        #[test]
        fn prop_spawned_gaps_stay_in_bounds(seed in 0u64..256) {
            let mut game = FlappyGame::new();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for _ in 0..200 {
                game.spawn_pipe(&mut rng);
            }
            for pipe in &game.pipes {
                prop_assert!(pipe.top >= GAP_TOP_MIN);
                prop_assert!(pipe.top + PIPE_GAP <= game.height - BOTTOM_CLEARANCE);
            }
        }
    }
}
