use crate::geom::Rect;
use crate::renderer::Input;
use crate::scene::{Color, DrawCmd, Hud, Scene, SrcRect};
use crate::sprite::{AssetCatalog, ImageId, SpriteMetrics};
use rand::Rng;

pub const CANVAS_W: f64 = 800.0;
pub const CANVAS_H: f64 = 300.0;

const GRAVITY: f64 = 0.7;
const JUMP_IMPULSE: f64 = -12.0;

const RUNNER_X: f64 = 50.0;
const RUNNER_SIZE: f64 = 60.0;
// hitbox padding for fairness: symmetric horizontally, lighter under foot
const PAD_X: f64 = 6.0;
const PAD_TOP: f64 = 6.0;
const PAD_BOTTOM: f64 = 1.2;
const RUN_FRAME_TICKS: u64 = 6;

const GROUND_H: f64 = 28.0;
/// Sprites sit this far into the ground band so they read as standing on it.
const GROUND_NUDGE: f64 = 21.0;

const BASE_SPEED: f64 = 8.0;
const SPEED_STEP_DISTANCE: f64 = 1000.0;
const SCORE_DISTANCE: f64 = 10.0;

// obstacles enter this far past the right edge
const SPAWN_MARGIN: f64 = 40.0;
const CLUSTER_MARGIN: f64 = 140.0;
const CLUSTER_CHANCE: f64 = 0.25;
const DESPAWN_X: f64 = -120.0;
pub const GAP_MIN_PX: f64 = 260.0;
pub const GAP_SPAN_PX: f64 = 140.0;
pub const MIN_SPAWN_TICKS: u32 = 30;
const FIRST_SPAWN_MIN: u32 = 48;
const FIRST_SPAWN_MAX: u32 = 120;

const GROUND_COLOR: Color = Color("#f5f5f5");
const GROUND_TILE_COLOR: Color = Color("#ddd");
const CACTUS_FILL: Color = Color("#3aa21e");
const CACTUS_CAP: Color = Color("#2f8f1a");
const RUNNER_COLOR: Color = Color("#1f1f1f");
const SCORE_COLOR: Color = Color("#222");
const SCORE_FONT: &str = "20px monospace";

/// Animation/state tag for the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pose {
    Running,
    Jumping,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Single tall cactus.
    Single,
    /// Double cactus, sometimes trailed by a small single.
    Double,
    /// Low wide bush.
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub x: f64,
    pub w: f64,
    /// Fallback height when no sprite metrics are available.
    pub h: f64,
    pub kind: ObstacleKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Runner {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub vy: f64,
    pub airborne: bool,
}

impl Runner {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn hitbox(&self) -> Rect {
        self.rect().inset(PAD_X, PAD_TOP, PAD_BOTTOM)
    }
}

pub struct DinoGame {
    pub width: f64,
    pub height: f64,
    pub runner: Runner,
    pub obstacles: Vec<Obstacle>,
    pub frame: u64,
    pub distance: f64,
    pub score: u32,
    pub dead: bool,
    pub ground_offset: f64,
    spawn_countdown: u32,
    /// Cactus sprite measurements resolved once at run start; collision
    /// heights stay stable for the whole run.
    cactus: Option<SpriteMetrics>,
}

impl DinoGame {
    pub fn new(cactus: Option<SpriteMetrics>, rng: &mut impl Rng) -> Self {
        Self::with_size(CANVAS_W, CANVAS_H, cactus, rng)
    }

    pub fn with_size(
        width: f64,
        height: f64,
        cactus: Option<SpriteMetrics>,
        rng: &mut impl Rng,
    ) -> Self {
        let ground_y = height - GROUND_H;
        Self {
            width,
            height,
            runner: Runner {
                x: RUNNER_X,
                y: ground_y - RUNNER_SIZE + GROUND_NUDGE,
                w: RUNNER_SIZE,
                h: RUNNER_SIZE,
                vy: 0.0,
                airborne: false,
            },
            obstacles: Vec::new(),
            frame: 0,
            distance: 0.0,
            score: 0,
            dead: false,
            ground_offset: 0.0,
            // randomize the first spawn so it is neither immediate nor fixed
            spawn_countdown: rng.gen_range(FIRST_SPAWN_MIN..FIRST_SPAWN_MAX),
            cactus,
        }
    }

    /// Top of the ground band.
    pub fn ground_y(&self) -> f64 {
        self.height - GROUND_H
    }

    /// Line the runner's feet rest on.
    fn contact_y(&self) -> f64 {
        self.ground_y() + GROUND_NUDGE
    }

    /// Run speed grows with cumulative distance, one px/tick per 1000px.
    pub fn speed(&self) -> f64 {
        BASE_SPEED + (self.distance / SPEED_STEP_DISTANCE).floor()
    }

    pub fn pose(&self) -> Pose {
        if self.dead {
            Pose::Dead
        } else if self.airborne() {
            Pose::Jumping
        } else {
            Pose::Running
        }
    }

    fn airborne(&self) -> bool {
        self.runner.airborne
    }

    fn grounded(&self) -> bool {
        self.runner.rect().bottom() >= self.contact_y() - 1.0
    }

    /// Jump only from the ground; holding or mashing mid-air does nothing.
    pub fn jump(&mut self) {
        if self.dead || !self.grounded() {
            return;
        }
        self.runner.vy = JUMP_IMPULSE;
        self.runner.airborne = true;
    }

    pub fn handle_input(&mut self, input: Input) {
        if input == Input::Flap {
            self.jump();
        }
    }

    /// One simulation step. The caller renders after every tick; once `dead`
    /// flips the caller renders that death frame and tears the loop down.
    pub fn tick(&mut self, rng: &mut impl Rng) {
        if self.dead {
            return;
        }
        let speed = self.speed();
        self.frame += 1;

        self.ground_offset += speed;
        for obstacle in &mut self.obstacles {
            obstacle.x -= speed;
        }

        if self.spawn_countdown == 0 {
            self.spawn(rng);
        } else {
            self.spawn_countdown -= 1;
        }

        self.obstacles.retain(|o| o.x >= DESPAWN_X);

        self.distance += speed;
        self.score = (self.distance / SCORE_DISTANCE).floor() as u32;

        self.runner.y += self.runner.vy;
        self.runner.vy += GRAVITY;
        if self.runner.rect().bottom() >= self.contact_y() {
            self.runner.y = self.contact_y() - self.runner.h;
            self.runner.vy = 0.0;
            self.runner.airborne = false;
        }

        self.check_collisions();
    }

    fn spawn(&mut self, rng: &mut impl Rng) {
        let spawn_x = self.width + SPAWN_MARGIN;
        let variant: f64 = rng.gen();
        if variant < 0.5 {
            self.obstacles.push(Obstacle {
                x: spawn_x,
                w: rng.gen_range(16.0f64..22.0).floor(),
                h: 36.0,
                kind: ObstacleKind::Single,
            });
        } else if variant < 0.7 {
            self.obstacles.push(Obstacle {
                x: spawn_x,
                w: rng.gen_range(14.0f64..20.0).floor(),
                h: 36.0,
                kind: ObstacleKind::Double,
            });
            // occasionally trail the pair with a smaller one
            if rng.gen::<f64>() < CLUSTER_CHANCE {
                self.obstacles.push(Obstacle {
                    x: self.width + CLUSTER_MARGIN,
                    w: rng.gen_range(12.0f64..18.0).floor(),
                    h: 32.0,
                    kind: ObstacleKind::Single,
                });
            }
        } else {
            self.obstacles.push(Obstacle {
                x: spawn_x,
                w: rng.gen_range(24.0f64..36.0).floor(),
                h: 24.0,
                kind: ObstacleKind::Low,
            });
        }

        // pick the next spawn from a desired pixel gap so spacing stays
        // visually consistent as the run speeds up
        let gap_px = GAP_MIN_PX + rng.gen::<f64>() * GAP_SPAN_PX;
        self.spawn_countdown = ((gap_px / self.speed()).floor() as u32).max(MIN_SPAWN_TICKS);
    }

    pub fn spawn_countdown(&self) -> u32 {
        self.spawn_countdown
    }

    /// Collision height of an obstacle: the cactus sprite's trimmed height
    /// scaled to the obstacle's width, or the archetype height without one.
    pub fn obstacle_height(&self, obstacle: &Obstacle) -> f64 {
        match self.cactus {
            Some(metrics) => metrics.scaled_height(obstacle.w),
            None => obstacle.h,
        }
    }

    pub fn obstacle_rect(&self, obstacle: &Obstacle) -> Rect {
        let h = self.obstacle_height(obstacle);
        Rect::new(
            obstacle.x,
            self.ground_y() - h + GROUND_NUDGE,
            obstacle.w,
            h,
        )
    }

    fn check_collisions(&mut self) {
        let hitbox = self.runner.hitbox();
        for i in 0..self.obstacles.len() {
            let rect = self.obstacle_rect(&self.obstacles[i]);
            if hitbox.intersects(&rect) {
                self.dead = true;
                // stop physics so the runner doesn't sink through the ground
                self.runner.vy = 0.0;
                self.runner.airborne = false;
                return;
            }
        }
    }

    pub fn scene(&self, assets: &AssetCatalog, best: u32) -> Scene {
        let mut scene = Scene::new(
            self.width,
            self.height,
            Hud {
                score: self.score,
                best,
                over: self.dead,
            },
        );

        self.draw_ground(assets, &mut scene);
        for obstacle in &self.obstacles {
            self.draw_obstacle(assets, &mut scene, obstacle);
        }
        self.draw_runner(assets, &mut scene);

        scene.push(DrawCmd::Text {
            text: format!("Score: {}", self.score),
            x: (self.width - 180.0).max(10.0),
            y: 28.0,
            color: SCORE_COLOR,
            font: SCORE_FONT,
        });
        scene
    }

    fn draw_ground(&self, assets: &AssetCatalog, scene: &mut Scene) {
        if let Some(img) = assets.get(ImageId::DinoGround) {
            scene.tile_x(
                ImageId::DinoGround,
                img.width as f64,
                self.ground_y(),
                img.height as f64,
                self.ground_offset,
            );
            return;
        }

        scene.push(DrawCmd::FillRect {
            rect: Rect::new(0.0, self.ground_y(), self.width, self.height - self.ground_y()),
            color: GROUND_COLOR,
        });
        // sparse tile marks scrolling with the run
        for i in -2..30 {
            let rx = (((i as f64 * 40.0 - self.ground_offset) % 1000.0) + 1000.0) % 1000.0;
            scene.push(DrawCmd::FillRect {
                rect: Rect::new(rx, self.ground_y(), 40.0, 6.0),
                color: GROUND_TILE_COLOR,
            });
        }
    }

    fn draw_obstacle(&self, assets: &AssetCatalog, scene: &mut Scene, obstacle: &Obstacle) {
        let rect = self.obstacle_rect(obstacle);
        let dst = Rect::new(obstacle.x.round(), rect.y, rect.w, rect.h);
        if let Some(img) = assets.get(ImageId::Cactus) {
            scene.push(DrawCmd::Sprite {
                image: ImageId::Cactus,
                src: Some(SrcRect {
                    x: 0.0,
                    y: img.src_top() as f64,
                    w: img.width as f64,
                    h: img.src_height() as f64,
                }),
                dst,
                flip_y: false,
            });
            return;
        }

        scene.push(DrawCmd::FillRect { rect: dst, color: CACTUS_FILL });
        scene.push(DrawCmd::FillRect {
            rect: Rect::new(dst.x - 2.0, dst.y - 4.0, dst.w + 4.0, 6.0),
            color: CACTUS_CAP,
        });
    }

    fn draw_runner(&self, assets: &AssetCatalog, scene: &mut Scene) {
        let dst = self.runner.rect();
        let sprite = match self.pose() {
            Pose::Dead => assets
                .contains(ImageId::DinoLose)
                .then_some(ImageId::DinoLose)
                .or_else(|| self.running_sprite(assets)),
            Pose::Running => self.running_sprite(assets),
            Pose::Jumping => assets
                .contains(ImageId::DinoStationary)
                .then_some(ImageId::DinoStationary),
        };

        match sprite {
            Some(image) => scene.push(DrawCmd::Sprite {
                image,
                src: None,
                dst,
                flip_y: false,
            }),
            None => scene.push(DrawCmd::FillRect { rect: dst, color: RUNNER_COLOR }),
        }
    }

    fn running_sprite(&self, assets: &AssetCatalog) -> Option<ImageId> {
        let frame = if (self.frame / RUN_FRAME_TICKS) % 2 == 0 {
            ImageId::DinoRun0
        } else {
            ImageId::DinoRun1
        };
        if assets.contains(frame) {
            Some(frame)
        } else if assets.contains(ImageId::DinoStationary) {
            Some(ImageId::DinoStationary)
        } else {
            None
        }
    }
}
