//! Level layout: procedural chunks for endless runs, a fixed script for the tutorial

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::state::{CollectibleKind, Enemy, EnemyKind, PlatformKind, World};
use crate::consts::*;
use crate::tuning::{EnemyWeights, GeneratorTuning};

const JUMP_PAD_SIZE: Vec2 = Vec2::new(40.0, 10.0);
const HAZARD_SIZE: Vec2 = Vec2::new(40.0, 20.0);
const COIN_SIZE: f32 = 20.0;
const COIN_LIFT: f32 = 60.0;
const COIN_ROW_SPACING: f32 = 30.0;
const HEALTH_SIZE: f32 = 24.0;
const HEALTH_LIFT: f32 = 90.0;

/// Seeded procedural chunk emitter
#[derive(Debug, Clone)]
pub struct LevelGenerator {
    rng: Pcg32,
    tuning: GeneratorTuning,
    chunks: u32,
}

impl LevelGenerator {
    pub fn new(seed: u64, tuning: GeneratorTuning) -> Self {
        debug_assert!(tuning.validate().is_ok(), "generator tuning must be validated");
        Self {
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            chunks: 0,
        }
    }

    pub fn tuning(&self) -> &GeneratorTuning {
        &self.tuning
    }

    /// Chunks emitted so far
    pub fn chunks(&self) -> u32 {
        self.chunks
    }

    /// Append one chunk of platforms, enemies and collectibles starting at `start_x`
    pub fn generate_chunk(&mut self, start_x: f32, world: &mut World) {
        let Self { rng, tuning, .. } = self;
        let mut cursor = start_x;
        let mut enemies = 0;
        let mut collectibles = 0;

        for _ in 0..tuning.segments_per_chunk {
            let gap = tuning.gap.sample(rng);
            let width = tuning.width.sample(rng);
            let top = VIEW_HEIGHT - tuning.rise.sample(rng);
            let x = cursor + gap;
            let center_x = x + width / 2.0;

            debug_assert!(
                world.frontier().is_none_or(|edge| x > edge),
                "chunk segment must start right of the frontier"
            );

            // Pads and hazards sit centred on top of the upcoming platform
            if rng.random_bool(tuning.jump_pad_chance) {
                world.add_platform(
                    Rect::new(
                        center_x - JUMP_PAD_SIZE.x / 2.0,
                        top - JUMP_PAD_SIZE.y,
                        JUMP_PAD_SIZE.x,
                        JUMP_PAD_SIZE.y,
                    ),
                    PlatformKind::JumpPad,
                );
            }
            if rng.random_bool(tuning.hazard_chance) {
                world.add_platform(
                    Rect::new(
                        center_x - HAZARD_SIZE.x / 2.0,
                        top - HAZARD_SIZE.y,
                        HAZARD_SIZE.x,
                        HAZARD_SIZE.y,
                    ),
                    PlatformKind::Hazard,
                );
            }

            // Main segment goes last so it stays the frontier
            world.add_platform(
                Rect::new(x, top, width, tuning.platform_height),
                PlatformKind::Platform,
            );

            if width > tuning.enemy_min_width && rng.random_bool(tuning.enemy_chance) {
                let kind = pick_enemy_kind(rng, &tuning.enemy_weights);
                let id = world.ids.next_id();
                world.enemies.push(spawn_enemy(id, kind, x, top, width));
                enemies += 1;
            }

            if width > tuning.coin_min_width && rng.random_bool(tuning.coin_chance) {
                let coin_y = top - COIN_LIFT;
                if rng.random_bool(tuning.single_coin_chance) {
                    world.add_collectible(
                        Rect::new(center_x - COIN_SIZE / 2.0, coin_y, COIN_SIZE, COIN_SIZE),
                        CollectibleKind::Coin,
                    );
                    collectibles += 1;
                } else {
                    for k in 0..3 {
                        let coin_x = center_x - 40.0 + k as f32 * COIN_ROW_SPACING;
                        world.add_collectible(
                            Rect::new(coin_x, coin_y, COIN_SIZE, COIN_SIZE),
                            CollectibleKind::Coin,
                        );
                    }
                    collectibles += 3;
                }
            }

            if rng.random_bool(tuning.health_chance) {
                world.add_collectible(
                    Rect::new(center_x, top - HEALTH_LIFT, HEALTH_SIZE, HEALTH_SIZE),
                    CollectibleKind::Health,
                );
                collectibles += 1;
            }

            cursor = x + width;
        }

        self.chunks += 1;
        log::debug!(
            "Chunk {} at x={:.0}..{:.0}: {} enemies, {} collectibles",
            self.chunks,
            start_x,
            cursor,
            enemies,
            collectibles
        );
    }
}

/// Weighted choice between the three enemy kinds
fn pick_enemy_kind<R: Rng>(rng: &mut R, weights: &EnemyWeights) -> EnemyKind {
    let roll = rng.random_range(0.0..weights.total());
    if roll < weights.patrol {
        EnemyKind::Patrol
    } else if roll < weights.patrol + weights.floater {
        EnemyKind::Floater
    } else {
        EnemyKind::Seeker
    }
}

/// Place an enemy centred on top of a platform
fn spawn_enemy(id: u32, kind: EnemyKind, platform_x: f32, platform_top: f32, width: f32) -> Enemy {
    let y = platform_top - ENEMY_SIZE;
    Enemy {
        id,
        rect: Rect::new(
            platform_x + width / 2.0 - ENEMY_SIZE / 2.0,
            y,
            ENEMY_SIZE,
            ENEMY_SIZE,
        ),
        // Seekers pick their velocity every tick
        vx: if kind == EnemyKind::Seeker {
            0.0
        } else {
            PATROL_SPEED
        },
        patrol_start_x: platform_x,
        patrol_end_x: platform_x + width,
        start_y: (kind == EnemyKind::Floater).then_some(y - FLOAT_LIFT),
        kind,
    }
}

/// Starting ground plus the first chunk
pub fn build_endless(generator: &mut LevelGenerator, world: &mut World) {
    world.add_platform(
        Rect::new(0.0, VIEW_HEIGHT - 80.0, 800.0, 80.0),
        PlatformKind::Ground,
    );
    generator.generate_chunk(800.0, world);
}

/// Hand-authored tutorial course
pub fn build_tutorial(world: &mut World) {
    use PlatformKind::*;

    // Run and jump
    world.add_platform(Rect::new(0.0, 600.0, 800.0, 60.0), Ground);
    world.add_platform(Rect::new(950.0, 600.0, 400.0, 60.0), Ground);
    // Double jump up to a floating step
    world.add_platform(Rect::new(1450.0, 500.0, 100.0, 20.0), Platform);
    world.add_platform(Rect::new(1700.0, 400.0, 500.0, 60.0), Ground);
    world.add_platform(Rect::new(2400.0, 400.0, 600.0, 60.0), Ground);

    // Wall jump corridor
    world.add_platform(Rect::new(3100.0, 200.0, 40.0, 400.0), Platform);
    world.add_platform(Rect::new(3250.0, 200.0, 40.0, 400.0), Platform);
    world.add_platform(Rect::new(3400.0, 500.0, 200.0, 40.0), Ground);

    // Jump pad up to the high ground
    world.add_platform(Rect::new(3700.0, 500.0, 60.0, 20.0), JumpPad);
    world.add_platform(Rect::new(3800.0, 200.0, 200.0, 40.0), Ground);

    world.add_collectible(Rect::new(1100.0, 550.0, 20.0, 20.0), CollectibleKind::Coin);

    let id = world.ids.next_id();
    world.enemies.push(Enemy {
        id,
        rect: Rect::new(2600.0, 360.0, ENEMY_SIZE, ENEMY_SIZE),
        vx: 0.0,
        patrol_start_x: 2600.0,
        patrol_end_x: 2600.0,
        start_y: None,
        kind: EnemyKind::Patrol,
    });

    world.add_platform(Rect::new(4200.0, 350.0, 50.0, 300.0), Finish);
}

/// On-screen instruction for the tutorial, chosen by how far the player got
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TutorialHint {
    Move,
    Jump,
    DoubleJump,
    Dash,
    WallJump,
    JumpPad,
    Finish,
}

impl TutorialHint {
    pub fn for_position(x: f32) -> Self {
        match x {
            x if x < 600.0 => TutorialHint::Move,
            x if x < 1200.0 => TutorialHint::Jump,
            x if x < 1800.0 => TutorialHint::DoubleJump,
            x if x < 2800.0 => TutorialHint::Dash,
            x if x < 3300.0 => TutorialHint::WallJump,
            x if x < 3800.0 => TutorialHint::JumpPad,
            _ => TutorialHint::Finish,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            TutorialHint::Move => "Arrow Keys / WASD to Move",
            TutorialHint::Jump => "Space / Up to Jump",
            TutorialHint::DoubleJump => "Press Jump in air to Double Jump",
            TutorialHint::Dash => "Press Shift or Z to Dash!",
            TutorialHint::WallJump => "Hold against wall & Jump to Wall Jump!",
            TutorialHint::JumpPad => "Bounce on Jump Pads!",
            TutorialHint::Finish => "Reach the wall to finish!",
        }
    }
}
