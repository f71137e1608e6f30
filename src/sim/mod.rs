//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (append order, removals applied after each scan)
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod effects;
pub mod enemy;
pub mod level;
pub mod rect;
pub mod state;
pub mod tick;

pub use camera::Camera;
pub use collision::{CollisionResult, Contact, solid_collision};
pub use effects::Effects;
pub use enemy::{EnemyHit, classify_hit, update_enemy};
pub use level::{LevelGenerator, TutorialHint, build_endless, build_tutorial};
pub use rect::Rect;
pub use state::{
    Collectible, CollectibleKind, DashState, DashTrail, Enemy, EnemyKind, Facing, GameEvent,
    GameState, LevelMode, Particle, ParticleKind, PhaseRequest, Platform, PlatformKind, Player,
    RunPhase, Stats, Support, WallSide, World,
};
pub use tick::{TickInput, tick};
