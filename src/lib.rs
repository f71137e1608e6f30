//! Gecko Dash - side-scrolling platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, enemies, level generation)
//! - `scheduler`: Fixed-timestep frame loop and the collaborator interfaces
//! - `platform`: Input abstraction (held actions to edge-triggered tick input)
//! - `settings`: Seed, effect quality and generator tuning
//! - `tuning`: Data-driven level generation ranges

pub mod platform;
pub mod scheduler;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use scheduler::Scheduler;
pub use settings::{ConfigError, QualityPreset, Settings};

/// Game configuration constants
///
/// All velocities are in pixels per tick, accelerations in pixels per tick².
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed to the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Gravity added to vertical velocity every tick
    pub const GRAVITY: f32 = 0.6;
    /// Multiplicative horizontal damping applied every tick
    pub const FRICTION: f32 = 0.85;
    /// Horizontal acceleration while a direction is held
    pub const MOVE_SPEED: f32 = 0.8;
    pub const JUMP_FORCE: f32 = -14.0;
    pub const DOUBLE_JUMP_FORCE: f32 = -12.0;
    pub const JUMP_PAD_FORCE: f32 = -22.0;

    /// Dash
    pub const DASH_SPEED: f32 = 15.0;
    /// Ticks a dash lasts (~160ms)
    pub const DASH_DURATION: u32 = 10;
    /// Ticks before the next dash may start (1 second)
    pub const DASH_COOLDOWN: u32 = 60;

    /// Wall interaction
    pub const WALL_JUMP_FORCE_X: f32 = 10.0;
    pub const WALL_JUMP_FORCE_Y: f32 = -13.0;
    pub const WALL_SLIDE_SPEED: f32 = 2.0;
    pub const WALL_SLIDE_GRAVITY_SCALE: f32 = 0.3;
    /// Per-tick chance of a dust particle while wall sliding
    pub const WALL_DUST_CHANCE: f64 = 0.2;

    /// Knockbacks
    pub const HAZARD_BOUNCE: f32 = -10.0;
    pub const HAZARD_PUSHBACK: f32 = 2.0;
    pub const STOMP_BOUNCE: f32 = -10.0;
    pub const ENEMY_HIT_BOUNCE_X: f32 = 10.0;
    pub const ENEMY_HIT_BOUNCE_Y: f32 = -8.0;

    /// Collision side disambiguation bands
    pub const VERTICAL_TOLERANCE: f32 = 15.0;
    pub const SIDE_TOLERANCE: f32 = 10.0;
    pub const STOMP_TOLERANCE: f32 = 10.0;

    /// View / world
    pub const VIEW_WIDTH: f32 = 1280.0;
    pub const VIEW_HEIGHT: f32 = 720.0;
    /// Falling below this y leaves the world
    pub const WORLD_BOTTOM: f32 = VIEW_HEIGHT;

    /// Player
    pub const PLAYER_WIDTH: f32 = 30.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;
    pub const PLAYER_SPAWN_X: f32 = 100.0;
    pub const PLAYER_SPAWN_Y: f32 = 300.0;
    pub const START_HEALTH: u32 = 3;

    /// Progress
    /// World units per metre of distance
    pub const DISTANCE_SCALE: f32 = 100.0;
    /// Distance stat is only pushed on multiples of this
    pub const DISTANCE_PUSH_STEP: u32 = 5;
    /// Score interval between upgrade-selection pauses
    pub const LEVEL_MILESTONE: u32 = 500;
    pub const STOMP_SCORE: u32 = 10;

    /// Camera
    pub const CAMERA_LEAD: f32 = 200.0;
    pub const CAMERA_EASING: f32 = 0.1;

    /// Entities further than this behind the camera's left edge are pruned
    pub const PRUNE_MARGIN: f32 = 200.0;
    /// Platforms are only pruned once the list grows past this
    pub const PLATFORM_PRUNE_THRESHOLD: usize = 50;
    /// Generate more level once the rightmost platform ends within this of the view
    pub const GENERATION_LOOKAHEAD: f32 = 200.0;

    /// Enemies
    pub const ENEMY_SIZE: f32 = 40.0;
    pub const PATROL_SPEED: f32 = 2.0;
    pub const SEEKER_SPEED: f32 = 3.0;
    pub const SEEKER_DETECTION_RADIUS: f32 = 400.0;
    pub const FLOAT_AMPLITUDE: f32 = 50.0;
    pub const FLOAT_ANGULAR_SPEED: f32 = 0.05;
    /// Floater origin sits this far above its resting spot
    pub const FLOAT_LIFT: f32 = 50.0;

    /// Effects
    pub const PARTICLE_DECAY: f32 = 0.05;
    pub const PARTICLE_SPREAD: f32 = 5.0;
    pub const TRAIL_START_ALPHA: f32 = 0.6;
    pub const TRAIL_DECAY: f32 = 0.05;
}
