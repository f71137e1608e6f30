//! Game state and core simulation types
//!
//! Everything the tick function mutates lives in [`GameState`]: it is created
//! at level load, mutated once per tick, and dropped at level teardown.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::effects::Effects;
use super::level::{self, LevelGenerator, TutorialHint};
use super::rect::Rect;
use crate::Settings;
use crate::consts::*;

/// Overall run state, owned by the external run-state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunPhase {
    Menu,
    Tutorial,
    Playing,
    Paused,
    /// Upgrade selection between score milestones
    LevelTransition,
    GameOver,
    Options,
}

impl RunPhase {
    /// Only these phases advance the simulation
    pub fn is_simulating(self) -> bool {
        matches!(self, RunPhase::Playing | RunPhase::Tutorial)
    }

    /// Transition table for the run state machine
    pub fn can_transition_to(self, next: RunPhase) -> bool {
        use RunPhase::*;
        match self {
            Menu => matches!(next, Tutorial | Playing | Options),
            Options => next == Menu,
            Tutorial => matches!(next, Paused | Menu),
            Playing => matches!(next, Paused | LevelTransition | GameOver | Menu),
            Paused => matches!(next, Playing | Tutorial | Menu),
            LevelTransition => next == Playing,
            GameOver => matches!(next, Playing | Menu),
        }
    }
}

/// Transition the core asks the run-state machine for.
///
/// Ordered by priority: when several happen in one tick the greatest wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PhaseRequest {
    /// Score milestone reached, pause for upgrade selection
    LevelTransition,
    /// Finish zone reached, back to the menu
    LevelComplete,
    /// Health ran out or the player fell out of the world
    GameOver,
}

impl PhaseRequest {
    pub fn target(self) -> RunPhase {
        match self {
            PhaseRequest::LevelTransition => RunPhase::LevelTransition,
            PhaseRequest::LevelComplete => RunPhase::Menu,
            PhaseRequest::GameOver => RunPhase::GameOver,
        }
    }
}

/// Which level script a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelMode {
    /// Procedurally generated, scored, can end in game over
    Endless,
    /// Fixed layout; falls respawn and death is disabled
    Tutorial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Side of the player a touched wall is on.
///
/// Sign convention: `Right` is +1 and `Left` is -1. A wall jump pushes along
/// `-sign`, i.e. always away from the wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSide {
    Left,
    Right,
}

impl WallSide {
    pub fn sign(self) -> f32 {
        match self {
            WallSide::Left => -1.0,
            WallSide::Right => 1.0,
        }
    }

    /// Direction the player faces after jumping off this wall
    pub fn away(self) -> Facing {
        match self {
            WallSide::Left => Facing::Right,
            WallSide::Right => Facing::Left,
        }
    }
}

/// What the player rested against at the end of the last collision pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Support {
    #[default]
    Airborne,
    Grounded,
    OnWall(WallSide),
}

/// The player's gecko
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub support: Support,
    pub facing: Facing,
    /// One extra jump per airborne excursion
    pub double_jump_ready: bool,
}

impl Player {
    pub fn spawn(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            support: Support::Airborne,
            facing: Facing::Right,
            double_jump_ready: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn is_grounded(&self) -> bool {
        self.support == Support::Grounded
    }

    pub fn wall(&self) -> Option<WallSide> {
        match self.support {
            Support::OnWall(side) => Some(side),
            _ => None,
        }
    }

    /// Signed wall contact: 0 none, +1 wall on the right, -1 wall on the left
    pub fn wall_contact(&self) -> i8 {
        match self.wall() {
            Some(WallSide::Right) => 1,
            Some(WallSide::Left) => -1,
            None => 0,
        }
    }

    /// Record a wall touch unless something already grounded us this tick
    pub fn touch_wall(&mut self, side: WallSide) {
        if !self.is_grounded() {
            self.support = Support::OnWall(side);
        }
    }

    /// Bottom-centre point, where jump dust appears
    pub fn feet(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x / 2.0, self.pos.y + self.size.y)
    }
}

/// Dash state machine.
///
/// | from        | event          | to                          |
/// |-------------|----------------|-----------------------------|
/// | `Ready`     | dash pressed   | `Active { DURATION, COOLDOWN }` |
/// | `Active`    | tick           | `Active` (both counters -1) |
/// | `Active`    | timer hits 0   | `Cooldown` or `Ready`       |
/// | `Cooldown`  | tick           | `Cooldown` or `Ready`       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DashState {
    #[default]
    Ready,
    Active { remaining: u32, cooldown: u32 },
    Cooldown { remaining: u32 },
}

/// What happened to the dash during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashStep {
    Idle,
    Dashing,
    /// The dash ran out this tick
    Ended,
}

impl DashState {
    pub fn is_active(&self) -> bool {
        matches!(self, DashState::Active { .. })
    }

    /// Ticks until a new dash may start
    pub fn cooldown(&self) -> u32 {
        match *self {
            DashState::Ready => 0,
            DashState::Active { cooldown, .. } => cooldown,
            DashState::Cooldown { remaining } => remaining,
        }
    }

    /// Start a dash if one is allowed. Returns false when gated.
    pub fn try_start(&mut self) -> bool {
        if *self != DashState::Ready {
            return false;
        }
        *self = DashState::Active {
            remaining: DASH_DURATION,
            cooldown: DASH_COOLDOWN,
        };
        true
    }

    /// Advance both counters by one tick
    pub fn step(&mut self) -> DashStep {
        match *self {
            DashState::Ready => DashStep::Idle,
            DashState::Active {
                remaining,
                cooldown,
            } => {
                let remaining = remaining.saturating_sub(1);
                let cooldown = cooldown.saturating_sub(1);
                if remaining == 0 {
                    *self = Self::cooling(cooldown);
                    DashStep::Ended
                } else {
                    *self = DashState::Active {
                        remaining,
                        cooldown,
                    };
                    DashStep::Dashing
                }
            }
            DashState::Cooldown { remaining } => {
                *self = Self::cooling(remaining.saturating_sub(1));
                DashStep::Idle
            }
        }
    }

    fn cooling(remaining: u32) -> Self {
        if remaining == 0 {
            DashState::Ready
        } else {
            DashState::Cooldown { remaining }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Ground,
    Platform,
    Hazard,
    Finish,
    JumpPad,
}

/// A static piece of level geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub rect: Rect,
    pub kind: PlatformKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Patrol,
    Seeker,
    Floater,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub rect: Rect,
    /// Horizontal velocity (pixels per tick)
    pub vx: f32,
    pub patrol_start_x: f32,
    pub patrol_end_x: f32,
    /// Float origin, floaters only
    pub start_y: Option<f32>,
    pub kind: EnemyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Coin,
    Health,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub rect: Rect,
    pub kind: CollectibleKind,
    pub collected: bool,
}

/// Colour class of a particle; the renderer owns the palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Jump,
    DoubleJump,
    WallJump,
    WallDust,
    Dash,
    JumpPad,
    Hazard,
    EnemyDefeat,
    Damage,
    Coin,
    Heal,
    HealFull,
}

/// A cosmetic particle (no gameplay effect)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases every tick
    pub life: f32,
    pub kind: ParticleKind,
}

/// Afterimage left behind while dashing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashTrail {
    pub rect: Rect,
    pub facing: Facing,
    pub alpha: f32,
}

/// Run statistics. Owned by the external store; the core keeps a working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub score: u32,
    pub distance: u32,
    pub coins: u32,
    pub health: u32,
    pub max_health: u32,
    pub level: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            score: 0,
            distance: 0,
            coins: 0,
            health: START_HEALTH,
            max_health: START_HEALTH,
            level: 1,
        }
    }
}

impl Stats {
    /// Lose health, never below zero. Returns true if this emptied it.
    pub fn damage(&mut self, amount: u32) -> bool {
        let before = self.health;
        self.health = self.health.saturating_sub(amount);
        before > 0 && self.health == 0
    }

    /// Gain health up to the maximum. Returns true if anything was healed.
    pub fn heal(&mut self, amount: u32) -> bool {
        let healed = self.health.saturating_add(amount).min(self.max_health);
        if healed <= self.health {
            return false;
        }
        self.health = healed;
        true
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Take health and max health from the authoritative store
    pub fn mirror_health(&mut self, external: &Stats) {
        self.max_health = external.max_health;
        self.health = external.health.min(external.max_health);
    }
}

/// Something that happened during a tick, for external audio/UI layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    DoubleJumped,
    WallJumped { side: WallSide },
    DashStarted,
    JumpPadBounce,
    Hurt { health: u32 },
    EnemyDefeated { kind: EnemyKind, stomped: bool },
    CoinCollected,
    HealthCollected { healed: bool },
    /// Tutorial fall, player put back at the start
    Respawned,
    LevelComplete,
    Milestone { level: u32 },
    GameOver,
}

/// Monotonic entity id source
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Level entities, in append order
#[derive(Debug, Clone, Default)]
pub struct World {
    /// The last element is always the rightmost generated platform
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub collectibles: Vec<Collectible>,
    pub ids: IdAllocator,
}

impl World {
    pub fn add_platform(&mut self, rect: Rect, kind: PlatformKind) -> u32 {
        let id = self.ids.next_id();
        self.platforms.push(Platform { id, rect, kind });
        id
    }

    pub fn add_collectible(&mut self, rect: Rect, kind: CollectibleKind) -> u32 {
        let id = self.ids.next_id();
        self.collectibles.push(Collectible {
            id,
            rect,
            kind,
            collected: false,
        });
        id
    }

    /// Right edge of the rightmost generated platform
    pub fn frontier(&self) -> Option<f32> {
        self.platforms.last().map(|p| p.rect.right())
    }
}

/// Complete simulation context for one level
#[derive(Debug, Clone)]
pub struct GameState {
    pub mode: LevelMode,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter
    pub frame: u64,
    pub player: Player,
    pub spawn: Vec2,
    pub dash: DashState,
    pub world: World,
    pub generator: LevelGenerator,
    /// Visual particles and trails (not gameplay-affecting)
    pub effects: Effects,
    pub camera: Camera,
    /// Working copy of the external stats
    pub stats: Stats,
    /// Best whole-metre distance reached this level
    pub best_distance: u32,
    /// Score carried in from before this level started
    pub base_score: u32,
    /// Score earned from defeating enemies
    pub bonus_score: u32,
    /// Next score that triggers a level transition
    pub next_milestone: u32,
    pub hint: Option<TutorialHint>,
    /// Drained by the scheduler every frame
    pub events: Vec<GameEvent>,
    /// Highest-priority transition requested during the current tick
    pub(crate) request: Option<PhaseRequest>,
}

impl GameState {
    /// Create a level and lay it out. Must complete before the first tick.
    pub fn new(mode: LevelMode, stats: Stats, settings: &Settings) -> Self {
        let spawn = Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y);
        let mut stats = stats;
        stats.health = stats.health.min(stats.max_health);
        let mut state = Self {
            mode,
            seed: settings.seed,
            frame: 0,
            player: Player::spawn(spawn),
            spawn,
            dash: DashState::Ready,
            world: World::default(),
            generator: LevelGenerator::new(settings.seed, settings.generator.clone()),
            effects: Effects::new(settings),
            camera: Camera::default(),
            stats,
            best_distance: 0,
            base_score: stats.score,
            bonus_score: 0,
            next_milestone: next_milestone_after(stats.score),
            hint: None,
            events: Vec::new(),
            request: None,
        };

        match mode {
            LevelMode::Endless => level::build_endless(&mut state.generator, &mut state.world),
            LevelMode::Tutorial => {
                level::build_tutorial(&mut state.world);
                state.hint = Some(TutorialHint::for_position(state.player.pos.x));
            }
        }

        log::info!(
            "Level start: {:?}, seed {}, {} platforms, {} enemies, {} collectibles",
            mode,
            state.seed,
            state.world.platforms.len(),
            state.world.enemies.len(),
            state.world.collectibles.len()
        );

        state
    }

    pub fn is_dashing(&self) -> bool {
        self.dash.is_active()
    }

    /// Record a phase request, keeping the highest priority one
    pub fn request(&mut self, request: PhaseRequest) {
        if self.request.is_none_or(|current| request > current) {
            self.request = Some(request);
        }
    }

    pub fn game_over_requested(&self) -> bool {
        self.request == Some(PhaseRequest::GameOver)
    }

    /// Lose one health. Running out ends an endless run; the tutorial never dies.
    pub fn take_damage(&mut self) {
        self.stats.damage(1);
        self.events.push(GameEvent::Hurt {
            health: self.stats.health,
        });
        if self.mode == LevelMode::Endless && self.stats.is_dead() {
            self.request(PhaseRequest::GameOver);
        }
    }

    /// Score as shown to the player
    pub fn score(&self) -> u32 {
        self.base_score + self.best_distance + self.bonus_score
    }

    /// Put the player back at the level start
    pub fn respawn(&mut self) {
        self.player = Player::spawn(self.spawn);
        self.camera.reset();
    }

    /// Resync after the external store was changed outside a tick (upgrades)
    pub fn resync_stats(&mut self, external: Stats) {
        self.stats = external;
        self.stats.health = external.health.min(external.max_health);
        self.base_score = external
            .score
            .saturating_sub(self.best_distance + self.bonus_score);
    }
}

/// First milestone strictly above `score`
pub fn next_milestone_after(score: u32) -> u32 {
    (score / LEVEL_MILESTONE + 1) * LEVEL_MILESTONE
}
