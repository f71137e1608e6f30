//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::collision::{Contact, solid_collision};
use super::enemy::step_enemies;
use super::level::TutorialHint;
use super::rect::Rect;
use super::state::{
    CollectibleKind, DashStep, Facing, GameEvent, GameState, LevelMode, ParticleKind,
    PhaseRequest, PlatformKind, RunPhase, Support, WallSide, next_milestone_after,
};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held: accelerate left
    pub move_left: bool,
    /// Held: accelerate right
    pub move_right: bool,
    /// Edge: jump, wall jump or double jump
    pub jump: bool,
    /// Edge: start a dash
    pub dash: bool,
    /// Edge: pause toggle (handled by the scheduler)
    pub pause: bool,
}

impl TickInput {
    /// Same held state with the one-shot edges cleared
    pub fn held_only(&self) -> Self {
        Self {
            jump: false,
            dash: false,
            pause: false,
            ..*self
        }
    }
}

/// Advance the game state by one fixed timestep.
///
/// Does nothing unless `phase` runs the simulation. Returns the highest
/// priority phase change requested during the tick.
pub fn tick(state: &mut GameState, phase: RunPhase, input: &TickInput) -> Option<PhaseRequest> {
    if !phase.is_simulating() {
        return None;
    }

    state.frame += 1;

    // Dash timers
    match state.dash.step() {
        DashStep::Dashing => {
            if state.frame % 2 == 0 {
                state.effects.push_trail(&state.player);
            }
        }
        // Leave the dash with a little momentum
        DashStep::Ended => state.player.vel.x = state.player.facing.sign() * MOVE_SPEED,
        DashStep::Idle => {}
    }

    apply_movement(state, input);

    if input.jump {
        jump(state);
    }
    if input.dash && state.dash.try_start() {
        let center = state.player.rect().center();
        state.effects.burst(center, ParticleKind::Dash, 10);
        state.events.push(GameEvent::DashStarted);
    }

    let prev = state.player.rect();
    state.player.pos += state.player.vel;
    state.player.support = Support::Airborne;

    if state.player.pos.y > WORLD_BOTTOM {
        match state.mode {
            LevelMode::Tutorial => {
                state.respawn();
                state.events.push(GameEvent::Respawned);
            }
            LevelMode::Endless => {
                state.stats.health = 0;
                state.request(PhaseRequest::GameOver);
                state.events.push(GameEvent::GameOver);
                log::info!(
                    "Fell out of the world at x={:.0}, score {}",
                    state.player.pos.x,
                    state.score()
                );
                return state.request.take();
            }
        }
    }

    resolve_platforms(state, prev);

    step_enemies(state);
    collect_pickups(state);

    match state.mode {
        LevelMode::Endless => {
            extend_level(state);
            update_progress(state);
        }
        LevelMode::Tutorial => {
            state.hint = Some(TutorialHint::for_position(state.player.pos.x));
        }
    }

    state.effects.decay();
    state.camera.follow(state.player.pos.x);

    debug_assert!(
        state.stats.health <= state.stats.max_health,
        "health {} above max {}",
        state.stats.health,
        state.stats.max_health
    );
    if state.game_over_requested() {
        state.events.push(GameEvent::GameOver);
        log::info!("Out of health, score {}", state.score());
    }

    state.request.take()
}

/// Horizontal input, friction, gravity and wall slide
fn apply_movement(state: &mut GameState, input: &TickInput) {
    let player = &mut state.player;

    if state.dash.is_active() {
        // Dashing ignores gravity
        player.vel = Vec2::new(player.facing.sign() * DASH_SPEED, 0.0);
        return;
    }

    if input.move_right {
        player.vel.x += MOVE_SPEED;
        player.facing = Facing::Right;
    }
    if input.move_left {
        player.vel.x -= MOVE_SPEED;
        player.facing = Facing::Left;
    }
    player.vel.x *= FRICTION;

    match player.wall() {
        Some(side) if player.vel.y > 0.0 => {
            player.vel.y += GRAVITY * WALL_SLIDE_GRAVITY_SCALE;
            player.vel.y = player.vel.y.min(WALL_SLIDE_SPEED);

            if state.effects.chance(WALL_DUST_CHANCE) {
                let x = match side {
                    WallSide::Right => player.pos.x + player.size.x,
                    WallSide::Left => player.pos.x,
                };
                let at = Vec2::new(x, player.pos.y + player.size.y);
                state.effects.burst(at, ParticleKind::WallDust, 1);
            }
        }
        _ => player.vel.y += GRAVITY,
    }
}

/// Ground jump, then wall jump, then the one double jump
fn jump(state: &mut GameState) {
    let player = &mut state.player;

    if player.is_grounded() {
        player.vel.y = JUMP_FORCE;
        player.support = Support::Airborne;
        player.double_jump_ready = true;
        let feet = player.feet();
        state.effects.burst(feet, ParticleKind::Jump, 5);
        state.events.push(GameEvent::Jumped);
    } else if let Some(side) = player.wall() {
        // Always away from the wall
        player.vel = Vec2::new(-side.sign() * WALL_JUMP_FORCE_X, WALL_JUMP_FORCE_Y);
        player.facing = side.away();
        player.support = Support::Airborne;
        player.double_jump_ready = true;
        let center = player.rect().center();
        state.effects.burst(center, ParticleKind::WallJump, 8);
        state.events.push(GameEvent::WallJumped { side });
    } else if player.double_jump_ready {
        player.vel.y = DOUBLE_JUMP_FORCE;
        player.double_jump_ready = false;
        let feet = player.feet();
        state.effects.burst(feet, ParticleKind::DoubleJump, 5);
        state.events.push(GameEvent::DoubleJumped);
    }
}

/// Platform scan in list order. `prev` is the player before integration.
fn resolve_platforms(state: &mut GameState, prev: Rect) {
    for i in 0..state.world.platforms.len() {
        let (rect, kind) = {
            let platform = &state.world.platforms[i];
            (platform.rect, platform.kind)
        };
        let now = state.player.rect();
        if !now.overlaps(&rect) {
            continue;
        }

        match kind {
            PlatformKind::JumpPad => {
                // Only when coming down onto it
                if state.player.vel.y > 0.0 {
                    state.player.vel.y = JUMP_PAD_FORCE;
                    state.player.support = Support::Airborne;
                    state.player.double_jump_ready = true;
                    let at = Vec2::new(rect.center().x, rect.top());
                    state.effects.burst(at, ParticleKind::JumpPad, 10);
                    state.events.push(GameEvent::JumpPadBounce);
                }
            }
            PlatformKind::Hazard => {
                if state.is_dashing() {
                    continue;
                }
                state.take_damage();
                state.player.vel.y = HAZARD_BOUNCE;
                state.player.vel.x = -state.player.vel.x * HAZARD_PUSHBACK;
                let at = state.player.pos;
                state.effects.burst(at, ParticleKind::Hazard, 10);
            }
            PlatformKind::Finish => {
                if state.request < Some(PhaseRequest::LevelComplete) {
                    log::info!("Level complete at frame {}", state.frame);
                    state.events.push(GameEvent::LevelComplete);
                }
                state.request(PhaseRequest::LevelComplete);
            }
            PlatformKind::Ground | PlatformKind::Platform => {
                let Some(hit) = solid_collision(prev, now, state.player.vel, &rect) else {
                    continue;
                };
                let player = &mut state.player;
                player.pos = hit.pos;
                match hit.contact {
                    Contact::Landed => {
                        player.vel.y = 0.0;
                        player.support = Support::Grounded;
                        player.double_jump_ready = true;
                    }
                    Contact::Ceiling => player.vel.y = 0.0,
                    Contact::Wall(side) => {
                        player.vel.x = 0.0;
                        player.touch_wall(side);
                    }
                    Contact::Unresolved => {}
                }
            }
        }
    }
}

/// Pick up overlapping collectibles and drop those left behind
fn collect_pickups(state: &mut GameState) {
    let cull_x = state.camera.x - PRUNE_MARGIN;
    let player = state.player.rect();

    let mut taken = Vec::new();
    for collectible in &mut state.world.collectibles {
        if collectible.collected || collectible.rect.right() < cull_x {
            continue;
        }
        if player.overlaps(&collectible.rect) {
            collectible.collected = true;
            taken.push((collectible.kind, collectible.rect.center()));
        }
    }

    for (kind, at) in taken {
        match kind {
            CollectibleKind::Coin => {
                state.stats.coins += 1;
                state.effects.burst(at, ParticleKind::Coin, 6);
                state.events.push(GameEvent::CoinCollected);
            }
            CollectibleKind::Health => {
                let healed = state.stats.heal(1);
                if healed {
                    state.effects.burst(at, ParticleKind::Heal, 10);
                } else {
                    state.effects.burst(at, ParticleKind::HealFull, 5);
                }
                state.events.push(GameEvent::HealthCollected { healed });
            }
        }
    }

    state
        .world
        .collectibles
        .retain(|c| !c.collected && c.rect.right() >= cull_x);
}

/// Generate ahead of the camera and prune behind it
fn extend_level(state: &mut GameState) {
    if let Some(edge) = state.world.frontier()
        && edge < state.camera.right() + GENERATION_LOOKAHEAD
    {
        state.generator.generate_chunk(edge, &mut state.world);
    }

    if state.world.platforms.len() > PLATFORM_PRUNE_THRESHOLD {
        let cull_x = state.camera.x - PRUNE_MARGIN;
        let before = state.world.platforms.len();
        state.world.platforms.retain(|p| p.rect.right() >= cull_x);
        log::debug!(
            "Pruned {} platforms behind x={:.0}",
            before - state.world.platforms.len(),
            cull_x
        );
    }
}

/// Distance, score and milestone tracking
fn update_progress(state: &mut GameState) {
    let metres = (state.player.pos.x.max(0.0) / DISTANCE_SCALE).floor() as u32;
    if metres > state.best_distance {
        state.best_distance = metres;
        if metres % DISTANCE_PUSH_STEP == 0 {
            state.stats.distance = metres;
        }
    }
    state.stats.score = state.score();

    if state.stats.score >= state.next_milestone {
        state.stats.level += 1;
        state.next_milestone = next_milestone_after(state.stats.score);
        state.request(PhaseRequest::LevelTransition);
        state.events.push(GameEvent::Milestone {
            level: state.stats.level,
        });
        log::info!(
            "Milestone reached: score {}, level {}",
            state.stats.score,
            state.stats.level
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::sim::level::build_tutorial;
    use crate::sim::state::{DashState, Stats, World};
    use proptest::prelude::*;

    const FLOOR_Y: f32 = 600.0;

    /// A long floor with nothing else, far enough right that nothing generates
    fn flat(mode: LevelMode) -> GameState {
        flat_with(mode, Stats::default())
    }

    fn flat_with(mode: LevelMode, stats: Stats) -> GameState {
        let mut state = GameState::new(mode, stats, &Settings::default());
        state.world = World::default();
        state
            .world
            .add_platform(Rect::new(0.0, FLOOR_Y, 3000.0, 40.0), PlatformKind::Ground);
        state
    }

    /// Put the player on the floor at `x` and let one tick ground them
    fn stand_at(state: &mut GameState, x: f32) {
        state.player.pos = Vec2::new(x, FLOOR_Y - PLAYER_HEIGHT);
        state.player.vel = Vec2::ZERO;
        state.camera.x = x - CAMERA_LEAD;
        tick(state, RunPhase::Playing, &TickInput::default());
        assert!(state.player.is_grounded());
    }

    fn press_jump() -> TickInput {
        TickInput {
            jump: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_scenario_a_rest_on_ground() {
        let mut state = flat(LevelMode::Endless);
        stand_at(&mut state, 100.0);

        for _ in 0..120 {
            tick(&mut state, RunPhase::Playing, &TickInput::default());
        }
        assert_eq!(state.player.vel, Vec2::ZERO);
        assert_eq!(state.player.pos, Vec2::new(100.0, FLOOR_Y - PLAYER_HEIGHT));
        assert!(state.player.is_grounded());
    }

    #[test]
    fn test_scenario_b_jump_from_ground() {
        let mut state = flat(LevelMode::Endless);
        stand_at(&mut state, 100.0);

        tick(&mut state, RunPhase::Playing, &press_jump());
        assert_eq!(state.player.vel.y, JUMP_FORCE);
        assert!(!state.player.is_grounded());
        assert!(state.events.contains(&GameEvent::Jumped));
    }

    #[test]
    fn test_scenario_c_hazard_ends_run() {
        let mut state = flat(LevelMode::Endless);
        stand_at(&mut state, 100.0);
        state.stats.health = 1;
        state
            .world
            .add_platform(Rect::new(110.0, FLOOR_Y - 20.0, 40.0, 20.0), PlatformKind::Hazard);

        let request = tick(&mut state, RunPhase::Playing, &TickInput::default());
        assert_eq!(state.stats.health, 0);
        assert_eq!(request, Some(PhaseRequest::GameOver));
        assert_eq!(state.player.vel.y, HAZARD_BOUNCE);
    }

    #[test]
    fn test_scenario_d_coin_collected_once() {
        let mut state = flat(LevelMode::Endless);
        stand_at(&mut state, 100.0);
        state
            .world
            .add_collectible(Rect::new(110.0, 560.0, 20.0, 20.0), CollectibleKind::Coin);

        tick(&mut state, RunPhase::Playing, &TickInput::default());
        assert_eq!(state.stats.coins, 1);
        assert!(state.world.collectibles.is_empty());

        tick(&mut state, RunPhase::Playing, &TickInput::default());
        assert_eq!(state.stats.coins, 1);
    }

    #[test]
    fn test_paused_tick_is_noop() {
        let mut state = flat(LevelMode::Endless);
        build_tutorial(&mut state.world);
        state.effects.burst(Vec2::new(200.0, 500.0), ParticleKind::Jump, 10);
        state.player.vel = Vec2::new(3.0, -2.0);
        let pos = state.player.pos;
        let frame = state.frame;
        let counts = |state: &GameState| {
            (
                state.world.platforms.len(),
                state.world.enemies.len(),
                state.world.collectibles.len(),
                state.effects.particles.len(),
            )
        };
        let before = counts(&state);
        let enemies: Vec<Rect> = state.world.enemies.iter().map(|e| e.rect).collect();
        let particles: Vec<Vec2> = state.effects.particles.iter().map(|p| p.pos).collect();
        assert!(before.1 > 0 && before.2 > 0 && before.3 > 0);

        for phase in [RunPhase::Paused, RunPhase::Menu, RunPhase::GameOver, RunPhase::LevelTransition] {
            let input = TickInput {
                move_right: true,
                jump: true,
                dash: true,
                ..Default::default()
            };
            assert_eq!(tick(&mut state, phase, &input), None);
        }
        assert_eq!(state.frame, frame);
        assert_eq!(state.player.pos, pos);
        assert_eq!(state.player.vel, Vec2::new(3.0, -2.0));
        assert_eq!(state.dash, DashState::Ready);
        assert_eq!(state.stats, Stats::default());
        assert_eq!(counts(&state), before);
        assert!(state.world.enemies.iter().map(|e| e.rect).eq(enemies));
        assert!(state.effects.particles.iter().map(|p| p.pos).eq(particles));
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_dash_is_immune_to_hazards() {
        let mut state = flat(LevelMode::Endless);
        stand_at(&mut state, 100.0);
        state
            .world
            .add_platform(Rect::new(110.0, FLOOR_Y - 20.0, 40.0, 20.0), PlatformKind::Hazard);
        state.dash = DashState::Active {
            remaining: 5,
            cooldown: 50,
        };

        tick(&mut state, RunPhase::Playing, &TickInput::default());
        assert_eq!(state.stats.health, START_HEALTH);
        assert_eq!(state.player.vel, Vec2::new(DASH_SPEED, 0.0));
    }

    #[test]
    fn test_dash_gated_by_cooldown() {
        let mut state = flat(LevelMode::Endless);
        stand_at(&mut state, 100.0);
        let dash = TickInput {
            dash: true,
            ..Default::default()
        };

        tick(&mut state, RunPhase::Playing, &dash);
        assert!(state.is_dashing());
        // A fresh press during the dash does nothing
        tick(&mut state, RunPhase::Playing, &dash);
        let started = state
            .events
            .iter()
            .filter(|e| **e == GameEvent::DashStarted)
            .count();
        assert_eq!(started, 1);

        for _ in 0..DASH_DURATION {
            tick(&mut state, RunPhase::Playing, &TickInput::default());
        }
        assert!(!state.is_dashing());
        assert!(state.dash.cooldown() > 0);
        tick(&mut state, RunPhase::Playing, &dash);
        assert!(!state.is_dashing());

        for _ in 0..DASH_COOLDOWN {
            tick(&mut state, RunPhase::Playing, &TickInput::default());
        }
        tick(&mut state, RunPhase::Playing, &dash);
        assert!(state.is_dashing());
    }

    #[test]
    fn test_one_double_jump_per_excursion() {
        let mut state = flat(LevelMode::Endless);
        stand_at(&mut state, 100.0);

        tick(&mut state, RunPhase::Playing, &press_jump());
        tick(&mut state, RunPhase::Playing, &press_jump());
        assert_eq!(state.player.vel.y, DOUBLE_JUMP_FORCE);
        assert!(!state.player.double_jump_ready);

        tick(&mut state, RunPhase::Playing, &press_jump());
        assert!(state.player.vel.y > DOUBLE_JUMP_FORCE);
        let doubles = state
            .events
            .iter()
            .filter(|e| **e == GameEvent::DoubleJumped)
            .count();
        assert_eq!(doubles, 1);

        // Landing restores it
        for _ in 0..120 {
            tick(&mut state, RunPhase::Playing, &TickInput::default());
        }
        assert!(state.player.is_grounded());
        assert!(state.player.double_jump_ready);
    }

    #[test]
    fn test_wall_on_right_jumps_left() {
        let mut state = flat(LevelMode::Endless);
        state
            .world
            .add_platform(Rect::new(200.0, 300.0, 40.0, 300.0), PlatformKind::Platform);
        state.player.pos = Vec2::new(172.0, 400.0);
        state.player.vel = Vec2::new(5.0, 0.0);

        tick(&mut state, RunPhase::Playing, &TickInput::default());
        assert_eq!(state.player.wall(), Some(WallSide::Right));
        assert_eq!(state.player.wall_contact(), 1);
        assert_eq!(state.player.rect().right(), 200.0);

        tick(&mut state, RunPhase::Playing, &press_jump());
        assert_eq!(state.player.vel, Vec2::new(-WALL_JUMP_FORCE_X, WALL_JUMP_FORCE_Y));
        assert_eq!(state.player.facing, Facing::Left);
        assert!(state.events.contains(&GameEvent::WallJumped {
            side: WallSide::Right
        }));
    }

    #[test]
    fn test_wall_on_left_jumps_right() {
        let mut state = flat(LevelMode::Endless);
        state
            .world
            .add_platform(Rect::new(100.0, 300.0, 40.0, 300.0), PlatformKind::Platform);
        state.player.pos = Vec2::new(138.0, 400.0);
        state.player.vel = Vec2::new(-5.0, 0.0);
        state.player.facing = Facing::Left;

        tick(&mut state, RunPhase::Playing, &TickInput::default());
        assert_eq!(state.player.wall(), Some(WallSide::Left));
        assert_eq!(state.player.wall_contact(), -1);
        assert_eq!(state.player.rect().left(), 140.0);

        tick(&mut state, RunPhase::Playing, &press_jump());
        assert_eq!(state.player.vel, Vec2::new(WALL_JUMP_FORCE_X, WALL_JUMP_FORCE_Y));
        assert_eq!(state.player.facing, Facing::Right);
    }

    #[test]
    fn test_wall_slide_caps_fall_speed() {
        let mut state = flat(LevelMode::Endless);
        state
            .world
            .add_platform(Rect::new(200.0, 0.0, 40.0, 600.0), PlatformKind::Platform);
        state.player.pos = Vec2::new(172.0, 100.0);
        state.player.vel = Vec2::new(5.0, 0.0);
        let hold_right = TickInput {
            move_right: true,
            ..Default::default()
        };

        for _ in 0..60 {
            tick(&mut state, RunPhase::Playing, &hold_right);
            assert!(state.player.vel.y <= WALL_SLIDE_SPEED);
        }
        assert_eq!(state.player.wall(), Some(WallSide::Right));
    }

    #[test]
    fn test_jump_pad_launches_falling_player() {
        let mut state = flat(LevelMode::Endless);
        state
            .world
            .add_platform(Rect::new(100.0, 590.0, 40.0, 10.0), PlatformKind::JumpPad);
        state.player.pos = Vec2::new(100.0, 535.0);
        state.player.vel = Vec2::new(0.0, 5.0);

        tick(&mut state, RunPhase::Playing, &TickInput::default());
        assert_eq!(state.player.vel.y, JUMP_PAD_FORCE);
        assert!(state.player.double_jump_ready);
    }

    #[test]
    fn test_health_pickup_caps_at_max() {
        let mut state = flat(LevelMode::Endless);
        stand_at(&mut state, 100.0);
        state.stats.health = 2;
        for x in [105.0, 110.0] {
            state
                .world
                .add_collectible(Rect::new(x, 560.0, 24.0, 24.0), CollectibleKind::Health);
        }

        tick(&mut state, RunPhase::Playing, &TickInput::default());
        assert_eq!(state.stats.health, START_HEALTH);
        assert!(state.world.collectibles.is_empty());
        assert!(state.events.contains(&GameEvent::HealthCollected { healed: true }));
        assert!(state.events.contains(&GameEvent::HealthCollected { healed: false }));
    }

    #[test]
    fn test_finish_completes_level() {
        let mut state = flat(LevelMode::Tutorial);
        stand_at(&mut state, 100.0);
        state
            .world
            .add_platform(Rect::new(120.0, 300.0, 50.0, 300.0), PlatformKind::Finish);

        let request = tick(&mut state, RunPhase::Tutorial, &TickInput::default());
        assert_eq!(request, Some(PhaseRequest::LevelComplete));
        assert_eq!(request.map(PhaseRequest::target), Some(RunPhase::Menu));
    }

    #[test]
    fn test_tutorial_fall_respawns() {
        let mut state = GameState::new(LevelMode::Tutorial, Stats::default(), &Settings::default());
        state.player.pos = Vec2::new(900.0, 715.0);
        state.player.vel = Vec2::new(4.0, 8.0);
        state.camera.x = 700.0;

        let request = tick(&mut state, RunPhase::Tutorial, &TickInput::default());
        assert_eq!(request, None);
        assert_eq!(state.player.pos, state.spawn);
        assert_eq!(state.player.vel, Vec2::ZERO);
        assert_eq!(state.stats.health, START_HEALTH);
        assert!(state.events.contains(&GameEvent::Respawned));
        assert_eq!(state.hint, Some(TutorialHint::Move));
    }

    #[test]
    fn test_endless_fall_is_game_over() {
        let mut state = flat(LevelMode::Endless);
        state.player.pos = Vec2::new(3100.0, 715.0);
        state.player.vel = Vec2::new(0.0, 8.0);

        let request = tick(&mut state, RunPhase::Playing, &TickInput::default());
        assert_eq!(request, Some(PhaseRequest::GameOver));
        assert_eq!(state.stats.health, 0);
    }

    #[test]
    fn test_tutorial_hazard_never_ends_run() {
        let mut state = flat(LevelMode::Tutorial);
        stand_at(&mut state, 100.0);
        state.stats.health = 1;
        state
            .world
            .add_platform(Rect::new(110.0, FLOOR_Y - 20.0, 40.0, 20.0), PlatformKind::Hazard);

        let request = tick(&mut state, RunPhase::Tutorial, &TickInput::default());
        assert_eq!(request, None);
        assert_eq!(state.player.vel.y, HAZARD_BOUNCE);
    }

    #[test]
    fn test_distance_and_milestone() {
        let stats = Stats {
            score: 495,
            ..Stats::default()
        };
        let mut state = flat_with(LevelMode::Endless, stats);
        state.player.pos = Vec2::new(500.0, FLOOR_Y - PLAYER_HEIGHT);

        let request = tick(&mut state, RunPhase::Playing, &TickInput::default());
        assert_eq!(state.best_distance, 5);
        assert_eq!(state.stats.distance, 5);
        assert_eq!(state.stats.score, 500);
        assert_eq!(request, Some(PhaseRequest::LevelTransition));
        assert_eq!(state.stats.level, 2);

        // Same milestone does not fire twice
        let request = tick(&mut state, RunPhase::Playing, &TickInput::default());
        assert_eq!(request, None);
        assert_eq!(state.next_milestone, 1000);
    }

    #[test]
    fn test_level_extends_ahead_of_camera() {
        let mut state = GameState::new(LevelMode::Endless, Stats::default(), &Settings::default());
        let edge = state.world.frontier().unwrap();
        state.camera.x = edge;

        tick(&mut state, RunPhase::Playing, &TickInput::default());
        assert_eq!(state.generator.chunks(), 2);
        assert!(state.world.frontier().unwrap() > edge);
    }

    #[test]
    fn test_platforms_pruned_behind_camera() {
        let mut state = flat(LevelMode::Endless);
        state.world = World::default();
        for i in 0..60 {
            state
                .world
                .add_platform(Rect::new(i as f32 * 50.0, FLOOR_Y, 40.0, 40.0), PlatformKind::Platform);
        }
        state
            .world
            .add_platform(Rect::new(20_000.0, FLOOR_Y, 400.0, 40.0), PlatformKind::Platform);
        state.camera.x = 5000.0;

        tick(&mut state, RunPhase::Playing, &TickInput::default());
        assert_eq!(state.world.platforms.len(), 1);
        assert_eq!(state.world.frontier(), Some(20_400.0));
    }

    #[test]
    fn test_determinism() {
        let settings = Settings::default().with_seed(99999);
        let mut state1 = GameState::new(LevelMode::Endless, Stats::default(), &settings);
        let mut state2 = GameState::new(LevelMode::Endless, Stats::default(), &settings);

        let inputs = [
            TickInput {
                move_right: true,
                ..Default::default()
            },
            TickInput {
                move_right: true,
                jump: true,
                ..Default::default()
            },
            TickInput {
                dash: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..50 {
            for input in &inputs {
                tick(&mut state1, RunPhase::Playing, input);
                tick(&mut state2, RunPhase::Playing, input);
            }
        }

        assert_eq!(state1.frame, state2.frame);
        assert_eq!(state1.player.pos, state2.player.pos);
        assert_eq!(state1.world.platforms.len(), state2.world.platforms.len());
        assert_eq!(state1.effects.particles.len(), state2.effects.particles.len());
        assert_eq!(state1.stats, state2.stats);
    }

    fn arb_input() -> impl Strategy<Value = TickInput> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(move_left, move_right, jump, dash)| TickInput {
                move_left,
                move_right,
                jump,
                dash,
                pause: false,
            },
        )
    }

    proptest! {
        #[test]
        fn health_stays_in_range(
            seed in any::<u64>(),
            inputs in prop::collection::vec(arb_input(), 1..400),
        ) {
            let settings = Settings::default().with_seed(seed);
            let mut state = GameState::new(LevelMode::Endless, Stats::default(), &settings);
            for input in &inputs {
                let request = tick(&mut state, RunPhase::Playing, input);
                prop_assert!(state.stats.health <= state.stats.max_health);
                if request == Some(PhaseRequest::GameOver) {
                    prop_assert_eq!(state.stats.health, 0);
                    break;
                }
            }
        }
    }
}
