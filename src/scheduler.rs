//! Fixed-timestep frame loop
//!
//! The scheduler owns the simulation context and talks to the rest of the
//! game through three narrow interfaces: a stats store, a run-state machine
//! and a renderer. Hosts call [`Scheduler::advance`] once per display frame.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::platform::{EdgeDetector, InputProvider};
use crate::settings::Settings;
use crate::sim::{
    Collectible, DashTrail, Enemy, GameEvent, GameState, LevelMode, Particle, Platform, Player,
    RunPhase, Stats, TickInput, TutorialHint, tick,
};

/// Authoritative run statistics, owned outside the core
pub trait StatsSink {
    fn snapshot(&self) -> Stats;
    /// Replace the stored value with a complete new one
    fn store(&mut self, stats: Stats);
}

/// Owner of the overall run phase
pub trait RunStateSink {
    fn phase(&self) -> RunPhase;
    fn request(&mut self, next: RunPhase);
}

/// Draws a frame. Must not mutate the simulation.
pub trait Renderer {
    fn present(&mut self, frame: &Frame<'_>);
}

impl<F> Renderer for F
where
    F: FnMut(&Frame<'_>),
{
    fn present(&mut self, frame: &Frame<'_>) {
        self(frame)
    }
}

/// In-process stats store
#[derive(Debug, Clone, Default)]
pub struct LocalStats {
    stats: Stats,
}

impl LocalStats {
    pub fn new(stats: Stats) -> Self {
        Self { stats }
    }
}

impl StatsSink for LocalStats {
    fn snapshot(&self) -> Stats {
        self.stats
    }

    fn store(&mut self, stats: Stats) {
        self.stats = stats;
    }
}

/// In-process run-state machine enforcing [`RunPhase::can_transition_to`]
#[derive(Debug, Clone)]
pub struct RunStateMachine {
    phase: RunPhase,
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStateMachine {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Menu,
        }
    }
}

impl RunStateSink for RunStateMachine {
    fn phase(&self) -> RunPhase {
        self.phase
    }

    fn request(&mut self, next: RunPhase) {
        if next == self.phase {
            return;
        }
        if self.phase.can_transition_to(next) {
            log::info!("Run phase {:?} -> {:?}", self.phase, next);
            self.phase = next;
        } else {
            log::warn!("Rejected run phase change {:?} -> {:?}", self.phase, next);
        }
    }
}

/// Read-only view of one frame for the renderer
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub phase: RunPhase,
    pub player: &'a Player,
    pub platforms: &'a [Platform],
    pub enemies: &'a [Enemy],
    pub collectibles: &'a [Collectible],
    pub particles: &'a [Particle],
    pub trails: &'a [DashTrail],
    pub camera_x: f32,
    pub dashing: bool,
    pub hint: Option<TutorialHint>,
    pub stats: &'a Stats,
    /// Gameplay events since the previous frame
    pub events: &'a [GameEvent],
}

impl<'a> Frame<'a> {
    fn new(state: &'a GameState, phase: RunPhase, events: &'a [GameEvent]) -> Self {
        Self {
            phase,
            player: &state.player,
            platforms: &state.world.platforms,
            enemies: &state.world.enemies,
            collectibles: &state.world.collectibles,
            particles: &state.effects.particles,
            trails: &state.effects.trails,
            camera_x: state.camera.x,
            dashing: state.is_dashing(),
            hint: state.hint,
            stats: &state.stats,
            events,
        }
    }
}

/// Frame loop driving the simulation at a fixed 60 Hz
pub struct Scheduler<S, R> {
    settings: Settings,
    stats: S,
    run: R,
    state: Option<GameState>,
    edges: EdgeDetector,
    /// Edges polled but not yet seen by a tick
    pending: TickInput,
    accumulator: f32,
    /// Phase to return to when unpausing
    resume_phase: RunPhase,
    events: Vec<GameEvent>,
}

impl<S: StatsSink, R: RunStateSink> Scheduler<S, R> {
    pub fn new(settings: Settings, stats: S, run: R) -> Self {
        Self {
            settings,
            stats,
            run,
            state: None,
            edges: EdgeDetector::new(),
            pending: TickInput::default(),
            accumulator: 0.0,
            resume_phase: RunPhase::Playing,
            events: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut GameState> {
        self.state.as_mut()
    }

    pub fn stats_sink(&self) -> &S {
        &self.stats
    }

    pub fn stats_sink_mut(&mut self) -> &mut S {
        &mut self.stats
    }

    pub fn run_state(&self) -> &R {
        &self.run
    }

    pub fn phase(&self) -> RunPhase {
        self.run.phase()
    }

    /// Build a fresh level and enter its phase. Layout finishes before this returns.
    pub fn start(&mut self, mode: LevelMode) {
        let stats = self.stats.snapshot();
        self.state = Some(GameState::new(mode, stats, &self.settings));
        self.accumulator = 0.0;
        self.edges.reset();
        self.pending = TickInput::default();
        self.events.clear();

        let phase = match mode {
            LevelMode::Endless => RunPhase::Playing,
            LevelMode::Tutorial => RunPhase::Tutorial,
        };
        self.run.request(phase);
    }

    /// New endless run from default stats
    pub fn restart(&mut self) {
        self.stats.store(Stats::default());
        self.start(LevelMode::Endless);
    }

    /// Apply an upgrade picked during a level transition and resume play.
    ///
    /// Returns false (and changes nothing) outside a level transition.
    pub fn choose_upgrade<F>(&mut self, upgrade: F) -> bool
    where
        F: FnOnce(Stats) -> Stats,
    {
        if self.run.phase() != RunPhase::LevelTransition {
            log::warn!("Upgrade chosen outside a level transition, ignoring");
            return false;
        }
        let next = upgrade(self.stats.snapshot());
        self.stats.store(next);
        if let Some(state) = self.state.as_mut() {
            state.resync_stats(next);
        }
        self.run.request(RunPhase::Playing);
        true
    }

    /// Pause if a level is running (e.g. on focus loss)
    pub fn pause(&mut self) {
        let phase = self.run.phase();
        if phase.is_simulating() {
            self.resume_phase = phase;
            self.run.request(RunPhase::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.run.phase() == RunPhase::Paused {
            self.run.request(self.resume_phase);
        }
    }

    fn toggle_pause(&mut self) {
        if self.run.phase() == RunPhase::Paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Run one display frame: poll input, step the simulation, present.
    ///
    /// `dt` is the wall-clock time since the previous frame in seconds.
    pub fn advance<I, V>(&mut self, dt: f32, input: &mut I, renderer: &mut V)
    where
        I: InputProvider + ?Sized,
        V: Renderer + ?Sized,
    {
        let polled = self.edges.update(input.poll());
        if polled.pause {
            self.toggle_pause();
        }

        // Presses wait for the next tick, short frames may run none
        self.pending = TickInput {
            jump: self.pending.jump || polled.jump,
            dash: self.pending.dash || polled.dash,
            pause: false,
            ..polled
        };
        if !self.run.phase().is_simulating() {
            self.pending = self.pending.held_only();
        }

        self.events.clear();
        let Some(state) = self.state.as_mut() else {
            return;
        };

        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let phase = self.run.phase();
            if phase.is_simulating() {
                step(state, phase, &self.pending, &mut self.stats, &mut self.run);
                // Clear one-shot inputs after processing
                self.pending = self.pending.held_only();
            }
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        self.events.append(&mut state.events);
        renderer.present(&Frame::new(state, self.run.phase(), &self.events));
    }
}

/// One substep: mirror health in, tick, push requests and stats out
fn step<S, R>(state: &mut GameState, phase: RunPhase, input: &TickInput, stats: &mut S, run: &mut R)
where
    S: StatsSink + ?Sized,
    R: RunStateSink + ?Sized,
{
    let external = stats.snapshot();
    state.stats.mirror_health(&external);

    if let Some(request) = tick(state, phase, input) {
        log::info!("Core requested {:?} at frame {}", request, state.frame);
        run.request(request.target());
    }

    if state.stats != external {
        stats.store(state.stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::START_HEALTH as START;
    use crate::platform::{ActionSet, ScriptedInput};
    use glam::Vec2;

    type TestScheduler = Scheduler<LocalStats, RunStateMachine>;

    fn scheduler() -> TestScheduler {
        Scheduler::new(
            Settings::default().with_seed(7),
            LocalStats::default(),
            RunStateMachine::new(),
        )
    }

    /// Records what the renderer was handed
    #[derive(Default)]
    struct Recorder {
        frames: usize,
        events: Vec<GameEvent>,
        last_phase: Option<RunPhase>,
    }

    impl Renderer for Recorder {
        fn present(&mut self, frame: &Frame<'_>) {
            self.frames += 1;
            self.events.extend_from_slice(frame.events);
            self.last_phase = Some(frame.phase);
        }
    }

    fn idle_frames(s: &mut TestScheduler, frames: usize, out: &mut Recorder) {
        let mut input = ScriptedInput::new().idle(frames);
        for _ in 0..frames {
            s.advance(SIM_DT, &mut input, out);
        }
    }

    fn frame_count(s: &TestScheduler) -> u64 {
        s.state().map_or(0, |state| state.frame)
    }

    #[test]
    fn test_nothing_runs_before_start() {
        let mut s = scheduler();
        let mut out = Recorder::default();
        idle_frames(&mut s, 5, &mut out);
        assert_eq!(out.frames, 0);
        assert_eq!(s.phase(), RunPhase::Menu);
    }

    #[test]
    fn test_accumulator_steps_fixed_ticks() {
        let mut s = scheduler();
        let mut out = Recorder::default();
        s.start(LevelMode::Tutorial);
        assert_eq!(s.phase(), RunPhase::Tutorial);

        let mut input = ScriptedInput::new();
        s.advance(0.0, &mut input, &mut out);
        assert_eq!(frame_count(&s), 0);
        assert_eq!(out.frames, 1);

        s.advance(SIM_DT, &mut input, &mut out);
        assert_eq!(frame_count(&s), 1);

        // Long stalls are clamped
        s.advance(5.0, &mut input, &mut out);
        let ticks = frame_count(&s) - 1;
        assert!((5..=MAX_SUBSTEPS as u64).contains(&ticks), "ran {ticks} ticks");
    }

    #[test]
    fn test_edges_consumed_by_first_substep() {
        let mut s = scheduler();
        let mut out = Recorder::default();
        s.start(LevelMode::Tutorial);
        idle_frames(&mut s, 90, &mut out);
        assert!(s.state().unwrap().player.is_grounded());

        out.events.clear();
        let mut input = ScriptedInput::new().hold(ActionSet::JUMP, 1);
        s.advance(4.0 * SIM_DT, &mut input, &mut out);

        assert!(frame_count(&s) >= 93);
        let jumps = out.events.iter().filter(|e| **e == GameEvent::Jumped).count();
        assert_eq!(jumps, 1);
        assert!(!out.events.contains(&GameEvent::DoubleJumped));
    }

    #[test]
    fn test_press_survives_frames_without_ticks() {
        let mut s = scheduler();
        let mut out = Recorder::default();
        s.start(LevelMode::Tutorial);
        idle_frames(&mut s, 90, &mut out);
        assert!(s.state().unwrap().player.is_grounded());
        let before = frame_count(&s);

        // A zero-length frame, then half-tick frames as on a 120 Hz display
        out.events.clear();
        let mut input = ScriptedInput::new().hold(ActionSet::JUMP, 6);
        s.advance(0.0, &mut input, &mut out);
        for _ in 0..5 {
            s.advance(0.5 * SIM_DT, &mut input, &mut out);
        }

        let ticks = frame_count(&s) - before;
        assert!((2..=3).contains(&ticks), "ran {ticks} ticks");
        let jumps = out.events.iter().filter(|e| **e == GameEvent::Jumped).count();
        assert_eq!(jumps, 1);
        // Holding the key does not count as a second press
        assert!(!out.events.contains(&GameEvent::DoubleJumped));
    }

    #[test]
    fn test_press_while_paused_is_dropped() {
        let mut s = scheduler();
        let mut out = Recorder::default();
        s.start(LevelMode::Tutorial);
        idle_frames(&mut s, 90, &mut out);
        s.pause();

        let mut input = ScriptedInput::new().hold(ActionSet::JUMP, 1);
        s.advance(SIM_DT, &mut input, &mut out);
        s.resume();
        out.events.clear();
        idle_frames(&mut s, 2, &mut out);
        assert!(!out.events.contains(&GameEvent::Jumped));
    }

    #[test]
    fn test_pause_toggle_freezes_and_resumes() {
        let mut s = scheduler();
        let mut out = Recorder::default();
        s.start(LevelMode::Tutorial);
        idle_frames(&mut s, 3, &mut out);

        let pause = ActionSet::PAUSE;
        let mut input = ScriptedInput::new().hold(pause, 1).idle(10).hold(pause, 1);

        s.advance(SIM_DT, &mut input, &mut out);
        assert_eq!(s.phase(), RunPhase::Paused);
        assert_eq!(out.last_phase, Some(RunPhase::Paused));
        let frozen = frame_count(&s);

        for _ in 0..10 {
            s.advance(SIM_DT, &mut input, &mut out);
        }
        assert_eq!(frame_count(&s), frozen);

        // Back to the tutorial, not Playing
        s.advance(SIM_DT, &mut input, &mut out);
        assert_eq!(s.phase(), RunPhase::Tutorial);
        assert_eq!(frame_count(&s), frozen + 1);
    }

    #[test]
    fn test_health_mirrored_from_store() {
        let mut s = scheduler();
        let mut out = Recorder::default();
        s.start(LevelMode::Tutorial);

        s.stats_sink_mut().store(Stats {
            health: 9,
            max_health: 5,
            ..Stats::default()
        });
        idle_frames(&mut s, 1, &mut out);
        let stats = s.state().unwrap().stats;
        assert_eq!(stats.max_health, 5);
        assert_eq!(stats.health, 5);
        // Clamped value pushed back to the store
        assert_eq!(s.stats_sink().snapshot().health, 5);
    }

    #[test]
    fn test_fall_out_ends_endless_run() {
        let mut s = scheduler();
        let mut out = Recorder::default();
        s.start(LevelMode::Endless);
        {
            let state = s.state_mut().unwrap();
            state.player.pos = Vec2::new(100.0, 715.0);
            state.player.vel = Vec2::new(0.0, 10.0);
        }
        idle_frames(&mut s, 1, &mut out);

        assert_eq!(s.phase(), RunPhase::GameOver);
        assert_eq!(s.stats_sink().snapshot().health, 0);
        assert!(out.events.contains(&GameEvent::GameOver));

        // Game over freezes the simulation
        let frozen = frame_count(&s);
        idle_frames(&mut s, 5, &mut out);
        assert_eq!(frame_count(&s), frozen);

        s.restart();
        assert_eq!(s.phase(), RunPhase::Playing);
        assert_eq!(s.stats_sink().snapshot(), Stats::default());
        assert_eq!(frame_count(&s), 0);
    }

    #[test]
    fn test_upgrade_after_milestone() {
        let mut s = Scheduler::new(
            Settings::default(),
            LocalStats::new(Stats {
                score: 499,
                ..Stats::default()
            }),
            RunStateMachine::new(),
        );
        let mut out = Recorder::default();
        s.start(LevelMode::Endless);
        // Ineligible outside a transition
        assert!(!s.choose_upgrade(|stats| stats));

        idle_frames(&mut s, 1, &mut out);
        assert_eq!(s.phase(), RunPhase::LevelTransition);
        assert_eq!(s.stats_sink().snapshot().level, 2);

        let applied = s.choose_upgrade(|stats| Stats {
            max_health: stats.max_health + 1,
            health: stats.max_health + 1,
            ..stats
        });
        assert!(applied);
        assert_eq!(s.phase(), RunPhase::Playing);
        assert_eq!(s.stats_sink().snapshot().max_health, START + 1);
        let working = s.state().unwrap().stats;
        assert_eq!(working.max_health, START + 1);
        assert_eq!(working.health, START + 1);
        assert_eq!(working.score, 500);
    }

    #[test]
    fn test_run_state_machine_rejects_illegal_changes() {
        let mut run = RunStateMachine::new();
        run.request(RunPhase::GameOver);
        assert_eq!(run.phase(), RunPhase::Menu);
        run.request(RunPhase::Playing);
        run.request(RunPhase::LevelTransition);
        assert_eq!(run.phase(), RunPhase::LevelTransition);
        run.request(RunPhase::Paused);
        assert_eq!(run.phase(), RunPhase::LevelTransition);
    }

    fn renderer<F: FnMut(&Frame<'_>)>(f: F) -> F {
        f
    }

    #[test]
    fn test_closure_renderer() {
        let mut s = scheduler();
        s.start(LevelMode::Tutorial);
        let mut input = ScriptedInput::new();
        let mut hint = None;
        s.advance(SIM_DT, &mut input, &mut renderer(|frame| hint = frame.hint));
        assert_eq!(hint, Some(TutorialHint::Move));
    }
}
