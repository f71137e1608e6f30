//! Gecko Dash - headless native runner
//!
//! Plays a scripted endless run without a window and logs what happened.
//!
//! Usage: `gecko-dash [settings.json] [seed] [low|medium|high]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use gecko_dash::consts::SIM_DT;
    use gecko_dash::scheduler::{LocalStats, RunStateMachine, StatsSink};
    use gecko_dash::sim::{LevelMode, RunPhase, Stats};
    use gecko_dash::{QualityPreset, Scheduler, Settings};

    env_logger::init();
    log::info!("Gecko Dash (headless) starting...");

    let mut args = std::env::args().skip(1);
    let mut settings = match args.next() {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default().with_seed(clock_seed()),
    };
    if let Some(seed) = args.next() {
        match seed.parse() {
            Ok(seed) => settings.seed = seed,
            Err(e) => log::warn!("Ignoring seed {seed:?}: {e}"),
        }
    }
    if let Some(name) = args.next() {
        match QualityPreset::from_name(&name) {
            Some(preset) => settings.apply_preset(preset),
            None => log::warn!("Unknown quality {name:?}, keeping {}", settings.quality.as_str()),
        }
    }
    log::info!("Seed {}, quality {}", settings.seed, settings.quality.as_str());

    let mut scheduler = Scheduler::new(settings, LocalStats::default(), RunStateMachine::new());
    scheduler.start(LevelMode::Endless);

    let mut input = demo::script(120);
    let mut hud = demo::LogRenderer::default();

    while input.remaining() > 0 {
        scheduler.advance(SIM_DT, &mut input, &mut hud);
        match scheduler.phase() {
            // Always take the extra heart
            RunPhase::LevelTransition => {
                scheduler.choose_upgrade(|stats| Stats {
                    max_health: stats.max_health + 1,
                    health: stats.max_health + 1,
                    ..stats
                });
            }
            RunPhase::GameOver | RunPhase::Menu => break,
            _ => {}
        }
    }

    let stats = scheduler.stats_sink().snapshot();
    log::info!(
        "Run over after {} frames ({:?}): score {}, distance {}m, coins {}, health {}/{}, level {}",
        hud.frames,
        scheduler.phase(),
        stats.score,
        stats.distance,
        stats.coins,
        stats.health,
        stats.max_health,
        stats.level
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core is embedded by a host page; there is no standalone entry point
}

/// Seed from the wall clock when none was configured
#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use gecko_dash::platform::{ActionSet, ScriptedInput};
    use gecko_dash::scheduler::{Frame, Renderer};
    use gecko_dash::sim::GameEvent;

    /// Run right, jumping and dashing on a fixed rhythm
    pub fn script(rounds: usize) -> ScriptedInput {
        let run = ActionSet::MOVE_RIGHT;
        let jump = run | ActionSet::JUMP;
        let dash = run | ActionSet::DASH;

        (0..rounds).fold(ScriptedInput::new(), |script, _| {
            script
                .hold(run, 30)
                .hold(jump, 1)
                .hold(run, 12)
                .hold(jump, 1)
                .hold(run, 8)
                .hold(dash, 1)
                .hold(run, 20)
        })
    }

    /// Logs gameplay events instead of drawing
    #[derive(Default)]
    pub struct LogRenderer {
        pub frames: u64,
    }

    impl Renderer for LogRenderer {
        fn present(&mut self, frame: &Frame<'_>) {
            self.frames += 1;
            for event in frame.events {
                match event {
                    GameEvent::Hurt { health } => log::info!("Hurt, {health} health left"),
                    GameEvent::Milestone { level } => log::info!("Reached level {level}"),
                    other => log::debug!("{other:?}"),
                }
            }
            if self.frames % 600 == 0 {
                log::info!(
                    "Frame {}: x={:.0}, score {}, {} platforms, {} particles",
                    self.frames,
                    frame.player.pos.x,
                    frame.stats.score,
                    frame.platforms.len(),
                    frame.particles.len()
                );
            }
        }
    }
}
