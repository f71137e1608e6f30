//! Particles and dash trails
//!
//! Purely cosmetic, but simulated here so lifetimes advance with the fixed
//! timestep. Uses its own RNG stream so effects never perturb level layout.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{DashTrail, Particle, ParticleKind, Player};
use crate::Settings;
use crate::consts::{PARTICLE_DECAY, PARTICLE_SPREAD, TRAIL_DECAY, TRAIL_START_ALPHA};

/// PCG stream reserved for cosmetic draws
const EFFECTS_STREAM: u64 = 0x5eed_f00d;

/// Particle and trail system
#[derive(Debug, Clone)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub trails: Vec<DashTrail>,
    rng: Pcg32,
    max_particles: usize,
    trails_enabled: bool,
    next_id: u32,
}

impl Effects {
    pub fn new(settings: &Settings) -> Self {
        Self {
            particles: Vec::new(),
            trails: Vec::new(),
            rng: Pcg32::new(settings.seed, EFFECTS_STREAM),
            max_particles: settings.max_particles(),
            trails_enabled: settings.trails,
            next_id: 0,
        }
    }

    /// Emit `count` particles at `at` with random velocity in a square spread
    pub fn burst(&mut self, at: Vec2, kind: ParticleKind, count: usize) {
        let count = count.min(self.max_particles);
        if count == 0 {
            return;
        }
        // Drop the oldest to make room
        let overflow = (self.particles.len() + count).saturating_sub(self.max_particles);
        if overflow > 0 {
            self.particles.drain(..overflow);
        }

        for _ in 0..count {
            let vel = Vec2::new(
                self.rng.random_range(-PARTICLE_SPREAD..=PARTICLE_SPREAD),
                self.rng.random_range(-PARTICLE_SPREAD..=PARTICLE_SPREAD),
            );
            let id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            self.particles.push(Particle {
                id,
                pos: at,
                vel,
                life: 1.0,
                kind,
            });
        }
    }

    /// Cosmetic coin flip (e.g. wall-slide dust)
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.random_bool(p)
    }

    /// Snapshot the player's pose as a fading afterimage
    pub fn push_trail(&mut self, player: &Player) {
        if !self.trails_enabled {
            return;
        }
        self.trails.push(DashTrail {
            rect: player.rect(),
            facing: player.facing,
            alpha: TRAIL_START_ALPHA,
        });
    }

    /// Advance particles and fade trails by one tick
    pub fn decay(&mut self) {
        for trail in &mut self.trails {
            trail.alpha -= TRAIL_DECAY;
        }
        self.trails.retain(|t| t.alpha > 0.0);

        for particle in &mut self.particles {
            particle.pos += particle.vel;
            particle.life -= PARTICLE_DECAY;
        }
        self.particles.retain(|p| p.life > 0.0);
    }
}
