//! Enemy AI and enemy-vs-player contact

use super::state::{Enemy, EnemyKind, GameEvent, GameState, ParticleKind, Player};
use crate::consts::*;

/// Outcome of the player touching an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyHit {
    /// Came down on its upper half
    Stomp,
    /// Rammed it mid-dash
    DashAttack,
    /// Any other touch hurts the player
    Contact,
}

/// Advance one enemy by a tick
pub fn update_enemy(enemy: &mut Enemy, player_x: f32, frame: u64) {
    match enemy.kind {
        EnemyKind::Patrol => patrol(enemy),
        EnemyKind::Seeker => {
            let dx = player_x - enemy.rect.pos.x;
            enemy.vx = if dx.abs() < SEEKER_DETECTION_RADIUS {
                if dx > 0.0 { SEEKER_SPEED } else { -SEEKER_SPEED }
            } else {
                0.0
            };
            enemy.rect.pos.x += enemy.vx;
        }
        EnemyKind::Floater => {
            patrol(enemy);
            if let Some(origin) = enemy.start_y {
                let phase = frame as f64 * FLOAT_ANGULAR_SPEED as f64;
                enemy.rect.pos.y = origin + phase.sin() as f32 * FLOAT_AMPLITUDE;
            }
        }
    }
}

/// Walk within the patrol bounds, turning around at either end
fn patrol(enemy: &mut Enemy) {
    enemy.rect.pos.x += enemy.vx;
    if enemy.rect.left() <= enemy.patrol_start_x {
        enemy.rect.pos.x = enemy.patrol_start_x;
        enemy.vx = enemy.vx.abs();
    } else if enemy.rect.right() >= enemy.patrol_end_x {
        enemy.rect.pos.x = enemy.patrol_end_x - enemy.rect.width();
        enemy.vx = -enemy.vx.abs();
    }
}

/// Classify an overlap between the player and an enemy
pub fn classify_hit(player: &Player, dashing: bool, enemy: &Enemy) -> EnemyHit {
    let mid = enemy.rect.top() + enemy.rect.height() / 2.0;
    if player.vel.y > 0.0 && player.rect().bottom() < mid + STOMP_TOLERANCE {
        EnemyHit::Stomp
    } else if dashing {
        EnemyHit::DashAttack
    } else {
        EnemyHit::Contact
    }
}

/// Move every enemy, resolve contacts with the player and prune defeated or
/// left-behind enemies.
pub fn step_enemies(state: &mut GameState) {
    let player_x = state.player.pos.x;
    let cull_x = state.camera.x - PRUNE_MARGIN;
    let mut defeated = Vec::new();

    for i in 0..state.world.enemies.len() {
        update_enemy(&mut state.world.enemies[i], player_x, state.frame);

        let enemy = &state.world.enemies[i];
        if enemy.rect.right() < cull_x || !state.player.rect().overlaps(&enemy.rect) {
            continue;
        }
        let (id, rect, kind) = (enemy.id, enemy.rect, enemy.kind);

        match classify_hit(&state.player, state.is_dashing(), enemy) {
            hit @ (EnemyHit::Stomp | EnemyHit::DashAttack) => {
                let stomped = hit == EnemyHit::Stomp;
                defeated.push(id);
                if stomped {
                    state.player.vel.y = STOMP_BOUNCE;
                }
                state.bonus_score += STOMP_SCORE;
                state.stats.score = state.score();
                state
                    .effects
                    .burst(rect.center(), ParticleKind::EnemyDefeat, 15);
                state.events.push(GameEvent::EnemyDefeated { kind, stomped });
            }
            EnemyHit::Contact => {
                if state.game_over_requested() {
                    continue;
                }
                state.take_damage();
                // Knock the player away from the enemy
                let away = if state.player.pos.x < rect.pos.x {
                    -1.0
                } else {
                    1.0
                };
                state.player.vel.y = ENEMY_HIT_BOUNCE_Y;
                state.player.vel.x = away * ENEMY_HIT_BOUNCE_X;
                let center = state.player.rect().center();
                state.effects.burst(center, ParticleKind::Damage, 10);
            }
        }
    }

    let before = state.world.enemies.len();
    state
        .world
        .enemies
        .retain(|e| !defeated.contains(&e.id) && e.rect.right() >= cull_x);
    let removed = before - state.world.enemies.len();
    if removed > 0 {
        log::debug!(
            "Removed {} enemies ({} defeated)",
            removed,
            defeated.len()
        );
    }
}
