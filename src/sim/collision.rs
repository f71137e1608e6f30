//! Collision detection and response for solid platforms
//!
//! The tricky part of a platformer: deciding which side of a platform the
//! player hit. Overlap alone cannot tell a landing from a wall bump, so the
//! player's pre-move rectangle is compared against the platform edges with a
//! tolerance band.

use glam::Vec2;

use super::rect::Rect;
use super::state::WallSide;
use crate::consts::{SIDE_TOLERANCE, VERTICAL_TOLERANCE};

/// Which face of a solid platform the player met
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Came down onto the top surface
    Landed,
    /// Came up into the underside
    Ceiling,
    /// Hit a vertical face; the wall is on this side of the player
    Wall(WallSide),
    /// Overlapping, but no side could be identified from the pre-move pose
    Unresolved,
}

/// Result of a solid platform collision check
#[derive(Debug, Clone, Copy)]
pub struct CollisionResult {
    pub contact: Contact,
    /// Corrected top-left position for the player
    pub pos: Vec2,
}

/// Check the player against one solid platform.
///
/// `prev` is the player's rectangle before this tick's integration, `now`
/// after it. `vel` is the velocity that moved it. Returns `None` when the
/// rectangles do not overlap.
pub fn solid_collision(prev: Rect, now: Rect, vel: Vec2, solid: &Rect) -> Option<CollisionResult> {
    if !now.overlaps(solid) {
        return None;
    }

    let contact = classify(prev, vel, solid);
    let pos = match contact {
        Contact::Landed => Vec2::new(now.pos.x, solid.top() - now.height()),
        Contact::Ceiling => Vec2::new(now.pos.x, solid.bottom()),
        Contact::Wall(WallSide::Right) => Vec2::new(solid.left() - now.width(), now.pos.y),
        Contact::Wall(WallSide::Left) => Vec2::new(solid.right(), now.pos.y),
        Contact::Unresolved => now.pos,
    };

    Some(CollisionResult { contact, pos })
}

/// Decide the contact side from the pre-move rectangle
fn classify(prev: Rect, vel: Vec2, solid: &Rect) -> Contact {
    // Was above (within the band) and not moving up
    if prev.bottom() <= solid.top() + VERTICAL_TOLERANCE && vel.y >= 0.0 {
        return Contact::Landed;
    }
    // Was below (within the band) and moving up
    if prev.top() >= solid.bottom() - VERTICAL_TOLERANCE && vel.y < 0.0 {
        return Contact::Ceiling;
    }
    // Approached from the left: the wall is on the player's right
    if prev.right() <= solid.left() + SIDE_TOLERANCE {
        return Contact::Wall(WallSide::Right);
    }
    // Approached from the right: the wall is on the player's left
    if prev.left() >= solid.right() - SIDE_TOLERANCE {
        return Contact::Wall(WallSide::Left);
    }
    Contact::Unresolved
}
