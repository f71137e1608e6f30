//! Horizontal follow camera

use serde::{Deserialize, Serialize};

use crate::consts::{CAMERA_EASING, CAMERA_LEAD, VIEW_WIDTH};

/// Camera tracking the player's x position with single-pole smoothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World x of the left edge of the view
    pub x: f32,
}

impl Camera {
    /// Ease toward keeping the player `CAMERA_LEAD` units from the left edge
    pub fn follow(&mut self, player_x: f32) {
        let target = player_x - CAMERA_LEAD;
        self.x += (target - self.x) * CAMERA_EASING;
    }

    pub fn reset(&mut self) {
        self.x = 0.0;
    }

    /// World x of the right edge of the view
    pub fn right(&self) -> f32 {
        self.x + VIEW_WIDTH
    }
}
