//! Dead-zone scroll camera
//!
//! The camera only moves when the player leaves the band between the left
//! and right boundary lines, and then snaps so the player sits exactly on
//! the line they crossed. It never scrolls left of the backtrack boundary.

use serde::{Deserialize, Serialize};

use super::player::Player;
use crate::config::GameConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World x of the viewport's left edge
    pub x: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow the player
    pub fn update(&mut self, player: &Player, config: &GameConfig) {
        let width = config.screen.viewport_width;
        let right_line = width * config.camera.right_boundary_factor;
        let left_line = width * config.camera.left_boundary_factor;

        if player.pos.x > self.x + right_line {
            self.x = player.pos.x - right_line;
        } else if player.pos.x < self.x + left_line {
            self.x = (player.pos.x - left_line).max(player.left_boundary(config));
        }
    }
}
