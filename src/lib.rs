//! Dasher - an endless side-scrolling platformer
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (player physics, obstacles, level generation)
//! - `config`: Data-driven game tuning, validated at construction
//! - `error`: Configuration errors

pub mod config;
pub mod error;
pub mod sim;

pub use config::GameConfig;
pub use error::ConfigError;

/// Default tuning constants
///
/// Velocities and accelerations are per simulation step (one step per
/// rendered frame at a nominal 60 Hz); durations are milliseconds unless
/// the name says otherwise.
pub mod consts {
    /// Screen dimensions
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;
    pub const STATUS_BAR_HEIGHT: f32 = 100.0;
    pub const PLAY_AREA_HEIGHT: f32 = SCREEN_HEIGHT - STATUS_BAR_HEIGHT;

    /// Player body
    pub const PLAYER_WIDTH: f32 = 50.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;
    pub const PLAYER_INITIAL_X: f32 = 100.0;
    pub const PLAYER_INITIAL_Y: f32 = PLAY_AREA_HEIGHT - PLAYER_HEIGHT - 20.0;

    /// Player physics
    pub const GRAVITY: f32 = 0.45;
    /// Flying keeps two thirds of normal gravity
    pub const FLYING_GRAVITY_FACTOR: f32 = 0.66;
    pub const JUMP_VELOCITY: f32 = -10.0;
    pub const BASE_MOVE_SPEED: f32 = 6.0;
    pub const SPEED_BOOST_MULTIPLIER: f32 = 1.25;
    /// Push-back after taking a hit, away from the obstacle's center
    pub const KNOCKBACK: f32 = 5.0;

    /// Lives and scoring
    pub const INITIAL_LIVES: u32 = 3;
    pub const COIN_VALUE: u64 = 50;

    /// Timed effects (ms)
    pub const SPEED_BOOST_DURATION: f64 = 5000.0;
    pub const FLYING_DURATION: f64 = 5000.0;
    pub const INVINCIBILITY_DURATION: f64 = 5000.0;
    pub const INVINCIBILITY_FROM_DAMAGE_DURATION: f64 = 2000.0;
    pub const IMMOBILIZED_DURATION: f64 = 1000.0;
    pub const HURT_ANIMATION_DURATION: f64 = 500.0;
    pub const DEATH_ANIMATION_FRAMES: u32 = 8;
    pub const DEATH_ANIMATION_FRAME_DELAY: f64 = 150.0;

    /// How far left the player may go from their furthest right position
    pub const MAX_BACKTRACK_DISTANCE: f32 = 1000.0;

    /// Camera dead zone (fractions of viewport width)
    pub const CAMERA_RIGHT_BOUNDARY_FACTOR: f32 = 0.5;
    pub const CAMERA_LEFT_BOUNDARY_FACTOR: f32 = 0.3;

    /// Difficulty ramp
    pub const DIFFICULTY_START_DISTANCE: f32 = 1000.0;
    pub const DIFFICULTY_MAX_DISTANCE: f32 = 20000.0;
    pub const BASE_OBSTACLE_CHANCE: f32 = 0.5;
    pub const MAX_OBSTACLE_CHANCE: f32 = 0.9;
    pub const BASE_PIT_CHANCE: f32 = 0.2;
    pub const MAX_PIT_CHANCE: f32 = 0.5;
    pub const MIN_PIT_WIDTH: f32 = 200.0;
    /// Upper bound of pit width at zero difficulty
    pub const BASE_MAX_PIT_WIDTH: f32 = 300.0;
    pub const MAX_PIT_WIDTH: f32 = 500.0;
    pub const BASE_POWERUP_CHANCE: f32 = 0.05;
    pub const MAX_POWERUP_CHANCE: f32 = 0.25;
    pub const COIN_CHANCE: f32 = 0.4;

    /// Level generation
    pub const FLOOR_HEIGHT: f32 = 20.0;
    pub const MIN_FLOOR_RUN: f32 = 100.0;
    pub const MAX_FLOOR_RUN: f32 = 300.0;
    pub const PLATFORM_HEIGHT: f32 = 20.0;
    pub const MIN_PLATFORM_WIDTH: f32 = 50.0;
    pub const MAX_PLATFORM_WIDTH: f32 = 150.0;
    /// Buffer from each pit edge to its bridge
    pub const PLATFORM_EDGE_BUFFER: f32 = 60.0;
    pub const MIN_PLATFORM_HORIZONTAL_DISTANCE: f32 = 50.0;
    /// Platforms never float higher than this y
    pub const PLATFORM_MIN_Y: f32 = 100.0;
    /// Lowest pit bridge sits this far above the play-area bottom
    pub const BRIDGE_BOTTOM_CLEARANCE: f32 = 150.0;
    /// Lowest extra platform sits this far above the play-area bottom
    pub const PLATFORM_BOTTOM_CLEARANCE: f32 = 100.0;
    pub const EXTRA_PLATFORM_CHANCE: f32 = 0.5;
    pub const OBSTACLE_BUFFER: f32 = 10.0;
    pub const PICKUP_SIZE: f32 = 20.0;
    pub const PICKUP_HOVER: f32 = 30.0;
    pub const PICKUP_PLACEMENT_ATTEMPTS: u32 = 5;
    /// Generate when the visible right edge comes this close to the generated edge
    pub const GENERATION_LOOKAHEAD: f32 = 600.0;
    pub const PRUNING_MARGIN: f32 = 100.0;

    /// Obstacles
    pub const SPIKE_TILE_WIDTH: f32 = 30.0;
    pub const FIRE_TILE_WIDTH: f32 = 30.0;
    pub const SPIKE_HITBOX_HEIGHT: f32 = 5.0;
    pub const MIN_OBSTACLE_WIDTH: f32 = 30.0;
    pub const MAX_OBSTACLE_WIDTH: f32 = 90.0;
    pub const MIN_OBSTACLE_HEIGHT: f32 = 20.0;
    pub const MAX_OBSTACLE_HEIGHT: f32 = 60.0;
    pub const BOMB_FUSE_MIN: f32 = 2.0;
    pub const BOMB_FUSE_MAX: f32 = 5.0;
    pub const EXPLOSION_FRAMES: u32 = 9;
    pub const EXPLOSION_FRAME_TIME: f32 = 0.1;
    pub const BLAST_SCALE: f32 = 3.0;

    /// Game-over screen duration (ms)
    pub const GAME_OVER_DISPLAY_DURATION: f64 = 3000.0;
    /// Nominal frame time the per-frame constants are tuned for
    pub const NOMINAL_FRAME_DT: f32 = 1.0 / 60.0;
}

/// Linear interpolation that returns exactly `b` at `t == 1`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Where `value` sits between `start` and `end`, clamped to [0, 1]
#[inline]
pub fn progress_between(value: f32, start: f32, end: f32) -> f32 {
    ((value - start) / (end - start)).clamp(0.0, 1.0)
}
