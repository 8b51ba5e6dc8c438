//! Game configuration
//!
//! A single read-only structure injected at construction. Every section
//! falls back to its defaults, so a JSON file only needs the fields it
//! overrides.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// How simulation steps relate to rendered frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum StepMode {
    /// One physics step per tick; the tick's dt only drives clocks
    #[default]
    PerFrame,
    /// Fixed-size steps drained from an accumulator
    Fixed { step_ms: f64, max_substeps: u32 },
}

/// Screen and play-area geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub viewport_width: f32,
    /// Falling below this y line is a pit fall
    pub play_area_height: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            viewport_width: VIEWPORT_WIDTH,
            play_area_height: PLAY_AREA_HEIGHT,
        }
    }
}

/// Player body, physics and effect durations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    pub initial_x: f32,
    pub initial_y: f32,

    // === Physics (per step) ===
    pub gravity: f32,
    pub flying_gravity_factor: f32,
    pub jump_velocity: f32,
    pub base_speed: f32,
    pub speed_boost_multiplier: f32,
    pub knockback: f32,

    // === Lives & score ===
    pub initial_lives: u32,
    pub coin_value: u64,

    // === Durations (ms) ===
    pub speed_boost_ms: f64,
    pub flying_ms: f64,
    pub invincibility_ms: f64,
    pub damage_invincibility_ms: f64,
    pub immobilized_ms: f64,
    pub hurt_ms: f64,
    pub death_frames: u32,
    pub death_frame_delay_ms: f64,

    pub max_backtrack: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            initial_x: PLAYER_INITIAL_X,
            initial_y: PLAYER_INITIAL_Y,

            gravity: GRAVITY,
            flying_gravity_factor: FLYING_GRAVITY_FACTOR,
            jump_velocity: JUMP_VELOCITY,
            base_speed: BASE_MOVE_SPEED,
            speed_boost_multiplier: SPEED_BOOST_MULTIPLIER,
            knockback: KNOCKBACK,

            initial_lives: INITIAL_LIVES,
            coin_value: COIN_VALUE,

            speed_boost_ms: SPEED_BOOST_DURATION,
            flying_ms: FLYING_DURATION,
            invincibility_ms: INVINCIBILITY_DURATION,
            damage_invincibility_ms: INVINCIBILITY_FROM_DAMAGE_DURATION,
            immobilized_ms: IMMOBILIZED_DURATION,
            hurt_ms: HURT_ANIMATION_DURATION,
            death_frames: DEATH_ANIMATION_FRAMES,
            death_frame_delay_ms: DEATH_ANIMATION_FRAME_DELAY,

            max_backtrack: MAX_BACKTRACK_DISTANCE,
        }
    }
}

/// Dead-zone camera
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub right_boundary_factor: f32,
    pub left_boundary_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            right_boundary_factor: CAMERA_RIGHT_BOUNDARY_FACTOR,
            left_boundary_factor: CAMERA_LEFT_BOUNDARY_FACTOR,
        }
    }
}

/// Difficulty curve: every chance and size ramps from base to max
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    pub start_distance: f32,
    pub max_distance: f32,
    pub base_obstacle_chance: f32,
    pub max_obstacle_chance: f32,
    pub base_pit_chance: f32,
    pub max_pit_chance: f32,
    pub min_pit_width: f32,
    pub base_max_pit_width: f32,
    pub max_pit_width: f32,
    pub base_powerup_chance: f32,
    pub max_powerup_chance: f32,
    pub coin_chance: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            start_distance: DIFFICULTY_START_DISTANCE,
            max_distance: DIFFICULTY_MAX_DISTANCE,
            base_obstacle_chance: BASE_OBSTACLE_CHANCE,
            max_obstacle_chance: MAX_OBSTACLE_CHANCE,
            base_pit_chance: BASE_PIT_CHANCE,
            max_pit_chance: MAX_PIT_CHANCE,
            min_pit_width: MIN_PIT_WIDTH,
            base_max_pit_width: BASE_MAX_PIT_WIDTH,
            max_pit_width: MAX_PIT_WIDTH,
            base_powerup_chance: BASE_POWERUP_CHANCE,
            max_powerup_chance: MAX_POWERUP_CHANCE,
            coin_chance: COIN_CHANCE,
        }
    }
}

/// Terrain and pickup layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub floor_height: f32,
    pub min_floor_run: f32,
    pub max_floor_run: f32,
    pub platform_height: f32,
    pub min_platform_width: f32,
    pub max_platform_width: f32,
    pub platform_edge_buffer: f32,
    pub min_platform_distance: f32,
    pub extra_platform_chance: f32,
    pub obstacle_buffer: f32,
    pub pickup_size: f32,
    pub pickup_hover: f32,
    pub pickup_attempts: u32,
    pub lookahead: f32,
    pub pruning_margin: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            floor_height: FLOOR_HEIGHT,
            min_floor_run: MIN_FLOOR_RUN,
            max_floor_run: MAX_FLOOR_RUN,
            platform_height: PLATFORM_HEIGHT,
            min_platform_width: MIN_PLATFORM_WIDTH,
            max_platform_width: MAX_PLATFORM_WIDTH,
            platform_edge_buffer: PLATFORM_EDGE_BUFFER,
            min_platform_distance: MIN_PLATFORM_HORIZONTAL_DISTANCE,
            extra_platform_chance: EXTRA_PLATFORM_CHANCE,
            obstacle_buffer: OBSTACLE_BUFFER,
            pickup_size: PICKUP_SIZE,
            pickup_hover: PICKUP_HOVER,
            pickup_attempts: PICKUP_PLACEMENT_ATTEMPTS,
            lookahead: GENERATION_LOOKAHEAD,
            pruning_margin: PRUNING_MARGIN,
        }
    }
}

/// Obstacle geometry and bomb timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub spike_tile_width: f32,
    pub fire_tile_width: f32,
    pub spike_hitbox_height: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub bomb_fuse_min: f32,
    pub bomb_fuse_max: f32,
    pub explosion_frames: u32,
    pub explosion_frame_time: f32,
    pub blast_scale: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            spike_tile_width: SPIKE_TILE_WIDTH,
            fire_tile_width: FIRE_TILE_WIDTH,
            spike_hitbox_height: SPIKE_HITBOX_HEIGHT,
            min_width: MIN_OBSTACLE_WIDTH,
            max_width: MAX_OBSTACLE_WIDTH,
            min_height: MIN_OBSTACLE_HEIGHT,
            max_height: MAX_OBSTACLE_HEIGHT,
            bomb_fuse_min: BOMB_FUSE_MIN,
            bomb_fuse_max: BOMB_FUSE_MAX,
            explosion_frames: EXPLOSION_FRAMES,
            explosion_frame_time: EXPLOSION_FRAME_TIME,
            blast_scale: BLAST_SCALE,
        }
    }
}

/// Loop timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub step_mode: StepMode,
    pub game_over_display_ms: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            step_mode: StepMode::PerFrame,
            game_over_display_ms: GAME_OVER_DISPLAY_DURATION,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameConfig {
    pub screen: ScreenConfig,
    pub player: PlayerConfig,
    pub camera: CameraConfig,
    pub difficulty: DifficultyConfig,
    pub generation: GenerationConfig,
    pub obstacles: ObstacleConfig,
    pub timing: TimingConfig,
    /// Fixed RNG seed (tests, reproducible demos); entropy when absent
    pub seed: Option<u64>,
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field for values that would break the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.screen;
        positive("screen.viewport_width", s.viewport_width)?;
        positive("screen.play_area_height", s.play_area_height)?;

        let p = &self.player;
        positive("player.width", p.width)?;
        positive("player.height", p.height)?;
        finite("player.initial_x", p.initial_x)?;
        finite("player.initial_y", p.initial_y)?;
        non_negative("player.initial_x", p.initial_x)?;
        positive("player.gravity", p.gravity)?;
        unit("player.flying_gravity_factor", p.flying_gravity_factor)?;
        finite("player.jump_velocity", p.jump_velocity)?;
        if p.jump_velocity >= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "player.jump_velocity must point upward (negative), got {}",
                p.jump_velocity
            )));
        }
        positive("player.base_speed", p.base_speed)?;
        positive("player.speed_boost_multiplier", p.speed_boost_multiplier)?;
        non_negative("player.knockback", p.knockback)?;
        if p.initial_lives == 0 {
            return Err(ConfigError::NotPositive {
                field: "player.initial_lives",
                value: 0.0,
            });
        }
        positive_ms("player.speed_boost_ms", p.speed_boost_ms)?;
        positive_ms("player.flying_ms", p.flying_ms)?;
        positive_ms("player.invincibility_ms", p.invincibility_ms)?;
        positive_ms("player.damage_invincibility_ms", p.damage_invincibility_ms)?;
        positive_ms("player.immobilized_ms", p.immobilized_ms)?;
        positive_ms("player.hurt_ms", p.hurt_ms)?;
        positive_ms("player.death_frame_delay_ms", p.death_frame_delay_ms)?;
        if p.death_frames == 0 {
            return Err(ConfigError::NotPositive {
                field: "player.death_frames",
                value: 0.0,
            });
        }
        positive("player.max_backtrack", p.max_backtrack)?;

        let c = &self.camera;
        open_unit("camera.right_boundary_factor", c.right_boundary_factor)?;
        open_unit("camera.left_boundary_factor", c.left_boundary_factor)?;
        ordered(
            "camera boundary factors",
            c.left_boundary_factor,
            c.right_boundary_factor,
        )?;

        let d = &self.difficulty;
        finite("difficulty.start_distance", d.start_distance)?;
        finite("difficulty.max_distance", d.max_distance)?;
        if d.max_distance <= d.start_distance {
            return Err(ConfigError::Invalid(format!(
                "difficulty.max_distance ({}) must exceed difficulty.start_distance ({})",
                d.max_distance, d.start_distance
            )));
        }
        for (field, value) in [
            ("difficulty.base_obstacle_chance", d.base_obstacle_chance),
            ("difficulty.max_obstacle_chance", d.max_obstacle_chance),
            ("difficulty.base_pit_chance", d.base_pit_chance),
            ("difficulty.max_pit_chance", d.max_pit_chance),
            ("difficulty.base_powerup_chance", d.base_powerup_chance),
            ("difficulty.max_powerup_chance", d.max_powerup_chance),
            ("difficulty.coin_chance", d.coin_chance),
        ] {
            unit(field, value)?;
        }
        positive("difficulty.min_pit_width", d.min_pit_width)?;
        ordered("difficulty.pit_width", d.min_pit_width, d.base_max_pit_width)?;
        ordered("difficulty.pit_width", d.base_max_pit_width, d.max_pit_width)?;

        let g = &self.generation;
        positive("generation.floor_height", g.floor_height)?;
        positive("generation.min_floor_run", g.min_floor_run)?;
        ordered("generation.floor_run", g.min_floor_run, g.max_floor_run)?;
        positive("generation.platform_height", g.platform_height)?;
        positive("generation.min_platform_width", g.min_platform_width)?;
        ordered(
            "generation.platform_width",
            g.min_platform_width,
            g.max_platform_width,
        )?;
        non_negative("generation.platform_edge_buffer", g.platform_edge_buffer)?;
        non_negative("generation.min_platform_distance", g.min_platform_distance)?;
        unit("generation.extra_platform_chance", g.extra_platform_chance)?;
        non_negative("generation.obstacle_buffer", g.obstacle_buffer)?;
        positive("generation.pickup_size", g.pickup_size)?;
        non_negative("generation.pickup_hover", g.pickup_hover)?;
        if g.pickup_attempts == 0 {
            return Err(ConfigError::NotPositive {
                field: "generation.pickup_attempts",
                value: 0.0,
            });
        }
        non_negative("generation.lookahead", g.lookahead)?;
        non_negative("generation.pruning_margin", g.pruning_margin)?;
        if g.min_floor_run < g.pickup_size {
            return Err(ConfigError::Invalid(format!(
                "generation.min_floor_run ({}) must fit a pickup ({})",
                g.min_floor_run, g.pickup_size
            )));
        }
        if s.play_area_height - BRIDGE_BOTTOM_CLEARANCE < PLATFORM_MIN_Y {
            return Err(ConfigError::Invalid(format!(
                "screen.play_area_height ({}) too small for platform placement",
                s.play_area_height
            )));
        }

        let o = &self.obstacles;
        positive("obstacles.spike_tile_width", o.spike_tile_width)?;
        positive("obstacles.fire_tile_width", o.fire_tile_width)?;
        positive("obstacles.spike_hitbox_height", o.spike_hitbox_height)?;
        positive("obstacles.min_width", o.min_width)?;
        ordered("obstacles.width", o.min_width, o.max_width)?;
        positive("obstacles.min_height", o.min_height)?;
        ordered("obstacles.height", o.min_height, o.max_height)?;
        positive("obstacles.bomb_fuse_min", o.bomb_fuse_min)?;
        ordered("obstacles.bomb_fuse", o.bomb_fuse_min, o.bomb_fuse_max)?;
        if o.explosion_frames == 0 {
            return Err(ConfigError::NotPositive {
                field: "obstacles.explosion_frames",
                value: 0.0,
            });
        }
        positive("obstacles.explosion_frame_time", o.explosion_frame_time)?;
        positive("obstacles.blast_scale", o.blast_scale)?;

        let t = &self.timing;
        positive_ms("timing.game_over_display_ms", t.game_over_display_ms)?;
        if let StepMode::Fixed {
            step_ms,
            max_substeps,
        } = t.step_mode
        {
            positive_ms("timing.step_mode.step_ms", step_ms)?;
            if max_substeps == 0 {
                return Err(ConfigError::NotPositive {
                    field: "timing.step_mode.max_substeps",
                    value: 0.0,
                });
            }
        }

        Ok(())
    }

    /// Top of the floor surface in world space
    pub fn floor_top(&self) -> f32 {
        self.screen.play_area_height - self.generation.floor_height
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite {
            field,
            value: value as f64,
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive {
            field,
            value: value as f64,
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive {
            field,
            value: value as f64,
        })
    }
}

fn positive_ms(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field, value });
    }
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange {
            field,
            value: value as f64,
        })
    }
}

fn open_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange {
            field,
            value: value as f64,
        })
    }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    finite(field, min)?;
    finite(field, max)?;
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange {
            field,
            min: min as f64,
            max: max as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{ "player": { "gravity": 0.6 }, "seed": 7 }"#)
            .expect("partial config should parse");
        assert_eq!(config.player.gravity, 0.6);
        assert_eq!(config.player.jump_velocity, JUMP_VELOCITY);
        assert_eq!(config.screen.viewport_width, VIEWPORT_WIDTH);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_rejects_negative_size() {
        let mut config = GameConfig::default();
        config.player.width = -5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "player.width",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_nan() {
        let mut config = GameConfig::default();
        config.generation.obstacle_buffer = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_rejects_inverted_difficulty_range() {
        let mut config = GameConfig::default();
        config.difficulty.max_distance = config.difficulty.start_distance;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_probability_out_of_range() {
        let mut config = GameConfig::default();
        config.difficulty.max_pit_chance = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfUnitRange { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_fixed_step_mode_round_trips_through_json() {
        let json = r#"{ "timing": { "step_mode": { "Fixed": { "step_ms": 16.0, "max_substeps": 4 } } } }"#;
        let config = GameConfig::from_json(json).expect("fixed step config");
        assert_eq!(
            config.timing.step_mode,
            StepMode::Fixed {
                step_ms: 16.0,
                max_substeps: 4
            }
        );
    }
}
