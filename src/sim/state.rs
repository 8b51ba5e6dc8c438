//! Game state and lifecycle
//!
//! Owns everything one game needs: config, player, world, camera, RNG,
//! the simulation clock and the buffered events for the presentation side.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::events::GameEvent;
use super::player::Player;
use super::world::World;
use crate::config::GameConfig;
use crate::error::ConfigError;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    #[default]
    Running,
    /// Death animation done; final score on screen
    LostMessage,
    /// Next tick starts a fresh game
    Over,
}

/// Presentation-only switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugFlags {
    pub show_hitboxes: bool,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub phase: GamePhase,
    /// Simulation clock (ms); every effect timer reads this
    pub clock_ms: f64,
    pub player: Player,
    pub world: World,
    pub camera: Camera,
    pub debug: DebugFlags,
    /// Ticks processed
    pub frame: u64,
    /// Clock time the game entered `LostMessage`
    pub lost_at: Option<f64>,
    pub games_started: u32,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,
    /// Unsimulated time in fixed-step mode (ms)
    pub(crate) accumulator_ms: f64,
    /// Jump edge waiting for the next simulated step
    pub(crate) pending_jump: bool,
}

impl GameState {
    /// Validate the config and start the first game
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_rng(&mut rand::rng()),
        };

        let mut state = Self {
            player: Player::new(&config),
            world: World::with_initial_floor(&config),
            config,
            phase: GamePhase::Running,
            clock_ms: 0.0,
            camera: Camera::new(),
            debug: DebugFlags::default(),
            frame: 0,
            lost_at: None,
            games_started: 0,
            rng,
            events: Vec::new(),
            accumulator_ms: 0.0,
            pending_jump: false,
        };
        state.new_game();
        Ok(state)
    }

    /// Fresh player, camera and world with just the initial floor
    pub fn new_game(&mut self) {
        self.player = Player::new(&self.config);
        self.world = World::with_initial_floor(&self.config);
        self.camera = Camera::new();
        self.phase = GamePhase::Running;
        self.lost_at = None;
        self.accumulator_ms = 0.0;
        self.pending_jump = false;
        self.games_started += 1;
        log::info!("Starting game {}", self.games_started);
    }

    pub fn score(&self) -> u64 {
        self.player.score
    }

    /// Events emitted since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view for drawing
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            clock_ms: self.clock_ms,
            camera_x: self.camera.x,
            score: self.player.score,
            lives: self.player.lives,
            player_has_moved: self.player.has_moved,
            debug: self.debug,
            player: &self.player,
            world: &self.world,
        }
    }
}

/// Everything the presentation layer reads in one frame
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub clock_ms: f64,
    pub camera_x: f32,
    pub score: u64,
    pub lives: u32,
    pub player_has_moved: bool,
    pub debug: DebugFlags,
    pub player: &'a Player,
    pub world: &'a World,
}
