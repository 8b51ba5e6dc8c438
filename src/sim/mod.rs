//! Simulation module
//!
//! All gameplay logic lives here. No rendering, audio or platform code:
//! - Frame-driven steps (optionally fixed-size substeps)
//! - Injected config and RNG (seedable for tests)
//! - Effect timers read the simulation clock, never the wall clock
//! - Presentation cues leave as `GameEvent`s

pub mod camera;
pub mod collision;
pub mod entities;
pub mod events;
pub mod generator;
pub mod obstacle;
pub mod player;
pub mod state;
pub mod tick;
pub mod world;

pub use camera::Camera;
pub use collision::{HasCollisionBox, Rect, collides};
pub use entities::{Coin, Floor, Platform, PowerUp, PowerUpKind};
pub use events::{Announcement, EventSink, GameEvent};
pub use generator::{GeneratedSegment, Pit, difficulty_factor, generate_segment, needs_segment};
pub use obstacle::{BombState, Hazard, Obstacle, ObstacleBuilder, ObstacleKind};
pub use player::{DeathAnimation, Facing, Invincibility, InvincibilityReason, Player};
pub use state::{DebugFlags, GamePhase, GameState, Snapshot};
pub use tick::{TickInput, TickOutcome, tick};
pub use world::{World, pruning_boundary};
