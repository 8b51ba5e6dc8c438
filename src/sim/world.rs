//! World entity lists
//!
//! Every list is ordered by ascending x because the generator only ever
//! appends to the right, so the last element of a list is the most
//! recently generated one.

use serde::{Deserialize, Serialize};

use super::collision::HasCollisionBox;
use super::entities::{Coin, Floor, Platform, PowerUp};
use super::events::{EventSink, GameEvent};
use super::obstacle::Obstacle;
use crate::config::GameConfig;

/// All live world entities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    pub floors: Vec<Floor>,
    pub platforms: Vec<Platform>,
    pub obstacles: Vec<Obstacle>,
    pub coins: Vec<Coin>,
    pub power_ups: Vec<PowerUp>,
    next_id: u32,
}

impl World {
    /// Fresh world with a single floor spanning the first screen
    pub fn with_initial_floor(config: &GameConfig) -> Self {
        let mut world = Self {
            next_id: 1,
            ..Self::default()
        };
        let id = world.next_entity_id();
        world.floors.push(Floor::new(
            id,
            0.0,
            config.screen.viewport_width,
            config.screen.play_area_height,
            config.generation.floor_height,
        ));
        world
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Most recently generated floor
    ///
    /// # Panics
    /// If the world has no floor. A world built by `with_initial_floor`
    /// always keeps at least its newest floor, so this is a logic error.
    pub fn last_floor(&self) -> &Floor {
        self.floors
            .last()
            .expect("world must always contain at least one floor")
    }

    pub fn last_platform(&self) -> Option<&Platform> {
        self.platforms.last()
    }

    pub fn entity_count(&self) -> usize {
        self.floors.len()
            + self.platforms.len()
            + self.obstacles.len()
            + self.coins.len()
            + self.power_ups.len()
    }

    /// Advance cosmetic animations and bomb fuses
    pub fn update_entities(
        &mut self,
        dt: f32,
        camera_x: f32,
        viewport_width: f32,
        events: &mut dyn EventSink,
    ) {
        for obstacle in &mut self.obstacles {
            if obstacle.update(dt, camera_x, viewport_width) {
                events.emit(GameEvent::BombExploded {
                    pos: obstacle.rect().center(),
                });
            }
        }
        for coin in &mut self.coins {
            coin.update(dt);
        }
        for power_up in &mut self.power_ups {
            power_up.update(dt);
        }
    }

    /// Drop everything whose right edge is behind the pruning boundary
    ///
    /// Returns how many entities were removed.
    pub fn prune(&mut self, furthest_right: f32, config: &GameConfig) -> usize {
        let boundary = pruning_boundary(furthest_right, config);
        let before = self.entity_count();

        let keep = |e: &dyn HasCollisionBox| e.bounds().right() >= boundary;
        self.floors.retain(|e| keep(e));
        self.platforms.retain(|e| keep(e));
        self.obstacles.retain(|e| keep(e));
        self.coins.retain(|e| keep(e));
        self.power_ups.retain(|e| keep(e));

        let removed = before - self.entity_count();
        if removed > 0 {
            log::trace!("Pruned {} entities behind x={:.0}", removed, boundary);
        }
        removed
    }
}

/// Leftmost x an entity's right edge may reach before it is pruned
pub fn pruning_boundary(furthest_right: f32, config: &GameConfig) -> f32 {
    (furthest_right - config.player.max_backtrack - config.generation.pruning_margin).max(0.0)
}
