//! Narrative and effect notifications
//!
//! The simulation never waits on presentation. It pushes discrete events
//! into a sink at the moment they happen; whoever drains the sink decides
//! how (or whether) to show them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::PowerUpKind;
use super::obstacle::ObstacleKind;

/// Status-line announcements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Announcement {
    PitFall,
    /// Damage from an obstacle (a bomb here means its blast)
    Hurt {
        kind: ObstacleKind,
    },
    LastLife,
    Died,
    ExtraLife,
    SpeedBoost,
    Flying,
    Invincibility,
}

/// Everything the simulation reports to its collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Announce(Announcement),
    CoinCollected { pos: Vec2 },
    PowerUpCollected { pos: Vec2, kind: PowerUpKind },
    DoubleJump { pos: Vec2 },
    BombExploded { pos: Vec2 },
}

impl GameEvent {
    pub fn announcement(&self) -> Option<Announcement> {
        match self {
            GameEvent::Announce(a) => Some(*a),
            _ => None,
        }
    }
}

/// Fire-and-forget event receiver
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);

    fn announce(&mut self, announcement: Announcement) {
        self.emit(GameEvent::Announce(announcement));
    }
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}
