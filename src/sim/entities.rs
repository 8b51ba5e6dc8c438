//! Terrain and pickup entities
//!
//! Floors and platforms are walkable surfaces; coins and power-ups are
//! one-shot pickups removed by the player's collection step.

use serde::{Deserialize, Serialize};

use super::collision::{HasCollisionBox, Rect};

/// Continuous walkable ground; a pit is the gap between two floors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: u32,
    pub rect: Rect,
}

impl Floor {
    /// Floor run starting at `x`, resting on the bottom of the play area
    pub fn new(id: u32, x: f32, width: f32, play_area_height: f32, height: f32) -> Self {
        Self {
            id,
            rect: Rect::new(x, play_area_height - height, width, height),
        }
    }
}

impl HasCollisionBox for Floor {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

/// Floating walkable surface, solid from every side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub rect: Rect,
}

impl Platform {
    pub fn new(id: u32, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            rect: Rect::new(x, y, width, height),
        }
    }
}

impl HasCollisionBox for Platform {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

/// Degrees a coin turns per animation step
const COIN_ROTATION_STEP: f32 = 5.0;
/// Seconds between coin animation steps
const COIN_ANIMATION_INTERVAL: f32 = 0.05;

/// Collectible coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub rect: Rect,
    /// Spin angle for rendering (degrees)
    #[serde(default)]
    pub rotation: f32,
    #[serde(skip)]
    anim_time: f32,
}

impl Coin {
    pub fn new(id: u32, x: f32, y: f32, size: f32) -> Self {
        Self {
            id,
            rect: Rect::new(x, y, size, size),
            rotation: 0.0,
            anim_time: 0.0,
        }
    }

    /// Advance the spin animation
    pub fn update(&mut self, dt: f32) {
        self.anim_time += dt;
        if self.anim_time >= COIN_ANIMATION_INTERVAL {
            self.rotation = (self.rotation + COIN_ROTATION_STEP) % 360.0;
            self.anim_time = 0.0;
        }
    }
}

impl HasCollisionBox for Coin {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Faster horizontal movement for a while
    Speed,
    /// Reduced gravity and repeatable upward thrust
    Flying,
    /// Pass through obstacles untouched
    Invincibility,
    /// One extra life, applied immediately
    Life,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Speed,
        PowerUpKind::Flying,
        PowerUpKind::Invincibility,
        PowerUpKind::Life,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Speed => "speed",
            PowerUpKind::Flying => "flying",
            PowerUpKind::Invincibility => "invincibility",
            PowerUpKind::Life => "life",
        }
    }
}

const PULSE_MIN: f32 = 0.8;
const PULSE_MAX: f32 = 1.2;
const PULSE_STEP: f32 = 0.05;
const PULSE_INTERVAL: f32 = 0.15;

/// Collectible power-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub rect: Rect,
    /// Render scale, bounces between 0.8 and 1.2
    #[serde(default = "default_pulse_scale")]
    pub pulse_scale: f32,
    #[serde(default = "default_pulse_direction")]
    pulse_direction: f32,
    #[serde(skip)]
    anim_time: f32,
}

impl PowerUp {
    pub fn new(id: u32, kind: PowerUpKind, x: f32, y: f32, size: f32) -> Self {
        Self {
            id,
            kind,
            rect: Rect::new(x, y, size, size),
            pulse_scale: 1.0,
            pulse_direction: PULSE_STEP,
            anim_time: 0.0,
        }
    }

    /// Advance the pulse animation
    pub fn update(&mut self, dt: f32) {
        self.anim_time += dt;
        if self.anim_time < PULSE_INTERVAL {
            return;
        }
        self.anim_time = 0.0;
        self.pulse_scale += self.pulse_direction;
        if self.pulse_scale > PULSE_MAX {
            self.pulse_scale = PULSE_MAX;
            self.pulse_direction = -PULSE_STEP;
        } else if self.pulse_scale < PULSE_MIN {
            self.pulse_scale = PULSE_MIN;
            self.pulse_direction = PULSE_STEP;
        }
    }
}

fn default_pulse_scale() -> f32 {
    1.0
}

fn default_pulse_direction() -> f32 {
    PULSE_STEP
}

impl HasCollisionBox for PowerUp {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_rests_on_play_area_bottom() {
        let floor = Floor::new(1, 0.0, 800.0, 500.0, 20.0);
        assert_eq!(floor.rect.y, 480.0);
        assert_eq!(floor.rect.bottom(), 500.0);
    }

    #[test]
    fn test_coin_spin_wraps() {
        let mut coin = Coin::new(1, 0.0, 0.0, 20.0);
        for _ in 0..100 {
            coin.update(0.06);
        }
        assert!(coin.rotation >= 0.0 && coin.rotation < 360.0);
        assert_eq!(coin.rotation, (100.0 * COIN_ROTATION_STEP) % 360.0);
    }

    #[test]
    fn test_power_up_pulse_stays_in_band() {
        let mut power_up = PowerUp::new(1, PowerUpKind::Speed, 0.0, 0.0, 20.0);
        for _ in 0..200 {
            power_up.update(0.2);
            assert!(power_up.pulse_scale >= PULSE_MIN - 1e-4);
            assert!(power_up.pulse_scale <= PULSE_MAX + 1e-4);
        }
    }

    #[test]
    fn test_restored_power_up_keeps_pulsing() {
        // Saved without any animation fields
        let json = r#"{ "id": 7, "kind": "Flying", "rect": { "x": 0.0, "y": 0.0, "width": 20.0, "height": 20.0 } }"#;
        let mut power_up: PowerUp = serde_json::from_str(json).expect("power-up json");
        assert_eq!(power_up.pulse_scale, 1.0);
        power_up.update(PULSE_INTERVAL);
        assert!(power_up.pulse_scale > 1.0);

        // Mid-pulse state survives a round trip, shrinking included
        let mut shrinking = PowerUp::new(8, PowerUpKind::Life, 0.0, 0.0, 20.0);
        while shrinking.pulse_direction > 0.0 {
            shrinking.update(PULSE_INTERVAL);
        }
        let before = shrinking.pulse_scale;
        let json = serde_json::to_string(&shrinking).expect("serialize");
        let mut restored: PowerUp = serde_json::from_str(&json).expect("deserialize");
        restored.update(PULSE_INTERVAL);
        assert!(restored.pulse_scale < before);
    }
}
