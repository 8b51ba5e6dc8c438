//! Player kinematics, collision response and status effects
//!
//! One call to [`Player::update`] is one simulation step. The order of the
//! steps inside it matters: horizontal resolution runs before the backtrack
//! clamp, the clamp runs before vertical movement, and jump input is applied
//! last so a grounded jump survives the floor snap of the same frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{HasCollisionBox, Rect, collides};
use super::entities::PowerUpKind;
use super::events::{Announcement, EventSink, GameEvent};
use super::obstacle::Obstacle;
use super::tick::TickInput;
use super::world::World;
use crate::config::GameConfig;

/// Which way the sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Why the player is currently invincible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvincibilityReason {
    /// Grace period after a hit; obstacles still block
    Damage,
    /// Power-up; obstacles are passed through
    PowerUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Invincibility {
    pub reason: InvincibilityReason,
    /// Clock time the effect started (ms)
    pub since: f64,
}

/// Death animation progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeathAnimation {
    pub frame: u32,
    pub frame_started: f64,
    pub complete: bool,
}

/// The player character
///
/// Timed effects store the clock time (ms) they started; `None` means the
/// effect is off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    /// Position at the start of the current step
    pub prev_pos: Vec2,
    pub facing: Facing,

    pub lives: u32,
    pub score: u64,
    pub coin_score: u64,

    pub jumping: bool,
    pub double_jumped: bool,

    pub speed_boost: Option<f64>,
    pub flying: Option<f64>,
    pub invincibility: Option<Invincibility>,
    pub immobilized: Option<f64>,
    pub hurt_since: Option<f64>,
    pub dying: Option<DeathAnimation>,

    /// High-water mark of x
    pub furthest_right: f32,
    /// Last stable ground or platform contact
    pub respawn: Vec2,
    /// Latches once the player has moved at all
    pub has_moved: bool,
    last_life_announced: bool,
}

impl Player {
    /// Fresh player at the configured spawn point
    pub fn new(config: &GameConfig) -> Self {
        let p = &config.player;
        let spawn = Vec2::new(p.initial_x, p.initial_y);
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            width: p.width,
            height: p.height,
            prev_pos: spawn,
            facing: Facing::Right,
            lives: p.initial_lives,
            score: 0,
            coin_score: 0,
            jumping: false,
            double_jumped: false,
            speed_boost: None,
            flying: None,
            invincibility: None,
            immobilized: None,
            hurt_since: None,
            dying: None,
            furthest_right: spawn.x,
            respawn: spawn,
            has_moved: false,
            last_life_announced: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility.is_some()
    }

    pub fn invincible_from_damage(&self) -> bool {
        matches!(
            self.invincibility,
            Some(Invincibility {
                reason: InvincibilityReason::Damage,
                ..
            })
        )
    }

    /// Power-up invincibility: obstacles are ignored entirely
    pub fn passes_through_obstacles(&self) -> bool {
        matches!(
            self.invincibility,
            Some(Invincibility {
                reason: InvincibilityReason::PowerUp,
                ..
            })
        )
    }

    pub fn is_speed_boosted(&self) -> bool {
        self.speed_boost.is_some()
    }

    pub fn is_flying(&self) -> bool {
        self.flying.is_some()
    }

    pub fn is_immobilized(&self) -> bool {
        self.immobilized.is_some()
    }

    pub fn is_dying(&self) -> bool {
        self.dying.is_some()
    }

    /// Hurt animation window is open
    pub fn is_hurt(&self, now: f64, config: &GameConfig) -> bool {
        self.hurt_since
            .is_some_and(|since| now - since < config.player.hurt_ms)
    }

    /// Horizontal speed with any boost applied
    pub fn effective_speed(&self, config: &GameConfig) -> f32 {
        let p = &config.player;
        if self.is_speed_boosted() {
            p.base_speed * p.speed_boost_multiplier
        } else {
            p.base_speed
        }
    }

    /// Leftmost x the player may reach
    pub fn left_boundary(&self, config: &GameConfig) -> f32 {
        (self.furthest_right - config.player.max_backtrack).max(0.0)
    }

    /// Advance one step
    ///
    /// Returns true once the death animation has played out.
    pub fn update(
        &mut self,
        input: &TickInput,
        world: &mut World,
        now: f64,
        config: &GameConfig,
        events: &mut dyn EventSink,
    ) -> bool {
        if self.dying.is_some() {
            return self.advance_death(now, config);
        }

        if let Some(since) = self.immobilized {
            if now - since > config.player.immobilized_ms {
                self.immobilized = None;
            }
            return false;
        }

        let p = &config.player;
        let speed = self.effective_speed(config);
        self.vel.x = if input.move_left {
            -speed
        } else if input.move_right {
            speed
        } else {
            0.0
        };
        if self.vel.x > 0.0 {
            self.facing = Facing::Right;
        } else if self.vel.x < 0.0 {
            self.facing = Facing::Left;
        }

        // Gravity
        let gravity = if self.is_flying() {
            p.gravity * p.flying_gravity_factor
        } else {
            p.gravity
        };
        self.vel.y += gravity;
        self.prev_pos = self.pos;

        let passes_through = self.passes_through_obstacles();
        // Obstacle hit this step (index into world.obstacles)
        let mut hit: Option<usize> = None;
        // Bombs set off by touch; ignored for the rest of the step
        let mut triggered: Vec<u32> = Vec::new();

        // === Horizontal ===
        self.pos.x += self.vel.x;

        for (i, obstacle) in world.obstacles.iter_mut().enumerate() {
            if !obstacle.is_active() {
                continue;
            }
            let hitbox = obstacle.collision_box();
            if !self.rect().overlaps(&hitbox) {
                continue;
            }
            if obstacle.is_armed_bomb() {
                if !passes_through {
                    set_off_bomb(obstacle, &mut triggered, events);
                }
                continue;
            }
            if passes_through {
                continue;
            }
            hit = Some(i);
            if self.vel.x > 0.0 {
                self.pos.x = hitbox.left() - self.width;
            } else if self.vel.x < 0.0 {
                self.pos.x = hitbox.right();
            }
        }

        for platform in &world.platforms {
            if !self.rect().overlaps(&platform.rect) {
                continue;
            }
            let landing =
                self.vel.y > 0.0 && self.prev_pos.y + self.height <= platform.rect.top();
            if landing {
                continue;
            }
            if self.vel.x > 0.0 {
                self.pos.x = platform.rect.left() - self.width;
            } else if self.vel.x < 0.0 {
                self.pos.x = platform.rect.right();
            }
        }

        self.furthest_right = self.furthest_right.max(self.pos.x);
        self.clamp_to_backtrack_limit(config);

        // === Vertical ===
        self.pos.y += self.vel.y;

        for floor in &world.floors {
            if self.vel.y > 0.0 && collides(&self.rect(), floor) {
                self.land_on(floor.rect.top());
            }
        }

        for platform in &world.platforms {
            self.resolve_platform_vertical(platform.rect);
        }

        for (i, obstacle) in world.obstacles.iter_mut().enumerate() {
            if !obstacle.is_active() || triggered.contains(&obstacle.id) {
                continue;
            }
            let hitbox = obstacle.collision_box();
            if !self.rect().overlaps(&hitbox) {
                continue;
            }
            if obstacle.is_armed_bomb() {
                if !passes_through {
                    set_off_bomb(obstacle, &mut triggered, events);
                }
                continue;
            }
            if passes_through {
                continue;
            }
            hit = Some(i);
            if self.vel.y > 0.0 {
                self.pos.y = hitbox.top() - self.height;
                self.vel.y = 0.0;
                self.jumping = false;
                self.double_jumped = false;
            } else if self.vel.y < 0.0 {
                self.pos.y = hitbox.bottom();
                self.vel.y = 0.0;
            }
        }

        // === Pit fall ===
        if self.pos.y > config.screen.play_area_height {
            if !self.lose_life(events) {
                log::debug!("Fell into a pit on the last life at x={:.0}", self.pos.x);
                self.start_dying(now, events);
                return false;
            }
            log::debug!(
                "Fell into a pit at x={:.0}, {} lives left",
                self.pos.x,
                self.lives
            );
            events.announce(Announcement::PitFall);
            self.pos = self.respawn;
            self.vel = Vec2::ZERO;
            self.clamp_to_backtrack_limit(config);
            self.start_damage_invincibility(now);
            self.immobilized = Some(now);
        }

        // === Obstacle damage ===
        if let Some(i) = hit {
            if !self.is_invincible() {
                let obstacle = &mut world.obstacles[i];
                if obstacle.handle_collision() {
                    let kind = obstacle.kind();
                    let obstacle_rect = obstacle.rect();
                    if !self.lose_life(events) {
                        self.start_dying(now, events);
                        return false;
                    }
                    log::debug!("Hit {} at x={:.0}", kind.as_str(), self.pos.x);
                    events.announce(Announcement::Hurt { kind });
                    self.start_damage_invincibility(now);

                    // Push clear of the obstacle so the next step doesn't re-collide
                    if self.rect().center().x < obstacle_rect.center().x {
                        self.pos.x = obstacle_rect.left() - self.width - p.knockback;
                    } else {
                        self.pos.x = obstacle_rect.right() + p.knockback;
                    }
                    self.clamp_to_backtrack_limit(config);
                }
            }
        }

        self.collect_pickups(world, now, config, events);
        self.expire_effects(now, config);
        self.update_score(config);

        // === Jump input ===
        if input.jump && self.immobilized.is_none() {
            if !self.jumping {
                self.vel.y = p.jump_velocity;
                self.jumping = true;
            } else if !self.double_jumped {
                self.vel.y = p.jump_velocity;
                self.double_jumped = true;
                events.emit(GameEvent::DoubleJump {
                    pos: Vec2::new(self.pos.x + self.width / 2.0, self.pos.y + self.height),
                });
            } else if self.is_flying() {
                self.vel.y = -speed;
            }
        }

        if self.vel != Vec2::ZERO {
            self.has_moved = true;
        }
        false
    }

    fn clamp_to_backtrack_limit(&mut self, config: &GameConfig) {
        let left = self.left_boundary(config);
        if self.pos.x < left {
            self.pos.x = left;
        }
    }

    fn land_on(&mut self, surface_top: f32) {
        self.pos.y = surface_top - self.height;
        self.vel.y = 0.0;
        self.jumping = false;
        self.double_jumped = false;
        self.respawn = self.pos;
    }

    fn resolve_platform_vertical(&mut self, platform: Rect) {
        let rect = self.rect();
        let prev_bottom = self.prev_pos.y + self.height;

        if rect.overlaps(&platform) {
            let feet_near_top = rect.bottom() <= platform.top() + 10.0;
            let was_above = prev_bottom <= platform.top();
            if self.vel.y > 0.0 && (feet_near_top || was_above) {
                self.land_on(platform.top());
            } else if self.vel.y < 0.0 {
                // Head bump
                self.pos.y = platform.bottom();
                self.vel.y = 0.0;
            }
            return;
        }

        // Crossed the whole platform within one step
        let aligned = rect.right() > platform.left() && rect.left() < platform.right();
        if !aligned {
            return;
        }
        let rose_through = self.prev_pos.y >= platform.bottom() && rect.bottom() <= platform.top();
        let fell_through =
            self.vel.y > 0.0 && prev_bottom <= platform.top() && rect.top() >= platform.bottom();
        if rose_through || fell_through {
            self.land_on(platform.top());
        }
    }

    /// Take one life; returns false when none are left
    fn lose_life(&mut self, events: &mut dyn EventSink) -> bool {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            return false;
        }
        if self.lives > 1 {
            self.last_life_announced = false;
        } else if !self.last_life_announced {
            self.last_life_announced = true;
            events.announce(Announcement::LastLife);
        }
        true
    }

    fn gain_life(&mut self, events: &mut dyn EventSink) {
        self.lives += 1;
        self.last_life_announced = false;
        events.announce(Announcement::ExtraLife);
    }

    fn start_damage_invincibility(&mut self, now: f64) {
        self.invincibility = Some(Invincibility {
            reason: InvincibilityReason::Damage,
            since: now,
        });
        self.hurt_since = Some(now);
    }

    fn start_dying(&mut self, now: f64, events: &mut dyn EventSink) {
        log::info!("Player died with score {}", self.score);
        self.dying = Some(DeathAnimation {
            frame: 0,
            frame_started: now,
            complete: false,
        });
        self.vel = Vec2::ZERO;
        self.jumping = false;
        self.double_jumped = false;
        self.speed_boost = None;
        self.flying = None;
        self.invincibility = None;
        self.immobilized = None;
        events.announce(Announcement::Died);
    }

    fn advance_death(&mut self, now: f64, config: &GameConfig) -> bool {
        let p = &config.player;
        let Some(death) = self.dying.as_mut() else {
            return false;
        };
        if !death.complete && now - death.frame_started > p.death_frame_delay_ms {
            death.frame += 1;
            death.frame_started = now;
            if death.frame >= p.death_frames {
                death.complete = true;
                death.frame = p.death_frames - 1;
            }
        }
        death.complete
    }

    /// Award every overlapping pickup once, removing one entry per id
    fn collect_pickups(
        &mut self,
        world: &mut World,
        now: f64,
        config: &GameConfig,
        events: &mut dyn EventSink,
    ) {
        let player_box = self.rect();
        let mut collected: Vec<u32> = Vec::new();

        let mut i = 0;
        while i < world.coins.len() {
            let coin = &world.coins[i];
            if collides(&player_box, coin) && !collected.contains(&coin.id) {
                collected.push(coin.id);
                let coin = world.coins.remove(i);
                self.coin_score += config.player.coin_value;
                events.emit(GameEvent::CoinCollected {
                    pos: Vec2::new(coin.rect.x, coin.rect.y),
                });
            } else {
                i += 1;
            }
        }

        let mut i = 0;
        while i < world.power_ups.len() {
            let power_up = &world.power_ups[i];
            if collides(&player_box, power_up) && !collected.contains(&power_up.id) {
                collected.push(power_up.id);
                let power_up = world.power_ups.remove(i);
                events.emit(GameEvent::PowerUpCollected {
                    pos: Vec2::new(power_up.rect.x, power_up.rect.y),
                    kind: power_up.kind,
                });
                self.apply_power_up(power_up.kind, now, events);
            } else {
                i += 1;
            }
        }
    }

    fn apply_power_up(&mut self, kind: PowerUpKind, now: f64, events: &mut dyn EventSink) {
        log::debug!("Collected {} power-up", kind.as_str());
        match kind {
            PowerUpKind::Speed => {
                self.speed_boost = Some(now);
                events.announce(Announcement::SpeedBoost);
            }
            PowerUpKind::Flying => {
                self.flying = Some(now);
                events.announce(Announcement::Flying);
            }
            PowerUpKind::Invincibility => {
                self.invincibility = Some(Invincibility {
                    reason: InvincibilityReason::PowerUp,
                    since: now,
                });
                events.announce(Announcement::Invincibility);
            }
            PowerUpKind::Life => self.gain_life(events),
        }
    }

    fn expire_effects(&mut self, now: f64, config: &GameConfig) {
        let p = &config.player;
        if self.speed_boost.is_some_and(|t| now - t > p.speed_boost_ms) {
            self.speed_boost = None;
        }
        if self.flying.is_some_and(|t| now - t > p.flying_ms) {
            self.flying = None;
        }
        if let Some(inv) = self.invincibility {
            let duration = match inv.reason {
                InvincibilityReason::Damage => p.damage_invincibility_ms,
                InvincibilityReason::PowerUp => p.invincibility_ms,
            };
            if now - inv.since > duration {
                self.invincibility = None;
            }
        }
    }

    fn update_score(&mut self, config: &GameConfig) {
        let distance = (self.furthest_right - config.player.initial_x).max(0.0);
        self.score = (distance / 10.0).floor() as u64 + self.coin_score;
    }
}

/// Touching an armed bomb lights it instead of hurting
fn set_off_bomb(bomb: &mut Obstacle, triggered: &mut Vec<u32>, events: &mut dyn EventSink) {
    if bomb.trigger() {
        log::debug!("Bomb {} set off by contact", bomb.id);
        triggered.push(bomb.id);
        events.emit(GameEvent::BombExploded {
            pos: bomb.rect().center(),
        });
    }
}

impl HasCollisionBox for Player {
    fn bounds(&self) -> Rect {
        self.rect()
    }
}
