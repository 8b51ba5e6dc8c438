//! Obstacles and the bomb lifecycle
//!
//! Spikes, fire and saws are stateless hazards. Bombs walk through
//! `Armed -> Countdown -> Exploding -> Spent`; a spent bomb carries no
//! geometry, so its collision box is empty by construction.
//!
//! Spikes and fire are built from repeated sprite tiles: the builder snaps
//! their width down to a whole number of tiles, and the final size is fixed
//! once the obstacle exists.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{HasCollisionBox, Rect};
use crate::config::ObstacleConfig;

/// Animation frame counts and frame times (seconds)
const FIRE_FRAMES: u32 = 3;
const FIRE_FRAME_TIME: f32 = 0.15;
const SAW_FRAMES: u32 = 8;
const SAW_FRAME_TIME: f32 = 0.1;
const BOMB_IDLE_FRAMES: u32 = 10;
const BOMB_IDLE_FRAME_TIME: f32 = 0.1;

/// Requested size when the caller gives none
pub const DEFAULT_OBSTACLE_SIZE: f32 = 30.0;

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Spikes,
    Fire,
    Saw,
    Bomb,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 4] = [
        ObstacleKind::Spikes,
        ObstacleKind::Fire,
        ObstacleKind::Saw,
        ObstacleKind::Bomb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Spikes => "spikes",
            ObstacleKind::Fire => "fire",
            ObstacleKind::Saw => "saw",
            ObstacleKind::Bomb => "bomb",
        }
    }
}

/// Bomb lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BombState {
    /// Fuse not lit until the bomb first appears on screen
    Armed { fuse: f32 },
    /// Fuse burning (seconds left)
    Countdown { remaining: f32 },
    /// Blast animation running; the blast hitbox lives while `frame` is in range
    Exploding { frame: u32, elapsed: f32 },
    /// Finished; no hitbox, never reactivates
    Spent,
}

/// Per-type hazard state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Hazard {
    Spikes,
    Fire,
    Saw,
    Bomb(BombState),
}

impl Hazard {
    pub fn kind(&self) -> ObstacleKind {
        match self {
            Hazard::Spikes => ObstacleKind::Spikes,
            Hazard::Fire => ObstacleKind::Fire,
            Hazard::Saw => ObstacleKind::Saw,
            Hazard::Bomb(_) => ObstacleKind::Bomb,
        }
    }
}

/// A hazard placed in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    rect: Rect,
    hazard: Hazard,
    /// Side-by-side sprite tiles (spikes/fire), 1 otherwise
    copies: u32,
    difficulty_factor: f32,
    /// Height of the spike base strip
    strip_height: f32,
    /// Blast square side while exploding
    blast_size: f32,
    explosion_frames: u32,
    explosion_frame_time: f32,
    /// Current animation frame (rendering only)
    pub anim_frame: u32,
    anim_time: f32,
    anim_speed: f32,
}

impl Obstacle {
    /// Nominal (drawn) box
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn kind(&self) -> ObstacleKind {
        self.hazard.kind()
    }

    pub fn copies(&self) -> u32 {
        self.copies
    }

    /// Difficulty the obstacle was generated at
    pub fn difficulty_factor(&self) -> f32 {
        self.difficulty_factor
    }

    /// Bomb state, if this is a bomb
    pub fn bomb_state(&self) -> Option<BombState> {
        match self.hazard {
            Hazard::Bomb(state) => Some(state),
            _ => None,
        }
    }

    /// Inactive obstacles are neither collided with nor drawn
    pub fn is_active(&self) -> bool {
        !matches!(self.hazard, Hazard::Bomb(BombState::Spent))
    }

    /// Bomb has gone off (exploding or spent)
    pub fn exploded(&self) -> bool {
        matches!(
            self.hazard,
            Hazard::Bomb(BombState::Exploding { .. } | BombState::Spent)
        )
    }

    /// Bomb still waiting to go off
    pub fn is_armed_bomb(&self) -> bool {
        matches!(
            self.hazard,
            Hazard::Bomb(BombState::Armed { .. } | BombState::Countdown { .. })
        )
    }

    /// Fuse is lit (the bomb has been seen)
    pub fn fuse_lit(&self) -> bool {
        matches!(
            self.hazard,
            Hazard::Bomb(
                BombState::Countdown { .. } | BombState::Exploding { .. } | BombState::Spent
            )
        )
    }

    /// Advance animation, fuse and explosion
    ///
    /// Returns true when a bomb's fuse ran out during this update.
    pub fn update(&mut self, dt: f32, camera_x: f32, viewport_width: f32) -> bool {
        let mut detonated = false;
        match self.hazard {
            Hazard::Spikes => {}
            Hazard::Fire => self.animate(dt, FIRE_FRAMES, FIRE_FRAME_TIME),
            Hazard::Saw => self.animate(dt, SAW_FRAMES, SAW_FRAME_TIME),
            Hazard::Bomb(state) => {
                let next = match state {
                    BombState::Armed { fuse } => {
                        self.animate(dt, BOMB_IDLE_FRAMES, BOMB_IDLE_FRAME_TIME);
                        // Fuse lights the first time the bomb is on screen
                        let screen_x = self.rect.x - camera_x;
                        if (0.0..=viewport_width).contains(&screen_x) {
                            BombState::Countdown { remaining: fuse }
                        } else {
                            state
                        }
                    }
                    BombState::Countdown { remaining } => {
                        self.animate(dt, BOMB_IDLE_FRAMES, BOMB_IDLE_FRAME_TIME);
                        let remaining = remaining - dt;
                        if remaining <= 0.0 {
                            detonated = true;
                            BombState::Exploding {
                                frame: 0,
                                elapsed: 0.0,
                            }
                        } else {
                            BombState::Countdown { remaining }
                        }
                    }
                    BombState::Exploding { frame, elapsed } => {
                        let elapsed = elapsed + dt;
                        if elapsed >= self.explosion_frame_time {
                            let frame = frame + 1;
                            if frame >= self.explosion_frames {
                                BombState::Spent
                            } else {
                                BombState::Exploding {
                                    frame,
                                    elapsed: 0.0,
                                }
                            }
                        } else {
                            BombState::Exploding { frame, elapsed }
                        }
                    }
                    BombState::Spent => BombState::Spent,
                };
                self.hazard = Hazard::Bomb(next);
            }
        }
        if detonated {
            log::debug!("Bomb {} fuse ran out at x={:.0}", self.id, self.rect.x);
        }
        detonated
    }

    /// Set a bomb off immediately; returns true if it was still armed
    pub fn trigger(&mut self) -> bool {
        if self.is_armed_bomb() {
            self.hazard = Hazard::Bomb(BombState::Exploding {
                frame: 0,
                elapsed: 0.0,
            });
            true
        } else {
            false
        }
    }

    /// Player touched this obstacle; returns whether the touch hurts
    ///
    /// An armed bomb explodes instead of hurting. Everything else,
    /// including a bomb's blast, hurts.
    pub fn handle_collision(&mut self) -> bool {
        !self.trigger()
    }

    fn animate(&mut self, dt: f32, frames: u32, frame_time: f32) {
        self.anim_time += dt * self.anim_speed;
        if self.anim_time >= frame_time {
            self.anim_time = 0.0;
            self.anim_frame = (self.anim_frame + 1) % frames;
        }
    }
}

impl HasCollisionBox for Obstacle {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn collision_box(&self) -> Rect {
        let r = self.rect;
        match self.hazard {
            // Only the base strip is lethal
            Hazard::Spikes => Rect::new(
                r.x,
                r.bottom() - self.strip_height,
                r.width,
                self.strip_height,
            ),
            // Bottom half of the flames
            Hazard::Fire => Rect::new(r.x, r.bottom() - r.height / 2.0, r.width, r.height / 2.0),
            Hazard::Saw => r,
            // Body of the bomb, resting on its base
            Hazard::Bomb(BombState::Armed { .. } | BombState::Countdown { .. }) => Rect::new(
                r.x + r.width / 4.0,
                r.bottom() - r.height / 2.0,
                r.width / 2.0,
                r.height / 2.0,
            ),
            Hazard::Bomb(BombState::Exploding { frame, .. }) => {
                if frame < self.explosion_frames {
                    r.centered_square(self.blast_size)
                } else {
                    Rect::EMPTY
                }
            }
            Hazard::Bomb(BombState::Spent) => Rect::EMPTY,
        }
    }
}

/// Pick an obstacle type from its shape and the current difficulty
///
/// Every type starts at weight 1. Flat shapes favour spikes, wide/low ones
/// fire, square ones saws, and high difficulty favours bombs.
pub fn choose_kind<R: Rng + ?Sized>(
    width: f32,
    height: f32,
    difficulty_factor: f32,
    rng: &mut R,
) -> ObstacleKind {
    let mut weights = [1.0_f32; 4];
    if height < width * 0.5 {
        weights[0] += 3.0;
    }
    if height < width && height > 0.0 {
        weights[1] += 2.0;
    }
    if (width - height).abs() < 10.0 {
        weights[2] += 2.0;
    }
    if difficulty_factor > 0.5 {
        weights[3] += 2.0 * difficulty_factor;
    }

    let total: f32 = weights.iter().sum();
    let roll = rng.random_range(0.0..=total);
    let mut cumulative = 0.0;
    for (kind, weight) in ObstacleKind::ALL.iter().zip(weights) {
        cumulative += weight;
        if roll <= cumulative {
            return *kind;
        }
    }
    ObstacleKind::Spikes
}

/// Two-phase obstacle construction
///
/// Collect the requested size and type, then `build` resolves the type,
/// the tile count and the final (possibly narrower) width.
#[derive(Debug, Clone)]
pub struct ObstacleBuilder {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    kind: Option<ObstacleKind>,
    difficulty_factor: f32,
}

impl ObstacleBuilder {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            width: DEFAULT_OBSTACLE_SIZE,
            height: DEFAULT_OBSTACLE_SIZE,
            kind: None,
            difficulty_factor: 0.0,
        }
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn kind(mut self, kind: ObstacleKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn difficulty(mut self, difficulty_factor: f32) -> Self {
        self.difficulty_factor = difficulty_factor;
        self
    }

    /// Width the obstacle will actually have for a given type
    pub fn resolved_width(&self, kind: ObstacleKind, config: &ObstacleConfig) -> (f32, u32) {
        let tile = match kind {
            ObstacleKind::Spikes => config.spike_tile_width,
            ObstacleKind::Fire => config.fire_tile_width,
            ObstacleKind::Saw | ObstacleKind::Bomb => return (self.width, 1),
        };
        let copies = ((self.width / tile).floor() as u32).max(1);
        (tile * copies as f32, copies)
    }

    pub fn build<R: Rng + ?Sized>(self, id: u32, rng: &mut R, config: &ObstacleConfig) -> Obstacle {
        let kind = self.kind.unwrap_or_else(|| {
            choose_kind(self.width, self.height, self.difficulty_factor, rng)
        });
        let (width, copies) = self.resolved_width(kind, config);

        let hazard = match kind {
            ObstacleKind::Spikes => Hazard::Spikes,
            ObstacleKind::Fire => Hazard::Fire,
            ObstacleKind::Saw => Hazard::Saw,
            ObstacleKind::Bomb => Hazard::Bomb(BombState::Armed {
                fuse: rng.random_range(config.bomb_fuse_min..=config.bomb_fuse_max),
            }),
        };

        Obstacle {
            id,
            rect: Rect::new(self.x, self.y, width, self.height),
            hazard,
            copies,
            difficulty_factor: self.difficulty_factor,
            strip_height: config.spike_hitbox_height.min(self.height),
            blast_size: width * config.blast_scale,
            explosion_frames: config.explosion_frames,
            explosion_frame_time: config.explosion_frame_time,
            anim_frame: 0,
            anim_time: 0.0,
            anim_speed: rng.random_range(0.5..=1.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    fn bomb_at(x: f32) -> Obstacle {
        ObstacleBuilder::new(x, 400.0)
            .size(30.0, 30.0)
            .kind(ObstacleKind::Bomb)
            .build(1, &mut rng(), &ObstacleConfig::default())
    }

    #[test]
    fn test_spikes_snap_width_to_whole_tiles() {
        let config = ObstacleConfig::default();
        let spikes = ObstacleBuilder::new(0.0, 0.0)
            .size(95.0, 35.0)
            .kind(ObstacleKind::Spikes)
            .build(1, &mut rng(), &config);
        assert_eq!(spikes.copies(), 3);
        assert_eq!(spikes.rect().width, 90.0);

        // Narrower than one tile still gets one full tile
        let fire = ObstacleBuilder::new(0.0, 0.0)
            .size(20.0, 30.0)
            .kind(ObstacleKind::Fire)
            .build(2, &mut rng(), &config);
        assert_eq!(fire.copies(), 1);
        assert_eq!(fire.rect().width, 30.0);
    }

    #[test]
    fn test_saw_keeps_requested_size() {
        let saw = ObstacleBuilder::new(10.0, 20.0)
            .size(64.0, 64.0)
            .kind(ObstacleKind::Saw)
            .build(1, &mut rng(), &ObstacleConfig::default());
        assert_eq!(saw.rect(), Rect::new(10.0, 20.0, 64.0, 64.0));
        assert_eq!(saw.collision_box(), saw.rect());
    }

    #[test]
    fn test_spike_and_fire_hitboxes_hug_the_base() {
        let config = ObstacleConfig::default();
        let spikes = ObstacleBuilder::new(0.0, 100.0)
            .size(60.0, 40.0)
            .kind(ObstacleKind::Spikes)
            .build(1, &mut rng(), &config);
        assert_eq!(spikes.collision_box(), Rect::new(0.0, 135.0, 60.0, 5.0));

        let fire = ObstacleBuilder::new(0.0, 100.0)
            .size(60.0, 40.0)
            .kind(ObstacleKind::Fire)
            .build(2, &mut rng(), &config);
        assert_eq!(fire.collision_box(), Rect::new(0.0, 120.0, 60.0, 20.0));
        assert!(spikes.rect().contains(&spikes.collision_box()));
        assert!(fire.rect().contains(&fire.collision_box()));
    }

    #[test]
    fn test_armed_bomb_hitbox_stays_inside_its_box() {
        let mut bomb = bomb_at(100.0);
        assert_eq!(bomb.collision_box(), Rect::new(107.5, 415.0, 15.0, 15.0));
        assert_eq!(bomb.collision_box().bottom(), bomb.rect().bottom());

        // Still true once the fuse is lit
        bomb.update(1.0 / 60.0, 0.0, 800.0);
        assert!(bomb.fuse_lit());
        assert!(bomb.rect().contains(&bomb.collision_box()));
    }

    #[test]
    fn test_bomb_fuse_waits_until_visible() {
        let mut bomb = bomb_at(2000.0);
        for _ in 0..600 {
            bomb.update(1.0 / 60.0, 0.0, 800.0);
        }
        assert!(matches!(bomb.bomb_state(), Some(BombState::Armed { .. })));

        // Camera scrolls so the bomb is on screen
        bomb.update(1.0 / 60.0, 1500.0, 800.0);
        assert!(bomb.fuse_lit());
        assert!(!bomb.exploded());
    }

    #[test]
    fn test_bomb_explodes_after_fuse_then_spends() {
        let config = ObstacleConfig::default();
        let mut bomb = bomb_at(100.0);
        let armed_box = bomb.collision_box();
        assert!(bomb.rect().contains(&armed_box));

        let mut detonations = 0;
        // 6 seconds is past the longest fuse
        for _ in 0..360 {
            if bomb.update(1.0 / 60.0, 0.0, 800.0) {
                detonations += 1;
                let blast = bomb.collision_box();
                assert_eq!(blast.width, 30.0 * config.blast_scale);
                assert_eq!(blast.center(), bomb.rect().center());
            }
            if !bomb.is_active() {
                break;
            }
        }
        assert_eq!(detonations, 1);
        assert!(!bomb.is_active());
        assert!(bomb.collision_box().is_empty());
    }

    #[test]
    fn test_spent_bomb_never_reactivates() {
        let mut bomb = bomb_at(100.0);
        assert!(bomb.trigger());
        for _ in 0..20 {
            bomb.update(0.1, 0.0, 800.0);
        }
        assert!(!bomb.is_active());

        for _ in 0..1000 {
            assert!(!bomb.update(0.1, 0.0, 800.0));
            assert!(!bomb.is_active());
            assert!(bomb.collision_box().is_empty());
        }
        assert!(!bomb.trigger());
        assert!(bomb.handle_collision());
        assert!(!bomb.is_active());
    }

    #[test]
    fn test_bomb_contact_explodes_without_damage() {
        let mut bomb = bomb_at(100.0);
        assert!(!bomb.handle_collision(), "first touch must not hurt");
        assert!(bomb.exploded());
        assert!(bomb.handle_collision(), "the blast hurts");
    }

    #[test]
    fn test_choose_kind_favours_flat_spikes() {
        let mut rng = rng();
        let mut counts = [0u32; 4];
        for _ in 0..4000 {
            let kind = choose_kind(90.0, 20.0, 0.0, &mut rng);
            counts[kind as usize] += 1;
        }
        // Weights 4:3:1:1
        assert!(counts[0] > counts[1]);
        assert!(counts[1] > counts[2]);
        assert!(counts[1] > counts[3]);
    }

    #[test]
    fn test_choose_kind_square_shapes_favour_saws() {
        let mut rng = rng();
        let mut counts = [0u32; 4];
        for _ in 0..4000 {
            let kind = choose_kind(50.0, 50.0, 0.0, &mut rng);
            counts[kind as usize] += 1;
        }
        // Weights 1:1:3:1
        assert!(counts[2] > counts[0] * 2);
        assert!(counts[2] > counts[3] * 2);
    }

    #[test]
    fn test_fire_animation_cycles() {
        let mut fire = ObstacleBuilder::new(0.0, 0.0)
            .kind(ObstacleKind::Fire)
            .build(1, &mut rng(), &ObstacleConfig::default());
        for _ in 0..100 {
            fire.update(0.2, 0.0, 800.0);
            assert!(fire.anim_frame < FIRE_FRAMES);
        }
    }
}
