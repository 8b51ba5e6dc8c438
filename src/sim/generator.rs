//! Procedural level generation
//!
//! Each call appends one segment to the right of the newest floor:
//! an optional pit with its bridge, a floor run, an optional extra
//! platform, up to two obstacles and up to one coin and one power-up.
//!
//! Fairness rules:
//! - Obstacles never appear inside the visible viewport.
//! - Every pit gets a bridge platform, never skipped.
//! - Pickups never overlap (with a buffer) obstacles placed by the same call.
//!   Obstacles from earlier calls are not re-checked.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::entities::{Coin, Floor, Platform, PowerUp, PowerUpKind};
use super::obstacle::{ObstacleBuilder, choose_kind};
use super::player::Player;
use super::world::World;
use crate::config::GameConfig;
use crate::consts::{BRIDGE_BOTTOM_CLEARANCE, PLATFORM_BOTTOM_CLEARANCE, PLATFORM_MIN_Y};
use crate::{lerp, progress_between};

/// Chance an obstacle tries the newest platform before the floor
const OBSTACLE_ON_PLATFORM_CHANCE: f32 = 0.25;
/// Late-game size boost for obstacles
const SIZE_BOOST_DIFFICULTY: f32 = 0.7;
const SIZE_BOOST_CHANCE: f32 = 0.2;
const SIZE_BOOST_FACTOR: f32 = 1.3;
/// Second obstacle placement
const SECOND_OBSTACLE_DIFFICULTY: f32 = 0.5;
const SECOND_OBSTACLE_MIN_GAP: f32 = 80.0;
const SECOND_OBSTACLE_MAX_GAP: f32 = 160.0;

/// Horizontal gap between two floor runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pit {
    pub start: f32,
    pub end: f32,
}

impl Pit {
    pub fn width(&self) -> f32 {
        self.end - self.start
    }
}

/// What one call to [`generate_segment`] added
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSegment {
    /// New rightmost generated edge
    pub right_edge: f32,
    pub difficulty_factor: f32,
    pub floor: Rect,
    pub pit: Option<Pit>,
    /// Bridge over the pit (id)
    pub bridge: Option<u32>,
    pub extra_platform: Option<u32>,
    pub obstacles: Vec<u32>,
    pub coins: Vec<u32>,
    pub power_ups: Vec<u32>,
}

/// Global difficulty knob in [0, 1], driven only by the player's furthest progress
pub fn difficulty_factor(furthest_right: f32, config: &GameConfig) -> f32 {
    let d = &config.difficulty;
    progress_between(furthest_right, d.start_distance, d.max_distance)
}

pub fn obstacle_chance(difficulty: f32, config: &GameConfig) -> f32 {
    let d = &config.difficulty;
    lerp(d.base_obstacle_chance, d.max_obstacle_chance, difficulty)
}

pub fn pit_chance(difficulty: f32, config: &GameConfig) -> f32 {
    let d = &config.difficulty;
    lerp(d.base_pit_chance, d.max_pit_chance, difficulty)
}

/// Upper bound of pit width at this difficulty
pub fn max_pit_width(difficulty: f32, config: &GameConfig) -> f32 {
    let d = &config.difficulty;
    lerp(d.base_max_pit_width, d.max_pit_width, difficulty)
}

pub fn powerup_chance(difficulty: f32, config: &GameConfig) -> f32 {
    let d = &config.difficulty;
    lerp(d.base_powerup_chance, d.max_powerup_chance, difficulty)
}

/// Whether the world needs another segment to stay ahead of the viewport
pub fn needs_segment(camera_x: f32, world: &World, config: &GameConfig) -> bool {
    camera_x + config.screen.viewport_width > world.last_floor().rect.right() - config.generation.lookahead
}

fn roll<R: Rng + ?Sized>(rng: &mut R, chance: f32) -> bool {
    rng.random::<f32>() < chance
}

/// Uniform draw from `[lo, hi]`, collapsing to `lo` for an empty range
fn range<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..=hi) } else { lo }
}

/// Append the next segment to the world
///
/// # Panics
/// If the world has no floor (see [`World::last_floor`]).
pub fn generate_segment<R: Rng + ?Sized>(
    player: &Player,
    world: &mut World,
    camera_x: f32,
    rng: &mut R,
    config: &GameConfig,
) -> GeneratedSegment {
    let g = &config.generation;
    let play_height = config.screen.play_area_height;
    let floor_top = config.floor_top();
    let visible_right = camera_x + config.screen.viewport_width;

    let difficulty = difficulty_factor(player.furthest_right, config);
    let mut segment = GeneratedSegment {
        difficulty_factor: difficulty,
        ..Default::default()
    };

    let mut new_x = world.last_floor().rect.right();

    // === Pit and bridge ===
    if roll(rng, pit_chance(difficulty, config)) {
        let min_pit = config.difficulty.min_pit_width;
        let pit_width = range(rng, min_pit, max_pit_width(difficulty, config).max(min_pit));
        let pit = Pit {
            start: new_x,
            end: new_x + pit_width,
        };
        let id = world.next_entity_id();
        world.platforms.push(bridge_platform(id, pit, rng, config));
        segment.pit = Some(pit);
        segment.bridge = Some(id);
        new_x = pit.end;
    }

    // === Floor run ===
    let floor_width = range(rng, g.min_floor_run, g.max_floor_run);
    let id = world.next_entity_id();
    let floor = Floor::new(id, new_x, floor_width, play_height, g.floor_height);
    segment.floor = floor.rect;
    segment.right_edge = floor.rect.right();
    world.floors.push(floor);

    // === Extra platform ===
    if roll(rng, g.extra_platform_chance) {
        let x = new_x + range(rng, 0.0, floor_width - g.min_floor_run);
        let y = range(rng, PLATFORM_MIN_Y, play_height - PLATFORM_BOTTOM_CLEARANCE);
        let width = range(rng, g.min_platform_width, g.max_platform_width);
        if too_close_to_platforms(x, width, &world.platforms, g.min_platform_distance) {
            log::trace!("Skipped extra platform at x={:.0}: too close", x);
        } else {
            let id = world.next_entity_id();
            world
                .platforms
                .push(Platform::new(id, x, y, width, g.platform_height));
            segment.extra_platform = Some(id);
        }
    }

    // === Obstacles ===
    let mut placed: Vec<Rect> = Vec::new();
    if roll(rng, obstacle_chance(difficulty, config)) {
        if let Some((id, first)) =
            place_obstacle(world, &segment, visible_right, difficulty, rng, config)
        {
            segment.obstacles.push(id);
            placed.push(first);

            if difficulty > SECOND_OBSTACLE_DIFFICULTY && roll(rng, difficulty * 0.5) {
                if let Some((id, second)) =
                    place_second_obstacle(world, &segment, first, difficulty, rng, config)
                {
                    segment.obstacles.push(id);
                    placed.push(second);
                }
            }
        }
    }

    // === Pickups ===
    let blocked: Vec<Rect> = placed.iter().map(|r| r.expand(g.obstacle_buffer)).collect();
    let pickup_y = floor_top - g.pickup_hover;

    let mut coin_rect = None;
    if roll(rng, config.difficulty.coin_chance) {
        if let Some(rect) = find_pickup_spot(segment.floor, pickup_y, &blocked, rng, config) {
            let id = world.next_entity_id();
            world.coins.push(Coin::new(id, rect.x, rect.y, g.pickup_size));
            segment.coins.push(id);
            coin_rect = Some(rect);
        }
    }

    if roll(rng, powerup_chance(difficulty, config)) {
        let mut avoid = blocked.clone();
        avoid.extend(coin_rect);
        if let Some(rect) = find_pickup_spot(segment.floor, pickup_y, &avoid, rng, config) {
            let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
            let id = world.next_entity_id();
            world
                .power_ups
                .push(PowerUp::new(id, kind, rect.x, rect.y, g.pickup_size));
            segment.power_ups.push(id);
        }
    }

    log::debug!(
        "Segment {:.0}..{:.0} (difficulty {:.2}): pit={} obstacles={} coins={} power_ups={}",
        segment.floor.left(),
        segment.right_edge,
        difficulty,
        segment.pit.is_some(),
        segment.obstacles.len(),
        segment.coins.len(),
        segment.power_ups.len()
    );

    segment
}

/// Platform over a pit, leaving the edge buffer free on both sides
///
/// A pit too narrow for that gets an oversized platform reaching past both
/// edges instead.
fn bridge_platform<R: Rng + ?Sized>(id: u32, pit: Pit, rng: &mut R, config: &GameConfig) -> Platform {
    let g = &config.generation;
    let y = range(
        rng,
        PLATFORM_MIN_Y,
        config.screen.play_area_height - BRIDGE_BOTTOM_CLEARANCE,
    );

    let max_width = g.max_platform_width.min(pit.width() - 2.0 * g.platform_edge_buffer);
    if max_width >= g.min_platform_width {
        let width = range(rng, g.min_platform_width, max_width);
        let min_x = pit.start + g.platform_edge_buffer;
        let max_x = pit.end - width - g.platform_edge_buffer;
        let x = if max_x > min_x {
            range(rng, min_x, max_x)
        } else {
            pit.start + (pit.width() - width) / 2.0
        };
        Platform::new(id, x, y, width, g.platform_height)
    } else {
        log::warn!(
            "Pit of {:.0}px too narrow for a bridge, spanning its edges",
            pit.width()
        );
        Platform::new(
            id,
            pit.start - g.platform_edge_buffer,
            y,
            pit.width() + 2.0 * g.platform_edge_buffer,
            g.platform_height,
        )
    }
}

/// Extra platforms must not overlap, or start just after, an existing one
fn too_close_to_platforms(x: f32, width: f32, platforms: &[Platform], min_distance: f32) -> bool {
    let right = x + width;
    platforms.iter().any(|p| {
        let overlaps = x <= p.rect.right() && right >= p.rect.left();
        let gap = x - p.rect.right();
        overlaps || (0.0..min_distance).contains(&gap)
    })
}

/// Random obstacle size, biased toward the large end as difficulty rises
fn obstacle_size<R: Rng + ?Sized>(difficulty: f32, rng: &mut R, config: &GameConfig) -> (f32, f32) {
    let o = &config.obstacles;
    let bias = 0.5 * difficulty;
    let mut width = range(rng, lerp(o.min_width, o.max_width, bias), o.max_width);
    let mut height = range(rng, lerp(o.min_height, o.max_height, bias), o.max_height);
    if difficulty > SIZE_BOOST_DIFFICULTY && roll(rng, SIZE_BOOST_CHANCE) {
        width *= SIZE_BOOST_FACTOR;
        height *= SIZE_BOOST_FACTOR;
    }
    (width, height)
}

/// Free x range on a surface, right of the visible edge, for a given width
fn surface_span(surface: Rect, width: f32, visible_right: f32, buffer: f32) -> Option<(f32, f32)> {
    let min_x = (surface.left() + buffer).max(visible_right);
    let max_x = surface.right() - width - buffer;
    (max_x >= min_x).then_some((min_x, max_x))
}

fn place_obstacle<R: Rng + ?Sized>(
    world: &mut World,
    segment: &GeneratedSegment,
    visible_right: f32,
    difficulty: f32,
    rng: &mut R,
    config: &GameConfig,
) -> Option<(u32, Rect)> {
    let buffer = config.generation.obstacle_buffer;
    let (width, height) = obstacle_size(difficulty, rng, config);
    let kind = choose_kind(width, height, difficulty, rng);
    let builder = ObstacleBuilder::new(0.0, 0.0)
        .size(width, height)
        .kind(kind)
        .difficulty(difficulty);
    let (final_width, _) = builder.resolved_width(kind, &config.obstacles);

    let on_platform = if roll(rng, OBSTACLE_ON_PLATFORM_CHANCE) {
        world.last_platform().and_then(|p| {
            surface_span(p.rect, final_width, visible_right, buffer).map(|span| (p.rect.top(), span))
        })
    } else {
        None
    };
    let (surface_top, (min_x, max_x)) = match on_platform {
        Some(spot) => spot,
        None => match surface_span(segment.floor, final_width, visible_right, buffer) {
            Some(span) => (segment.floor.top(), span),
            None => {
                log::trace!(
                    "No room for a {:.0}px {} past x={:.0}",
                    final_width,
                    kind.as_str(),
                    visible_right
                );
                return None;
            }
        },
    };

    let x = range(rng, min_x, max_x);
    let id = world.next_entity_id();
    let obstacle = ObstacleBuilder::new(x, surface_top - height)
        .size(width, height)
        .kind(kind)
        .difficulty(difficulty)
        .build(id, rng, &config.obstacles);
    let rect = obstacle.rect();
    world.obstacles.push(obstacle);
    Some((id, rect))
}

/// A second floor obstacle a short run after the first
fn place_second_obstacle<R: Rng + ?Sized>(
    world: &mut World,
    segment: &GeneratedSegment,
    first: Rect,
    difficulty: f32,
    rng: &mut R,
    config: &GameConfig,
) -> Option<(u32, Rect)> {
    let buffer = config.generation.obstacle_buffer;
    let (width, height) = obstacle_size(difficulty, rng, config);
    let kind = choose_kind(width, height, difficulty, rng);
    let builder = ObstacleBuilder::new(0.0, 0.0).size(width, height).kind(kind);
    let (final_width, _) = builder.resolved_width(kind, &config.obstacles);

    let x = first.right() + range(rng, SECOND_OBSTACLE_MIN_GAP, SECOND_OBSTACLE_MAX_GAP);
    // First one may sit on a bridge left of the floor
    if x < segment.floor.left() + buffer || x + final_width > segment.floor.right() - buffer {
        return None;
    }

    let id = world.next_entity_id();
    let obstacle = ObstacleBuilder::new(x, segment.floor.top() - height)
        .size(width, height)
        .kind(kind)
        .difficulty(difficulty)
        .build(id, rng, &config.obstacles);
    let rect = obstacle.rect();
    world.obstacles.push(obstacle);
    Some((id, rect))
}

/// First random spot on the floor that stays clear of `blocked`
fn find_pickup_spot<R: Rng + ?Sized>(
    floor: Rect,
    y: f32,
    blocked: &[Rect],
    rng: &mut R,
    config: &GameConfig,
) -> Option<Rect> {
    let size = config.generation.pickup_size;
    for _ in 0..config.generation.pickup_attempts {
        let x = range(rng, floor.left(), floor.right() - size);
        let candidate = Rect::new(x, y, size, size);
        if !blocked.iter().any(|b| b.overlaps(&candidate)) {
            return Some(candidate);
        }
    }
    log::trace!("No clear pickup spot on floor at x={:.0}", floor.left());
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::HasCollisionBox;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup(seed: u64) -> (GameConfig, World, Player, Pcg32) {
        let config = GameConfig::default();
        let world = World::with_initial_floor(&config);
        let player = Player::new(&config);
        (config, world, player, Pcg32::seed_from_u64(seed))
    }

    #[test]
    fn test_difficulty_is_exactly_one_at_max_distance() {
        let config = GameConfig::default();
        let d = difficulty_factor(config.difficulty.max_distance, &config);
        assert_eq!(d, 1.0);
        assert_eq!(
            obstacle_chance(d, &config),
            config.difficulty.max_obstacle_chance
        );
        assert_eq!(pit_chance(d, &config), config.difficulty.max_pit_chance);
    }

    #[test]
    fn test_difficulty_clamps() {
        let config = GameConfig::default();
        assert_eq!(difficulty_factor(0.0, &config), 0.0);
        assert_eq!(difficulty_factor(config.difficulty.start_distance, &config), 0.0);
        assert_eq!(difficulty_factor(1.0e9, &config), 1.0);
        let mid = (config.difficulty.start_distance + config.difficulty.max_distance) / 2.0;
        assert!((difficulty_factor(mid, &config) - 0.5).abs() < 1e-6);
        assert_eq!(
            obstacle_chance(0.0, &config),
            config.difficulty.base_obstacle_chance
        );
    }

    #[test]
    fn test_segments_extend_floor_contiguously() {
        let (config, mut world, player, mut rng) = setup(7);
        for _ in 0..50 {
            let before = world.last_floor().rect.right();
            let segment = generate_segment(&player, &mut world, 0.0, &mut rng, &config);
            let floor = world.last_floor().rect;
            assert_eq!(segment.right_edge, floor.right());
            match segment.pit {
                Some(pit) => {
                    assert_eq!(pit.start, before);
                    assert_eq!(floor.left(), pit.end);
                }
                None => assert_eq!(floor.left(), before),
            }
            assert!(floor.width >= config.generation.min_floor_run);
            assert!(floor.width <= config.generation.max_floor_run);
        }
    }

    #[test]
    fn test_every_pit_gets_a_bridge() {
        let (config, mut world, mut player, mut rng) = setup(11);
        player.furthest_right = config.difficulty.max_distance;
        let mut pits = 0;
        for _ in 0..200 {
            let segment = generate_segment(&player, &mut world, 0.0, &mut rng, &config);
            let Some(pit) = segment.pit else { continue };
            pits += 1;
            let id = segment.bridge.expect("pit without bridge");
            let bridge = world
                .platforms
                .iter()
                .find(|p| p.id == id)
                .expect("bridge in world");
            assert!(bridge.rect.left() < pit.end);
            assert!(bridge.rect.right() > pit.start);
            assert!(bridge.rect.top() >= PLATFORM_MIN_Y);
            assert!(bridge.rect.top() <= config.screen.play_area_height - BRIDGE_BOTTOM_CLEARANCE);
        }
        assert!(pits > 0);
    }

    #[test]
    fn test_narrow_pit_gets_oversized_bridge() {
        let mut config = GameConfig::default();
        config.generation.platform_edge_buffer = 80.0;
        let mut rng = Pcg32::seed_from_u64(3);
        let pit = Pit {
            start: 1000.0,
            end: 1200.0,
        };
        let bridge = bridge_platform(1, pit, &mut rng, &config);
        assert_eq!(bridge.rect.left(), 920.0);
        assert_eq!(bridge.rect.right(), 1280.0);
    }

    #[test]
    fn test_obstacles_never_spawn_on_screen() {
        let (config, mut world, mut player, mut rng) = setup(5);
        player.furthest_right = 15000.0;
        let mut camera_x = 0.0;
        for _ in 0..300 {
            let segment = generate_segment(&player, &mut world, camera_x, &mut rng, &config);
            for id in &segment.obstacles {
                let obstacle = world.obstacles.iter().find(|o| o.id == *id).expect("obstacle");
                assert!(obstacle.rect().left() >= camera_x + config.screen.viewport_width);
                assert_eq!(obstacle.difficulty_factor(), segment.difficulty_factor);
            }
            camera_x = segment.right_edge - config.screen.viewport_width;
        }
    }

    #[test]
    fn test_pickups_clear_of_same_call_obstacles() {
        let (config, mut world, mut player, mut rng) = setup(9);
        player.furthest_right = config.difficulty.max_distance;
        for _ in 0..300 {
            let segment = generate_segment(&player, &mut world, 0.0, &mut rng, &config);
            let hazards: Vec<Rect> = world
                .obstacles
                .iter()
                .filter(|o| segment.obstacles.contains(&o.id))
                .map(|o| o.rect().expand(config.generation.obstacle_buffer))
                .collect();
            let pickups = world
                .coins
                .iter()
                .filter(|c| segment.coins.contains(&c.id))
                .map(|c| c.bounds())
                .chain(
                    world
                        .power_ups
                        .iter()
                        .filter(|p| segment.power_ups.contains(&p.id))
                        .map(|p| p.bounds()),
                );
            for pickup in pickups {
                assert!(hazards.iter().all(|h| !h.overlaps(&pickup)));
                assert!(segment.floor.left() <= pickup.left());
                assert!(pickup.right() <= segment.floor.right());
            }
        }
    }

    #[test]
    fn test_extra_platform_spacing() {
        let platforms = vec![Platform::new(1, 100.0, 300.0, 100.0, 20.0)];
        assert!(too_close_to_platforms(150.0, 50.0, &platforms, 50.0));
        assert!(too_close_to_platforms(230.0, 50.0, &platforms, 50.0));
        assert!(!too_close_to_platforms(250.0, 50.0, &platforms, 50.0));
        assert!(!too_close_to_platforms(0.0, 50.0, &platforms, 50.0));
    }

    #[test]
    fn test_needs_segment_follows_camera() {
        let config = GameConfig::default();
        let world = World::with_initial_floor(&config);
        // Initial floor ends at 800; the first screen already needs lookahead
        assert!(needs_segment(0.0, &world, &config));
        let mut far = World::default();
        far.floors.push(Floor::new(1, 0.0, 5000.0, 500.0, 20.0));
        assert!(!needs_segment(0.0, &far, &config));
        assert!(needs_segment(3700.0, &far, &config));
    }
}
