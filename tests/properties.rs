//! Property tests for the simulation as a whole

use std::collections::HashSet;

use dasher::GameConfig;
use dasher::sim::{GamePhase, GameState, Player, TickInput, World, generate_segment, tick};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

const DT: f32 = 1.0 / 60.0;

fn seeded_state(seed: u64) -> GameState {
    let config = GameConfig {
        seed: Some(seed),
        ..GameConfig::default()
    };
    GameState::new(config).expect("default config is valid")
}

/// Decode a byte into held movement plus a jump edge
fn input_from(byte: u8) -> TickInput {
    TickInput {
        move_left: byte % 5 == 0,
        move_right: byte % 5 >= 2,
        jump: byte % 7 == 0,
        debug_toggle: false,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn player_never_backtracks_past_limit(
        seed in 0u64..10_000,
        moves in proptest::collection::vec(any::<u8>(), 50..400)
    ) {
        let mut state = seeded_state(seed);
        let max_backtrack = state.config.player.max_backtrack;

        for &byte in &moves {
            // Each byte is held for a few frames
            for _ in 0..4 {
                tick(&mut state, &input_from(byte), DT);
                if state.phase != GamePhase::Running {
                    continue;
                }
                let player = &state.player;
                prop_assert!(
                    player.pos.x >= player.furthest_right - max_backtrack - 1e-3,
                    "x={} furthest={}",
                    player.pos.x,
                    player.furthest_right
                );
                prop_assert!(player.pos.x >= 0.0);
                prop_assert!(player.pos.x.is_finite() && player.pos.y.is_finite());
            }
        }
    }

    #[test]
    fn score_never_drops_within_a_game(
        seed in 0u64..10_000,
        moves in proptest::collection::vec(any::<u8>(), 50..300)
    ) {
        let mut state = seeded_state(seed);
        let mut game = state.games_started;
        let mut last_score = state.score();

        for &byte in &moves {
            for _ in 0..4 {
                tick(&mut state, &input_from(byte), DT);
                if state.games_started != game {
                    game = state.games_started;
                    last_score = state.score();
                    continue;
                }
                prop_assert!(state.score() >= last_score);
                last_score = state.score();
            }
        }
    }

    #[test]
    fn obstacles_appear_off_screen_and_pickups_stay_clear(
        seed in 0u64..10_000,
        frames in 200usize..1500
    ) {
        let mut state = seeded_state(seed);
        let mut seen: HashSet<u32> = state.world.obstacles.iter().map(|o| o.id).collect();
        let run = TickInput {
            move_right: true,
            ..Default::default()
        };

        for frame in 0..frames {
            let input = TickInput {
                jump: frame % 25 == 0,
                ..run
            };
            tick(&mut state, &input, DT);

            let visible_right = state.camera.x + state.config.screen.viewport_width;
            for obstacle in &state.world.obstacles {
                if seen.insert(obstacle.id) {
                    prop_assert!(
                        obstacle.rect().left() >= visible_right,
                        "obstacle {} at {} spawned on screen (right edge {})",
                        obstacle.id,
                        obstacle.rect().left(),
                        visible_right
                    );
                }
            }

            let pickups = state
                .world
                .coins
                .iter()
                .map(|c| c.rect)
                .chain(state.world.power_ups.iter().map(|p| p.rect));
            for pickup in pickups {
                for obstacle in &state.world.obstacles {
                    prop_assert!(!pickup.overlaps(&obstacle.rect()));
                }
            }
        }
    }

    #[test]
    fn every_pit_gets_a_bridge(
        seed in 0u64..10_000,
        progress in 0.0f32..30_000.0
    ) {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut world = World::with_initial_floor(&config);
        let mut player = Player::new(&config);
        player.furthest_right = progress;

        for _ in 0..40 {
            let previous_edge = world.last_floor().rect.right();
            let segment = generate_segment(&player, &mut world, 0.0, &mut rng, &config);

            prop_assert!(segment.right_edge > previous_edge);
            match segment.pit {
                Some(pit) => {
                    prop_assert_eq!(pit.start, previous_edge);
                    prop_assert!(pit.width() >= config.difficulty.min_pit_width);
                    let bridge_id = segment.bridge.expect("pit without bridge");
                    let bridge = world
                        .platforms
                        .iter()
                        .find(|p| p.id == bridge_id)
                        .expect("bridge is in the world");
                    prop_assert!(bridge.rect.right() > pit.start && bridge.rect.left() < pit.end);
                    prop_assert_eq!(segment.floor.left(), pit.end);
                }
                None => prop_assert_eq!(segment.floor.left(), previous_edge),
            }
        }
    }
}
