//! Dasher entry point
//!
//! Headless runner: drives the simulation with a simple autopilot at the
//! nominal frame rate, logs what happens and prints the final snapshot.
//!
//! Usage: `dasher [config.json] [frames]`

#[cfg(not(target_arch = "wasm32"))]
use anyhow::Context;

#[cfg(not(target_arch = "wasm32"))]
use dasher::sim::{GameState, TickInput, tick};

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_FRAMES: u64 = 3600;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Dasher (headless) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            dasher::GameConfig::from_json(&json).with_context(|| format!("parsing config {path}"))?
        }
        None => dasher::GameConfig::default(),
    };
    let frames = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid frame count {n:?}"))?,
        None => DEFAULT_FRAMES,
    };

    let mut state = GameState::new(config)?;
    let dt = dasher::consts::NOMINAL_FRAME_DT;
    let mut best = 0;

    for _ in 0..frames {
        let input = autopilot(&state);
        let outcome = tick(&mut state, &input, dt);
        if let Some(score) = outcome.final_score {
            best = best.max(score);
        }
        for event in state.drain_events() {
            match event.announcement() {
                Some(a) => log::info!("{a:?}"),
                None => log::debug!("{event:?}"),
            }
        }
    }

    best = best.max(state.score());
    log::info!(
        "Ran {} frames over {} game(s), best score {}",
        frames,
        state.games_started,
        best
    );
    println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
    Ok(())
}

/// Run right; jump at the end of the ground or in front of a hazard
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(state: &GameState) -> TickInput {
    let player = state.player.rect();
    let look_ahead = player.right() + 40.0;

    let ground_ends = state
        .world
        .floors
        .iter()
        .find(|f| f.rect.left() <= player.center().x && f.rect.right() >= player.center().x)
        .is_some_and(|f| f.rect.right() < look_ahead);

    let hazard_ahead = state.world.obstacles.iter().any(|o| {
        let r = o.rect();
        o.is_active() && r.left() >= player.left() && r.left() < look_ahead + 40.0
    });

    TickInput {
        move_right: true,
        jump: ground_ends || hazard_ahead,
        ..Default::default()
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end; the simulation is used as a library there
}
