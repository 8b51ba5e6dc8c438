//! Simulation tick
//!
//! One call per rendered frame. In `Running` a step is:
//! player update -> camera -> entity animation -> generation -> pruning.

use super::generator::{generate_segment, needs_segment};
use super::state::{GamePhase, GameState};
use crate::config::StepMode;

/// Upper bound on segments generated in one step
const MAX_SEGMENTS_PER_STEP: u32 = 16;

/// Input intents for a single tick (already edge-detected)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Jump pressed this frame
    pub jump: bool,
    /// Toggle hitbox display
    pub debug_toggle: bool,
}

/// What the orchestrator needs to know after a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The death animation finished this tick
    pub game_over: bool,
    /// Score to show on the game-over screen
    pub final_score: Option<u64>,
    /// Simulation steps run
    pub steps: u32,
}

/// Advance the game by one rendered frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> TickOutcome {
    state.frame += 1;
    if input.debug_toggle {
        state.debug.show_hitboxes = !state.debug.show_hitboxes;
        log::debug!("Hitboxes {}", if state.debug.show_hitboxes { "on" } else { "off" });
    }

    let dt = frame_dt(dt);
    let dt_ms = frame_ms(dt);

    match state.phase {
        GamePhase::Over => {
            state.new_game();
            return TickOutcome::default();
        }
        GamePhase::LostMessage => {
            state.clock_ms += dt_ms;
            let shown_since = state.lost_at.unwrap_or(state.clock_ms);
            if state.clock_ms - shown_since > state.config.timing.game_over_display_ms {
                log::info!("Game over, final score {}", state.player.score);
                state.phase = GamePhase::Over;
            }
            return TickOutcome::default();
        }
        GamePhase::Running => {}
    }

    match state.config.timing.step_mode {
        StepMode::PerFrame => {
            state.clock_ms += dt_ms;
            let game_over = step(state, input, dt);
            finish(state, game_over, 1)
        }
        StepMode::Fixed {
            step_ms,
            max_substeps,
        } => {
            state.pending_jump |= input.jump;
            state.accumulator_ms += dt_ms;

            let mut steps = 0;
            let mut game_over = false;
            while state.accumulator_ms >= step_ms && steps < max_substeps {
                state.accumulator_ms -= step_ms;
                state.clock_ms += step_ms;
                // Jump edge goes to the first substep only
                let step_input = TickInput {
                    jump: std::mem::take(&mut state.pending_jump),
                    debug_toggle: false,
                    ..*input
                };
                steps += 1;
                if step(state, &step_input, (step_ms / 1000.0) as f32) {
                    game_over = true;
                    break;
                }
            }
            if steps == max_substeps {
                // Drop the backlog instead of spiralling
                state.accumulator_ms = state.accumulator_ms.min(step_ms);
            }
            finish(state, game_over, steps)
        }
    }
}

/// Frame time with negative and non-finite values treated as no time
fn frame_dt(dt: f32) -> f32 {
    if dt.is_finite() { dt.max(0.0) } else { 0.0 }
}

/// Frame time in ms, rounded to whole microseconds
///
/// `f32` seconds widen to slightly-off `f64` values (0.02 s becomes
/// 19.9999995 ms), which would starve the fixed-step accumulator.
fn frame_ms(dt: f32) -> f64 {
    (dt as f64 * 1_000_000.0).round() / 1000.0
}

fn finish(state: &GameState, game_over: bool, steps: u32) -> TickOutcome {
    TickOutcome {
        game_over,
        final_score: game_over.then_some(state.player.score),
        steps,
    }
}

/// One simulation step; returns true when the game was lost
fn step(state: &mut GameState, input: &TickInput, dt: f32) -> bool {
    let now = state.clock_ms;
    let done = state.player.update(
        input,
        &mut state.world,
        now,
        &state.config,
        &mut state.events,
    );
    if done {
        log::info!(
            "Death animation complete at x={:.0}, score {}",
            state.player.pos.x,
            state.player.score
        );
        state.phase = GamePhase::LostMessage;
        state.lost_at = Some(now);
        return true;
    }

    state.camera.update(&state.player, &state.config);
    state.world.update_entities(
        dt,
        state.camera.x,
        state.config.screen.viewport_width,
        &mut state.events,
    );

    let mut generated = 0;
    while generated < MAX_SEGMENTS_PER_STEP
        && needs_segment(state.camera.x, &state.world, &state.config)
    {
        generate_segment(
            &state.player,
            &mut state.world,
            state.camera.x,
            &mut state.rng,
            &state.config,
        );
        generated += 1;
    }

    state.world.prune(state.player.furthest_right, &state.config);
    false
}
