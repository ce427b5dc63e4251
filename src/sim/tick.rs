//! Fixed timestep simulation tick
//!
//! Core race loop that advances the simulation deterministically.

use super::ai;
use super::collision::first_hit;
use super::state::{RaceOutcome, RaceState, RaceStatus};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest requested player x (left edge); clamped before use
    pub player_x: Option<f32>,
}

/// Advance the race by one fixed timestep.
///
/// Returns the outcome on the tick the race ends. Ticks outside `Running`
/// are no-ops, so a late timer callback can never mutate a finished race.
pub fn tick(state: &mut RaceState, input: &TickInput) -> Option<RaceOutcome> {
    if state.status != RaceStatus::Running {
        return None;
    }

    state.tick_count += 1;
    let mode = state.settings.mode;

    // Obstacles
    if mode.ramps_speed() {
        state.speed = (state.speed + state.settings.speed_ramp).min(state.settings.speed_cap);
    }
    state.field.spawn(&mut state.rng, &state.settings);
    state
        .field
        .advance(state.speed * state.settings.advance_factor);
    state.field.prune(state.settings.prune_y());

    // Cars
    if let Some(x) = input.player_x {
        state.set_player_lateral_position(x);
    }
    if mode.ramps_speed() {
        let speed = state.speed;
        state.player_mut().speed = speed;
    }
    for car in &mut state.cars {
        car.advance_progress(&state.settings);
    }

    // Rivals
    if mode.has_opponents() && state.settings.ai_enabled {
        ai::update_rivals(
            &mut state.cars,
            &state.field.obstacles,
            &state.settings,
            &mut state.rng,
        );
    }

    // Collisions
    if let Some(obstacle_id) = first_hit(state.player(), &state.field.obstacles, &state.settings) {
        state.status = RaceStatus::Crashed;
        log::info!(
            "Player crashed into obstacle {} at tick {} (progress {:.0})",
            obstacle_id,
            state.tick_count,
            state.player().progress
        );
        return state.outcome();
    }
    if mode.has_opponents() {
        apply_rival_collisions(state);
    }

    // Finish line
    if mode.finishes_by_distance() {
        if let Some(winner_id) = finish_winner(state) {
            state.winner_id = Some(winner_id);
            state.status = RaceStatus::Finished;
            log::info!("Race finished at tick {}, winner {}", state.tick_count, winner_id);
            return state.outcome();
        }
    }

    None
}

/// Rivals that hit an obstacle lose speed instead of crashing
fn apply_rival_collisions(state: &mut RaceState) {
    let settings = &state.settings;
    for car in state.cars.iter_mut().filter(|c| !c.is_player) {
        if first_hit(car, &state.field.obstacles, settings).is_some() {
            car.speed = (car.speed - settings.ai_collision_penalty).max(settings.ai_collision_min_speed);
            log::debug!("Rival {} hit an obstacle, speed now {:.2}", car.id, car.speed);
        }
    }
}

/// Car with the most progress among those past the finish line.
/// Strict comparison keeps the earliest roster entry on ties.
pub fn finish_winner(state: &RaceState) -> Option<u32> {
    let distance = state.settings.race_distance;
    let mut winner: Option<(u32, f32)> = None;
    for car in state.cars.iter().filter(|c| c.progress >= distance) {
        match winner {
            Some((_, best)) if car.progress <= best => {}
            _ => winner = Some((car.id, car.progress)),
        }
    }
    winner.map(|(id, _)| id)
}
