//! Race session scheduler
//!
//! Owns a race for the lifetime of the race screen: runs the countdown,
//! turns wall-clock time into fixed 50 ms ticks, feeds the latest gesture to
//! each tick and guarantees nothing ticks after the race ends or the screen
//! goes away.

use crate::consts::{COUNTDOWN_STEP_MS, MAX_SUBSTEPS, TICK_MS};
use crate::error::RaceError;
use crate::input::InputAdapter;
use crate::roster::Roster;
use crate::settings::RaceSettings;
use crate::sim::{RaceOutcome, RaceSnapshot, RaceState, RaceStatus, TickInput, tick};

pub struct RaceSession {
    state: RaceState,
    input: InputAdapter,
    accumulator_ms: f32,
    countdown_ms: f32,
    countdown_remaining: u32,
    cancelled: bool,
    outcome: Option<RaceOutcome>,
}

impl RaceSession {
    /// Wrap a freshly built race
    pub fn new(state: RaceState) -> Self {
        let input = InputAdapter::new(&state.settings, state.player().pos.x);
        let countdown_remaining = state.settings.countdown_seconds;
        Self {
            state,
            input,
            accumulator_ms: 0.0,
            countdown_ms: 0.0,
            countdown_remaining,
            cancelled: false,
            outcome: None,
        }
    }

    /// Validate the roster and build a seeded race
    pub fn create(settings: RaceSettings, roster: &Roster, seed: u64) -> Result<Self, RaceError> {
        Ok(Self::new(RaceState::with_seed(settings, roster, seed)?))
    }

    /// Ready → Countdown (or straight to Running when there is no countdown)
    pub fn start(&mut self) {
        if self.cancelled || !self.state.begin_countdown() {
            return;
        }
        log::info!("Countdown: {}", self.countdown_remaining);
        if self.countdown_remaining == 0 {
            self.state.begin_running();
        }
    }

    /// Feed a relative drag gesture
    pub fn drag(&mut self, dx: f32) {
        if self.cancelled || self.state.status.is_terminal() {
            return;
        }
        self.input.drag(dx);
    }

    /// Advance wall-clock time. Returns the outcome on the update the race ends.
    pub fn update(&mut self, elapsed_ms: f32) -> Option<RaceOutcome> {
        if self.cancelled || !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            return None;
        }

        if self.state.status == RaceStatus::Countdown {
            self.run_countdown(elapsed_ms);
            return None;
        }
        if self.state.status != RaceStatus::Running {
            return None;
        }

        self.accumulator_ms += elapsed_ms;
        let mut substeps = 0;
        while self.accumulator_ms >= TICK_MS && substeps < MAX_SUBSTEPS {
            let input = TickInput {
                player_x: self.input.take_target(),
            };
            self.accumulator_ms -= TICK_MS;
            substeps += 1;

            if let Some(outcome) = tick(&mut self.state, &input) {
                self.outcome = Some(outcome.clone());
                self.cancel();
                return Some(outcome);
            }
        }

        // Drop backlog we could not catch up on
        if substeps == MAX_SUBSTEPS {
            self.accumulator_ms = self.accumulator_ms.min(TICK_MS);
        }
        None
    }

    fn run_countdown(&mut self, elapsed_ms: f32) {
        self.countdown_ms += elapsed_ms;
        while self.countdown_ms >= COUNTDOWN_STEP_MS && self.countdown_remaining > 0 {
            self.countdown_ms -= COUNTDOWN_STEP_MS;
            self.countdown_remaining -= 1;
            log::info!("Countdown: {}", self.countdown_remaining);
        }
        if self.countdown_remaining == 0 {
            // Leftover countdown time does not turn into ticks
            self.countdown_ms = 0.0;
            self.state.begin_running();
        }
    }

    /// Cancel the pending timer (screen teardown). Idempotent.
    pub fn stop(&mut self) {
        if !self.cancelled {
            log::info!("Race session stopped at tick {}", self.state.tick_count);
        }
        self.cancel();
    }

    fn cancel(&mut self) {
        self.cancelled = true;
        self.accumulator_ms = 0.0;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn countdown_remaining(&self) -> u32 {
        self.countdown_remaining
    }

    pub fn status(&self) -> RaceStatus {
        self.state.status
    }

    pub fn outcome(&self) -> Option<&RaceOutcome> {
        self.outcome.as_ref()
    }

    pub fn state(&self) -> &RaceState {
        &self.state
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        self.state.snapshot()
    }
}
