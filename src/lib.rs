//! Photo Racer - arcade race simulation core
//!
//! Core modules:
//! - `sim`: Deterministic race simulation (obstacles, cars, collisions, AI, tick)
//! - `session`: Fixed-timestep scheduler with countdown and cancellation
//! - `input`: Gesture-to-lane-position adapter
//! - `roster`: Drivers, roster validation, car catalog
//! - `settings`: Data-driven race tuning and track geometry
//! - `highscores`: Best-score capability and score ratings

pub mod error;
pub mod highscores;
pub mod input;
pub mod roster;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, RaceError, ScoreStoreError};
pub use highscores::{
    Achievement, InMemoryScores, JsonFileScores, Podium, ScoreRating, ScoreReport,
    ScoreRepository, record_score,
};
pub use input::InputAdapter;
pub use roster::{Driver, Roster};
pub use session::RaceSession;
pub use settings::RaceSettings;

/// Simulation timing constants
pub mod consts {
    /// Fixed simulation tick period in milliseconds
    pub const TICK_MS: f32 = 50.0;
    /// Maximum ticks per scheduler update to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Countdown step length in milliseconds (3 → 2 → 1 → go)
    pub const COUNTDOWN_STEP_MS: f32 = 1000.0;
}

/// Clamp `value` into `[min, max]`, collapsing to `min` when the range is inverted.
#[inline]
pub fn clamp_range(value: f32, min: f32, max: f32) -> f32 {
    if max < min {
        return min;
    }
    value.clamp(min, max)
}
