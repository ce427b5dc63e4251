//! Error types
//!
//! The simulation itself never fails mid-race: invalid input is clamped and
//! late ticks are no-ops. Errors only arise when a race is set up or when the
//! collaborators around it (settings files, score storage) touch the disk.

use std::io;

use thiserror::Error;

/// Reasons a race refuses to start
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RaceError {
    #[error("roster is empty")]
    EmptyRoster,
    #[error("roster has no player driver")]
    NoPlayer,
    #[error("roster has {count} player drivers, expected exactly one")]
    MultiplePlayers { count: usize },
    #[error("driver id {0} appears more than once")]
    DuplicateDriverId(u32),
    #[error("roster has {count} drivers, at most {max} allowed")]
    TooManyDrivers { count: usize, max: usize },
    #[error("car {0} is not in the catalog")]
    UnknownCar(u32),
    #[error("player driver needs a portrait before racing")]
    MissingPlayerPortrait,
    #[error("invalid race settings: {0}")]
    InvalidSettings(String),
}

/// Settings file failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("settings rejected: {0}")]
    Invalid(String),
}

/// Best-score storage failures
#[derive(Debug, Error)]
pub enum ScoreStoreError {
    #[error("failed to access score file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse score file: {0}")]
    Parse(#[from] serde_json::Error),
}
