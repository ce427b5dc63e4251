//! Deterministic race simulation module
//!
//! All race logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (roster order for cars, id order for obstacles)
//! - No rendering, navigation or storage dependencies

pub mod ai;
pub mod collision;
pub mod obstacles;
pub mod state;
pub mod tick;

pub use ai::{AiAction, nearest_threat, steer_car, update_rivals};
pub use collision::{Aabb, CollisionRule, collides, first_hit};
pub use obstacles::ObstacleField;
pub use state::{
    Car, CarSnapshot, Obstacle, ObstacleKind, ObstacleSnapshot, RaceOutcome, RaceSnapshot,
    RaceState, RaceStatus, RankedResult, clamp_lateral,
};
pub use tick::{TickInput, finish_winner, tick};

pub use crate::settings::RaceMode;
