//! Race state and core simulation types
//!
//! Everything needed to reproduce a race lives here: settings, roster-ordered
//! cars, the obstacle field and the RNG stream.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::obstacles::ObstacleField;
use crate::clamp_range;
use crate::error::RaceError;
use crate::roster::Roster;
use crate::settings::{RaceMode, RaceSettings};

/// Race lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceStatus {
    /// Created, waiting for the countdown to begin
    Ready,
    /// Countdown running; no simulation ticks
    Countdown,
    /// Active racing
    Running,
    /// Player hit an obstacle
    Crashed,
    /// A car reached the race distance
    Finished,
}

impl RaceStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RaceStatus::Crashed | RaceStatus::Finished)
    }
}

/// Obstacle appearance (no gameplay difference)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Rock,
    Oil,
    Cone,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Rock, ObstacleKind::Oil, ObstacleKind::Cone];
}

/// An obstacle entity, positioned by its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
    pub kind: ObstacleKind,
}

/// A car entity, positioned by its top-left corner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    /// Driver id from the roster
    pub id: u32,
    pub name: String,
    pub pos: Vec2,
    pub speed: f32,
    /// Cumulative distance, never decreases
    pub progress: f32,
    pub is_player: bool,
    /// Catalog car body
    pub car_id: u32,
    pub portrait_ref: Option<String>,
    pub color_tag: String,
}

impl Car {
    /// Advance cumulative distance for one tick
    pub fn advance_progress(&mut self, settings: &RaceSettings) {
        let step = if self.is_player {
            settings.player_progress_per_tick
        } else {
            self.speed
        };
        self.progress += step.max(0.0);
    }
}

/// One row of the final standings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// 1-based placing
    pub position: usize,
    pub driver_id: u32,
    pub progress: f32,
}

/// Terminal result handed to the results screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RaceOutcome {
    Crashed {
        final_progress: f32,
    },
    Finished {
        ranked_results: Vec<RankedResult>,
        winner_id: u32,
    },
}

impl RaceOutcome {
    /// Scalar score for best-score comparison
    pub fn score(&self, player_id: u32) -> u64 {
        let progress = match self {
            RaceOutcome::Crashed { final_progress } => *final_progress,
            RaceOutcome::Finished { ranked_results, .. } => ranked_results
                .iter()
                .find(|r| r.driver_id == player_id)
                .map(|r| r.progress)
                .unwrap_or(0.0),
        };
        progress.max(0.0).round() as u64
    }

    /// Player's placing, if the race finished
    pub fn player_position(&self, player_id: u32) -> Option<usize> {
        match self {
            RaceOutcome::Crashed { .. } => None,
            RaceOutcome::Finished { ranked_results, .. } => ranked_results
                .iter()
                .find(|r| r.driver_id == player_id)
                .map(|r| r.position),
        }
    }
}

/// Read-only per-tick view for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceSnapshot {
    pub tick_count: u64,
    pub status: RaceStatus,
    pub cars: Vec<CarSnapshot>,
    pub obstacles: Vec<ObstacleSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CarSnapshot {
    pub id: u32,
    pub car_id: u32,
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub progress: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObstacleSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub kind: ObstacleKind,
}

/// Complete race state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "StoredRaceState")]
pub struct RaceState {
    pub settings: RaceSettings,
    /// Simulation ticks run while Running
    pub tick_count: u64,
    pub status: RaceStatus,
    /// Cars in roster order
    pub cars: Vec<Car>,
    pub field: ObstacleField,
    /// Current race speed (ramps in single-car mode)
    pub speed: f32,
    pub winner_id: Option<u32>,
    /// Seeded RNG stream for spawns and AI
    pub rng: Pcg32,
    #[serde(skip_serializing)]
    player_index: usize,
}

/// Serialized form of [`RaceState`]; the player index is rebuilt on load
#[derive(Deserialize)]
struct StoredRaceState {
    settings: RaceSettings,
    tick_count: u64,
    status: RaceStatus,
    cars: Vec<Car>,
    field: ObstacleField,
    speed: f32,
    winner_id: Option<u32>,
    rng: Pcg32,
}

impl TryFrom<StoredRaceState> for RaceState {
    type Error = String;

    fn try_from(stored: StoredRaceState) -> Result<Self, Self::Error> {
        let mut players = stored.cars.iter().enumerate().filter(|(_, c)| c.is_player);
        let player_index = match (players.next(), players.next()) {
            (Some((index, _)), None) => index,
            (None, _) => return Err(RaceError::NoPlayer.to_string()),
            (Some(_), Some(_)) => {
                let count = stored.cars.iter().filter(|c| c.is_player).count();
                return Err(RaceError::MultiplePlayers { count }.to_string());
            }
        };
        Ok(Self {
            settings: stored.settings,
            tick_count: stored.tick_count,
            status: stored.status,
            cars: stored.cars,
            field: stored.field,
            speed: stored.speed,
            winner_id: stored.winner_id,
            rng: stored.rng,
            player_index,
        })
    }
}

impl RaceState {
    /// Build a race from a validated roster and an injected RNG
    pub fn new(settings: RaceSettings, roster: &Roster, mut rng: Pcg32) -> Result<Self, RaceError> {
        settings.validate().map_err(RaceError::InvalidSettings)?;
        roster.validate(&settings)?;

        let count = roster.len();
        let cars: Vec<Car> = roster
            .drivers
            .iter()
            .enumerate()
            .map(|(index, driver)| {
                let x = initial_x(&settings, index, count);
                let speed = if driver.is_player {
                    if settings.mode.ramps_speed() {
                        settings.base_speed
                    } else {
                        0.0
                    }
                } else if settings.ai_initial_speed_max > settings.ai_initial_speed_min {
                    rng.random_range(settings.ai_initial_speed_min..settings.ai_initial_speed_max)
                } else {
                    settings.ai_initial_speed_min
                };
                Car {
                    id: driver.id,
                    name: driver.name.clone(),
                    pos: Vec2::new(x, settings.car_y(index)),
                    speed,
                    progress: 0.0,
                    is_player: driver.is_player,
                    car_id: driver.car_id,
                    portrait_ref: driver.portrait_ref.clone(),
                    color_tag: driver.color_tag.clone(),
                }
            })
            .collect();

        let player_index = cars.iter().position(|c| c.is_player).ok_or(RaceError::NoPlayer)?;

        log::info!(
            "New {} race: {} car(s), distance {}",
            settings.mode.as_str(),
            cars.len(),
            settings.race_distance
        );

        Ok(Self {
            speed: settings.base_speed,
            settings,
            tick_count: 0,
            status: RaceStatus::Ready,
            cars,
            field: ObstacleField::default(),
            winner_id: None,
            rng,
            player_index,
        })
    }

    /// Build a race with a PCG stream seeded from `seed`
    pub fn with_seed(settings: RaceSettings, roster: &Roster, seed: u64) -> Result<Self, RaceError> {
        Self::new(settings, roster, Pcg32::seed_from_u64(seed))
    }

    pub fn mode(&self) -> RaceMode {
        self.settings.mode
    }

    pub fn player(&self) -> &Car {
        &self.cars[self.player_index]
    }

    pub fn player_mut(&mut self) -> &mut Car {
        &mut self.cars[self.player_index]
    }

    /// Ready → Countdown
    pub fn begin_countdown(&mut self) -> bool {
        if self.status != RaceStatus::Ready {
            return false;
        }
        self.status = RaceStatus::Countdown;
        true
    }

    /// Ready/Countdown → Running
    pub fn begin_running(&mut self) -> bool {
        if !matches!(self.status, RaceStatus::Ready | RaceStatus::Countdown) {
            return false;
        }
        self.status = RaceStatus::Running;
        log::info!("Race running");
        true
    }

    /// Clamp `x` into the track and move the player there
    pub fn set_player_lateral_position(&mut self, x: f32) -> f32 {
        let clamped = clamp_lateral(&self.settings, x);
        self.player_mut().pos.x = clamped;
        clamped
    }

    /// Standings by progress, roster order on ties
    pub fn ranked_results(&self) -> Vec<RankedResult> {
        let mut order: Vec<&Car> = self.cars.iter().collect();
        // sort_by is stable, so equal progress keeps roster order
        order.sort_by(|a, b| b.progress.total_cmp(&a.progress));
        order
            .into_iter()
            .enumerate()
            .map(|(i, car)| RankedResult {
                position: i + 1,
                driver_id: car.id,
                progress: car.progress.round(),
            })
            .collect()
    }

    /// Terminal outcome, once the race has ended
    pub fn outcome(&self) -> Option<RaceOutcome> {
        match self.status {
            RaceStatus::Crashed => Some(RaceOutcome::Crashed {
                final_progress: self.player().progress,
            }),
            RaceStatus::Finished => Some(RaceOutcome::Finished {
                ranked_results: self.ranked_results(),
                winner_id: self.winner_id?,
            }),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            tick_count: self.tick_count,
            status: self.status,
            cars: self
                .cars
                .iter()
                .map(|c| CarSnapshot {
                    id: c.id,
                    car_id: c.car_id,
                    x: c.pos.x,
                    y: c.pos.y,
                    speed: c.speed,
                    progress: c.progress,
                })
                .collect(),
            obstacles: self
                .field
                .obstacles
                .iter()
                .map(|o| ObstacleSnapshot {
                    id: o.id,
                    x: o.pos.x,
                    y: o.pos.y,
                    kind: o.kind,
                })
                .collect(),
        }
    }
}

/// Clamp a car's left edge into `[margin_left, lane_width - car_width - margin_right]`
pub fn clamp_lateral(settings: &RaceSettings, x: f32) -> f32 {
    let x = if x.is_nan() { settings.min_car_x() } else { x };
    clamp_range(x, settings.min_car_x(), settings.max_car_x())
}

fn initial_x(settings: &RaceSettings, index: usize, count: usize) -> f32 {
    let x = if count <= 1 {
        (settings.lane_width - settings.car_width) / 2.0
    } else {
        let margin = settings.margin_left;
        2.0 * margin + index as f32 * (settings.lane_width - 8.0 * margin) / 4.0
    };
    clamp_lateral(settings, x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Driver;
    use proptest::prelude::*;

    fn multi_state() -> RaceState {
        let roster = Roster::with_default_rivals(Driver::player(1, "You"));
        RaceState::with_seed(RaceSettings::multi_car(), &roster, 7).unwrap()
    }

    #[test]
    fn test_new_race_layout() {
        let state = multi_state();
        assert_eq!(state.status, RaceStatus::Ready);
        assert_eq!(state.cars.len(), 4);
        assert_eq!(state.player().id, 1);
        assert_eq!(state.cars[0].pos, Vec2::new(20.0, 650.0));
        assert_eq!(state.cars[1].pos, Vec2::new(100.0, 635.0));
        assert_eq!(state.player().speed, 0.0);
        for car in state.cars.iter().filter(|c| !c.is_player) {
            assert!((1.0..3.0).contains(&car.speed));
        }
    }

    #[test]
    fn test_single_car_starts_centered() {
        let roster = Roster::single(Driver::player(5, "Solo"));
        let state = RaceState::with_seed(RaceSettings::endless(), &roster, 1).unwrap();
        assert_eq!(state.player().pos, Vec2::new(175.0, 650.0));
        assert_eq!(state.player().speed, 2.0);
    }

    #[test]
    fn test_invalid_roster_refused() {
        let result = RaceState::with_seed(RaceSettings::multi_car(), &Roster::default(), 1);
        assert_eq!(result.err(), Some(RaceError::EmptyRoster));
    }

    #[test]
    fn test_status_transitions_forward_only() {
        let mut state = multi_state();
        assert!(state.begin_countdown());
        assert!(!state.begin_countdown());
        assert!(state.begin_running());
        assert!(!state.begin_running());
        state.status = RaceStatus::Crashed;
        assert!(!state.begin_running());
        assert!(state.status.is_terminal());
    }

    #[test]
    fn test_set_player_position_clamps() {
        let mut state = multi_state();
        assert_eq!(state.set_player_lateral_position(-500.0), 10.0);
        assert_eq!(state.set_player_lateral_position(10_000.0), 340.0);
        assert_eq!(state.set_player_lateral_position(123.0), 123.0);
        assert_eq!(state.set_player_lateral_position(f32::NAN), 10.0);
        assert_eq!(state.player().pos.x, 10.0);
    }

    #[test]
    fn test_ranked_results_keep_roster_order_on_ties() {
        let mut state = multi_state();
        state.cars[0].progress = 500.0;
        state.cars[1].progress = 800.0;
        state.cars[2].progress = 500.0;
        state.cars[3].progress = 100.4;
        let ranked = state.ranked_results();
        let ids: Vec<u32> = ranked.iter().map(|r| r.driver_id).collect();
        assert_eq!(ids, vec![2, 1, 3, 4]);
        assert_eq!(ranked[3].position, 4);
        assert_eq!(ranked[3].progress, 100.0);
    }

    #[test]
    fn test_outcome_only_when_terminal() {
        let mut state = multi_state();
        assert!(state.outcome().is_none());
        state.player_mut().progress = 42.0;
        state.status = RaceStatus::Crashed;
        let outcome = state.outcome().unwrap();
        assert_eq!(outcome, RaceOutcome::Crashed { final_progress: 42.0 });
        assert_eq!(outcome.score(1), 42);
        assert_eq!(outcome.player_position(1), None);
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut state = multi_state();
        state.field.place(Vec2::new(50.0, 60.0), ObstacleKind::Oil);
        let snap = state.snapshot();
        assert_eq!(snap.cars.len(), 4);
        assert_eq!(snap.obstacles.len(), 1);
        assert_eq!(snap.obstacles[0].kind, ObstacleKind::Oil);
        assert_eq!(snap.status, RaceStatus::Ready);
        let car_ids: Vec<u32> = snap.cars.iter().map(|c| c.car_id).collect();
        assert_eq!(car_ids, vec![1, 2, 3, 4]);
    }

    proptest! {
        #[test]
        fn lateral_position_always_on_track(x in proptest::num::f32::ANY) {
            let mut state = multi_state();
            let settings = state.settings.clone();
            let placed = state.set_player_lateral_position(x);
            prop_assert!(placed >= settings.min_car_x() && placed <= settings.max_car_x());
            prop_assert_eq!(state.player().pos.x, placed);
        }
    }

    #[test]
    fn test_state_serializes() {
        let state = multi_state();
        let json = serde_json::to_string(&state).unwrap();
        let restored: RaceState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.cars, state.cars);
        assert_eq!(restored.player().id, 1);
        assert!(!json.contains("player_index"));
    }

    #[test]
    fn test_state_without_player_fails_to_load() {
        let mut state = multi_state();
        state.cars.retain(|c| !c.is_player);
        let json = serde_json::to_string(&state).unwrap();
        assert!(serde_json::from_str::<RaceState>(&json).is_err());

        let mut state = multi_state();
        state.cars.clear();
        let json = serde_json::to_string(&state).unwrap();
        assert!(serde_json::from_str::<RaceState>(&json).is_err());
    }

    #[test]
    fn test_reordered_cars_find_player_on_load() {
        let mut state = multi_state();
        state.cars.rotate_left(2);
        let json = serde_json::to_string(&state).unwrap();
        let restored: RaceState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.player().id, 1);
        assert!(restored.player().is_player);
    }
}
