//! Race settings and tuning
//!
//! Track geometry and every gameplay constant live here so a race can be
//! reproduced from `(settings, roster, seed)` alone. Persisted as JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::CollisionRule;

/// Which race variant to simulate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RaceMode {
    /// Endless runner: one car, speed ramps up, race ends only on crash
    #[default]
    SingleCar,
    /// Short race against AI rivals, ends on crash or when a car reaches the distance
    MultiCar,
}

impl RaceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RaceMode::SingleCar => "single",
            RaceMode::MultiCar => "multi",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" | "endless" | "single-car" => Some(RaceMode::SingleCar),
            "multi" | "multiplayer" | "multi-car" => Some(RaceMode::MultiCar),
            _ => None,
        }
    }

    /// Whether non-player cars take part
    pub fn has_opponents(&self) -> bool {
        matches!(self, RaceMode::MultiCar)
    }

    /// Whether the race can end by distance
    pub fn finishes_by_distance(&self) -> bool {
        matches!(self, RaceMode::MultiCar)
    }

    /// Whether race speed escalates every tick
    pub fn ramps_speed(&self) -> bool {
        matches!(self, RaceMode::SingleCar)
    }
}

/// Race tuning (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceSettings {
    pub mode: RaceMode,

    // === Track geometry ===
    /// Horizontal extent of the track
    pub lane_width: f32,
    /// Vertical extent of the visible track
    pub lane_height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub car_width: f32,
    pub car_height: f32,
    pub obstacle_size: f32,
    /// Player car sits this far above the bottom edge
    pub player_y_offset: f32,
    /// Per-roster-index vertical stagger in multi-car mode
    pub car_stagger: f32,
    pub collision_rule: CollisionRule,

    // === Obstacles ===
    /// Per-tick spawn probability
    pub spawn_probability: f64,
    /// Horizontal spawn margin on both sides
    pub spawn_margin: f32,
    /// Spawn height (off-screen top)
    pub spawn_y: f32,
    /// Obstacles further than this below the bottom edge are pruned
    pub prune_margin: f32,
    /// Obstacle Δy per tick = race speed × advance factor
    pub advance_factor: f32,

    // === Speed and progress ===
    pub base_speed: f32,
    /// Single-car speed increase per tick
    pub speed_ramp: f32,
    pub speed_cap: f32,
    /// Player progress per tick
    pub player_progress_per_tick: f32,
    /// Multi-car finish distance
    pub race_distance: f32,

    // === AI ===
    pub ai_enabled: bool,
    /// Look-ahead above the car
    pub ai_window_ahead: f32,
    /// Look-behind below the car
    pub ai_window_behind: f32,
    pub ai_window_lateral: f32,
    pub ai_steer_step: f32,
    pub ai_slowdown: f32,
    pub ai_speed_floor: f32,
    pub ai_accel: f32,
    pub ai_speed_cap: f32,
    /// Max lateral jitter magnitude when the path is clear
    pub ai_jitter: f32,
    pub ai_initial_speed_min: f32,
    pub ai_initial_speed_max: f32,
    /// Speed lost when an AI car hits an obstacle
    pub ai_collision_penalty: f32,
    pub ai_collision_min_speed: f32,

    // === Race setup ===
    pub countdown_seconds: u32,
    pub max_drivers: usize,
    pub require_player_portrait: bool,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            mode: RaceMode::SingleCar,

            lane_width: 400.0,
            lane_height: 800.0,
            margin_left: 10.0,
            margin_right: 10.0,
            car_width: 50.0,
            car_height: 30.0,
            obstacle_size: 30.0,
            player_y_offset: 150.0,
            car_stagger: 15.0,
            collision_rule: CollisionRule::Aabb,

            spawn_probability: 0.02,
            spawn_margin: 30.0,
            spawn_y: -50.0,
            prune_margin: 50.0,
            advance_factor: 2.0,

            base_speed: 2.0,
            speed_ramp: 0.01,
            speed_cap: 8.0,
            player_progress_per_tick: 2.0,
            race_distance: 1000.0,

            ai_enabled: true,
            ai_window_ahead: 100.0,
            ai_window_behind: 50.0,
            ai_window_lateral: 60.0,
            ai_steer_step: 3.0,
            ai_slowdown: 0.5,
            ai_speed_floor: 0.5,
            ai_accel: 0.1,
            ai_speed_cap: 3.0,
            ai_jitter: 1.0,
            ai_initial_speed_min: 1.0,
            ai_initial_speed_max: 3.0,
            ai_collision_penalty: 1.0,
            ai_collision_min_speed: 0.2,

            countdown_seconds: 3,
            max_drivers: 4,
            require_player_portrait: false,
        }
    }
}

impl RaceSettings {
    /// Endless-runner defaults
    pub fn endless() -> Self {
        Self::default()
    }

    /// Multi-car race defaults
    pub fn multi_car() -> Self {
        Self {
            mode: RaceMode::MultiCar,
            spawn_probability: 0.03,
            ..Self::default()
        }
    }

    /// Leftmost allowed car x
    pub fn min_car_x(&self) -> f32 {
        self.margin_left
    }

    /// Rightmost allowed car x (car's left edge)
    pub fn max_car_x(&self) -> f32 {
        self.lane_width - self.car_width - self.margin_right
    }

    /// Resting y of the player car (roster index 0 sits lowest)
    pub fn car_y(&self, roster_index: usize) -> f32 {
        let base = self.lane_height - self.player_y_offset;
        match self.mode {
            RaceMode::SingleCar => base,
            RaceMode::MultiCar => base - roster_index as f32 * self.car_stagger,
        }
    }

    /// y beyond which obstacles are pruned
    pub fn prune_y(&self) -> f32 {
        self.lane_height + self.prune_margin
    }

    /// Check that the geometry and tuning describe a playable track
    pub fn validate(&self) -> Result<(), String> {
        if self.max_car_x() < self.min_car_x() {
            return Err(format!(
                "lane width {} cannot fit a {}-wide car between margins",
                self.lane_width, self.car_width
            ));
        }
        if self.lane_width - self.spawn_margin < self.spawn_margin {
            return Err("spawn margins exceed lane width".to_string());
        }
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(format!(
                "spawn probability {} outside [0, 1]",
                self.spawn_probability
            ));
        }
        if self.advance_factor <= 0.0 || self.base_speed <= 0.0 {
            return Err("obstacles must advance with positive speed".to_string());
        }
        if self.speed_cap < self.base_speed {
            return Err("speed cap below base speed".to_string());
        }
        if self.player_progress_per_tick < 0.0 {
            return Err("player progress per tick must be non-negative".to_string());
        }
        if self.race_distance <= 0.0 {
            return Err("race distance must be positive".to_string());
        }
        if self.ai_initial_speed_max < self.ai_initial_speed_min || self.ai_initial_speed_min < 0.0
        {
            return Err("AI initial speed range is empty or negative".to_string());
        }
        if self.ai_speed_floor < 0.0 || self.ai_collision_min_speed < 0.0 {
            return Err("AI speed floors must be non-negative".to_string());
        }
        if let CollisionRule::Radius(radius) = self.collision_rule {
            if radius <= 0.0 {
                return Err(format!("collision radius {} must be positive", radius));
            }
        }
        if self.max_drivers == 0 {
            return Err("max drivers must be at least one".to_string());
        }
        Ok(())
    }

    /// Load settings from a JSON file; missing fields take defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path.as_ref())?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.validate().map_err(ConfigError::Invalid)?;
        log::info!("Loaded race settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!(
                    "Using default settings ({}): {}",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Race settings saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RaceSettings::endless().validate().is_ok());
        assert!(RaceSettings::multi_car().validate().is_ok());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(RaceMode::from_str("Endless"), Some(RaceMode::SingleCar));
        assert_eq!(RaceMode::from_str("multi"), Some(RaceMode::MultiCar));
        assert_eq!(RaceMode::from_str("pit-stop"), None);
        assert_eq!(RaceMode::from_str(RaceMode::MultiCar.as_str()), Some(RaceMode::MultiCar));
    }

    #[test]
    fn test_car_bounds() {
        let settings = RaceSettings::default();
        assert_eq!(settings.min_car_x(), 10.0);
        assert_eq!(settings.max_car_x(), 340.0);
    }

    #[test]
    fn test_multi_car_stagger() {
        let settings = RaceSettings::multi_car();
        assert_eq!(settings.car_y(0), 650.0);
        assert_eq!(settings.car_y(2), 620.0);
        assert_eq!(RaceSettings::endless().car_y(2), 650.0);
    }

    #[test]
    fn test_narrow_lane_rejected() {
        let settings = RaceSettings {
            lane_width: 40.0,
            ..RaceSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: RaceSettings =
            serde_json::from_str(r#"{"mode":"MultiCar","race_distance":500.0}"#).unwrap();
        assert_eq!(settings.mode, RaceMode::MultiCar);
        assert_eq!(settings.race_distance, 500.0);
        assert_eq!(settings.lane_width, 400.0);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!(
            "photo_racer_settings_{}.json",
            std::process::id()
        ));
        let settings = RaceSettings {
            race_distance: 750.0,
            ..RaceSettings::multi_car()
        };
        settings.save(&path).unwrap();
        let loaded = RaceSettings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let settings = RaceSettings::load_or_default("/nonexistent/photo_racer.json");
        assert_eq!(settings, RaceSettings::default());
    }
}
