//! Drivers, rosters and the car catalog
//!
//! A roster is the ordered list of drivers in a race. Roster order is
//! significant: it fixes car layout and breaks finish ties.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::RaceError;
use crate::settings::{RaceMode, RaceSettings};

/// A selectable car body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CarModel {
    pub id: u32,
    pub name: &'static str,
    pub glyph: &'static str,
}

/// Cars offered on the selection screen
pub const CAR_CATALOG: [CarModel; 6] = [
    CarModel { id: 1, name: "Speedster", glyph: "🚗" },
    CarModel { id: 2, name: "Off-roader", glyph: "🚙" },
    CarModel { id: 3, name: "Formula", glyph: "🏎️" },
    CarModel { id: 4, name: "Van", glyph: "🚐" },
    CarModel { id: 5, name: "Taxi", glyph: "🚕" },
    CarModel { id: 6, name: "Police", glyph: "🚓" },
];

/// Look up a catalog car by id
pub fn car_model(id: u32) -> Option<&'static CarModel> {
    CAR_CATALOG.iter().find(|c| c.id == id)
}

/// A race participant as handed over by the setup screens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: u32,
    pub name: String,
    pub is_player: bool,
    /// Catalog car the driver picked
    #[serde(default = "default_car_id")]
    pub car_id: u32,
    /// Opaque handle (URI) of an externally captured photo
    #[serde(default)]
    pub portrait_ref: Option<String>,
    /// Opaque display attribute (e.g. "#FF4444")
    #[serde(default)]
    pub color_tag: String,
}

fn default_car_id() -> u32 {
    CAR_CATALOG[0].id
}

impl Driver {
    pub fn player(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_player: true,
            car_id: default_car_id(),
            portrait_ref: None,
            color_tag: String::new(),
        }
    }

    pub fn rival(id: u32, name: impl Into<String>) -> Self {
        Self {
            is_player: false,
            ..Self::player(id, name)
        }
    }

    pub fn with_portrait(mut self, portrait_ref: impl Into<String>) -> Self {
        self.portrait_ref = Some(portrait_ref.into());
        self
    }

    pub fn with_car(mut self, car_id: u32) -> Self {
        self.car_id = car_id;
        self
    }

    pub fn with_color(mut self, color_tag: impl Into<String>) -> Self {
        self.color_tag = color_tag.into();
        self
    }
}

/// Ordered list of drivers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Roster {
    pub drivers: Vec<Driver>,
}

impl Roster {
    pub fn new(drivers: Vec<Driver>) -> Self {
        Self { drivers }
    }

    /// Endless-runner roster: just the player
    pub fn single(player: Driver) -> Self {
        Self {
            drivers: vec![player],
        }
    }

    /// The player plus three rivals, as the driver setup screen starts out.
    ///
    /// The player keeps its id, car and color (red when unset); rivals take
    /// the lowest free ids after it.
    pub fn with_default_rivals(mut player: Driver) -> Self {
        if player.color_tag.is_empty() {
            player.color_tag = "#FF4444".to_string();
        }
        let player_id = player.id;
        let mut ids = (1..).filter(|id| *id != player_id);
        let mut drivers = vec![player];
        for (n, (color, car_id)) in [("#4444FF", 2), ("#44FF44", 3), ("#FFFF44", 4)]
            .into_iter()
            .enumerate()
        {
            if let Some(id) = ids.next() {
                drivers.push(
                    Driver::rival(id, format!("Rival {}", n + 1))
                        .with_car(car_id)
                        .with_color(color),
                );
            }
        }
        Self { drivers }
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn player(&self) -> Option<&Driver> {
        self.drivers.iter().find(|d| d.is_player)
    }

    /// Refuse degenerate rosters before any simulation happens
    pub fn validate(&self, settings: &RaceSettings) -> Result<(), RaceError> {
        if self.drivers.is_empty() {
            return Err(RaceError::EmptyRoster);
        }

        let players = self.drivers.iter().filter(|d| d.is_player).count();
        match players {
            0 => return Err(RaceError::NoPlayer),
            1 => {}
            count => return Err(RaceError::MultiplePlayers { count }),
        }

        let max = match settings.mode {
            RaceMode::SingleCar => 1,
            RaceMode::MultiCar => settings.max_drivers,
        };
        if self.drivers.len() > max {
            return Err(RaceError::TooManyDrivers {
                count: self.drivers.len(),
                max,
            });
        }

        let mut seen = HashSet::new();
        for driver in &self.drivers {
            if !seen.insert(driver.id) {
                return Err(RaceError::DuplicateDriverId(driver.id));
            }
        }

        if let Some(driver) = self.drivers.iter().find(|d| car_model(d.car_id).is_none()) {
            return Err(RaceError::UnknownCar(driver.car_id));
        }

        if settings.require_player_portrait
            && self.player().is_some_and(|p| p.portrait_ref.is_none())
        {
            return Err(RaceError::MissingPlayerPortrait);
        }

        Ok(())
    }
}
