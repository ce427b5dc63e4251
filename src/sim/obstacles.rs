//! Obstacle field: spawning, scrolling and pruning
//!
//! Obstacles enter above the visible track, scroll down at the race's
//! speed and are dropped once they leave the bottom edge.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Obstacle, ObstacleKind};
use crate::settings::RaceSettings;

/// The active obstacle set, ordered by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleField {
    pub obstacles: Vec<Obstacle>,
    /// Next obstacle id; ids are never reused
    next_id: u32,
}

impl Default for ObstacleField {
    fn default() -> Self {
        Self {
            obstacles: Vec::new(),
            next_id: 1,
        }
    }
}

impl ObstacleField {
    /// Allocate a new obstacle id
    fn next_obstacle_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place an obstacle at an explicit position
    pub fn place(&mut self, pos: Vec2, kind: ObstacleKind) -> u32 {
        let id = self.next_obstacle_id();
        self.obstacles.push(Obstacle { id, pos, kind });
        id
    }

    /// Roll the per-tick spawn chance; on success add an obstacle above the track
    pub fn spawn<R: Rng>(&mut self, rng: &mut R, settings: &RaceSettings) -> Option<u32> {
        if !rng.random_bool(settings.spawn_probability) {
            return None;
        }

        let min_x = settings.spawn_margin;
        let max_x = settings.lane_width - settings.spawn_margin;
        let x = if max_x > min_x {
            rng.random_range(min_x..max_x)
        } else {
            min_x
        };
        let kind = ObstacleKind::ALL[rng.random_range(0..ObstacleKind::ALL.len())];

        let id = self.place(Vec2::new(x, settings.spawn_y), kind);
        log::debug!("Spawned {:?} obstacle {} at x={:.1}", kind, id, x);
        Some(id)
    }

    /// Scroll every obstacle down by `delta`
    pub fn advance(&mut self, delta: f32) {
        for obstacle in &mut self.obstacles {
            obstacle.pos.y += delta;
        }
    }

    /// Drop obstacles whose y is past `limit_y`; returns how many were removed
    pub fn prune(&mut self, limit_y: f32) -> usize {
        let before = self.obstacles.len();
        self.obstacles.retain(|o| o.pos.y <= limit_y);
        before - self.obstacles.len()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}
