//! Collision detection between cars and obstacles
//!
//! Canonical rule is axis-aligned box overlap. A center-distance rule is
//! kept for tracks configured to use it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Car, Obstacle};
use crate::settings::RaceSettings;

/// How car/obstacle contact is decided
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum CollisionRule {
    /// Bounding boxes overlap
    #[default]
    Aabb,
    /// Box centers closer than the radius
    Radius(f32),
}

/// Axis-aligned bounding box, anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x && a_max.x > other.min.x && self.min.y < b_max.y && a_max.y > other.min.y
    }
}

pub fn car_bounds(car: &Car, settings: &RaceSettings) -> Aabb {
    Aabb::new(car.pos.x, car.pos.y, settings.car_width, settings.car_height)
}

pub fn obstacle_bounds(obstacle: &Obstacle, settings: &RaceSettings) -> Aabb {
    Aabb::new(
        obstacle.pos.x,
        obstacle.pos.y,
        settings.obstacle_size,
        settings.obstacle_size,
    )
}

/// Test two boxes under the given rule
pub fn boxes_collide(car: &Aabb, obstacle: &Aabb, rule: CollisionRule) -> bool {
    match rule {
        CollisionRule::Aabb => car.overlaps(obstacle),
        CollisionRule::Radius(radius) => car.center().distance(obstacle.center()) < radius,
    }
}

/// Does `car` touch `obstacle`?
pub fn collides(car: &Car, obstacle: &Obstacle, settings: &RaceSettings) -> bool {
    boxes_collide(
        &car_bounds(car, settings),
        &obstacle_bounds(obstacle, settings),
        settings.collision_rule,
    )
}

/// Id of the first obstacle (in field order) that `car` touches
pub fn first_hit(car: &Car, obstacles: &[Obstacle], settings: &RaceSettings) -> Option<u32> {
    let bounds = car_bounds(car, settings);
    obstacles
        .iter()
        .find(|o| boxes_collide(&bounds, &obstacle_bounds(o, settings), settings.collision_rule))
        .map(|o| o.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ObstacleKind;

    fn car_at(x: f32, y: f32) -> Car {
        Car {
            id: 1,
            name: "You".to_string(),
            pos: Vec2::new(x, y),
            speed: 2.0,
            progress: 0.0,
            is_player: true,
            car_id: 1,
            portrait_ref: None,
            color_tag: String::new(),
        }
    }

    fn obstacle_at(id: u32, x: f32, y: f32) -> Obstacle {
        Obstacle {
            id,
            pos: Vec2::new(x, y),
            kind: ObstacleKind::Rock,
        }
    }

    #[test]
    fn test_aabb_overlap_hit_and_miss() {
        let car = Aabb::new(100.0, 500.0, 50.0, 30.0);
        assert!(car.overlaps(&Aabb::new(110.0, 505.0, 30.0, 30.0)));
        assert!(!car.overlaps(&Aabb::new(300.0, 505.0, 30.0, 30.0)));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let car = Aabb::new(100.0, 500.0, 50.0, 30.0);
        assert!(!car.overlaps(&Aabb::new(150.0, 500.0, 30.0, 30.0)));
        assert!(!car.overlaps(&Aabb::new(100.0, 470.0, 30.0, 30.0)));
    }

    #[test]
    fn test_collides_uses_settings_dimensions() {
        let settings = RaceSettings::default();
        let car = car_at(100.0, 500.0);
        assert!(collides(&car, &obstacle_at(1, 110.0, 505.0), &settings));
        assert!(!collides(&car, &obstacle_at(2, 300.0, 505.0), &settings));
    }

    #[test]
    fn test_radius_rule() {
        let settings = RaceSettings {
            collision_rule: CollisionRule::Radius(50.0),
            ..RaceSettings::default()
        };
        let car = car_at(100.0, 500.0);
        // centers (125, 515) and (165, 515): 40 apart
        assert!(collides(&car, &obstacle_at(1, 150.0, 500.0), &settings));
        // centers 60 apart
        assert!(!collides(&car, &obstacle_at(2, 170.0, 500.0), &settings));
    }

    #[test]
    fn test_first_hit_short_circuits_in_order() {
        let settings = RaceSettings::default();
        let car = car_at(100.0, 500.0);
        let obstacles = [
            obstacle_at(1, 300.0, 500.0),
            obstacle_at(2, 120.0, 490.0),
            obstacle_at(3, 105.0, 505.0),
        ];
        assert_eq!(first_hit(&car, &obstacles, &settings), Some(2));
        assert_eq!(first_hit(&car, &obstacles[..1], &settings), None);
    }
}
