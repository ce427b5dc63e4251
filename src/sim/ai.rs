//! Rival car controller
//!
//! Reactive and memoryless: each tick a rival looks at a small window around
//! itself, dodges the nearest obstacle in it, and otherwise drifts and speeds up.

use rand::Rng;

use super::state::{Car, Obstacle, clamp_lateral};
use crate::settings::RaceSettings;

/// What a rival decided this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiAction {
    /// Steered away from obstacle `id` and slowed down
    Evade(u32),
    /// Path clear: jittered and accelerated
    Cruise,
}

/// Nearest obstacle inside the rival's look-around window
pub fn nearest_threat<'a>(
    car: &Car,
    obstacles: &'a [Obstacle],
    settings: &RaceSettings,
) -> Option<&'a Obstacle> {
    let top = car.pos.y - settings.ai_window_ahead;
    let bottom = car.pos.y + settings.ai_window_behind;

    obstacles
        .iter()
        .filter(|o| {
            o.pos.y > top
                && o.pos.y < bottom
                && (o.pos.x - car.pos.x).abs() < settings.ai_window_lateral
        })
        // min_by keeps the first of equal candidates
        .min_by(|a, b| {
            a.pos
                .distance_squared(car.pos)
                .total_cmp(&b.pos.distance_squared(car.pos))
        })
}

/// Update one rival's lateral position and speed
pub fn steer_car<R: Rng>(
    car: &mut Car,
    obstacles: &[Obstacle],
    settings: &RaceSettings,
    rng: &mut R,
) -> AiAction {
    if let Some(threat) = nearest_threat(car, obstacles, settings) {
        // Move away from the obstacle's side
        let step = if threat.pos.x > car.pos.x {
            -settings.ai_steer_step
        } else {
            settings.ai_steer_step
        };
        car.pos.x = clamp_lateral(settings, car.pos.x + step);
        car.speed = (car.speed - settings.ai_slowdown).max(settings.ai_speed_floor);
        return AiAction::Evade(threat.id);
    }

    let jitter = (rng.random::<f32>() - 0.5) * 2.0 * settings.ai_jitter;
    car.pos.x = clamp_lateral(settings, car.pos.x + jitter);
    car.speed = (car.speed + settings.ai_accel).min(settings.ai_speed_cap);
    AiAction::Cruise
}

/// Update every non-player car, in roster order
pub fn update_rivals<R: Rng>(
    cars: &mut [Car],
    obstacles: &[Obstacle],
    settings: &RaceSettings,
    rng: &mut R,
) {
    for car in cars.iter_mut().filter(|c| !c.is_player) {
        if let AiAction::Evade(id) = steer_car(car, obstacles, settings, rng) {
            log::trace!("Rival {} evading obstacle {}", car.id, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ObstacleKind;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rival(x: f32, y: f32, speed: f32) -> Car {
        Car {
            id: 2,
            name: "Rival".to_string(),
            pos: Vec2::new(x, y),
            speed,
            progress: 0.0,
            is_player: false,
            car_id: 1,
            portrait_ref: None,
            color_tag: String::new(),
        }
    }

    fn rock(id: u32, x: f32, y: f32) -> Obstacle {
        Obstacle {
            id,
            pos: Vec2::new(x, y),
            kind: ObstacleKind::Rock,
        }
    }

    #[test]
    fn test_evades_obstacle_on_right() {
        let settings = RaceSettings::multi_car();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut car = rival(200.0, 600.0, 2.0);
        let action = steer_car(&mut car, &[rock(7, 230.0, 560.0)], &settings, &mut rng);
        assert_eq!(action, AiAction::Evade(7));
        assert_eq!(car.pos.x, 197.0);
        assert_eq!(car.speed, 1.5);
    }

    #[test]
    fn test_evades_obstacle_on_left_with_floor() {
        let settings = RaceSettings::multi_car();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut car = rival(200.0, 600.0, 0.6);
        steer_car(&mut car, &[rock(1, 180.0, 620.0)], &settings, &mut rng);
        assert_eq!(car.pos.x, 203.0);
        assert_eq!(car.speed, 0.5);
    }

    #[test]
    fn test_evasion_clamped_to_track() {
        let settings = RaceSettings::multi_car();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut car = rival(11.0, 600.0, 2.0);
        steer_car(&mut car, &[rock(1, 40.0, 600.0)], &settings, &mut rng);
        assert_eq!(car.pos.x, 10.0);
    }

    #[test]
    fn test_nearest_threat_chosen() {
        let settings = RaceSettings::multi_car();
        let car = rival(200.0, 600.0, 2.0);
        let obstacles = [
            rock(1, 250.0, 520.0),
            rock(2, 190.0, 590.0),
            rock(3, 400.0, 600.0),
        ];
        assert_eq!(nearest_threat(&car, &obstacles, &settings).map(|o| o.id), Some(2));
    }

    #[test]
    fn test_window_excludes_far_obstacles() {
        let settings = RaceSettings::multi_car();
        let car = rival(200.0, 600.0, 2.0);
        let obstacles = [
            rock(1, 200.0, 500.0), // exactly at the top edge
            rock(2, 200.0, 650.0), // exactly at the bottom edge
            rock(3, 260.0, 600.0), // exactly at the lateral edge
        ];
        assert!(nearest_threat(&car, &obstacles, &settings).is_none());
    }

    #[test]
    fn test_cruise_accelerates_to_cap_with_bounded_jitter() {
        let settings = RaceSettings::multi_car();
        let mut rng = Pcg32::seed_from_u64(99);
        let mut car = rival(200.0, 600.0, 2.95);
        for _ in 0..10 {
            let before = car.pos.x;
            assert_eq!(steer_car(&mut car, &[], &settings, &mut rng), AiAction::Cruise);
            assert!((car.pos.x - before).abs() <= 1.0);
        }
        assert_eq!(car.speed, 3.0);
    }

    #[test]
    fn test_player_untouched() {
        let settings = RaceSettings::multi_car();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut player = rival(100.0, 600.0, 2.0);
        player.is_player = true;
        let mut cars = vec![player.clone()];
        update_rivals(&mut cars, &[rock(1, 110.0, 600.0)], &settings, &mut rng);
        assert_eq!(cars[0], player);
    }

    #[test]
    fn test_seeded_rivals_are_reproducible() {
        let settings = RaceSettings::multi_car();
        let run = || {
            let mut rng = Pcg32::seed_from_u64(2024);
            let mut cars = vec![rival(100.0, 600.0, 1.0), rival(250.0, 585.0, 2.0)];
            for _ in 0..30 {
                update_rivals(&mut cars, &[], &settings, &mut rng);
            }
            cars
        };
        assert_eq!(run(), run());
    }
}
