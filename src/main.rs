//! Photo Racer headless runner
//!
//! Runs one race without a screen: a simple autopilot drags the player away
//! from the nearest obstacle ahead, and the result is scored against the best
//! score kept next to the system temp dir.
//!
//! Usage: `photo-racer [single|multi] [seed] [settings.json]`

use std::time::{SystemTime, UNIX_EPOCH};

use photo_racer::consts::TICK_MS;
use photo_racer::highscores::{Achievement, JsonFileScores, Podium, ScoreRating, record_score};
use photo_racer::roster::{Driver, Roster};
use photo_racer::settings::{RaceMode, RaceSettings};
use photo_racer::sim::{RaceOutcome, RaceSnapshot};
use photo_racer::RaceSession;

/// Give up on endless runs that outlive this many ticks
const MAX_TICKS: u64 = 100_000;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = args
        .first()
        .and_then(|s| RaceMode::from_str(s))
        .unwrap_or(RaceMode::SingleCar);
    let seed = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
    let mut settings = match args.get(2) {
        Some(path) => RaceSettings::load_or_default(path),
        None => match mode {
            RaceMode::SingleCar => RaceSettings::endless(),
            RaceMode::MultiCar => RaceSettings::multi_car(),
        },
    };
    settings.mode = mode;

    let player = Driver::player(1, "You").with_portrait("local://driver.jpg");
    let roster = match mode {
        RaceMode::SingleCar => Roster::single(player),
        RaceMode::MultiCar => Roster::with_default_rivals(player),
    };

    log::info!("Photo Racer ({}) starting with seed {}", mode.as_str(), seed);

    let mut session = match RaceSession::create(settings, &roster, seed) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Cannot start race: {}", e);
            std::process::exit(1);
        }
    };

    let player_id = session.state().player().id;
    session.start();
    let mut outcome = None;
    while outcome.is_none() && session.state().tick_count < MAX_TICKS {
        if let Some(dx) = autopilot(&session.snapshot(), player_id, &session.state().settings) {
            session.drag(dx);
        }
        outcome = session.update(TICK_MS);
    }
    session.stop();

    let Some(outcome) = outcome else {
        println!("No result after {} ticks", MAX_TICKS);
        return;
    };

    let score = outcome.score(player_id);
    match &outcome {
        RaceOutcome::Crashed { final_progress } => {
            println!("Crashed after {:.0} units", final_progress);
        }
        RaceOutcome::Finished {
            ranked_results,
            winner_id,
        } => {
            println!("Finished! Winner: driver {}", winner_id);
            for result in ranked_results {
                println!(
                    "  {:>2}. driver {} - {:.0} ({:?})",
                    result.position,
                    result.driver_id,
                    result.progress,
                    Podium::for_position(result.position)
                );
            }
        }
    }

    let mut scores = JsonFileScores::new(std::env::temp_dir().join("photo_racer_best.json"));
    match record_score(&mut scores, score) {
        Ok(report) => {
            println!(
                "Score {} ({}), best {}{}",
                report.score,
                ScoreRating::for_score(report.score).as_str(),
                report.best,
                if report.is_new_record { " - new record!" } else { "" }
            );
            for achievement in Achievement::earned(&report) {
                println!("  Achievement: {}", achievement.as_str());
            }
        }
        Err(e) => log::warn!("Could not update best score: {}", e),
    }
}

/// Drag away from the closest obstacle bearing down on the player
fn autopilot(snapshot: &RaceSnapshot, player_id: u32, settings: &RaceSettings) -> Option<f32> {
    let player = snapshot.cars.iter().find(|c| c.id == player_id)?;
    let car_center = player.x + settings.car_width / 2.0;
    let threat = snapshot
        .obstacles
        .iter()
        .filter(|o| o.y < player.y + settings.car_height && o.y > player.y - 200.0)
        .filter(|o| (o.x + settings.obstacle_size / 2.0 - car_center).abs() < settings.car_width)
        .max_by(|a, b| a.y.total_cmp(&b.y))?;

    let threat_center = threat.x + settings.obstacle_size / 2.0;
    let room_left = car_center - settings.min_car_x();
    let room_right = settings.max_car_x() + settings.car_width - car_center;
    let step = 6.0;
    let go_left = (threat_center >= car_center && room_left > settings.car_width)
        || room_right <= settings.car_width;
    Some(if go_left { -step } else { step })
}
