//! Best score tracking
//!
//! The simulation only emits a final score. Storage is a capability the
//! results screen injects, so the race core never touches persistence.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ScoreStoreError;

/// Storage for the single best-score scalar
pub trait ScoreRepository {
    /// Best score so far (0 when nothing is stored)
    fn best(&self) -> Result<u64, ScoreStoreError>;
    /// Replace the stored best score
    fn store(&mut self, score: u64) -> Result<(), ScoreStoreError>;
}

/// Result of comparing a run against the stored best
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub score: u64,
    pub previous_best: u64,
    pub best: u64,
    pub is_new_record: bool,
}

/// Compare `score` with the stored best and persist it if it beats it
pub fn record_score<R: ScoreRepository + ?Sized>(
    repo: &mut R,
    score: u64,
) -> Result<ScoreReport, ScoreStoreError> {
    let previous_best = repo.best()?;
    let is_new_record = score > previous_best;
    if is_new_record {
        repo.store(score)?;
        log::info!("New best score: {} (was {})", score, previous_best);
    }
    Ok(ScoreReport {
        score,
        previous_best,
        best: previous_best.max(score),
        is_new_record,
    })
}

/// Volatile store, for tests and sessions without storage
#[derive(Debug, Clone, Default)]
pub struct InMemoryScores {
    best: u64,
}

impl InMemoryScores {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreRepository for InMemoryScores {
    fn best(&self) -> Result<u64, ScoreStoreError> {
        Ok(self.best)
    }

    fn store(&mut self, score: u64) -> Result<(), ScoreStoreError> {
        self.best = score;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BestScoreFile {
    best_score: u64,
}

/// Best score kept in a small JSON file
#[derive(Debug, Clone)]
pub struct JsonFileScores {
    path: PathBuf,
}

impl JsonFileScores {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScoreRepository for JsonFileScores {
    fn best(&self) -> Result<u64, ScoreStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str::<BestScoreFile>(&json)?.best_score),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&mut self, score: u64) -> Result<(), ScoreStoreError> {
        let json = serde_json::to_string(&BestScoreFile { best_score: score })?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Rating tier shown on the results screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreRating {
    Rookie,
    Good,
    Great,
    Master,
    Legend,
}

impl ScoreRating {
    pub fn for_score(score: u64) -> Self {
        match score {
            0..100 => ScoreRating::Rookie,
            100..300 => ScoreRating::Good,
            300..500 => ScoreRating::Great,
            500..1000 => ScoreRating::Master,
            _ => ScoreRating::Legend,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreRating::Rookie => "Rookie",
            ScoreRating::Good => "Good",
            ScoreRating::Great => "Great",
            ScoreRating::Master => "Master",
            ScoreRating::Legend => "Legend",
        }
    }
}

/// Badges unlocked by a run, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Achievement {
    FirstHundred,
    Speedy,
    StarRacer,
    RecordHolder,
}

impl Achievement {
    pub fn earned(report: &ScoreReport) -> Vec<Achievement> {
        let thresholds = [
            (100, Achievement::FirstHundred),
            (300, Achievement::Speedy),
            (500, Achievement::StarRacer),
        ];
        let mut earned: Vec<Achievement> = thresholds
            .into_iter()
            .filter(|(min, _)| report.score >= *min)
            .map(|(_, achievement)| achievement)
            .collect();
        if report.is_new_record {
            earned.push(Achievement::RecordHolder);
        }
        earned
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Achievement::FirstHundred => "First Hundred",
            Achievement::Speedy => "Speedy",
            Achievement::StarRacer => "Star Racer",
            Achievement::RecordHolder => "Record Holder",
        }
    }
}

/// Medal for a finishing position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Podium {
    Gold,
    Silver,
    Bronze,
    Finisher,
}

impl Podium {
    pub fn for_position(position: usize) -> Self {
        match position {
            1 => Podium::Gold,
            2 => Podium::Silver,
            3 => Podium::Bronze,
            _ => Podium::Finisher,
        }
    }
}
