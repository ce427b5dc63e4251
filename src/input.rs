//! Gesture input adapter
//!
//! Drag gestures arrive asynchronously from the UI as relative deltas. The
//! adapter folds them into a single clamped target x; the next tick reads
//! whatever target was written last. Intermediate gestures are not queued.

use crate::clamp_range;
use crate::settings::RaceSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct InputAdapter {
    target_x: f32,
    min_x: f32,
    max_x: f32,
    /// Set when a gesture arrived since the last tick
    dirty: bool,
}

impl InputAdapter {
    /// Track the player car starting from `initial_x`
    pub fn new(settings: &RaceSettings, initial_x: f32) -> Self {
        let (min_x, max_x) = (settings.min_car_x(), settings.max_car_x());
        Self {
            target_x: clamp_range(initial_x, min_x, max_x),
            min_x,
            max_x,
            dirty: false,
        }
    }

    /// Apply a relative drag of `dx` units. Non-finite deltas are dropped.
    pub fn drag(&mut self, dx: f32) {
        if !dx.is_finite() {
            return;
        }
        self.target_x = clamp_range(self.target_x + dx, self.min_x, self.max_x);
        self.dirty = true;
    }

    /// Latest target, if any gesture arrived since the previous call
    pub fn take_target(&mut self) -> Option<f32> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.target_x)
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }
}
