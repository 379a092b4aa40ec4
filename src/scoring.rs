//! Live scoring of typed input against the target text.
//!
//! Everything here is a pure function of its arguments so it can run on every
//! keystroke and on every clock tick without coordination.

use serde::{Deserialize, Serialize};

use crate::session::SampleRecord;
use crate::util::coefficient_of_variation;

/// Characters per "word" in the WPM convention
pub const CHARS_PER_WORD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub wpm: u32,
    pub raw_wpm: u32,
    pub accuracy: u32,
    pub correct: usize,
    pub errors: usize,
}

impl Score {
    /// Result reported before any time has elapsed
    pub const NEUTRAL: Score = Score {
        wpm: 0,
        raw_wpm: 0,
        accuracy: 100,
        correct: 0,
        errors: 0,
    };
}

impl Default for Score {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Compare `typed` against `target` position by position and derive speed and
/// accuracy for the given elapsed time.
///
/// Positions past the end of `target` count as errors.
pub fn score(typed: &[char], target: &[char], elapsed_secs: f64) -> Score {
    if elapsed_secs <= 0.0 {
        return Score::NEUTRAL;
    }

    let correct = typed
        .iter()
        .enumerate()
        .filter(|&(idx, c)| target.get(idx) == Some(c))
        .count();
    let errors = typed.len() - correct;

    let minutes = elapsed_secs / 60.0;
    let raw_wpm = words_per_minute(typed.len(), minutes);
    let wpm = words_per_minute(correct, minutes);

    let accuracy = if typed.is_empty() {
        100
    } else {
        ((correct as f64 / typed.len() as f64) * 100.0).round() as u32
    };

    Score {
        wpm,
        raw_wpm,
        accuracy,
        correct,
        errors,
    }
}

fn words_per_minute(chars: usize, minutes: f64) -> u32 {
    ((chars as f64 / CHARS_PER_WORD) / minutes).round() as u32
}

/// Steadiness of the per-second wpm samples as a percentage: 100 means every
/// sample was identical.
///
/// Computed as `100 * (1 - cv)` where `cv` is the coefficient of variation,
/// clamped to `0..=100`. Fewer than two samples yield 100; an all-zero history
/// yields 0.
pub fn consistency(history: &[SampleRecord]) -> u32 {
    if history.len() < 2 {
        return 100;
    }

    let samples: Vec<f64> = history.iter().map(|s| s.wpm as f64).collect();
    match coefficient_of_variation(&samples) {
        Some(cv) => (100.0 * (1.0 - cv)).clamp(0.0, 100.0).round() as u32,
        None => 0,
    }
}
