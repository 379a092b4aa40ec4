use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TimeLimitError;

/// Kind of text the test is run against
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// lowercase word salad without punctuation
    #[default]
    Casual,
    /// prose paragraphs with capitalization and punctuation
    Competition,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Casual => Mode::Competition,
            Mode::Competition => Mode::Casual,
        }
    }
}

/// Length of a timed test. Only the durations offered in the UI are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TimeLimit(u64);

impl TimeLimit {
    pub const OPTIONS: [TimeLimit; 4] = [
        TimeLimit(15),
        TimeLimit(30),
        TimeLimit(60),
        TimeLimit(120),
    ];

    pub fn secs(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        let idx = Self::position(self);
        Self::OPTIONS[(idx + 1) % Self::OPTIONS.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::position(self);
        Self::OPTIONS[(idx + Self::OPTIONS.len() - 1) % Self::OPTIONS.len()]
    }

    fn position(limit: TimeLimit) -> usize {
        Self::OPTIONS
            .iter()
            .position(|&o| o == limit)
            .unwrap_or(1)
    }
}

impl Default for TimeLimit {
    fn default() -> Self {
        TimeLimit(30)
    }
}

impl TryFrom<u64> for TimeLimit {
    type Error = TimeLimitError;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        Self::OPTIONS
            .iter()
            .copied()
            .find(|o| o.0 == secs)
            .ok_or(TimeLimitError(secs))
    }
}

impl From<TimeLimit> for u64 {
    fn from(limit: TimeLimit) -> Self {
        limit.0
    }
}

impl std::str::FromStr for TimeLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs: u64 = s.trim().parse().map_err(|e| format!("{e}"))?;
        TimeLimit::try_from(secs).map_err(|e| e.to_string())
    }
}

impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub mode: Mode,
    pub time_limit: TimeLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Finished,
}

/// What the user has typed so far. Spaces never make it in here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    typed: Vec<char>,
}

impl InputState {
    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    pub fn len(&self) -> usize {
        self.typed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.typed.is_empty()
    }

    pub fn as_string(&self) -> String {
        self.typed.iter().collect()
    }

    pub(crate) fn replace(&mut self, typed: Vec<char>) {
        debug_assert!(!typed.contains(&' '));
        self.typed = typed;
    }
}

/// One live sample taken per clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub second: u64,
    pub wpm: u32,
    pub raw_wpm: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharacterCounts {
    pub correct: usize,
    pub incorrect: usize,
    /// always zero: input is compared position by position with no word boundaries
    pub extra: usize,
    /// always zero: an infinite prompt has no untyped remainder to miss
    pub missed: usize,
}

/// Final summary of a finished test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub wpm: u32,
    pub raw_wpm: u32,
    pub accuracy: u32,
    pub consistency: u32,
    pub error_count: usize,
    pub elapsed_secs: f64,
    pub character_counts: CharacterCounts,
    pub history: Vec<SampleRecord>,
    pub mode: Mode,
    pub time_limit: TimeLimit,
}

impl TestResult {
    /// Elapsed time rounded to whole seconds, as shown on the results screen
    pub fn time(&self) -> u64 {
        self.elapsed_secs.round() as u64
    }
}
