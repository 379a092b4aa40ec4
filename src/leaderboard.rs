use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::session::TestResult;

/// Leaderboard shared between the controller and the UI on the event-loop thread
pub type SharedLeaderboard = Rc<RefCell<Leaderboard>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub username: String,
    pub wpm: u32,
    pub accuracy: f64,
    pub date: String,
}

/// Results for the lifetime of the process, best wpm first
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    next_id: u64,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leaderboard as it looks at startup
    pub fn seeded() -> Self {
        let mut board = Self::new();
        for (username, wpm, accuracy, date) in [
            ("speed_demon", 145, 99.5, "15 oct 2023"),
            ("kb_warrior", 128, 98.2, "14 oct 2023"),
            ("click_clack", 115, 97.0, "16 oct 2023"),
            ("typist_pro", 98, 95.5, "12 oct 2023"),
        ] {
            let id = board.next_id();
            board.append(LeaderboardEntry {
                id,
                username: username.to_string(),
                wpm,
                accuracy,
                date: date.to_string(),
            });
        }
        board
    }

    pub fn shared(self) -> SharedLeaderboard {
        Rc::new(RefCell::new(self))
    }

    /// Insert `entry` keeping the collection sorted by wpm, highest first.
    /// Ties keep insertion order.
    pub fn append(&mut self, entry: LeaderboardEntry) {
        let pos = self.entries.partition_point(|e| e.wpm >= entry.wpm);
        self.entries.insert(pos, entry);
    }

    /// Build an entry for `result` and append it. Returns the new entry.
    pub fn record(&mut self, username: &str, result: &TestResult, at: DateTime<Local>) -> LeaderboardEntry {
        let entry = LeaderboardEntry {
            id: self.next_id(),
            username: username.to_string(),
            wpm: result.wpm,
            accuracy: result.accuracy as f64,
            date: format_date(at),
        };
        self.append(entry.clone());
        entry
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1-based rank of the entry with `id`
    pub fn rank_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id).map(|i| i + 1)
    }

    fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

/// `15 oct 2023` style date
pub fn format_date(at: DateTime<Local>) -> String {
    at.format("%-d %b %Y").to_string().to_lowercase()
}
