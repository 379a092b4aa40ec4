//! The Idle → Running → Finished state machine behind a typing test.
//!
//! A [`SessionController`] lives for the whole process. Each call to
//! [`SessionController::load_new_test`] replaces the per-test state (input,
//! text buffer, clock, history) in one go, after cancelling the previous
//! test's tick so no timer outlives its session.

use std::time::Duration;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::buffer::StreamBuffer;
use crate::clock::{Clock, SessionClock, TickScheduler};
use crate::leaderboard::SharedLeaderboard;
use crate::provider::{fallback_words, fetch_words, TextProvider};
use crate::scoring::{consistency, score, Score};
use crate::session::{
    CharacterCounts, InputState, Mode, SampleRecord, SessionConfig, SessionState, TestResult,
    TimeLimit,
};

/// Live scores are never computed over less than this, so the first tick
/// does not report an absurd spike.
pub const MIN_SAMPLE_SECS: f64 = 0.5;

/// Everything owned by a single test
#[derive(Debug, Default)]
struct Session {
    state: SessionState,
    input: InputState,
    buffer: StreamBuffer,
    clock: SessionClock,
    history: Vec<SampleRecord>,
    time_remaining: u64,
    result: Option<TestResult>,
    entry_id: Option<String>,
}

pub struct SessionController<P: TextProvider, C: Clock> {
    config: SessionConfig,
    username: String,
    provider: P,
    clock: C,
    scheduler: TickScheduler,
    leaderboard: SharedLeaderboard,
    session: Session,
}

impl<P: TextProvider, C: Clock> SessionController<P, C> {
    /// Build a controller and load its first test
    pub fn new(
        config: SessionConfig,
        username: impl Into<String>,
        provider: P,
        clock: C,
        leaderboard: SharedLeaderboard,
    ) -> Self {
        let mut controller = Self {
            config,
            username: username.into(),
            provider,
            clock,
            scheduler: TickScheduler::new(),
            leaderboard,
            session: Session::default(),
        };
        controller.load_new_test();
        controller
    }

    /// Throw away the current test and go back to Idle with fresh text
    pub fn load_new_test(&mut self) {
        self.session.clock.stop(&mut self.scheduler);

        let mode = self.config.mode;
        let words = fetch_words(&mut self.provider, mode);
        let buffer = StreamBuffer::new(words)
            .or_else(|_| StreamBuffer::new(fallback_words(mode)))
            .unwrap_or_default();

        let limit = self.config.time_limit.secs();
        self.session = Session {
            state: SessionState::Idle,
            buffer,
            clock: SessionClock::new(limit),
            time_remaining: limit,
            ..Session::default()
        };

        debug!(
            %mode,
            time_limit = limit,
            target_len = self.session.buffer.target_len(),
            "loaded new test"
        );
    }

    /// Restart shortcut: always loads a new test, whatever the current state
    pub fn restart(&mut self) {
        debug!(state = ?self.session.state, "restart requested");
        self.load_new_test();
    }

    /// Feed the full contents of the input field. Returns whether the value
    /// was accepted.
    ///
    /// Ignored once finished. Values ending in a space are dropped, and while
    /// running the input may only grow.
    pub fn input_changed(&mut self, value: &str) -> bool {
        if self.session.state == SessionState::Finished {
            return false;
        }
        if value.ends_with(' ') {
            return false;
        }

        let typed: Vec<char> = value.chars().collect();
        if typed.contains(&' ') {
            return false;
        }

        match self.session.state {
            SessionState::Idle => {
                if typed.is_empty() {
                    return false;
                }
                self.start();
            }
            SessionState::Running => {
                if typed.len() < self.session.input.len() {
                    return false;
                }
            }
            SessionState::Finished => return false,
        }

        if self.session.buffer.grow_if_needed(typed.len()) {
            debug!(
                typed = typed.len(),
                target_len = self.session.buffer.target_len(),
                "extended target text"
            );
        }
        self.session.input.replace(typed);
        true
    }

    /// Append a single typed character
    pub fn push_char(&mut self, c: char) -> bool {
        let mut value = self.session.input.as_string();
        value.push(c);
        self.input_changed(&value)
    }

    fn start(&mut self) {
        let now = self.clock.now();
        let token = self.session.clock.start(&mut self.scheduler, now);
        self.session.state = SessionState::Running;
        debug!(?token, "test started");
    }

    /// Run the 1 Hz tick if it is due. Call this whenever the event loop wakes.
    pub fn poll_clock(&mut self) -> Option<SampleRecord> {
        let now = self.clock.now();
        let token = self.scheduler.poll(now)?;

        if self.session.state != SessionState::Running || !self.session.clock.owns(token) {
            self.scheduler.cancel(token);
            return None;
        }

        let elapsed = self.session.clock.elapsed_secs(now);
        let remaining = self.session.clock.remaining_secs(now);
        self.session.time_remaining = remaining;

        let live = score(
            self.session.input.typed(),
            self.session.buffer.target(),
            elapsed.max(MIN_SAMPLE_SECS),
        );
        let sample = SampleRecord {
            second: elapsed.floor() as u64,
            wpm: live.wpm,
            raw_wpm: live.raw_wpm,
        };
        self.session.history.push(sample);

        if remaining == 0 {
            let latest = self.session.input.typed().to_vec();
            self.finish_with(Some(latest));
        }

        Some(sample)
    }

    /// End the running test now
    pub fn finish(&mut self) -> Option<&TestResult> {
        self.finish_with(None)
    }

    /// End the running test, scoring `final_input` when given instead of the
    /// committed input. An override containing a space is ignored and the
    /// committed input is scored.
    pub fn finish_with(&mut self, final_input: Option<Vec<char>>) -> Option<&TestResult> {
        if self.session.state != SessionState::Running {
            return None;
        }

        let final_input = final_input.filter(|typed| {
            let accepted = !typed.contains(&' ');
            if !accepted {
                warn!("final input contains a space, scoring committed input");
            }
            accepted
        });

        self.session.clock.stop(&mut self.scheduler);
        self.session.state = SessionState::Finished;
        self.session.time_remaining = 0;

        if let Some(typed) = final_input {
            self.session.input.replace(typed);
        }

        let now = self.clock.now();
        let duration = self.session.clock.final_duration_secs(now);
        let Score {
            wpm,
            raw_wpm,
            accuracy,
            correct,
            errors,
        } = score(
            self.session.input.typed(),
            self.session.buffer.target(),
            duration,
        );

        self.session.history.push(SampleRecord {
            second: duration.floor() as u64,
            wpm,
            raw_wpm,
        });

        let result = TestResult {
            wpm,
            raw_wpm,
            accuracy,
            consistency: consistency(&self.session.history),
            error_count: errors,
            elapsed_secs: duration,
            character_counts: CharacterCounts {
                correct,
                incorrect: errors,
                extra: 0,
                missed: 0,
            },
            history: self.session.history.clone(),
            mode: self.config.mode,
            time_limit: self.config.time_limit,
        };

        let entry = self
            .leaderboard
            .borrow_mut()
            .record(&self.username, &result, Local::now());

        info!(
            wpm = result.wpm,
            raw_wpm = result.raw_wpm,
            accuracy = result.accuracy,
            consistency = result.consistency,
            secs = duration,
            entry = %entry.id,
            "test finished"
        );

        self.session.entry_id = Some(entry.id);
        self.session.result = Some(result);
        self.session.result.as_ref()
    }

    /// Switch text mode. Refused while a test is running.
    pub fn change_mode(&mut self, mode: Mode) -> bool {
        if self.is_running() {
            return false;
        }
        self.config.mode = mode;
        self.load_new_test();
        true
    }

    /// Switch test length. Refused while a test is running.
    pub fn change_time(&mut self, time_limit: TimeLimit) -> bool {
        if self.is_running() {
            return false;
        }
        self.config.time_limit = time_limit;
        self.load_new_test();
        true
    }

    /// Score of the input so far, as shown while typing
    pub fn live_score(&self) -> Score {
        match self.session.state {
            SessionState::Idle => Score::NEUTRAL,
            SessionState::Running => {
                let elapsed = self.session.clock.elapsed_secs(self.clock.now());
                score(
                    self.session.input.typed(),
                    self.session.buffer.target(),
                    elapsed.max(MIN_SAMPLE_SECS),
                )
            }
            SessionState::Finished => self
                .session
                .result
                .as_ref()
                .map(|r| Score {
                    wpm: r.wpm,
                    raw_wpm: r.raw_wpm,
                    accuracy: r.accuracy,
                    correct: r.character_counts.correct,
                    errors: r.character_counts.incorrect,
                })
                .unwrap_or_default(),
        }
    }

    /// How long the event loop may sleep before the next tick is due
    pub fn until_next_tick(&self) -> Option<Duration> {
        self.scheduler.until_due(self.clock.now())
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn is_running(&self) -> bool {
        self.session.state == SessionState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.session.state == SessionState::Finished
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn input(&self) -> &InputState {
        &self.session.input
    }

    pub fn typed(&self) -> &[char] {
        self.session.input.typed()
    }

    pub fn buffer(&self) -> &StreamBuffer {
        &self.session.buffer
    }

    pub fn history(&self) -> &[SampleRecord] {
        &self.session.history
    }

    pub fn time_remaining(&self) -> u64 {
        self.session.time_remaining
    }

    pub fn result(&self) -> Option<&TestResult> {
        self.session.result.as_ref()
    }

    /// Leaderboard id of the entry recorded for the finished test
    pub fn entry_id(&self) -> Option<&str> {
        self.session.entry_id.as_deref()
    }

    pub fn leaderboard(&self) -> SharedLeaderboard {
        self.leaderboard.clone()
    }

    pub fn has_pending_tick(&self) -> bool {
        self.scheduler.has_pending()
    }
}
