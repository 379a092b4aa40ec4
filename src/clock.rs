//! Wall-clock time source and the cooperative 1 Hz tick schedule.
//!
//! Nothing here spawns a thread. The event loop asks the [`TickScheduler`]
//! whether a tick is due each time it wakes, and the controller handles the
//! tick with full access to the latest session state.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

/// Sampling interval while a test is running
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Source of "now"
pub trait Clock {
    fn now(&self) -> SystemTime;
}

impl<T: Clock + ?Sized> Clock for Box<T> {
    fn now(&self) -> SystemTime {
        (**self).now()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<SystemTime>>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: SystemTime) {
        self.now.set(to);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        self.now.get()
    }
}

/// Handle returned when a tick is scheduled. Needed to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken(u64);

#[derive(Debug, Clone, Copy)]
struct Pending {
    token: TickToken,
    anchor: SystemTime,
    interval: Duration,
    next_due: SystemTime,
}

/// Holds at most one repeating tick. Scheduling a new one cancels the old.
#[derive(Debug, Default)]
pub struct TickScheduler {
    next_id: u64,
    pending: Option<Pending>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a repeating tick that first fires `interval` after `anchor`.
    pub fn schedule(&mut self, anchor: SystemTime, interval: Duration) -> TickToken {
        if let Some(old) = self.pending.take() {
            tracing::debug!(token = old.token.0, "replacing scheduled tick");
        }

        self.next_id += 1;
        let token = TickToken(self.next_id);
        self.pending = Some(Pending {
            token,
            anchor,
            interval,
            next_due: anchor + interval,
        });
        token
    }

    /// Cancel the tick identified by `token`. Stale tokens are ignored.
    pub fn cancel(&mut self, token: TickToken) -> bool {
        match self.pending {
            Some(p) if p.token == token => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_scheduled(&self, token: TickToken) -> bool {
        self.pending.is_some_and(|p| p.token == token)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Fire the pending tick if it is due at `now`.
    ///
    /// Due times stay anchored to the schedule start. If the loop stalled past
    /// several due times they collapse into one firing.
    pub fn poll(&mut self, now: SystemTime) -> Option<TickToken> {
        let pending = self.pending.as_mut()?;
        if now < pending.next_due {
            return None;
        }

        let since_anchor = now
            .duration_since(pending.anchor)
            .unwrap_or(Duration::ZERO);
        let interval_ms = pending.interval.as_millis().max(1);
        let fired = (since_anchor.as_millis() / interval_ms) as u32;
        pending.next_due = pending.anchor + pending.interval * (fired + 1);
        Some(pending.token)
    }

    /// Time left until the pending tick is due, if any
    pub fn until_due(&self, now: SystemTime) -> Option<Duration> {
        self.pending.map(|p| {
            p.next_due
                .duration_since(now)
                .unwrap_or(Duration::ZERO)
        })
    }
}

/// Per-session timing. Elapsed time is always recomputed from the recorded
/// start, never accumulated from tick counts.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    started_at: Option<SystemTime>,
    token: Option<TickToken>,
    time_limit_secs: u64,
}

impl SessionClock {
    pub fn new(time_limit_secs: u64) -> Self {
        Self {
            started_at: None,
            token: None,
            time_limit_secs,
        }
    }

    /// Record the start and schedule the 1 Hz tick on `scheduler`
    pub fn start(&mut self, scheduler: &mut TickScheduler, now: SystemTime) -> TickToken {
        self.stop(scheduler);
        self.started_at = Some(now);
        let token = scheduler.schedule(now, TICK_INTERVAL);
        self.token = Some(token);
        token
    }

    /// Cancel this clock's tick. The start timestamp is kept for final timing.
    pub fn stop(&mut self, scheduler: &mut TickScheduler) {
        if let Some(token) = self.token.take() {
            scheduler.cancel(token);
        }
    }

    pub fn owns(&self, token: TickToken) -> bool {
        self.token == Some(token)
    }

    pub fn is_running(&self) -> bool {
        self.token.is_some()
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn time_limit_secs(&self) -> u64 {
        self.time_limit_secs
    }

    /// Fractional seconds since start, zero before the clock starts
    pub fn elapsed_secs(&self, now: SystemTime) -> f64 {
        self.started_at
            .map(|start| secs_between(start, now))
            .unwrap_or(0.0)
    }

    /// Whole seconds left, never negative
    pub fn remaining_secs(&self, now: SystemTime) -> u64 {
        let elapsed = self.elapsed_secs(now).floor() as u64;
        self.time_limit_secs.saturating_sub(elapsed)
    }

    /// Duration to score a finished test with: time since start capped at the
    /// limit. A missing start is treated as a full-length test.
    pub fn final_duration_secs(&self, now: SystemTime) -> f64 {
        let limit = Duration::from_secs(self.time_limit_secs);
        let start = self
            .started_at
            .unwrap_or_else(|| now.checked_sub(limit).unwrap_or(SystemTime::UNIX_EPOCH));
        secs_between(start, now).min(self.time_limit_secs as f64)
    }
}

/// Seconds from `start` to `end`, zero if `end` is earlier
pub fn secs_between(start: SystemTime, end: SystemTime) -> f64 {
    end.duration_since(start)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(clock: &ManualClock) -> SystemTime {
        clock.now()
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::default();
        let other = clock.clone();
        let before = clock.now();

        other.advance(Duration::from_millis(250));

        assert_eq!(secs_between(before, clock.now()), 0.25);
    }

    #[test]
    fn tick_fires_once_per_interval() {
        let clock = ManualClock::default();
        let mut scheduler = TickScheduler::new();
        let token = scheduler.schedule(at(&clock), TICK_INTERVAL);

        clock.advance(Duration::from_millis(999));
        assert_eq!(scheduler.poll(at(&clock)), None);

        clock.advance(Duration::from_millis(1));
        assert_eq!(scheduler.poll(at(&clock)), Some(token));
        assert_eq!(scheduler.poll(at(&clock)), None);

        clock.advance(Duration::from_secs(1));
        assert_eq!(scheduler.poll(at(&clock)), Some(token));
    }

    #[test]
    fn stalled_loop_coalesces_ticks() {
        let clock = ManualClock::default();
        let mut scheduler = TickScheduler::new();
        let token = scheduler.schedule(at(&clock), TICK_INTERVAL);

        clock.advance(Duration::from_millis(3_500));
        assert_eq!(scheduler.poll(at(&clock)), Some(token));
        assert_eq!(scheduler.poll(at(&clock)), None);
        assert_eq!(
            scheduler.until_due(at(&clock)),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn cancelled_tick_never_fires() {
        let clock = ManualClock::default();
        let mut scheduler = TickScheduler::new();
        let token = scheduler.schedule(at(&clock), TICK_INTERVAL);

        assert!(scheduler.cancel(token));
        assert!(!scheduler.cancel(token));

        clock.advance(Duration::from_secs(5));
        assert_eq!(scheduler.poll(at(&clock)), None);
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn rescheduling_replaces_previous_tick() {
        let clock = ManualClock::default();
        let mut scheduler = TickScheduler::new();
        let first = scheduler.schedule(at(&clock), TICK_INTERVAL);
        let second = scheduler.schedule(at(&clock), TICK_INTERVAL);

        assert_ne!(first, second);
        assert!(!scheduler.is_scheduled(first));
        assert!(scheduler.is_scheduled(second));
        assert!(!scheduler.cancel(first));

        clock.advance(TICK_INTERVAL);
        assert_eq!(scheduler.poll(at(&clock)), Some(second));
    }

    #[test]
    fn session_clock_tracks_elapsed_and_remaining() {
        let clock = ManualClock::default();
        let mut scheduler = TickScheduler::new();
        let mut session = SessionClock::new(15);

        assert_eq!(session.elapsed_secs(at(&clock)), 0.0);
        assert_eq!(session.remaining_secs(at(&clock)), 15);

        session.start(&mut scheduler, at(&clock));
        clock.advance(Duration::from_millis(2_700));

        assert!((session.elapsed_secs(at(&clock)) - 2.7).abs() < 1e-9);
        assert_eq!(session.remaining_secs(at(&clock)), 13);

        clock.advance(Duration::from_secs(60));
        assert_eq!(session.remaining_secs(at(&clock)), 0);
    }

    #[test]
    fn session_clock_stop_cancels_tick() {
        let clock = ManualClock::default();
        let mut scheduler = TickScheduler::new();
        let mut session = SessionClock::new(30);

        let token = session.start(&mut scheduler, at(&clock));
        assert!(session.owns(token));
        assert!(session.is_running());

        session.stop(&mut scheduler);
        assert!(!session.is_running());
        assert!(!scheduler.has_pending());
        assert!(session.started_at().is_some());
    }

    #[test]
    fn final_duration_is_capped_at_limit() {
        let clock = ManualClock::default();
        let mut scheduler = TickScheduler::new();
        let mut session = SessionClock::new(15);
        session.start(&mut scheduler, at(&clock));

        clock.advance(Duration::from_millis(7_250));
        assert!((session.final_duration_secs(at(&clock)) - 7.25).abs() < 1e-9);

        clock.advance(Duration::from_secs(20));
        assert_eq!(session.final_duration_secs(at(&clock)), 15.0);
    }

    #[test]
    fn final_duration_without_start_uses_full_limit() {
        let clock = ManualClock::default();
        let session = SessionClock::new(60);

        assert_eq!(session.final_duration_secs(at(&clock)), 60.0);
    }
}
