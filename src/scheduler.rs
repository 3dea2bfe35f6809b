//! Fixed-interval step scheduling for a cooperative, single-threaded host loop.
//!
//! The scheduler never sleeps and never calls into the machine itself. The host asks it
//! when the next step is due ([`Scheduler::next_deadline`]), polls it with the current
//! time, and dispatches the returned [`Tick`]. Each tick carries the generation of the
//! `start` that armed it; `stop` bumps the generation, so a tick that was already handed
//! out but not yet dispatched is recognised as stale and has no effect.

use std::time::{Duration, Instant};
use tracing::trace;

/// A fired timer slot, valid until the next `start` or `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    generation: u64,
    due: Instant,
}

impl Tick {
    /// When the tick was scheduled to fire.
    pub fn due(&self) -> Instant {
        self.due
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
    /// When the current period began: the `start` time or the last fired tick.
    anchor: Option<Instant>,
    generation: u64,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            anchor: None,
            generation: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    /// Arms the timer so the first tick is due one interval after `now`.
    /// Any previously armed timer is cancelled first.
    pub fn start(&mut self, interval: Duration, now: Instant) {
        self.stop();
        self.interval = interval;
        self.anchor = Some(now);
        trace!(generation = self.generation, ?interval, "scheduler started");
    }

    /// Cancels the timer. Ticks handed out before this call become stale. Idempotent.
    pub fn stop(&mut self) {
        if self.anchor.take().is_some() {
            self.generation += 1;
            trace!(generation = self.generation, "scheduler stopped");
        }
    }

    /// Changes the interval. While active, the next tick is due one new interval after
    /// the last tick (or the start), so no step is skipped or fired twice.
    pub fn reschedule(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// When the next tick is due, if the timer is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.anchor.map(|anchor| anchor + self.interval)
    }

    /// Time left until the next tick, saturating at zero.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Returns a tick if one is due at `now` and re-arms for the following period.
    ///
    /// At most one tick is returned per call, however late the poll is.
    pub fn poll(&mut self, now: Instant) -> Option<Tick> {
        let due = self.next_deadline()?;
        if now < due {
            return None;
        }

        self.anchor = Some(now);
        Some(Tick {
            generation: self.generation,
            due,
        })
    }

    /// Whether `tick` came from the currently armed timer.
    pub fn is_current(&self, tick: &Tick) -> bool {
        self.is_active() && tick.generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(100);

    #[test]
    fn test_not_due_before_interval() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new(INTERVAL);
        scheduler.start(INTERVAL, now);

        assert!(scheduler.is_active());
        assert_eq!(scheduler.next_deadline(), Some(now + INTERVAL));
        assert_eq!(scheduler.poll(now + Duration::from_millis(99)), None);
        assert!(scheduler.poll(now + INTERVAL).is_some());
    }

    #[test]
    fn test_inactive_scheduler_never_fires() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new(INTERVAL);

        assert_eq!(scheduler.next_deadline(), None);
        assert_eq!(scheduler.poll(now + Duration::from_secs(10)), None);
    }

    #[test]
    fn test_late_poll_fires_once() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new(INTERVAL);
        scheduler.start(INTERVAL, now);

        let late = now + Duration::from_secs(5);
        assert!(scheduler.poll(late).is_some());
        assert_eq!(scheduler.poll(late), None);
        assert_eq!(scheduler.next_deadline(), Some(late + INTERVAL));
    }

    #[test]
    fn test_stop_makes_pending_tick_stale() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new(INTERVAL);
        scheduler.start(INTERVAL, now);

        let tick = scheduler.poll(now + INTERVAL).unwrap();
        assert!(scheduler.is_current(&tick));

        scheduler.stop();
        assert!(!scheduler.is_current(&tick));

        // A restart does not revive the old tick either.
        scheduler.start(INTERVAL, now + INTERVAL);
        assert!(!scheduler.is_current(&tick));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut scheduler = Scheduler::new(INTERVAL);
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_active());

        scheduler.start(INTERVAL, Instant::now());
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_active());
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn test_reschedule_applies_from_last_tick() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new(INTERVAL);
        scheduler.start(INTERVAL, now);

        let first = now + INTERVAL;
        scheduler.poll(first).unwrap();

        scheduler.reschedule(Duration::from_millis(300));
        assert_eq!(scheduler.interval(), Duration::from_millis(300));
        assert_eq!(
            scheduler.next_deadline(),
            Some(first + Duration::from_millis(300))
        );
        assert_eq!(scheduler.poll(first + Duration::from_millis(200)), None);
        assert!(scheduler.poll(first + Duration::from_millis(300)).is_some());
    }

    #[test]
    fn test_time_until_due_saturates() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new(INTERVAL);
        scheduler.start(INTERVAL, now);

        assert_eq!(scheduler.time_until_due(now), Some(INTERVAL));
        assert_eq!(
            scheduler.time_until_due(now + Duration::from_secs(1)),
            Some(Duration::ZERO)
        );
    }
}
