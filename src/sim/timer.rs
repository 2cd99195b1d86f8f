/// Scheduled state driven by the frame loop.
///
/// Nothing here spawns threads or callbacks. The owner calls `poll(now)` once
/// per frame and gets back whatever became due since the last call, so a
/// cancelled timer can never report a stray tick.
///
///   - `Countdown`        1 Hz countdown (freeze penalty)
///   - `OneShot`          single deadline (delayed screen transitions)
///   - `RollingCounter`   N events within a sliding window (secret unlock)

use std::time::{Duration, Instant};

// ══════════════════════════════════════════════════════════════
// Countdown
// ══════════════════════════════════════════════════════════════

/// What a `Countdown::poll` observed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CountdownPoll {
    /// Not running.
    Idle,
    /// Running, no whole period has elapsed since the last tick.
    Waiting,
    /// One or more periods elapsed; payload is the new remaining value.
    Ticked(u32),
    /// Reached zero during this poll. The countdown is now idle.
    Finished,
}

#[derive(Clone, Debug)]
pub struct Countdown {
    period: Duration,
    remaining: u32,
    /// Instant at which the next decrement is due. `None` = idle.
    next_due: Option<Instant>,
}

impl Countdown {
    pub fn new(period: Duration) -> Self {
        Countdown { period, remaining: 0, next_due: None }
    }

    /// Start counting down from `units`. Replaces any run in progress.
    pub fn start(&mut self, units: u32, now: Instant) {
        if units == 0 {
            self.cancel();
            return;
        }
        self.remaining = units;
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.remaining = 0;
        self.next_due = None;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Apply every decrement that fell due at or before `now`.
    /// Catches up if the frame loop stalled for several periods.
    pub fn poll(&mut self, now: Instant) -> CountdownPoll {
        let Some(mut due) = self.next_due else {
            return CountdownPoll::Idle;
        };

        let mut ticked = false;
        while now >= due && self.remaining > 0 {
            self.remaining -= 1;
            due += self.period;
            ticked = true;
        }

        if self.remaining == 0 {
            self.next_due = None;
            return CountdownPoll::Finished;
        }

        self.next_due = Some(due);
        if ticked {
            CountdownPoll::Ticked(self.remaining)
        } else {
            CountdownPoll::Waiting
        }
    }
}

// ══════════════════════════════════════════════════════════════
// OneShot
// ══════════════════════════════════════════════════════════════

/// A single cancellable deadline carrying a payload.
#[derive(Clone, Debug)]
pub struct OneShot<T> {
    pending: Option<(Instant, T)>,
}

impl<T> OneShot<T> {
    pub fn new() -> Self {
        OneShot { pending: None }
    }

    /// Schedule `payload` to fire after `delay`. Replaces anything pending.
    pub fn schedule(&mut self, payload: T, delay: Duration, now: Instant) {
        self.pending = Some((now + delay, payload));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the payload if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((at, _)) if now >= *at => self.pending.take().map(|(_, p)| p),
            _ => None,
        }
    }
}

impl<T> Default for OneShot<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ══════════════════════════════════════════════════════════════
// RollingCounter
// ══════════════════════════════════════════════════════════════

/// Fires once `threshold` events arrive with no gap longer than `window`
/// between consecutive events. Every event extends the window. After firing
/// the count starts over from zero.
#[derive(Clone, Debug)]
pub struct RollingCounter {
    threshold: u32,
    window: Duration,
    count: u32,
    last: Option<Instant>,
}

impl RollingCounter {
    pub fn new(threshold: u32, window: Duration) -> Self {
        RollingCounter { threshold: threshold.max(1), window, count: 0, last: None }
    }

    /// Record one event. Returns true when this event completes the gesture.
    pub fn record(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) >= self.window {
                self.count = 0;
            }
        }

        self.count += 1;
        self.last = Some(now);

        if self.count >= self.threshold {
            self.reset();
            true
        } else {
            false
        }
    }

    /// Events counted so far, as seen at `now` (an expired window reads as 0).
    #[cfg(test)]
    pub fn count_at(&self, now: Instant) -> u32 {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.window => self.count,
            _ => 0,
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.last = None;
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    // ── Countdown ──

    #[test]
    fn countdown_idle_until_started() {
        let mut c = Countdown::new(SEC);
        assert!(!c.is_active());
        assert_eq!(c.poll(Instant::now()), CountdownPoll::Idle);
    }

    #[test]
    fn countdown_ticks_once_per_period() {
        let t0 = Instant::now();
        let mut c = Countdown::new(SEC);
        c.start(3, t0);
        assert_eq!(c.poll(t0 + ms(500)), CountdownPoll::Waiting);
        assert_eq!(c.poll(t0 + SEC), CountdownPoll::Ticked(2));
        assert_eq!(c.poll(t0 + ms(1500)), CountdownPoll::Waiting);
        assert_eq!(c.poll(t0 + 2 * SEC), CountdownPoll::Ticked(1));
        assert_eq!(c.poll(t0 + 3 * SEC), CountdownPoll::Finished);
        assert!(!c.is_active());
        assert_eq!(c.poll(t0 + 4 * SEC), CountdownPoll::Idle);
    }

    #[test]
    fn countdown_catches_up_after_stall() {
        let t0 = Instant::now();
        let mut c = Countdown::new(SEC);
        c.start(10, t0);
        assert_eq!(c.poll(t0 + ms(4200)), CountdownPoll::Ticked(6));
        assert_eq!(c.remaining(), 6);
    }

    #[test]
    fn countdown_cancel_suppresses_further_ticks() {
        let t0 = Instant::now();
        let mut c = Countdown::new(SEC);
        c.start(5, t0);
        c.cancel();
        assert_eq!(c.poll(t0 + 10 * SEC), CountdownPoll::Idle);
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn countdown_restart_replaces_previous_run() {
        let t0 = Instant::now();
        let mut c = Countdown::new(SEC);
        c.start(5, t0);
        assert_eq!(c.poll(t0 + 3 * SEC), CountdownPoll::Ticked(2));
        c.start(5, t0 + 3 * SEC);
        assert_eq!(c.remaining(), 5);
        // The old schedule would have finished at t0+5s; the new one has not.
        assert_eq!(c.poll(t0 + 5 * SEC), CountdownPoll::Ticked(3));
    }

    // ── OneShot ──

    #[test]
    fn oneshot_fires_once_at_deadline() {
        let t0 = Instant::now();
        let mut o = OneShot::new();
        o.schedule("go", ms(800), t0);
        assert_eq!(o.poll(t0 + ms(799)), None);
        assert_eq!(o.poll(t0 + ms(800)), Some("go"));
        assert_eq!(o.poll(t0 + ms(2000)), None);
    }

    #[test]
    fn oneshot_cancel_drops_payload() {
        let t0 = Instant::now();
        let mut o = OneShot::new();
        o.schedule(1, ms(10), t0);
        o.cancel();
        assert!(!o.is_pending());
        assert_eq!(o.poll(t0 + SEC), None);
    }

    // ── RollingCounter ──

    #[test]
    fn rolling_fires_at_threshold_within_window() {
        let t0 = Instant::now();
        let mut r = RollingCounter::new(3, SEC);
        assert!(!r.record(t0));
        assert!(!r.record(t0 + ms(300)));
        assert!(r.record(t0 + ms(600)));
        assert_eq!(r.count_at(t0 + ms(600)), 0);
    }

    #[test]
    fn rolling_window_extends_on_each_event() {
        let t0 = Instant::now();
        let mut r = RollingCounter::new(3, SEC);
        assert!(!r.record(t0));
        assert!(!r.record(t0 + ms(900)));
        // 1.8s after the first press but only 0.9s after the second.
        assert!(r.record(t0 + ms(1800)));
    }

    #[test]
    fn rolling_resets_after_gap() {
        let t0 = Instant::now();
        let mut r = RollingCounter::new(3, SEC);
        r.record(t0);
        r.record(t0 + ms(200));
        assert!(!r.record(t0 + ms(1300)));
        assert_eq!(r.count_at(t0 + ms(1300)), 1);
    }

    #[test]
    fn rolling_starts_over_after_firing() {
        let t0 = Instant::now();
        let mut r = RollingCounter::new(2, SEC);
        r.record(t0);
        assert!(r.record(t0 + ms(100)));
        assert!(!r.record(t0 + ms(200)));
        assert!(r.record(t0 + ms(300)));
    }
}
