/// Freeze penalty: the input lockout that follows a wrong treasure guess.
///
/// One `Freeze` owns the one countdown, so two lockouts can never run at
/// the same time. Two secret gestures cut it short:
///   - unlock key pressed 3× within 1s (only counted while frozen)
///   - overlay tapped 5× within 2s

use std::time::{Duration, Instant};

use log::info;

use super::timer::{Countdown, CountdownPoll, RollingCounter};

pub const FREEZE_SECONDS: u32 = 180;
pub const KEY_UNLOCK_PRESSES: u32 = 3;
pub const KEY_UNLOCK_WINDOW: Duration = Duration::from_secs(1);
pub const TAP_UNLOCK_TAPS: u32 = 5;
pub const TAP_UNLOCK_WINDOW: Duration = Duration::from_secs(2);

/// Read-only view handed to the presentation layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FreezeState {
    pub remaining_seconds: u32,
    pub active: bool,
}

/// Which gesture ended a freeze early.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnlockChannel {
    Key,
    Tap,
}

/// Result of advancing the freeze clock.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FreezeTick {
    Remaining(u32),
    Expired,
}

#[derive(Clone, Debug)]
pub struct Freeze {
    countdown: Countdown,
    key_presses: RollingCounter,
    taps: RollingCounter,
}

impl Freeze {
    pub fn new() -> Self {
        Freeze {
            countdown: Countdown::new(Duration::from_secs(1)),
            key_presses: RollingCounter::new(KEY_UNLOCK_PRESSES, KEY_UNLOCK_WINDOW),
            taps: RollingCounter::new(TAP_UNLOCK_TAPS, TAP_UNLOCK_WINDOW),
        }
    }

    /// Begin a fresh 180s lockout, replacing any lockout in progress.
    pub fn start(&mut self, now: Instant) {
        self.countdown.start(FREEZE_SECONDS, now);
    }

    /// Drop the lockout without logging (screen teardown).
    pub fn cancel(&mut self) {
        self.countdown.cancel();
        self.key_presses.reset();
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.countdown.is_active()
    }

    #[inline]
    pub fn remaining_seconds(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn state(&self) -> FreezeState {
        FreezeState {
            remaining_seconds: self.remaining_seconds(),
            active: self.is_active(),
        }
    }

    /// Advance the countdown. `None` when nothing changed this frame.
    pub fn tick(&mut self, now: Instant) -> Option<FreezeTick> {
        match self.countdown.poll(now) {
            CountdownPoll::Idle | CountdownPoll::Waiting => None,
            CountdownPoll::Ticked(left) => Some(FreezeTick::Remaining(left)),
            CountdownPoll::Finished => {
                self.key_presses.reset();
                Some(FreezeTick::Expired)
            }
        }
    }

    /// One press of the unlock key. Ignored unless frozen.
    pub fn unlock_key(&mut self, now: Instant) -> Option<UnlockChannel> {
        if !self.is_active() {
            return None;
        }
        if self.key_presses.record(now) {
            self.unlock(UnlockChannel::Key);
            return Some(UnlockChannel::Key);
        }
        None
    }

    /// One tap on the freeze overlay.
    pub fn overlay_tap(&mut self, now: Instant) -> Option<UnlockChannel> {
        if self.taps.record(now) && self.is_active() {
            self.unlock(UnlockChannel::Tap);
            return Some(UnlockChannel::Tap);
        }
        None
    }

    fn unlock(&mut self, channel: UnlockChannel) {
        let left = self.remaining_seconds();
        self.countdown.cancel();
        self.key_presses.reset();
        info!("secret unlock via {:?} with {}s remaining", channel, left);
    }
}

impl Default for Freeze {
    fn default() -> Self {
        Self::new()
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn frozen_at(t0: Instant) -> Freeze {
        let mut f = Freeze::new();
        f.start(t0);
        f
    }

    #[test]
    fn start_gives_full_penalty() {
        let t0 = Instant::now();
        let f = frozen_at(t0);
        assert_eq!(f.state(), FreezeState { remaining_seconds: 180, active: true });
    }

    #[test]
    fn counts_down_to_expiry() {
        let t0 = Instant::now();
        let mut f = frozen_at(t0);
        assert_eq!(f.tick(t0 + ms(1000)), Some(FreezeTick::Remaining(179)));
        assert_eq!(f.tick(t0 + ms(1500)), None);
        assert_eq!(f.tick(t0 + Duration::from_secs(180)), Some(FreezeTick::Expired));
        assert!(!f.is_active());
        assert_eq!(f.tick(t0 + Duration::from_secs(200)), None);
    }

    #[test]
    fn three_key_presses_unlock_at_any_remaining_value() {
        for elapsed in [0u64, 1, 90, 178] {
            let t0 = Instant::now();
            let mut f = frozen_at(t0);
            let base = t0 + Duration::from_secs(elapsed);
            f.tick(base);
            assert_eq!(f.unlock_key(base), None);
            assert_eq!(f.unlock_key(base + ms(300)), None);
            assert_eq!(f.unlock_key(base + ms(600)), Some(UnlockChannel::Key));
            assert!(!f.is_active());
            assert_eq!(f.tick(base + Duration::from_secs(5)), None);
        }
    }

    #[test]
    fn slow_key_presses_do_not_unlock() {
        let t0 = Instant::now();
        let mut f = frozen_at(t0);
        f.unlock_key(t0);
        f.unlock_key(t0 + ms(1100));
        assert_eq!(f.unlock_key(t0 + ms(2200)), None);
        assert!(f.is_active());
    }

    #[test]
    fn key_presses_ignored_when_not_frozen() {
        let t0 = Instant::now();
        let mut f = Freeze::new();
        f.unlock_key(t0);
        f.unlock_key(t0 + ms(100));
        f.start(t0 + ms(200));
        // Presses before the freeze must not count toward the gesture.
        assert_eq!(f.unlock_key(t0 + ms(300)), None);
        assert!(f.is_active());
    }

    #[test]
    fn five_taps_unlock() {
        let t0 = Instant::now();
        let mut f = frozen_at(t0);
        for i in 0..4 {
            assert_eq!(f.overlay_tap(t0 + ms(i * 400)), None);
        }
        assert_eq!(f.overlay_tap(t0 + ms(1600)), Some(UnlockChannel::Tap));
        assert!(!f.is_active());
    }

    #[test]
    fn taps_with_long_gap_start_over() {
        let t0 = Instant::now();
        let mut f = frozen_at(t0);
        for i in 0..4 {
            f.overlay_tap(t0 + ms(i * 100));
        }
        assert_eq!(f.overlay_tap(t0 + ms(2500)), None);
        assert!(f.is_active());
    }

    #[test]
    fn taps_carry_across_expiry_into_next_freeze() {
        let t0 = Instant::now();
        let mut f = frozen_at(t0);
        for at in [178_500, 179_000, 179_500, 179_900] {
            assert_eq!(f.overlay_tap(t0 + ms(at)), None);
        }
        assert_eq!(f.tick(t0 + ms(180_000)), Some(FreezeTick::Expired));
        f.start(t0 + ms(180_500));
        assert_eq!(f.overlay_tap(t0 + ms(181_000)), Some(UnlockChannel::Tap));
        assert!(!f.is_active());
    }

    #[test]
    fn taps_carry_across_cancel() {
        let t0 = Instant::now();
        let mut f = frozen_at(t0);
        for i in 0..4 {
            f.overlay_tap(t0 + ms(i * 100));
        }
        f.cancel();
        f.start(t0 + ms(500));
        assert_eq!(f.overlay_tap(t0 + ms(600)), Some(UnlockChannel::Tap));
    }

    #[test]
    fn taps_never_unlock_when_not_frozen() {
        let t0 = Instant::now();
        let mut f = Freeze::new();
        for i in 0..5 {
            assert_eq!(f.overlay_tap(t0 + ms(i * 100)), None);
        }
        assert!(!f.is_active());
    }

    #[test]
    fn restart_replaces_running_freeze() {
        let t0 = Instant::now();
        let mut f = frozen_at(t0);
        f.tick(t0 + Duration::from_secs(100));
        assert_eq!(f.remaining_seconds(), 80);
        f.start(t0 + Duration::from_secs(100));
        assert_eq!(f.remaining_seconds(), 180);
    }
}
