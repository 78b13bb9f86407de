//! Countdown timers driven by scheduled alarms
//!
//! A countdown never owns a repeating timer. Instead it is armed with the
//! serial of exactly one pending one-second alarm, and only that alarm may
//! decrement it. Pausing, resetting or dropping the countdown disarms it, so
//! every alarm still in flight from an earlier chain is ignored when it
//! arrives. Two chains can never drive the same countdown.

use serde::{Deserialize, Serialize};

/// Identifies which countdown an alarm belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clock {
    /// The shared handout reading timer
    Reading,
    /// The timer of the mounted discussion screen
    Discussion,
}

/// Alarms scheduled by countdowns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// One second has passed for the countdown armed with `serial`
    Tick {
        /// Countdown the tick belongs to
        clock: Clock,
        /// Serial the countdown was armed with
        serial: u64,
    },
}

/// Countdown updates sent to the host on every tick
#[derive(Debug, Clone, Serialize)]
pub enum UpdateMessage {
    /// A countdown changed
    Tick {
        /// The countdown that changed
        clock: Clock,
        /// Its new state
        timer: TimerView,
    },
}

/// Display state of a countdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerView {
    /// Seconds left
    pub remaining: u64,
    /// Whether the countdown is running
    pub ticking: bool,
    /// Remaining time as `MM:SS`
    pub display: String,
}

/// Outcome of delivering a tick alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The alarm was not the one the countdown is armed with
    Stale,
    /// One second was taken off and the countdown keeps running
    Counting,
    /// The countdown just reached zero
    Expired,
}

/// Formats seconds as `MM:SS`, minutes are not capped at 59
pub fn format_time(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// A second-resolution countdown
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u64,
    ticking: bool,
    armed: Option<u64>,
}

impl Countdown {
    /// Creates a stopped countdown
    pub fn new(seconds: u64) -> Self {
        Self {
            remaining: seconds,
            ticking: false,
            armed: None,
        }
    }

    /// Seconds left
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Whether the countdown is running
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// Starts counting down
    ///
    /// # Returns
    ///
    /// `true` when the countdown started and is now armed with `serial`, in
    /// which case the caller must schedule the tick. Resuming a running
    /// countdown or one that is out of time does nothing.
    pub fn resume(&mut self, serial: u64) -> bool {
        if self.ticking || self.remaining == 0 {
            return false;
        }
        self.ticking = true;
        self.armed = Some(serial);
        true
    }

    /// Stops counting down, pending ticks become stale
    pub fn pause(&mut self) {
        self.ticking = false;
        self.armed = None;
    }

    /// Stops and sets a new remaining time
    pub fn reset(&mut self, seconds: u64) {
        self.pause();
        self.remaining = seconds;
    }

    /// Delivers a tick alarm
    ///
    /// A counting outcome leaves the countdown disarmed until the caller arms
    /// the next tick with [`Countdown::rearm`].
    pub fn tick(&mut self, serial: u64) -> TickOutcome {
        if !self.ticking || self.armed != Some(serial) {
            return TickOutcome::Stale;
        }
        self.armed = None;
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.ticking = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Counting
        }
    }

    /// Arms the next tick of a running countdown
    pub fn rearm(&mut self, serial: u64) -> bool {
        if !self.ticking || self.armed.is_some() {
            return false;
        }
        self.armed = Some(serial);
        true
    }

    /// Display state
    pub fn view(&self) -> TimerView {
        TimerView {
            remaining: self.remaining,
            ticking: self.ticking,
            display: format_time(self.remaining),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(600), "10:00");
        assert_eq!(format_time(437), "07:17");
        assert_eq!(format_time(5), "00:05");
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(6000), "100:00");
    }

    #[test]
    fn test_new_countdown_is_stopped() {
        let countdown = Countdown::new(600);
        assert_eq!(countdown.remaining(), 600);
        assert!(!countdown.is_ticking());
    }

    #[test]
    fn test_each_tick_takes_one_second() {
        let mut countdown = Countdown::new(3);
        assert!(countdown.resume(1));
        assert_eq!(countdown.tick(1), TickOutcome::Counting);
        assert_eq!(countdown.remaining(), 2);
        assert!(countdown.rearm(2));
        assert_eq!(countdown.tick(2), TickOutcome::Counting);
        assert!(countdown.rearm(3));
        assert_eq!(countdown.tick(3), TickOutcome::Expired);
        assert_eq!(countdown.remaining(), 0);
        assert!(!countdown.is_ticking());
    }

    #[test]
    fn test_expiry_fires_once() {
        let mut countdown = Countdown::new(1);
        countdown.resume(1);
        assert_eq!(countdown.tick(1), TickOutcome::Expired);
        assert_eq!(countdown.tick(1), TickOutcome::Stale);
        assert!(!countdown.resume(2));
        assert!(!countdown.rearm(2));
        assert_eq!(countdown.tick(2), TickOutcome::Stale);
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn test_resume_while_ticking_does_not_start_a_second_chain() {
        let mut countdown = Countdown::new(10);
        assert!(countdown.resume(1));
        assert!(!countdown.resume(2));
        assert_eq!(countdown.tick(2), TickOutcome::Stale);
        assert_eq!(countdown.tick(1), TickOutcome::Counting);
        assert_eq!(countdown.remaining(), 9);
    }

    #[test]
    fn test_rearm_requires_a_consumed_tick() {
        let mut countdown = Countdown::new(10);
        countdown.resume(1);
        assert!(!countdown.rearm(2));
        assert_eq!(countdown.tick(2), TickOutcome::Stale);
    }

    #[test]
    fn test_pause_makes_pending_tick_stale() {
        let mut countdown = Countdown::new(10);
        countdown.resume(1);
        countdown.pause();
        assert_eq!(countdown.tick(1), TickOutcome::Stale);
        assert_eq!(countdown.remaining(), 10);

        assert!(countdown.resume(2));
        assert_eq!(countdown.tick(1), TickOutcome::Stale);
        assert_eq!(countdown.tick(2), TickOutcome::Counting);
        assert_eq!(countdown.remaining(), 9);
    }

    #[test]
    fn test_reset_stops_and_restores() {
        let mut countdown = Countdown::new(10);
        countdown.resume(1);
        countdown.tick(1);
        countdown.reset(180);
        assert_eq!(countdown.remaining(), 180);
        assert!(!countdown.is_ticking());
        assert_eq!(countdown.tick(1), TickOutcome::Stale);
    }

    #[test]
    fn test_view() {
        let mut countdown = Countdown::new(437);
        countdown.resume(1);
        assert_eq!(
            countdown.view(),
            TimerView {
                remaining: 437,
                ticking: true,
                display: "07:17".to_owned(),
            }
        );
    }
}
