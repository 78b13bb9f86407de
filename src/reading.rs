//! The shared handout reading timer
//!
//! One reading timer lives for the whole session. It starts when the common
//! information is shown, keeps running while players read their own story,
//! and is stopped and restored to the full reading time when the first
//! discussion begins. When it runs out the table may extend it once.

use crate::{
    phase::ReadingTimerEdge,
    timer::{Countdown, TickOutcome, TimerView},
};

/// Reading timer with a single allowed extension
#[derive(Debug, Clone)]
pub struct ReadingTimer {
    countdown: Countdown,
    full: u64,
    extension: u64,
    extension_used: bool,
}

impl ReadingTimer {
    /// Creates a stopped reading timer
    ///
    /// # Arguments
    ///
    /// * `full` - Reading time in seconds
    /// * `extension` - Seconds granted by the one extension
    pub fn new(full: u64, extension: u64) -> Self {
        Self {
            countdown: Countdown::new(full),
            full,
            extension,
            extension_used: false,
        }
    }

    /// Applies the lifecycle edge of a phase being entered
    ///
    /// # Returns
    ///
    /// `true` when the timer started with `serial` and a tick must be
    /// scheduled.
    pub fn apply(&mut self, edge: ReadingTimerEdge, serial: u64) -> bool {
        match edge {
            ReadingTimerEdge::Start => self.countdown.resume(serial),
            ReadingTimerEdge::StopAndReset => {
                self.countdown.reset(self.full);
                self.extension_used = false;
                false
            }
            ReadingTimerEdge::Keep => false,
        }
    }

    /// Delivers a tick alarm
    pub fn tick(&mut self, serial: u64) -> TickOutcome {
        self.countdown.tick(serial)
    }

    /// Arms the next tick
    pub fn rearm(&mut self, serial: u64) -> bool {
        self.countdown.rearm(serial)
    }

    /// Whether the one extension is still available
    pub fn can_extend(&self) -> bool {
        !self.extension_used && self.countdown.remaining() == 0
    }

    /// Grants the extension and resumes counting
    ///
    /// # Returns
    ///
    /// `true` when the extension was granted and a tick armed with `serial`
    /// must be scheduled. Only an expired timer can be extended, and only once.
    pub fn extend(&mut self, serial: u64) -> bool {
        if !self.can_extend() {
            return false;
        }
        self.extension_used = true;
        self.countdown.reset(self.extension);
        self.countdown.resume(serial)
    }

    /// Whether the extension has been granted
    pub fn extension_used(&self) -> bool {
        self.extension_used
    }

    /// Seconds granted by the extension
    pub fn extension_seconds(&self) -> u64 {
        self.extension
    }

    /// Seconds left
    pub fn remaining(&self) -> u64 {
        self.countdown.remaining()
    }

    /// Whether the timer is running
    pub fn is_ticking(&self) -> bool {
        self.countdown.is_ticking()
    }

    /// Display state
    pub fn view(&self) -> TimerView {
        self.countdown.view()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn run_out(timer: &mut ReadingTimer, mut serial: u64) -> u64 {
        loop {
            match timer.tick(serial) {
                TickOutcome::Counting => {
                    serial += 1;
                    assert!(timer.rearm(serial));
                }
                TickOutcome::Expired => return serial,
                TickOutcome::Stale => panic!("tick {serial} should be armed"),
            }
        }
    }

    #[test]
    fn test_start_edge_starts_once() {
        let mut timer = ReadingTimer::new(600, 180);
        assert!(timer.apply(ReadingTimerEdge::Start, 1));
        assert!(!timer.apply(ReadingTimerEdge::Start, 2));
        assert!(timer.is_ticking());
        assert_eq!(timer.tick(2), TickOutcome::Stale);
    }

    #[test]
    fn test_keep_edge_does_nothing() {
        let mut timer = ReadingTimer::new(600, 180);
        timer.apply(ReadingTimerEdge::Start, 1);
        assert!(!timer.apply(ReadingTimerEdge::Keep, 2));
        assert!(timer.is_ticking());
        assert_eq!(timer.tick(1), TickOutcome::Counting);
    }

    #[test]
    fn test_stop_and_reset_edge() {
        let mut timer = ReadingTimer::new(600, 180);
        timer.apply(ReadingTimerEdge::Start, 1);
        timer.tick(1);
        assert_eq!(timer.remaining(), 599);
        assert!(!timer.apply(ReadingTimerEdge::StopAndReset, 2));
        assert_eq!(timer.remaining(), 600);
        assert!(!timer.is_ticking());
    }

    #[test]
    fn test_runs_out_after_full_time() {
        let mut timer = ReadingTimer::new(600, 180);
        timer.apply(ReadingTimerEdge::Start, 0);
        let last = run_out(&mut timer, 0);
        assert_eq!(last, 599);
        assert_eq!(timer.remaining(), 0);
        assert!(!timer.is_ticking());
        assert!(timer.can_extend());
    }

    #[test]
    fn test_extension_is_granted_once() {
        let mut timer = ReadingTimer::new(5, 3);
        timer.apply(ReadingTimerEdge::Start, 0);
        let serial = run_out(&mut timer, 0);

        assert!(timer.extend(serial + 1));
        assert_eq!(timer.remaining(), 3);
        assert!(timer.is_ticking());
        assert!(timer.extension_used());

        run_out(&mut timer, serial + 1);
        assert!(!timer.can_extend());
        assert!(!timer.extend(100));
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn test_cannot_extend_a_running_timer() {
        let mut timer = ReadingTimer::new(600, 180);
        timer.apply(ReadingTimerEdge::Start, 1);
        assert!(!timer.extend(2));
        assert_eq!(timer.remaining(), 600);
    }

    #[test]
    fn test_reset_restores_the_extension() {
        let mut timer = ReadingTimer::new(2, 1);
        timer.apply(ReadingTimerEdge::Start, 0);
        let serial = run_out(&mut timer, 0);
        timer.extend(serial + 1);
        timer.apply(ReadingTimerEdge::StopAndReset, 0);
        assert!(!timer.extension_used());
        assert_eq!(timer.remaining(), 2);
    }
}
