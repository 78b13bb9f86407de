//! Attention splash
//!
//! The session opens on a splash reminding players to join their voice call.
//! It fades out and then moves on to the title screen by itself.

use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Alarms scheduled by the splash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Start fading the splash out
    FadeOut {
        /// Serial of the splash mount that scheduled the alarm
        serial: u64,
    },
    /// Move on to the title screen
    Advance {
        /// Serial of the splash mount that scheduled the alarm
        serial: u64,
    },
}

/// What a splash alarm means for the mounted splash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplashOutcome {
    /// The alarm belongs to an earlier mount
    Stale,
    /// The splash started fading out
    FadedOut,
    /// The splash is done
    Advance,
}

/// State of a mounted splash
#[derive(Debug, Clone)]
pub struct Splash {
    serial: u64,
    fading_out: bool,
}

impl Splash {
    /// Mounts the splash and schedules its two alarms
    ///
    /// # Arguments
    ///
    /// * `serial` - Serial tagging this mount's alarms
    /// * `fade_out` - Delay before fading out
    /// * `advance` - Delay before moving on
    /// * `schedule_message` - Function to schedule delayed messages
    pub fn mount<S: FnMut(crate::AlarmMessage, Duration)>(
        serial: u64,
        fade_out: Duration,
        advance: Duration,
        mut schedule_message: S,
    ) -> Self {
        schedule_message(AlarmMessage::FadeOut { serial }.into(), fade_out);
        schedule_message(AlarmMessage::Advance { serial }.into(), advance);
        Self {
            serial,
            fading_out: false,
        }
    }

    /// Whether the splash is fading out
    pub fn is_fading_out(&self) -> bool {
        self.fading_out
    }

    /// Delivers a splash alarm
    pub fn receive(&mut self, alarm: AlarmMessage) -> SplashOutcome {
        match alarm {
            AlarmMessage::FadeOut { serial } if serial == self.serial && !self.fading_out => {
                self.fading_out = true;
                SplashOutcome::FadedOut
            }
            AlarmMessage::Advance { serial } if serial == self.serial => SplashOutcome::Advance,
            _ => SplashOutcome::Stale,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_mount_schedules_fade_then_advance() {
        let mut scheduled = Vec::new();
        let splash = Splash::mount(
            3,
            Duration::from_secs(4),
            Duration::from_secs(6),
            |alarm, delay| scheduled.push((alarm, delay)),
        );
        assert!(!splash.is_fading_out());
        assert_eq!(scheduled.len(), 2);
        assert!(matches!(
            scheduled[0],
            (
                crate::AlarmMessage::Splash(AlarmMessage::FadeOut { serial: 3 }),
                d
            ) if d == Duration::from_secs(4)
        ));
        assert!(matches!(
            scheduled[1],
            (
                crate::AlarmMessage::Splash(AlarmMessage::Advance { serial: 3 }),
                d
            ) if d == Duration::from_secs(6)
        ));
    }

    #[test]
    fn test_alarms() {
        let mut splash = Splash::mount(3, Duration::ZERO, Duration::ZERO, |_, _| {});
        assert_eq!(
            splash.receive(AlarmMessage::FadeOut { serial: 2 }),
            SplashOutcome::Stale
        );
        assert_eq!(
            splash.receive(AlarmMessage::FadeOut { serial: 3 }),
            SplashOutcome::FadedOut
        );
        assert!(splash.is_fading_out());
        assert_eq!(
            splash.receive(AlarmMessage::FadeOut { serial: 3 }),
            SplashOutcome::Stale
        );
        assert_eq!(
            splash.receive(AlarmMessage::Advance { serial: 9 }),
            SplashOutcome::Stale
        );
        assert_eq!(
            splash.receive(AlarmMessage::Advance { serial: 3 }),
            SplashOutcome::Advance
        );
    }
}
