//! # Murder Mystery Session Library
//!
//! This library provides the session engine of a murder mystery facilitation
//! tool. It walks a table of players through a fixed sequence of screens,
//! from the attention splash to the debriefing, gating progress with a shared
//! reading timer, per-screen discussion timers and confirmation dialogs.
//!
//! The engine does no I/O of its own. A host feeds it user actions, the
//! alarms it asked for and the resources it asked to be fetched, and renders
//! the frames and updates it sends back.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]
use serde::{Deserialize, Serialize};

pub mod constants;

pub mod debriefing;
pub mod discussion;
pub mod game;
pub mod modal;
pub mod phase;
pub mod reading;
pub mod scenario;
pub mod screen;
pub mod session;
pub mod splash;
pub mod timer;
pub mod voting;

/// Messages carrying the complete session view
///
/// A sync message is sent after every structural change, so a host can
/// always redraw from the latest one alone.
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum SyncMessage {
    /// The full view of the session
    Frame(screen::Frame),
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Messages sent to update specific parts of the session view
///
/// Update messages are applied on top of the latest frame, such as a timer
/// tick or a handout that finished loading.
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum UpdateMessage {
    /// Session notices and outbound links
    Game(game::UpdateMessage),
    /// Countdown ticks
    Timer(timer::UpdateMessage),
    /// Fetch requests and their results
    Content(scenario::content::UpdateMessage),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Alarm messages for timed events
///
/// The host schedules these on the engine's behalf and hands them back when
/// they are due.
#[derive(Debug, Clone, Copy, derive_more::From, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Attention splash alarms
    Splash(splash::AlarmMessage),
    /// Countdown ticks
    Timer(timer::AlarmMessage),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::timer::Clock;

    #[test]
    fn test_alarm_round_trips_through_json() {
        let alarm: AlarmMessage = timer::AlarmMessage::Tick {
            clock: Clock::Reading,
            serial: 7,
        }
        .into();
        let json = serde_json::to_string(&alarm).unwrap();
        let back: AlarmMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            back,
            AlarmMessage::Timer(timer::AlarmMessage::Tick {
                clock: Clock::Reading,
                serial: 7
            })
        ));
    }

    #[test]
    fn test_update_message_is_tagged() {
        let message: UpdateMessage = game::UpdateMessage::Notice("pick someone".to_owned()).into();
        assert_eq!(message.to_message(), r#"{"Game":{"Notice":"pick someone"}}"#);
    }
}
