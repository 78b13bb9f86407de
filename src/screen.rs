//! Views sent to the host
//!
//! A frame is everything the host needs to draw the session: the current
//! phase, the screen for it, the reading timer overlay when it is shown and
//! the open dialog, if any.

use serde::Serialize;
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::{
    debriefing::EntryView,
    discussion::{Controls, Discussion, TabLabel},
    modal::ModalView,
    phase::Phase,
    scenario::{
        config::Goal,
        content::{ContentTicket, ContentView},
    },
    timer::TimerView,
    voting::Candidate,
};

/// Session state errors shown in place of a screen
///
/// Apart from a missing story, which only replaces the story text, none of
/// these can be recovered from inside the session; the players have to start
/// over.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionFault {
    /// A character dependent phase was reached without a character
    #[error("No character has been selected. If the page was reloaded, please start over.")]
    NoCharacterSelected,
    /// The selected character is not part of the scenario
    #[error("The selected character could not be found.")]
    CharacterNotFound,
    /// The selected character has no individual story, shown in the story slot
    #[error("There is no story for this character.")]
    NoStory,
    /// The ending was reached without a vote
    #[error("There is no voting result.")]
    NoVote,
    /// The scenario has neither a matching nor a default ending
    #[error("No matching ending could be found.")]
    NoMatchingEnding,
}

/// Headings of the plain handout screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum InfoHeading {
    /// Session schedule
    #[display("Schedule")]
    Schedule,
    /// Synopsis
    #[display("Synopsis")]
    Synopsis,
    /// Common information handout
    #[display("Handout: Common Info")]
    CommonInfo,
    /// Intermediate information handout
    #[display("Intermediate Info")]
    Interlude,
}

/// A character as shown on the selection screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterCard {
    /// Identifier to pick the character with
    pub id: String,
    /// Name
    pub name: String,
    /// Public profile
    pub profile: String,
}

/// A handout tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabView {
    /// What the tab holds
    pub label: TabLabel,
    /// Fetch of the tab's text
    pub ticket: Option<ContentTicket>,
    /// The tab's text
    pub content: ContentView,
}

/// What the host draws for the current phase
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Screen {
    /// Attention splash
    Attention {
        /// Whether the fade out has started
        fading_out: bool,
    },
    /// The scenario has not been loaded yet
    Loading,
    /// Title screen
    Start {
        /// Scenario title
        title: String,
    },
    /// A handout with navigation buttons
    Info {
        /// Heading
        heading: InfoHeading,
        /// Handout text
        content: ContentView,
        /// Whether a BACK button is shown
        can_go_back: bool,
    },
    /// Player character selection
    CharacterSelect {
        /// Selectable characters
        characters: Vec<CharacterCard>,
    },
    /// The picked character's own story
    IndividualStory {
        /// Character name
        name: String,
        /// Story text
        story: ContentView,
        /// Goals of the character
        goals: Vec<Goal>,
        /// Map image path
        map_image: Option<String>,
    },
    /// A timed discussion
    Discussion {
        /// Which round
        round: Discussion,
        /// Heading
        title: String,
        /// Goals of the character
        goals: Vec<Goal>,
        /// Map image path
        map_image: Option<String>,
        /// Handout tabs
        tabs: Vec<TabView>,
        /// Index of the active tab
        active_tab: usize,
        /// Discussion countdown
        timer: TimerView,
        /// Controls offered under the timer
        controls: Controls,
    },
    /// The vote
    Voting {
        /// Candidates in ballot order
        candidates: Vec<Candidate>,
        /// Selected candidate id
        selected: Option<String>,
    },
    /// The ending matching the vote
    Ending {
        /// Ending title
        title: String,
        /// Ending text
        content: ContentView,
    },
    /// Commentary and epilogues
    Debriefing {
        /// Selectable material
        entries: Vec<EntryView>,
        /// Key of the shown entry
        active: Option<String>,
        /// Text of the shown entry
        content: Option<ContentView>,
    },
    /// A terminal session error
    Fault {
        /// What went wrong
        fault: SessionFault,
        /// Message to show
        message: String,
    },
}

impl From<SessionFault> for Screen {
    fn from(fault: SessionFault) -> Self {
        Screen::Fault {
            fault,
            message: fault.to_string(),
        }
    }
}

/// A complete view of the session
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Current phase
    pub phase: Phase,
    /// Screen of the phase
    pub screen: Screen,
    /// Reading timer overlay, on the reading phases only
    pub reading_timer: Option<TimerView>,
    /// The open dialog
    pub modal: Option<ModalView>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_fault_screen_carries_message() {
        let screen = Screen::from(SessionFault::NoMatchingEnding);
        assert_eq!(
            screen,
            Screen::Fault {
                fault: SessionFault::NoMatchingEnding,
                message: "No matching ending could be found.".to_owned(),
            }
        );
    }

    #[test]
    fn test_frame_skips_missing_overlays() {
        let frame = Frame {
            phase: Phase::Start,
            screen: Screen::Start {
                title: "The Last Train".to_owned(),
            },
            reading_timer: None,
            modal: None,
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains(r#""phase":"start""#));
        assert!(!json.contains("reading_timer"));
        assert!(!json.contains("modal"));
    }

    #[test]
    fn test_info_headings() {
        assert_eq!(InfoHeading::CommonInfo.to_string(), "Handout: Common Info");
        assert_eq!(InfoHeading::Interlude.to_string(), "Intermediate Info");
    }
}
