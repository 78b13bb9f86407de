//! Session phases and the transition table
//!
//! A session walks through a fixed, linear list of phases. Every phase knows
//! where its forward and backward edges lead, what kind of user action is
//! allowed to take the forward edge, and what has to be in place before it
//! can be shown.

use std::{fmt::Display, str::FromStr};

use enum_map::{Enum, EnumMap, enum_map};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::discussion::Discussion;

/// One stage of the session, in play order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Enum, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Splash asking players to join a voice call
    #[default]
    Attention,
    /// Title screen
    Start,
    /// Session schedule
    Schedule,
    /// Synopsis of the case
    Synopsis,
    /// Every player picks a character
    CharacterSelect,
    /// Reading the common handout, the reading timer starts here
    CommonInfo,
    /// Reading the picked character's own story
    IndividualStory,
    /// First timed discussion
    FirstDiscussion,
    /// Intermediate information revealed between discussions
    Interlude,
    /// Second timed discussion
    SecondDiscussion,
    /// The table votes for the culprit
    Voting,
    /// The ending matching the vote
    Ending,
    /// Commentary and per-character epilogues
    Debriefing,
}

/// What kind of action takes a phase's forward edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// The splash alarm advances on its own
    Splash,
    /// A plain NEXT button
    Button,
    /// Confirming the character pick
    CharacterConfirmation,
    /// Acknowledging the end of the discussion timer
    TimeUpConfirmation,
    /// Confirming the vote
    VoteConfirmation,
    /// No forward edge
    Terminal,
}

/// What entering a phase does to the reading timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingTimerEdge {
    /// Start ticking, unless already ticking or out of time
    Start,
    /// Stop ticking and restore the full reading time
    StopAndReset,
    /// Leave the timer as it is
    Keep,
}

/// Error for phase names that do not exist
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown phase `{0}`")]
pub struct UnknownPhase(String);

impl Phase {
    /// Every phase in play order
    pub const ALL: [Phase; 13] = [
        Phase::Attention,
        Phase::Start,
        Phase::Schedule,
        Phase::Synopsis,
        Phase::CharacterSelect,
        Phase::CommonInfo,
        Phase::IndividualStory,
        Phase::FirstDiscussion,
        Phase::Interlude,
        Phase::SecondDiscussion,
        Phase::Voting,
        Phase::Ending,
        Phase::Debriefing,
    ];

    /// Name used on the wire and in logs
    pub fn name(self) -> &'static str {
        match self {
            Phase::Attention => "attention",
            Phase::Start => "start",
            Phase::Schedule => "schedule",
            Phase::Synopsis => "synopsis",
            Phase::CharacterSelect => "characterSelect",
            Phase::CommonInfo => "commonInfo",
            Phase::IndividualStory => "individualStory",
            Phase::FirstDiscussion => "firstDiscussion",
            Phase::Interlude => "interlude",
            Phase::SecondDiscussion => "secondDiscussion",
            Phase::Voting => "voting",
            Phase::Ending => "ending",
            Phase::Debriefing => "debriefing",
        }
    }

    /// Parses a phase name, falling back to the splash for unknown names
    pub fn from_name_lossy(name: &str) -> Self {
        name.parse().unwrap_or_else(|e: UnknownPhase| {
            log::warn!("{e}, falling back to {}", Phase::Attention);
            Phase::Attention
        })
    }

    /// Target of the forward edge
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Attention => Some(Phase::Start),
            Phase::Start => Some(Phase::Schedule),
            Phase::Schedule => Some(Phase::Synopsis),
            Phase::Synopsis => Some(Phase::CharacterSelect),
            Phase::CharacterSelect => Some(Phase::CommonInfo),
            Phase::CommonInfo => Some(Phase::IndividualStory),
            Phase::IndividualStory => Some(Phase::FirstDiscussion),
            Phase::FirstDiscussion => Some(Phase::Interlude),
            Phase::Interlude => Some(Phase::SecondDiscussion),
            Phase::SecondDiscussion => Some(Phase::Voting),
            Phase::Voting => Some(Phase::Ending),
            Phase::Ending => Some(Phase::Debriefing),
            Phase::Debriefing => None,
        }
    }

    /// Target of the backward edge, for the screens that have a BACK button
    pub fn back(self) -> Option<Phase> {
        match self {
            Phase::Synopsis => Some(Phase::Schedule),
            Phase::CharacterSelect => Some(Phase::Synopsis),
            Phase::IndividualStory => Some(Phase::CommonInfo),
            _ => None,
        }
    }

    /// The action that takes the forward edge
    pub fn gate(self) -> Gate {
        match self {
            Phase::Attention => Gate::Splash,
            Phase::CharacterSelect => Gate::CharacterConfirmation,
            Phase::FirstDiscussion | Phase::SecondDiscussion => Gate::TimeUpConfirmation,
            Phase::Voting => Gate::VoteConfirmation,
            Phase::Debriefing => Gate::Terminal,
            Phase::Start
            | Phase::Schedule
            | Phase::Synopsis
            | Phase::CommonInfo
            | Phase::IndividualStory
            | Phase::Interlude
            | Phase::Ending => Gate::Button,
        }
    }

    /// Whether the scenario must be loaded before the phase can be shown
    pub fn requires_scenario(self) -> bool {
        self != Phase::Attention
    }

    /// Whether a character must have been picked before the phase can be shown
    pub fn requires_character(self) -> bool {
        matches!(
            self,
            Phase::IndividualStory
                | Phase::FirstDiscussion
                | Phase::SecondDiscussion
                | Phase::Voting
                | Phase::Ending
                | Phase::Debriefing
        )
    }

    /// Whether the shared reading timer is displayed during the phase
    pub fn shows_reading_timer(self) -> bool {
        matches!(self, Phase::CommonInfo | Phase::IndividualStory)
    }

    /// The discussion round held during the phase
    pub fn discussion(self) -> Option<Discussion> {
        match self {
            Phase::FirstDiscussion => Some(Discussion::First),
            Phase::SecondDiscussion => Some(Discussion::Second),
            _ => None,
        }
    }

    /// Reading timer lifecycle, keyed by the phase being entered
    pub fn reading_timer_table() -> EnumMap<Phase, ReadingTimerEdge> {
        enum_map! {
            Phase::CommonInfo => ReadingTimerEdge::Start,
            Phase::FirstDiscussion => ReadingTimerEdge::StopAndReset,
            _ => ReadingTimerEdge::Keep,
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.name() == s)
            .ok_or_else(|| UnknownPhase(s.to_owned()))
    }
}

impl<'de> Deserialize<'de> for Phase {
    /// Deserializes a phase name, unknown names become `Attention`
    fn deserialize<D>(deserializer: D) -> Result<Phase, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Phase::from_name_lossy(&s))
    }
}
