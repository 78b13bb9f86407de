//! Configuration constants for the murder mystery session engine
//!
//! This module contains the default timings, validation limits and fixed
//! labels used throughout the session so that every screen and timer works
//! from the same boundaries.

/// Default timings, all in seconds
pub mod timing {
    /// Handout reading time started on the common information screen
    pub const READING_TIME: u64 = 600;
    /// Extra reading time granted once when the reading timer runs out
    pub const READING_EXTENSION: u64 = 180;
    /// Length of the first discussion phase
    pub const FIRST_DISCUSSION: u64 = 600;
    /// Length of the second discussion phase
    pub const SECOND_DISCUSSION: u64 = 600;
    /// Delay before the attention splash starts fading out
    pub const SPLASH_FADE_OUT: u64 = 4;
    /// Delay before the attention splash advances to the start screen
    pub const SPLASH_ADVANCE: u64 = 6;
    /// Interval between two countdown ticks
    pub const TICK: u64 = 1;
}

/// Bounds accepted for configurable timings, all in seconds
pub mod bounds {
    /// Shortest reading or discussion time
    pub const MIN_PHASE_TIME: u64 = 10;
    /// Longest reading or discussion time
    pub const MAX_PHASE_TIME: u64 = 3 * 60 * 60;
    /// Shortest reading extension
    pub const MIN_EXTENSION: u64 = 10;
    /// Longest reading extension
    pub const MAX_EXTENSION: u64 = 60 * 60;
    /// Longest splash delay
    pub const MAX_SPLASH: u64 = 60;
}

/// Scenario document limits
pub mod scenario {
    /// Maximum length of the scenario title in characters
    pub const MAX_TITLE_LENGTH: usize = 200;
    /// Maximum number of characters in a scenario
    pub const MAX_CHARACTER_COUNT: usize = 64;
    /// Maximum length of a character or ending identifier
    pub const MAX_ID_LENGTH: usize = 64;
    /// Maximum length of a resource path
    pub const MAX_PATH_LENGTH: usize = 512;
    /// Identifier of the ending used when no ending matches the vote
    pub const DEFAULT_ENDING_ID: &str = "default";
    /// Key of the main commentary on the debriefing screen
    pub const MAIN_COMMENTARY_KEY: &str = "main";
}

/// Fixed labels shown on dialogs
pub mod labels {
    /// Default confirm button label
    pub const CONFIRM: &str = "YES";
    /// Default cancel button label
    pub const CANCEL: &str = "NO";
    /// Acknowledge label used by notifications
    pub const ACKNOWLEDGE: &str = "OK";
}

/// Outbound share link configuration
pub mod share {
    /// Endpoint receiving the share text
    pub const INTENT_URL: &str = "https://twitter.com/intent/tweet";
    /// Hashtags attached to every share text by default
    pub const HASHTAGS: [&str; 2] = ["マダミス", "マーダーミステリー"];
    /// Maximum number of configured hashtags
    pub const MAX_HASHTAG_COUNT: usize = 8;
    /// Maximum length of a configured hashtag in characters
    pub const MAX_HASHTAG_LENGTH: usize = 64;
}
