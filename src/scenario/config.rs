//! Scenario document model and validation
//!
//! This module defines the scenario document a session is played from: the
//! title, the handouts, the cast of characters, the endings keyed by the
//! voted character and the debriefing material. A scenario is parsed once,
//! validated, and then only ever read.

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::constants::scenario::{
    DEFAULT_ENDING_ID, MAIN_COMMENTARY_KEY, MAX_CHARACTER_COUNT, MAX_ID_LENGTH, MAX_TITLE_LENGTH,
};

use super::media::{Handout, ResourcePath};

type ValidationResult = garde::Result;

/// Errors that can occur while loading a scenario document
#[derive(Error, Debug)]
pub enum Error {
    /// The document is not valid JSON or does not have the scenario shape
    #[error("scenario document is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    /// The document parsed but breaks one of the scenario constraints
    #[error("scenario document is invalid: {0}")]
    Invalid(#[from] garde::Report),
}

/// Errors raised while resolving the ending for a vote
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EndingError {
    /// Neither an ending for the voted character nor a default ending exists
    #[error("no ending matches `{voted}` and the scenario has no default ending")]
    NoMatchingEnding {
        /// The voted character identifier
        voted: String,
    },
}

/// Whether a character is played by someone at the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CharacterKind {
    /// Player character: selectable and votable
    #[serde(rename = "PC")]
    Player,
    /// Non-player character: votable only
    #[serde(rename = "NPC")]
    NonPlayer,
}

/// A scoring goal handed to a player character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Goal {
    /// Description of the goal
    #[garde(length(min = 1))]
    pub text: String,
    /// Points scored when the goal is achieved
    #[garde(skip)]
    pub points: i64,
}

/// A member of the scenario's cast
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Unique identifier, referenced by endings and votes
    #[garde(length(min = 1, max = MAX_ID_LENGTH))]
    pub id: String,
    /// Display name
    #[garde(length(min = 1))]
    pub name: String,
    /// Player or non-player character
    #[serde(rename = "type")]
    #[garde(skip)]
    pub kind: CharacterKind,
    /// Short public profile shown on the selection screen
    #[serde(default)]
    #[garde(skip)]
    pub profile: String,
    /// Goals of the character, player characters only
    #[serde(default)]
    #[garde(dive)]
    pub goals: Vec<Goal>,
    /// Individual story handout, player characters only
    #[garde(dive)]
    pub story_file: Option<ResourcePath>,
    /// Map of the scene handed to this character
    #[garde(dive)]
    pub map_image_file: Option<ResourcePath>,
}

impl Character {
    /// Whether the character can be picked by a player
    pub fn is_player(&self) -> bool {
        self.kind == CharacterKind::Player
    }
}

/// An epilogue chosen by the outcome of the vote
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Ending {
    /// Character the table voted for, or the `"default"` sentinel
    #[garde(length(min = 1, max = MAX_ID_LENGTH))]
    pub voted_char_id: String,
    /// Text of the ending
    #[garde(dive)]
    pub ending_file: ResourcePath,
    /// Title shown above the ending text
    #[garde(skip)]
    pub title: String,
}

/// A titled piece of debriefing material
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DebriefingContent {
    /// Title shown on the selection button
    #[garde(length(min = 1))]
    pub title: String,
    /// Text of the material
    #[garde(dive)]
    pub file: ResourcePath,
}

/// Per-character epilogue revealed during the debriefing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DebriefingCharacterEnding {
    /// Identifier of the entry, usually the character identifier
    #[serde(default)]
    #[garde(skip)]
    pub id: String,
    /// Title shown on the selection button
    #[garde(length(min = 1))]
    pub title: String,
    /// Text of the epilogue
    #[garde(dive)]
    pub file: ResourcePath,
}

/// Material for the closing discussion
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Debriefing {
    /// The author's commentary on the case
    #[garde(dive)]
    pub main_commentary: DebriefingContent,
    /// Epilogues for each character
    #[serde(default)]
    #[garde(custom(validate_unique_epilogues), dive)]
    pub character_endings: Vec<DebriefingCharacterEnding>,
}

impl DebriefingCharacterEnding {
    /// Key the epilogue is selected by, its id or else its title
    pub fn key(&self) -> &str {
        if self.id.is_empty() {
            &self.title
        } else {
            &self.id
        }
    }
}

/// Rejects epilogues that could not be told apart from each other or from
/// the main commentary
#[allow(clippy::ptr_arg)]
fn validate_unique_epilogues(
    endings: &Vec<DebriefingCharacterEnding>,
    _ctx: &(),
) -> ValidationResult {
    match std::iter::once(MAIN_COMMENTARY_KEY)
        .chain(endings.iter().map(DebriefingCharacterEnding::key))
        .duplicates()
        .next()
    {
        Some(key) => Err(garde::Error::new(format!(
            "debriefing entry `{key}` is defined twice"
        ))),
        None => Ok(()),
    }
}

/// A complete scenario document
///
/// This is the immutable content of a session, loaded once at startup and
/// shared read-only by every screen.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Title of the scenario
    #[garde(length(chars, min = 1, max = MAX_TITLE_LENGTH))]
    title: String,
    /// Schedule of the session
    #[garde(dive)]
    schedule_file: ResourcePath,
    /// Synopsis read before picking characters
    #[garde(dive)]
    synopsis_file: ResourcePath,
    /// Information shared by every player
    #[garde(dive)]
    common_info: Handout,
    /// Information revealed between the two discussions
    #[garde(dive)]
    intermediate_info: Handout,
    /// The cast, in presentation order
    #[garde(length(max = MAX_CHARACTER_COUNT), custom(validate_unique_characters), dive)]
    characters: Vec<Character>,
    /// Endings keyed by voted character
    #[garde(custom(validate_unique_endings), dive)]
    endings: Vec<Ending>,
    /// Closing material
    #[garde(dive)]
    debriefing: Debriefing,
}

/// Rejects casts where two characters share an identifier
#[allow(clippy::ptr_arg)]
fn validate_unique_characters(characters: &Vec<Character>, _ctx: &()) -> ValidationResult {
    match characters.iter().map(|c| c.id.as_str()).duplicates().next() {
        Some(id) => Err(garde::Error::new(format!("character id `{id}` is used twice"))),
        None => Ok(()),
    }
}

/// Rejects scenarios with two endings for the same vote
#[allow(clippy::ptr_arg)]
fn validate_unique_endings(endings: &Vec<Ending>, _ctx: &()) -> ValidationResult {
    match endings
        .iter()
        .map(|e| e.voted_char_id.as_str())
        .duplicates()
        .next()
    {
        Some(id) => Err(garde::Error::new(format!("ending for `{id}` is defined twice"))),
        None => Ok(()),
    }
}

impl Scenario {
    /// Parses and validates a scenario document
    ///
    /// # Errors
    ///
    /// * `Error::Parse` - the text is not a scenario document
    /// * `Error::Invalid` - the document breaks a scenario constraint
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let scenario: Self = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Title of the scenario
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Schedule handout
    pub fn schedule_file(&self) -> &ResourcePath {
        &self.schedule_file
    }

    /// Synopsis handout
    pub fn synopsis_file(&self) -> &ResourcePath {
        &self.synopsis_file
    }

    /// Common information handout
    pub fn common_info(&self) -> &ResourcePath {
        &self.common_info.text_file
    }

    /// Intermediate information handout
    pub fn intermediate_info(&self) -> &ResourcePath {
        &self.intermediate_info.text_file
    }

    /// The whole cast in document order
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// All endings
    pub fn endings(&self) -> &[Ending] {
        &self.endings
    }

    /// Debriefing material
    pub fn debriefing(&self) -> &Debriefing {
        &self.debriefing
    }

    /// Looks a character up by identifier
    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Characters a player may pick, in document order
    pub fn player_characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter().filter(|c| c.is_player())
    }

    /// Voting candidates: player characters first, document order otherwise
    pub fn voting_order(&self) -> Vec<&Character> {
        self.characters.iter().sorted_by_key(|c| c.kind).collect_vec()
    }

    /// Picks the ending for a vote
    ///
    /// An ending keyed by the voted identifier wins; otherwise the ending keyed
    /// `"default"` is used.
    ///
    /// # Errors
    ///
    /// Returns `EndingError::NoMatchingEnding` when neither exists.
    pub fn resolve_ending(&self, voted: &str) -> Result<&Ending, EndingError> {
        self.endings
            .iter()
            .find(|e| e.voted_char_id == voted)
            .or_else(|| {
                self.endings
                    .iter()
                    .find(|e| e.voted_char_id == DEFAULT_ENDING_ID)
            })
            .ok_or_else(|| EndingError::NoMatchingEnding {
                voted: voted.to_owned(),
            })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SCENARIO_JSON: &str = r#"{
        "title": "The Last Train",
        "scheduleFile": "texts/schedule.txt",
        "synopsisFile": "texts/synopsis.txt",
        "commonInfo": { "textFile": "texts/common.txt" },
        "intermediateInfo": { "textFile": "texts/intermediate.txt" },
        "characters": [
            { "id": "victim", "name": "Victor", "type": "NPC", "profile": "Found dead" },
            {
                "id": "charA",
                "name": "Alice",
                "type": "PC",
                "profile": "A conductor",
                "goals": [{ "text": "Hide your debt", "points": 3 }],
                "storyFile": "texts/alice.txt",
                "mapImageFile": "images/map.png"
            },
            { "id": "charB", "name": "Bob", "type": "PC", "profile": "A passenger", "storyFile": "texts/bob.txt" },
            { "id": "charC", "name": "Carol", "type": "PC", "profile": "A cook" }
        ],
        "endings": [
            { "votedCharId": "charA", "endingFile": "texts/end_a.txt", "title": "Alice was arrested" },
            { "votedCharId": "default", "endingFile": "texts/end_default.txt", "title": "The culprit escaped" }
        ],
        "debriefing": {
            "mainCommentary": { "title": "Commentary", "file": "texts/commentary.txt" },
            "characterEndings": [
                { "id": "charA", "title": "Alice afterwards", "file": "texts/after_a.txt" },
                { "title": "Bob afterwards", "file": "texts/after_b.txt" }
            ]
        }
    }"#;

    pub(crate) fn sample_scenario() -> Scenario {
        Scenario::from_json(SCENARIO_JSON).unwrap()
    }

    #[test]
    fn test_sample_scenario_loads() {
        let scenario = sample_scenario();
        assert_eq!(scenario.title(), "The Last Train");
        assert_eq!(scenario.characters().len(), 4);
        assert_eq!(scenario.common_info().as_str(), "texts/common.txt");
        assert_eq!(scenario.intermediate_info().as_str(), "texts/intermediate.txt");
        assert_eq!(scenario.debriefing().character_endings.len(), 2);
    }

    #[test]
    fn test_optional_character_fields() {
        let scenario = sample_scenario();
        let carol = scenario.character("charC").unwrap();
        assert!(carol.goals.is_empty());
        assert!(carol.story_file.is_none());
        assert!(carol.map_image_file.is_none());

        let alice = scenario.character("charA").unwrap();
        assert_eq!(alice.goals[0].points, 3);
        assert_eq!(alice.map_image_file.as_ref().unwrap().as_str(), "images/map.png");
    }

    #[test]
    fn test_player_characters_exclude_npcs() {
        let scenario = sample_scenario();
        let ids = scenario.player_characters().map(|c| c.id.as_str()).collect_vec();
        assert_eq!(ids, ["charA", "charB", "charC"]);
    }

    #[test]
    fn test_voting_order_puts_npcs_last_and_is_stable() {
        let scenario = sample_scenario();
        let ids = scenario.voting_order().into_iter().map(|c| c.id.as_str()).collect_vec();
        assert_eq!(ids, ["charA", "charB", "charC", "victim"]);
    }

    #[test]
    fn test_resolve_exact_ending() {
        let scenario = sample_scenario();
        assert_eq!(scenario.resolve_ending("charA").unwrap().title, "Alice was arrested");
    }

    #[test]
    fn test_resolve_default_ending() {
        let scenario = sample_scenario();
        assert_eq!(scenario.resolve_ending("charZ").unwrap().title, "The culprit escaped");
    }

    #[test]
    fn test_resolve_without_default_is_an_error() {
        let json = SCENARIO_JSON.replace(r#""votedCharId": "default""#, r#""votedCharId": "charB""#);
        let scenario = Scenario::from_json(&json).unwrap();
        assert_eq!(
            scenario.resolve_ending("charY").unwrap_err(),
            EndingError::NoMatchingEnding {
                voted: "charY".to_owned()
            }
        );
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(Scenario::from_json("{"), Err(Error::Parse(_))));
        assert!(matches!(
            Scenario::from_json(r#"{"title": "x"}"#),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_character_kind_is_rejected() {
        let json = SCENARIO_JSON.replace(r#""type": "NPC""#, r#""type": "GM""#);
        assert!(matches!(Scenario::from_json(&json), Err(Error::Parse(_))));
    }

    #[test]
    fn test_duplicate_character_ids_are_invalid() {
        let json = SCENARIO_JSON.replace(r#""id": "charB""#, r#""id": "charA""#);
        assert!(matches!(Scenario::from_json(&json), Err(Error::Invalid(_))));
    }

    #[test]
    fn test_debriefing_entries_must_be_distinct() {
        let json = SCENARIO_JSON.replace(r#""id": "charA", "title""#, r#""id": "main", "title""#);
        assert!(matches!(Scenario::from_json(&json), Err(Error::Invalid(_))));

        let json = SCENARIO_JSON.replace(r#""title": "Bob afterwards""#, r#""title": "Alice afterwards""#);
        assert!(Scenario::from_json(&json).is_ok());

        let json = SCENARIO_JSON.replace(
            r#"{ "id": "charA", "title": "Alice afterwards""#,
            r#"{ "title": "Bob afterwards""#,
        );
        assert!(matches!(Scenario::from_json(&json), Err(Error::Invalid(_))));
    }

    #[test]
    fn test_duplicate_endings_are_invalid() {
        let json = SCENARIO_JSON.replace(r#""votedCharId": "default""#, r#""votedCharId": "charA""#);
        assert!(matches!(Scenario::from_json(&json), Err(Error::Invalid(_))));
    }

    #[test]
    fn test_empty_title_is_invalid() {
        let json = SCENARIO_JSON.replace(r#""title": "The Last Train""#, r#""title": """#);
        assert!(matches!(Scenario::from_json(&json), Err(Error::Invalid(_))));
    }

    #[test]
    fn test_empty_path_is_invalid() {
        let json = SCENARIO_JSON.replace("texts/bob.txt", "");
        assert!(matches!(Scenario::from_json(&json), Err(Error::Invalid(_))));
    }
}
