//! Debriefing screen
//!
//! After the ending the table reads the author's commentary and every
//! character's epilogue, one at a time, and may share the session on social
//! media.

use itertools::Itertools;
use serde::Serialize;
use url::Url;

use crate::{
    constants::{scenario::MAIN_COMMENTARY_KEY, share::INTENT_URL},
    scenario::{
        Scenario,
        content::{ContentTicket, Contents},
        media::ResourcePath,
    },
};

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    title: String,
    file: ResourcePath,
}

/// A selectable piece of debriefing material
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    /// Key to select the entry with
    pub key: String,
    /// Button title
    pub title: String,
}

/// State of a mounted debriefing screen
#[derive(Debug, Clone)]
pub struct DebriefingBoard {
    entries: Vec<Entry>,
    active: Option<(usize, ContentTicket)>,
}

impl DebriefingBoard {
    /// Lists the commentary first, then the character epilogues
    ///
    /// Epilogues without an id are keyed by their title.
    pub fn new(scenario: &Scenario) -> Self {
        let debriefing = scenario.debriefing();
        let main = Entry {
            key: MAIN_COMMENTARY_KEY.to_owned(),
            title: debriefing.main_commentary.title.clone(),
            file: debriefing.main_commentary.file.clone(),
        };
        let entries = std::iter::once(main)
            .chain(debriefing.character_endings.iter().map(|ending| Entry {
                key: ending.key().to_owned(),
                title: ending.title.clone(),
                file: ending.file.clone(),
            }))
            .collect_vec();
        Self {
            entries,
            active: None,
        }
    }

    /// Shows an entry, requesting its text
    ///
    /// The previously shown entry's fetch is released so its late result is
    /// dropped. Selecting the shown entry again does nothing.
    ///
    /// # Returns
    ///
    /// `true` when the shown entry changed.
    pub fn select(&mut self, key: &str, contents: &mut Contents) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.key == key) else {
            return false;
        };
        if let Some((active, ticket)) = self.active {
            if active == index {
                return false;
            }
            contents.release(ticket);
        }
        let ticket = contents.request(&self.entries[index].file);
        self.active = Some((index, ticket));
        true
    }

    /// All entries
    pub fn entries(&self) -> Vec<EntryView> {
        self.entries
            .iter()
            .map(|e| EntryView {
                key: e.key.clone(),
                title: e.title.clone(),
            })
            .collect_vec()
    }

    /// Key of the shown entry
    pub fn active_key(&self) -> Option<&str> {
        self.active
            .map(|(index, _)| self.entries[index].key.as_str())
    }

    /// Fetch of the shown entry's text
    pub fn active_ticket(&self) -> Option<ContentTicket> {
        self.active.map(|(_, ticket)| ticket)
    }
}

/// Builds the share link announcing the finished session
///
/// The text names the scenario and ends with the hashtags followed by the
/// title as a hashtag, whitespace removed.
///
/// # Errors
///
/// Returns a `url::ParseError` if the intent endpoint cannot be parsed.
pub fn share_url(title: &str, hashtags: &[String]) -> Result<Url, url::ParseError> {
    let tags = hashtags.iter().map(|tag| format!("#{tag}")).join(" ");
    let title_tag: String = title.chars().filter(|c| !c.is_whitespace()).collect();
    let text = format!("I played the murder mystery \u{300e}{title}\u{300f}!\n\n{tags}\n#{title_tag}");
    Url::parse_with_params(INTENT_URL, &[("text", text)])
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::scenario::config::tests::sample_scenario;

    #[test]
    fn test_entries_order_and_keys() {
        let board = DebriefingBoard::new(&sample_scenario());
        let keys = board.entries().into_iter().map(|e| e.key).collect_vec();
        assert_eq!(keys, ["main", "charA", "Bob afterwards"]);
        assert!(board.active_key().is_none());
    }

    #[test]
    fn test_select_requests_text() {
        let mut board = DebriefingBoard::new(&sample_scenario());
        let mut contents = Contents::default();
        assert!(board.select("main", &mut contents));
        assert_eq!(board.active_key(), Some("main"));
        assert_eq!(contents.len(), 1);
        assert!(!board.select("main", &mut contents));
        assert!(!board.select("missing", &mut contents));
        assert_eq!(contents.len(), 1);
    }

    #[test]
    fn test_switching_releases_previous_fetch() {
        let mut board = DebriefingBoard::new(&sample_scenario());
        let mut contents = Contents::default();
        board.select("main", &mut contents);
        let first = board.active_ticket().unwrap();
        board.select("charA", &mut contents);
        let second = board.active_ticket().unwrap();

        assert_ne!(first, second);
        assert_eq!(contents.len(), 1);
        assert!(contents.complete(first, Ok("late".to_owned())).is_none());
        assert!(contents.complete(second, Ok("fresh".to_owned())).is_some());
    }

    #[test]
    fn test_share_url() {
        let url = share_url("The Last Train", &["mystery".to_owned()]).unwrap();
        assert_eq!(url.host_str(), Some("twitter.com"));
        assert_eq!(url.path(), "/intent/tweet");
        let (key, text) = url.query_pairs().next().unwrap();
        assert_eq!(key, "text");
        assert!(text.contains("\u{300e}The Last Train\u{300f}"));
        assert!(text.ends_with("#mystery\n#TheLastTrain"));
    }
}
