//! Voting for the culprit
//!
//! The ballot lists every character, player characters first, and always has
//! a valid selection when there is anyone to vote for. Once the table confirms
//! the vote the ballot is finalized and never changes again.

use serde::Serialize;
use thiserror::Error;

use crate::scenario::Scenario;

/// Errors that can occur while voting
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Error {
    /// The id is not on the ballot
    #[error("`{0}` is not on the ballot")]
    UnknownCandidate(String),
    /// No candidate has been selected
    #[error("select the character you believe is the culprit")]
    NothingSelected,
    /// The vote has already been cast
    #[error("the vote has already been cast")]
    AlreadyFinalized,
}

/// A character on the ballot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Character identifier
    pub id: String,
    /// Character name
    pub name: String,
}

/// Single-choice ballot
#[derive(Debug, Clone)]
pub struct Ballot {
    candidates: Vec<Candidate>,
    selected: Option<usize>,
    finalized: bool,
}

impl Ballot {
    /// Builds the ballot for a scenario, preselecting the first candidate
    pub fn new(scenario: &Scenario) -> Self {
        let candidates: Vec<_> = scenario
            .voting_order()
            .into_iter()
            .map(|c| Candidate {
                id: c.id.clone(),
                name: c.name.clone(),
            })
            .collect();
        Self {
            selected: (!candidates.is_empty()).then_some(0),
            candidates,
            finalized: false,
        }
    }

    /// Candidates in ballot order
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// The selected candidate
    pub fn selected(&self) -> Option<&Candidate> {
        self.selected.and_then(|index| self.candidates.get(index))
    }

    /// Whether the vote has been cast
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Selects a candidate
    ///
    /// # Errors
    ///
    /// * `Error::AlreadyFinalized` - the vote has been cast
    /// * `Error::UnknownCandidate` - `id` is not on the ballot
    pub fn choose(&mut self, id: &str) -> Result<(), Error> {
        if self.finalized {
            return Err(Error::AlreadyFinalized);
        }
        let index = self
            .candidates
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| Error::UnknownCandidate(id.to_owned()))?;
        self.selected = Some(index);
        Ok(())
    }

    /// Checks the ballot before asking for confirmation
    ///
    /// # Errors
    ///
    /// * `Error::AlreadyFinalized` - the vote has been cast
    /// * `Error::NothingSelected` - there is no selection
    pub fn submit(&self) -> Result<&Candidate, Error> {
        if self.finalized {
            return Err(Error::AlreadyFinalized);
        }
        self.selected().ok_or(Error::NothingSelected)
    }

    /// Casts the vote for the selected candidate
    ///
    /// # Errors
    ///
    /// * `Error::AlreadyFinalized` - the vote has been cast
    /// * `Error::NothingSelected` - there is no selection
    pub fn finalize(&mut self) -> Result<String, Error> {
        let id = self.submit()?.id.clone();
        self.finalized = true;
        Ok(id)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::scenario::config::tests::{SCENARIO_JSON, sample_scenario};

    #[test]
    fn test_first_candidate_is_preselected() {
        let ballot = Ballot::new(&sample_scenario());
        assert_eq!(ballot.selected().unwrap().id, "charA");
        assert_eq!(ballot.candidates().last().unwrap().id, "victim");
    }

    #[test]
    fn test_choose_only_listed_candidates() {
        let mut ballot = Ballot::new(&sample_scenario());
        assert_eq!(
            ballot.choose("nobody"),
            Err(Error::UnknownCandidate("nobody".to_owned()))
        );
        assert_eq!(ballot.selected().unwrap().id, "charA");
        ballot.choose("victim").unwrap();
        assert_eq!(ballot.selected().unwrap().name, "Victor");
    }

    #[test]
    fn test_finalize_once() {
        let mut ballot = Ballot::new(&sample_scenario());
        ballot.choose("charB").unwrap();
        assert_eq!(ballot.submit().unwrap().id, "charB");
        assert_eq!(ballot.finalize(), Ok("charB".to_owned()));
        assert!(ballot.is_finalized());
        assert_eq!(ballot.finalize(), Err(Error::AlreadyFinalized));
        assert_eq!(ballot.choose("charA"), Err(Error::AlreadyFinalized));
    }

    #[test]
    fn test_empty_ballot_blocks_submission() {
        let json = SCENARIO_JSON.replace(
            &SCENARIO_JSON[SCENARIO_JSON.find(r#""characters""#).unwrap()
                ..SCENARIO_JSON.find(r#""endings""#).unwrap()],
            r#""characters": [],
        "#,
        );
        let scenario = Scenario::from_json(&json).unwrap();
        let mut ballot = Ballot::new(&scenario);
        assert!(ballot.selected().is_none());
        assert_eq!(ballot.submit(), Err(Error::NothingSelected));
        assert_eq!(ballot.finalize(), Err(Error::NothingSelected));
    }
}
