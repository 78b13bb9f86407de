//! Text resource loading for mounted screens
//!
//! Screens never fetch anything themselves. When a screen is mounted the
//! engine issues a ticket for every text resource the screen shows and asks
//! the host to fetch it. Results come back tagged with their ticket; a result
//! whose ticket is no longer registered belongs to a screen that has been torn
//! down and is dropped.

use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::media::ResourcePath;

/// Message shown in place of a handout that could not be fetched
pub const LOAD_FAILED: &str = "Failed to load content.";

/// Identifies one fetch issued for one mounted screen
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("#{_0}")]
pub struct ContentTicket(u64);

/// Errors a host can report for a fetch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The resource answered with an unsuccessful status
    #[error("resource answered with status {0}")]
    Status(u16),
    /// The resource could not be reached at all
    #[error("resource could not be fetched: {0}")]
    Transport(String),
}

/// What a screen shows in a content slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ContentView {
    /// Nothing to show, the slot has no resource
    Empty,
    /// The fetch has been requested and has not completed
    Loading,
    /// The text of the resource
    Ready(String),
    /// The fetch failed, the message replaces the text
    Failed(String),
}

/// Content updates sent to the host
#[derive(Debug, Clone, Serialize)]
pub enum UpdateMessage {
    /// Ask the host to fetch a resource and report back with the ticket
    FetchRequest {
        /// Ticket to report the result with
        ticket: ContentTicket,
        /// Resource to fetch
        path: ResourcePath,
    },
    /// A requested resource has been loaded or has failed
    Loaded {
        /// Ticket of the completed fetch
        ticket: ContentTicket,
        /// The resulting content
        content: ContentView,
    },
}

#[derive(Debug)]
struct Slot {
    path: ResourcePath,
    view: ContentView,
    requested: bool,
}

/// Registry of fetches belonging to the mounted screen
#[derive(Debug, Default)]
pub struct Contents {
    next_ticket: u64,
    slots: HashMap<ContentTicket, Slot>,
}

impl Contents {
    /// Registers a fetch and returns its ticket
    ///
    /// Tickets are never reused within a session.
    pub fn request(&mut self, path: &ResourcePath) -> ContentTicket {
        let ticket = ContentTicket(self.next_ticket);
        self.next_ticket += 1;
        self.slots.insert(
            ticket,
            Slot {
                path: path.clone(),
                view: ContentView::Loading,
                requested: false,
            },
        );
        ticket
    }

    /// Fetch requests for every ticket not yet handed to the host
    ///
    /// Each ticket is returned once, in issue order.
    pub fn take_requests(&mut self) -> Vec<UpdateMessage> {
        self.slots
            .iter_mut()
            .filter(|(_, slot)| !slot.requested)
            .sorted_by_key(|(ticket, _)| **ticket)
            .map(|(ticket, slot)| {
                slot.requested = true;
                UpdateMessage::FetchRequest {
                    ticket: *ticket,
                    path: slot.path.clone(),
                }
            })
            .collect_vec()
    }

    /// Current content of a slot, `Empty` for slots without a resource
    pub fn view(&self, ticket: Option<ContentTicket>) -> ContentView {
        ticket
            .and_then(|ticket| self.slots.get(&ticket))
            .map_or(ContentView::Empty, |slot| slot.view.clone())
    }

    /// Records the result of a fetch
    ///
    /// # Returns
    ///
    /// The new content of the slot, or `None` when the ticket is stale or has
    /// already completed.
    pub fn complete(
        &mut self,
        ticket: ContentTicket,
        result: Result<String, FetchError>,
    ) -> Option<ContentView> {
        let slot = self.slots.get_mut(&ticket)?;
        if slot.view != ContentView::Loading {
            return None;
        }
        slot.view = match result {
            Ok(text) => ContentView::Ready(text),
            Err(error) => {
                log::warn!("failed to fetch {}: {error}", slot.path);
                ContentView::Failed(LOAD_FAILED.to_owned())
            }
        };
        Some(slot.view.clone())
    }

    /// Forgets a single fetch, its late result will be dropped
    pub fn release(&mut self, ticket: ContentTicket) {
        self.slots.remove(&ticket);
    }

    /// Forgets every fetch of the unmounted screen
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of registered fetches
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no fetch is registered
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
