//! Scenario content
//!
//! This module contains the scenario document a session is played from,
//! the resource references it holds, and the loading of text resources for
//! the screens that show them.

pub mod config;
pub mod content;
pub mod media;

pub use config::{Character, CharacterKind, EndingError, Error, Scenario};
