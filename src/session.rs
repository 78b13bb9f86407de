//! Communication with the presentation host
//!
//! This module defines the trait for tunneling messages between the session
//! engine and whatever renders it (a browser shell, a terminal front end or
//! a test double). The tunnel abstraction keeps the engine free of any
//! rendering concern.

use super::{SyncMessage, UpdateMessage};

/// Trait for sending messages through a communication tunnel
///
/// Implementations might forward to a WASM bridge, a terminal renderer or
/// simply record the messages.
pub trait Tunnel {
    /// Sends an incremental update to the host
    ///
    /// Update messages carry small changes such as a timer tick, a fetch
    /// request or a freshly loaded handout.
    ///
    /// # Arguments
    ///
    /// * `message` - The update message to send
    fn send_message(&self, message: &UpdateMessage);

    /// Sends a full frame to the host
    ///
    /// Sync messages describe the whole visible state and are sent after
    /// every phase change, dialog change or control change.
    ///
    /// # Arguments
    ///
    /// * `state` - The synchronization message to send
    fn send_state(&self, state: &SyncMessage);
}
