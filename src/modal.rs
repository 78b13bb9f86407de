//! Confirmation dialogs
//!
//! A single dialog primitive serves every confirmation in the session. A
//! dialog with a cancel label asks a yes/no question; a dialog without one is
//! a notification with a single acknowledge button. The dialog only
//! classifies responses: closing it is always the caller's job.

use serde::{Deserialize, Serialize};

use crate::constants::labels;

/// Identifies one opening of a dialog
///
/// Responses carry the id of the dialog they were given to, so a second
/// click on a dialog that has already been handled is recognised and dropped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("#{_0}")]
pub struct ModalId(pub(crate) u64);

/// A user response to a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// The confirm (or acknowledge) button
    Confirm,
    /// The cancel button
    Cancel,
    /// A click outside the dialog body
    Backdrop,
}

/// How a dialog interprets a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Run the confirm handler
    Confirmed,
    /// Run the cancel handler
    Cancelled,
    /// The response means nothing for this dialog
    Ignored,
}

/// Dialog content and buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    message: String,
    confirm_label: String,
    cancel_label: Option<String>,
}

impl Modal {
    /// A yes/no question with the default labels
    pub fn confirmation(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            confirm_label: labels::CONFIRM.to_owned(),
            cancel_label: Some(labels::CANCEL.to_owned()),
        }
    }

    /// A notification with a single button labelled with the default confirm label
    pub fn notification(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            confirm_label: labels::CONFIRM.to_owned(),
            cancel_label: None,
        }
    }

    /// Replaces the confirm label
    #[must_use]
    pub fn confirm_label(mut self, label: impl Into<String>) -> Self {
        self.confirm_label = label.into();
        self
    }

    /// Replaces the cancel label, ignored for notifications
    #[must_use]
    pub fn cancel_label(mut self, label: impl Into<String>) -> Self {
        if self.cancel_label.is_some() {
            self.cancel_label = Some(label.into());
        }
        self
    }

    /// Whether the dialog asks a yes/no question
    pub fn is_confirmation(&self) -> bool {
        self.cancel_label.is_some()
    }

    /// Message shown in the dialog
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Classifies a response
    ///
    /// The backdrop counts as cancel for a question and is ignored by a
    /// notification, which has nothing to cancel.
    pub fn resolve(&self, response: Response) -> Resolution {
        match (response, self.is_confirmation()) {
            (Response::Confirm, _) => Resolution::Confirmed,
            (Response::Cancel | Response::Backdrop, true) => Resolution::Cancelled,
            (Response::Cancel | Response::Backdrop, false) => Resolution::Ignored,
        }
    }

    /// Display state of the dialog opened as `id`
    pub fn view(&self, id: ModalId) -> ModalView {
        ModalView {
            id,
            message: self.message.clone(),
            buttons: match &self.cancel_label {
                Some(cancel) => Buttons::Confirmation {
                    confirm: self.confirm_label.clone(),
                    cancel: cancel.clone(),
                },
                None => Buttons::Notification {
                    acknowledge: self.confirm_label.clone(),
                },
            },
        }
    }
}

/// Buttons of an open dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Buttons {
    /// Cancel and confirm buttons
    Confirmation {
        /// Confirm button label
        confirm: String,
        /// Cancel button label
        cancel: String,
    },
    /// A single acknowledge button
    Notification {
        /// Button label
        acknowledge: String,
    },
}

/// Display state of an open dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModalView {
    /// Id to answer the dialog with
    pub id: ModalId,
    /// Message shown in the dialog
    pub message: String,
    /// Buttons shown under the message
    pub buttons: Buttons,
}
