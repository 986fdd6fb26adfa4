//! Contact-seller flow
//!
//! `Idle -> Composing -> (sent | cancelled) -> Idle`. While composing, a
//! submitted message may be in flight; a failed send stays in `Composing` so
//! the user can retry by hand. Every submit gets a new generation and only
//! the result of the latest one moves the state.

use serde::Serialize;
use thiserror::Error;

use crate::types::{ContactRequest, ContactResponse, ListingDetail, TelegramUser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContactState {
    #[default]
    Idle,
    Composing {
        sending: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("no listing or user context")]
    MissingContext,
    #[error("message is empty")]
    EmptyMessage,
    #[error("contact form is not open")]
    NotComposing,
    #[error("a message is already being sent")]
    AlreadySending,
}

/// Result of a completed send, as seen by the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Server accepted the message; carries its confirmation text if any.
    Sent { confirmation: Option<String> },
    /// Transport error or `success: false`.
    Failed { reason: String },
}

#[derive(Debug, Default)]
pub struct ContactFlow {
    state: ContactState,
    generation: u64,
}

impl ContactFlow {
    pub fn state(&self) -> ContactState {
        self.state
    }

    pub fn is_composing(&self) -> bool {
        matches!(self.state, ContactState::Composing { .. })
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.state, ContactState::Composing { sending: true })
    }

    /// Generation of the most recent submit.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `Idle -> Composing`. Re-opening an open form is a no-op.
    pub fn open(
        &mut self,
        listing: Option<&ListingDetail>,
        user: Option<&TelegramUser>,
    ) -> Result<(), ContactError> {
        if listing.is_none() || user.is_none() {
            return Err(ContactError::MissingContext);
        }
        if !self.is_composing() {
            self.state = ContactState::Composing { sending: false };
        }
        Ok(())
    }

    /// Validate the draft and build the request; marks the flow as sending
    /// under a new [`generation`](Self::generation).
    pub fn submit(
        &mut self,
        listing: Option<&ListingDetail>,
        user: Option<&TelegramUser>,
        text: &str,
    ) -> Result<ContactRequest, ContactError> {
        match self.state {
            ContactState::Idle => return Err(ContactError::NotComposing),
            ContactState::Composing { sending: true } => return Err(ContactError::AlreadySending),
            ContactState::Composing { sending: false } => {}
        }
        let message = text.trim();
        if message.is_empty() {
            return Err(ContactError::EmptyMessage);
        }
        let (Some(listing), Some(user)) = (listing, user) else {
            return Err(ContactError::MissingContext);
        };

        self.state = ContactState::Composing { sending: true };
        self.generation += 1;
        Ok(ContactRequest {
            listing_id: listing.id,
            message: message.to_string(),
            user_id: user.id,
        })
    }

    /// Apply the result of send `generation`. Success returns to `Idle`;
    /// failure keeps the form open. A result arriving after a cancel leaves
    /// the state alone, and one superseded by a newer submit yields `None`.
    pub fn complete(
        &mut self,
        generation: u64,
        result: &Result<ContactResponse, String>,
    ) -> Option<SendOutcome> {
        if generation != self.generation {
            return None;
        }
        let outcome = match result {
            Ok(resp) if resp.success => SendOutcome::Sent {
                confirmation: resp.message.clone(),
            },
            Ok(resp) => SendOutcome::Failed {
                reason: resp
                    .error
                    .clone()
                    .unwrap_or_else(|| "success: false".to_string()),
            },
            Err(e) => SendOutcome::Failed { reason: e.clone() },
        };

        if self.is_sending() {
            self.state = match outcome {
                SendOutcome::Sent { .. } => ContactState::Idle,
                SendOutcome::Failed { .. } => ContactState::Composing { sending: false },
            };
        }
        Some(outcome)
    }

    /// `Composing -> Idle` (cancel button, modal closed, new listing opened).
    pub fn cancel(&mut self) {
        self.state = ContactState::Idle;
    }
}
