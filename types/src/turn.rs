//! Attacker dialog turns.
//!
//! A stream's history is a flat sequence of `Turn`s, even indices user
//! (feedback), odd indices assistant (the attacker's JSON reply).

use serde::{Deserialize, Serialize};

/// Who produced a turn in an attacker conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

/// One message in an attacker stream's history.
///
/// Content is a plain `String` rather than `NonEmptyString`: the engine
/// itself only ever appends non-empty feedback and non-empty attacker
/// replies, but callers replaying a persisted stream should not have to
/// re-validate content that was already accepted once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
