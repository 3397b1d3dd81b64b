//! The shape a `Generator` actually consumes: a system message plus
//! completed (user, assistant) pairs, with at most one trailing open user
//! turn still awaiting a reply.
//!
//! This is distinct from [`crate::Turn`]'s flat message list: a `Dialog` is
//! built once per attacker call from a stream's history, after the engine
//! has already established the even/odd pairing invariant.

/// One finished exchange: a user message and the assistant's reply to it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CompletedTurn {
    pub user: String,
    pub assistant: String,
}

/// A request to a [`crate::Turn`]-consuming generator.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Dialog {
    pub system: String,
    pub turns: Vec<CompletedTurn>,
    /// The final user message, if the history has odd length and so ends on
    /// an unanswered turn.
    pub open_turn: Option<String>,
}

impl Dialog {
    #[must_use]
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            turns: Vec::new(),
            open_turn: None,
        }
    }
}
