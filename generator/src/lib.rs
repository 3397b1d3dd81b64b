//! The `Generator` boundary: anything capable of producing replies to a
//! [`Dialog`], standing in for the attacker, target, and judge language
//! models.
//!
//! Wiring a `Generator` to a real model API is an external concern (model
//! choice, auth, transport) and out of scope here; this crate defines the
//! trait, a generalized retry helper (see [`retry`]), and [`ScriptedGenerator`]
//! for driving the engine in tests without a network.

pub mod retry;

use async_trait::async_trait;
use redteam_core::CancellationToken;
use redteam_types::Dialog;
use thiserror::Error;

/// Failure modes a `Generator` implementation can report.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The caller's `CancellationToken` fired before a reply arrived.
    #[error("generation cancelled")]
    Cancelled,
    /// Anything else: a network error, an API error, a malformed response.
    /// Carries only a display string since concrete transport error types
    /// live outside this crate's scope.
    #[error("generator transport failed: {0}")]
    Transport(String),
}

/// Produces up to `n` replies to `dialog`. The engine only ever requests
/// `n = 1`; an empty result is permitted and the caller treats it as a
/// retryable or degraded outcome depending on role.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        cancel: &CancellationToken,
        dialog: &Dialog,
        n: usize,
    ) -> Result<Vec<String>, GeneratorError>;
}

/// A scripted reply queue, for driving the engine deterministically in
/// tests. Each call pops `n` entries off the front; an empty queue panics
/// rather than silently returning a placeholder, since a test running the
/// script dry almost always means the branching factor assumed a different
/// call count than what the engine actually made.
pub struct ScriptedGenerator {
    replies: std::sync::Mutex<std::collections::VecDeque<Result<String, GeneratorError>>>,
}

impl ScriptedGenerator {
    #[must_use]
    pub fn new(replies: impl IntoIterator<Item = String>) -> Self {
        Self {
            replies: std::sync::Mutex::new(replies.into_iter().map(Ok).collect()),
        }
    }

    #[must_use]
    pub fn with_results(replies: impl IntoIterator<Item = Result<String, GeneratorError>>) -> Self {
        Self {
            replies: std::sync::Mutex::new(replies.into_iter().collect()),
        }
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(
        &self,
        cancel: &CancellationToken,
        _dialog: &Dialog,
        n: usize,
    ) -> Result<Vec<String>, GeneratorError> {
        if cancel.is_cancelled() {
            return Err(GeneratorError::Cancelled);
        }
        let mut queue = self.replies.lock().unwrap();
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let reply = queue
                .pop_front()
                .expect("ScriptedGenerator ran out of scripted replies")?;
            out.push(reply);
        }
        Ok(out)
    }
}

/// A `Generator` that always returns the same text. Useful for the judge or
/// on-topic roles in tests that only care about the attacker's behavior.
pub struct ConstantGenerator(String);

impl ConstantGenerator {
    #[must_use]
    pub fn new(reply: impl Into<String>) -> Self {
        Self(reply.into())
    }
}

#[async_trait]
impl Generator for ConstantGenerator {
    async fn generate(
        &self,
        cancel: &CancellationToken,
        _dialog: &Dialog,
        n: usize,
    ) -> Result<Vec<String>, GeneratorError> {
        if cancel.is_cancelled() {
            return Err(GeneratorError::Cancelled);
        }
        Ok(std::iter::repeat_n(self.0.clone(), n).collect())
    }
}
