//! Attacker output and per-attempt records.

use crate::proofs::NonEmptyString;

/// The attacker's parsed JSON reply: `{"improvement": ..., "prompt": ...}`.
///
/// `prompt` is the next candidate to send the target; `improvement` is the
/// attacker's own rationale, carried forward only as feedback context.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AttackResult {
    pub improvement: String,
    pub prompt: NonEmptyString,
}

/// Everything recorded about one candidate once its branch finishes scoring.
///
/// Kept separate from the engine's live parallel arrays: this is the
/// durable, per-attempt shape handed to an `AttemptSink`, not the working
/// representation used while pruning. Metadata is exactly `{depth,
/// judge_score, goal, improvement}`; `prompt` and `target_output` carry the
/// attempt's actual content alongside that metadata.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AttemptRecord {
    pub depth: usize,
    pub goal: String,
    pub improvement: String,
    pub prompt: String,
    pub target_output: String,
    pub judge_score: i32,
    /// Normalized judge score in `[0, 1]`, `judge_score as f64 / 10.0`.
    pub score: f64,
}

impl AttemptRecord {
    #[must_use]
    pub fn is_success(&self, judge_success_score: i32) -> bool {
        self.judge_score >= judge_success_score
    }
}
