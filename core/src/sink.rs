//! Where finished attempts go.
//!
//! Persistence is an external collaborator, not something this workspace
//! implements: callers supply an `AttemptSink`. `VecAttemptSink` is the
//! in-memory double used by engine tests and short-lived CLI runs.

use std::sync::Mutex;

use redteam_types::AttemptRecord;

/// Receives one `AttemptRecord` per scored candidate, in the order the
/// engine finishes scoring it (not necessarily prompt-submission order,
/// since target/judge calls run concurrently within a round).
pub trait AttemptSink: Send + Sync {
    fn record(&self, attempt: AttemptRecord);
}

/// Collects every attempt in memory, in arrival order.
#[derive(Debug, Default)]
pub struct VecAttemptSink {
    attempts: Mutex<Vec<AttemptRecord>>,
}

impl VecAttemptSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<AttemptRecord> {
        self.attempts.into_inner().unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttemptSink for VecAttemptSink {
    fn record(&self, attempt: AttemptRecord) {
        self.attempts.lock().unwrap().push(attempt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AttemptRecord {
        AttemptRecord {
            depth: 0,
            goal: "goal".into(),
            improvement: "improvement".into(),
            prompt: "prompt".into(),
            target_output: "output".into(),
            judge_score: 3,
            score: 0.3,
        }
    }

    #[test]
    fn records_accumulate_in_order() {
        let sink = VecAttemptSink::new();
        sink.record(sample());
        sink.record(sample());
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.into_inner().len(), 2);
    }
}
