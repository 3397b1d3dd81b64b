//! The candidate set and pruning.
//!
//! *Parallel sub-sequences vs record list*: a single `Vec<Candidate>` would
//! read more naturally, but the pipeline populates
//! `target_outputs`/`on_topic_scores`/`judge_scores` at different stages, and
//! pruning has to run identically whichever of those are present yet. This
//! is modeled here as a record-of-options-with-explicit-absence
//! (`Option<Vec<_>>` per late-populated field), which keeps the "rebuild
//! only present sub-sequences" rule in one place (`select`).

use redteam_types::AttackResult;

use crate::conversation::Stream;

/// Surviving candidates at a given pipeline stage. `prompts`, `improvements`,
/// `conversations`, and `attack_results` are always present once a candidate
/// exists; the scoring fields are populated progressively.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub prompts: Vec<String>,
    pub improvements: Vec<String>,
    pub conversations: Vec<Stream>,
    pub attack_results: Vec<AttackResult>,
    pub target_outputs: Option<Vec<String>>,
    pub on_topic_scores: Option<Vec<f64>>,
    pub judge_scores: Option<Vec<i32>>,
}

impl CandidateSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push_branch(&mut self, prompt: String, improvement: String, conversation: Stream, attack_result: AttackResult) {
        self.prompts.push(prompt);
        self.improvements.push(improvement);
        self.conversations.push(conversation);
        self.attack_results.push(attack_result);
    }

    /// Rebuild this set keeping only `indices`, in the given order, copying
    /// only the sub-sequences that are currently present.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        let pick = |v: &[String]| indices.iter().map(|&i| v[i].clone()).collect();
        Self {
            prompts: pick(&self.prompts),
            improvements: pick(&self.improvements),
            conversations: indices.iter().map(|&i| self.conversations[i].clone()).collect(),
            attack_results: indices.iter().map(|&i| self.attack_results[i].clone()).collect(),
            target_outputs: self
                .target_outputs
                .as_ref()
                .map(|v| indices.iter().map(|&i| v[i].clone()).collect()),
            on_topic_scores: self
                .on_topic_scores
                .as_ref()
                .map(|v| indices.iter().map(|&i| v[i]).collect()),
            judge_scores: self
                .judge_scores
                .as_ref()
                .map(|v| indices.iter().map(|&i| v[i]).collect()),
        }
    }
}

/// Compute the surviving indices for a prune by `key`, descending, stable,
/// zero-key candidates dropped, truncated to `width`.
///
/// Phase-1 on-topic scoring happens before the target query, and its
/// tie-break is fixed to input order by a stable sort, which is exactly
/// what this function does.
#[must_use]
pub fn prune_indices(key: &[f64], width: usize) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..key.len()).collect();
    ranked.sort_by(|&a, &b| key[b].partial_cmp(&key[a]).unwrap_or(std::cmp::Ordering::Equal));

    let mut survivors: Vec<usize> = ranked.iter().copied().filter(|&i| key[i] != 0.0).collect();

    if survivors.is_empty() && !ranked.is_empty() {
        survivors.push(ranked[0]);
    }

    survivors.truncate(width);
    survivors
}

/// Prune a candidate set by `key` (one score per current candidate) down to
/// `width`.
#[must_use]
pub fn prune(candidates: &CandidateSet, key: &[f64], width: usize) -> CandidateSet {
    debug_assert_eq!(key.len(), candidates.len());
    candidates.select(&prune_indices(key, width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use redteam_types::{NonEmptyString, StreamId};

    fn candidate_set(n: usize) -> CandidateSet {
        let mut set = CandidateSet::default();
        for i in 0..n {
            set.push_branch(
                format!("prompt-{i}"),
                format!("improvement-{i}"),
                Stream::new(StreamId::new(i), "system"),
                AttackResult {
                    improvement: format!("improvement-{i}"),
                    prompt: NonEmptyString::new(format!("prompt-{i}")).unwrap(),
                },
            );
        }
        set
    }

    #[test]
    fn prune_keeps_top_k_with_stable_ties() {
        let indices = prune_indices(&[0.0, 1.0, 1.0], 1);
        assert_eq!(indices, vec![1]);
    }

    #[test]
    fn all_zero_key_restores_top_one() {
        let indices = prune_indices(&[0.0, 0.0, 0.0], 5);
        assert_eq!(indices, vec![0]);
    }

    #[test]
    fn prune_truncates_to_width() {
        let indices = prune_indices(&[3.0, 1.0, 2.0], 2);
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn select_rebuilds_only_present_subsequences() {
        let mut set = candidate_set(3);
        set.judge_scores = Some(vec![1, 5, 3]);
        let pruned = prune(&set, &[1.0, 5.0, 3.0], 2);
        assert_eq!(pruned.len(), 2);
        assert_eq!(pruned.prompts, vec!["prompt-1", "prompt-2"]);
        assert_eq!(pruned.judge_scores, Some(vec![5, 3]));
        assert!(pruned.target_outputs.is_none());
    }

    #[test]
    fn empty_candidate_set_prunes_to_empty() {
        let set = CandidateSet::default();
        let pruned = prune(&set, &[], 3);
        assert!(pruned.is_empty());
    }
}
