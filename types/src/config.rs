//! Engine configuration.
//!
//! This module only defines the validated, immutable record. Loading it
//! from a loosely-typed name-value mapping or a TOML file is
//! `redteam-config`'s job (kept out of this no-IO crate).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which of the two built-in strategies a `Configuration` was seeded from.
///
/// Strategy only supplies defaults; nothing downstream branches on it once
/// a `Configuration` is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Single-branch iteration over parallel streams, no pruning.
    LinearRefinement,
    /// Branching tree search with on-topic filtering and two-phase pruning.
    TreeWithPruning,
}

impl Strategy {
    #[must_use]
    pub fn defaults(self) -> Configuration {
        match self {
            Strategy::LinearRefinement => Configuration {
                goal: String::new(),
                target_str: String::new(),
                branching_factor: 1,
                pruning: false,
                n_streams: 3,
                depth: 20,
                width: usize::MAX,
                keep_last_n: 4,
                judge_success_score: 10,
                attack_max_attempts: 5,
            },
            Strategy::TreeWithPruning => Configuration {
                goal: String::new(),
                target_str: String::new(),
                branching_factor: 4,
                pruning: true,
                n_streams: 1,
                depth: 10,
                width: 1,
                keep_last_n: 1,
                judge_success_score: 10,
                attack_max_attempts: 5,
            },
        }
    }
}

/// A single immutable record read at engine construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    /// Natural-language description of the target behavior to elicit.
    pub goal: String,
    /// Prefix the attacker tries to make the target emit.
    pub target_str: String,
    /// Attacker candidates generated per stream per depth.
    pub branching_factor: usize,
    /// Enables on-topic filter and judge-score pruning.
    pub pruning: bool,
    /// Independent attacker conversations carried across depths.
    pub n_streams: usize,
    /// Maximum iterations.
    pub depth: usize,
    /// Cap on surviving candidates after each prune.
    pub width: usize,
    /// Attacker-history turns retained per stream.
    pub keep_last_n: usize,
    /// Integer threshold (1..10) that triggers early exit.
    pub judge_success_score: i32,
    /// Retry budget for attacker when output is unparseable.
    pub attack_max_attempts: u32,
}

/// A `Configuration` rejected by [`Configuration::validated`].
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("goal must not be empty")]
    EmptyGoal,
    #[error("target_str must not be empty")]
    EmptyTargetStr,
    #[error("branching_factor must be at least 1")]
    ZeroBranchingFactor,
    #[error("n_streams must be at least 1")]
    ZeroStreams,
    #[error("depth must be at least 1")]
    ZeroDepth,
    #[error("width must be at least 1")]
    ZeroWidth,
    #[error("keep_last_n must be at least 1")]
    ZeroKeepLastN,
    #[error("judge_success_score must be in 1..=10 (got {0})")]
    JudgeScoreOutOfRange(i32),
    #[error("attack_max_attempts must be at least 1")]
    ZeroAttackMaxAttempts,
}

impl Configuration {
    /// Build a config for the named strategy, overriding `goal`/`target_str`.
    #[must_use]
    pub fn for_strategy(strategy: Strategy, goal: impl Into<String>, target_str: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            target_str: target_str.into(),
            ..strategy.defaults()
        }
    }

    /// Check every invariant once, at construction time, so the engine never
    /// has to re-validate a `Configuration` it already holds.
    pub fn validated(self) -> Result<Self, ConfigurationError> {
        if self.goal.trim().is_empty() {
            return Err(ConfigurationError::EmptyGoal);
        }
        if self.target_str.trim().is_empty() {
            return Err(ConfigurationError::EmptyTargetStr);
        }
        if self.branching_factor == 0 {
            return Err(ConfigurationError::ZeroBranchingFactor);
        }
        if self.n_streams == 0 {
            return Err(ConfigurationError::ZeroStreams);
        }
        if self.depth == 0 {
            return Err(ConfigurationError::ZeroDepth);
        }
        if self.width == 0 {
            return Err(ConfigurationError::ZeroWidth);
        }
        if self.keep_last_n == 0 {
            return Err(ConfigurationError::ZeroKeepLastN);
        }
        if !(1..=10).contains(&self.judge_success_score) {
            return Err(ConfigurationError::JudgeScoreOutOfRange(self.judge_success_score));
        }
        if self.attack_max_attempts == 0 {
            return Err(ConfigurationError::ZeroAttackMaxAttempts);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_defaults_are_single_branch_no_pruning() {
        let cfg = Strategy::LinearRefinement.defaults();
        assert_eq!(cfg.branching_factor, 1);
        assert!(!cfg.pruning);
        assert_eq!(cfg.n_streams, 3);
        assert_eq!(cfg.depth, 20);
        assert_eq!(cfg.keep_last_n, 4);
    }

    #[test]
    fn validated_rejects_empty_goal() {
        let cfg = Configuration::for_strategy(Strategy::LinearRefinement, "", "target");
        assert!(matches!(cfg.validated(), Err(ConfigurationError::EmptyGoal)));
    }

    #[test]
    fn validated_accepts_defaults_with_goal_and_target() {
        let cfg = Configuration::for_strategy(Strategy::TreeWithPruning, "goal", "Sure, here");
        assert!(cfg.validated().is_ok());
    }

    #[test]
    fn validated_rejects_out_of_range_judge_score() {
        let mut cfg = Configuration::for_strategy(Strategy::LinearRefinement, "goal", "target");
        cfg.judge_success_score = 11;
        assert!(matches!(
            cfg.validated(),
            Err(ConfigurationError::JudgeScoreOutOfRange(11))
        ));
    }

    #[test]
    fn tree_defaults_are_branching_with_pruning() {
        let cfg = Strategy::TreeWithPruning.defaults();
        assert_eq!(cfg.branching_factor, 4);
        assert!(cfg.pruning);
        assert_eq!(cfg.n_streams, 1);
        assert_eq!(cfg.depth, 10);
        assert_eq!(cfg.width, 1);
        assert_eq!(cfg.keep_last_n, 1);
    }
}
