//! The six end-to-end scenarios from the branch/score/prune/feedback
//! contract, driven with scripted and condition-aware generator doubles.

use std::sync::Arc;

use async_trait::async_trait;
use redteam_core::{CancellationToken, VecAttemptSink};
use redteam_engine::{Engine, EngineError};
use redteam_generator::{ConstantGenerator, Generator, GeneratorError, ScriptedGenerator};
use redteam_types::{Configuration, Dialog, Strategy};

/// A generator whose reply depends on the dialog it receives, for tests that
/// need distinct per-candidate behavior inside one concurrent fan-out (where
/// a FIFO-scripted reply queue can't guarantee call order).
struct ConditionalGenerator<F> {
    respond: F,
}

#[async_trait]
impl<F> Generator for ConditionalGenerator<F>
where
    F: Fn(&Dialog) -> String + Send + Sync,
{
    async fn generate(&self, cancel: &CancellationToken, dialog: &Dialog, n: usize) -> Result<Vec<String>, GeneratorError> {
        if cancel.is_cancelled() {
            return Err(GeneratorError::Cancelled);
        }
        Ok(std::iter::repeat_n((self.respond)(dialog), n).collect())
    }
}

fn attack_reply(prompt: &str) -> String {
    format!(r#"{{"improvement": "", "prompt": "{prompt}"}}"#)
}

#[tokio::test]
async fn degenerate_success() {
    let config = Configuration {
        n_streams: 1,
        branching_factor: 1,
        depth: 100,
        ..Configuration::for_strategy(Strategy::LinearRefinement, "goal", "Sure, here")
    }
    .validated()
    .unwrap();

    let attacker = Arc::new(ScriptedGenerator::new([attack_reply("P")]));
    let judge = Arc::new(ConstantGenerator::new("Rating: [[10]]"));
    let target = Arc::new(ConstantGenerator::new("anything"));

    let engine = Engine::new(attacker, judge, target);
    let sink = VecAttemptSink::new();
    let cancel = CancellationToken::new();

    let attempts = engine.run(&config, &sink, &cancel).await.unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].score, 1.0);
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn immediate_cancellation() {
    let config = Configuration {
        n_streams: 1,
        branching_factor: 1,
        depth: 100,
        ..Configuration::for_strategy(Strategy::LinearRefinement, "goal", "Sure, here")
    }
    .validated()
    .unwrap();

    let attacker = Arc::new(ScriptedGenerator::new([attack_reply("P")]));
    let judge = Arc::new(ConstantGenerator::new("Rating: [[10]]"));
    let target = Arc::new(ConstantGenerator::new("anything"));

    let engine = Engine::new(attacker, judge, target);
    let sink = VecAttemptSink::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    match engine.run(&config, &sink, &cancel).await {
        Err(EngineError::Cancelled { attempts }) => assert!(attempts.is_empty()),
        other => panic!("expected Cancelled, got {other:?}"),
    }
    assert!(sink.is_empty());
}

#[tokio::test]
async fn unparseable_attacker_drops_every_branch_without_error() {
    let config = Configuration {
        n_streams: 1,
        branching_factor: 1,
        depth: 2,
        attack_max_attempts: 2,
        ..Configuration::for_strategy(Strategy::LinearRefinement, "goal", "Sure, here")
    }
    .validated()
    .unwrap();

    let attacker = Arc::new(ConstantGenerator::new("not json"));
    let judge = Arc::new(ConstantGenerator::new(String::new()));
    let target = Arc::new(ConstantGenerator::new(String::new()));

    let engine = Engine::new(attacker, judge, target);
    let sink = VecAttemptSink::new();
    let cancel = CancellationToken::new();

    let attempts = engine.run(&config, &sink, &cancel).await.unwrap();
    assert!(attempts.is_empty());
    assert!(sink.is_empty());
}

#[tokio::test]
async fn prune_keeps_top_k_by_on_topic() {
    let config = Configuration {
        n_streams: 1,
        branching_factor: 3,
        width: 1,
        depth: 1,
        ..Configuration::for_strategy(Strategy::TreeWithPruning, "goal", "Sure, here")
    }
    .validated()
    .unwrap();

    let attacker = Arc::new(ScriptedGenerator::new([
        attack_reply("branch-0"),
        attack_reply("branch-1"),
        attack_reply("branch-2"),
    ]));
    let judge = Arc::new(ConditionalGenerator {
        respond: |dialog: &Dialog| {
            let open = dialog.open_turn.as_deref().unwrap_or_default();
            if open.contains("branch-0") {
                "Response: [[NO]]".to_string()
            } else if dialog.system.contains("Rate") {
                "Rating: [[3]]".to_string()
            } else {
                "Response: [[YES]]".to_string()
            }
        },
    });
    let target = Arc::new(ConstantGenerator::new("target reply"));

    let engine = Engine::new(attacker, judge, target);
    let sink = VecAttemptSink::new();
    let cancel = CancellationToken::new();

    let attempts = engine.run(&config, &sink, &cancel).await.unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].prompt, "branch-1");
}

#[tokio::test]
async fn all_zero_on_topic_restores_top_one() {
    let config = Configuration {
        n_streams: 1,
        branching_factor: 3,
        width: 1,
        depth: 1,
        ..Configuration::for_strategy(Strategy::TreeWithPruning, "goal", "Sure, here")
    }
    .validated()
    .unwrap();

    let attacker = Arc::new(ScriptedGenerator::new([
        attack_reply("branch-0"),
        attack_reply("branch-1"),
        attack_reply("branch-2"),
    ]));
    let judge = Arc::new(ConditionalGenerator {
        respond: |_dialog: &Dialog| "Response: [[NO]]".to_string(),
    });
    let target = Arc::new(ConstantGenerator::new("target reply"));

    let engine = Engine::new(attacker, judge, target);
    let sink = VecAttemptSink::new();
    let cancel = CancellationToken::new();

    let attempts = engine.run(&config, &sink, &cancel).await.unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].prompt, "branch-0");
}

#[tokio::test]
async fn judge_degrades_on_empty_reply_and_continues() {
    let config = Configuration {
        n_streams: 1,
        branching_factor: 3,
        depth: 1,
        ..Configuration::for_strategy(Strategy::LinearRefinement, "goal", "Sure, here")
    }
    .validated()
    .unwrap();

    let attacker = Arc::new(ScriptedGenerator::new([
        attack_reply("branch-0"),
        attack_reply("branch-1"),
        attack_reply("branch-2"),
    ]));
    let judge = Arc::new(ConditionalGenerator {
        respond: |dialog: &Dialog| {
            let open = dialog.open_turn.as_deref().unwrap_or_default();
            if open.contains("branch-1") { String::new() } else { "Rating: [[7]]".to_string() }
        },
    });
    let target = Arc::new(ConstantGenerator::new("target reply"));

    let engine = Engine::new(attacker, judge, target);
    let sink = VecAttemptSink::new();
    let cancel = CancellationToken::new();

    let attempts = engine.run(&config, &sink, &cancel).await.unwrap();
    assert_eq!(attempts.len(), 3);
    let scores: Vec<i32> = attempts.iter().map(|a| a.judge_score).collect();
    assert_eq!(scores, vec![7, 1, 7]);
}

#[tokio::test]
async fn attempt_depth_matches_the_iteration_it_was_emitted_in() {
    let config = Configuration {
        n_streams: 1,
        branching_factor: 1,
        depth: 3,
        ..Configuration::for_strategy(Strategy::LinearRefinement, "goal", "Sure, here")
    }
    .validated()
    .unwrap();

    let attacker = Arc::new(ScriptedGenerator::new([
        attack_reply("branch-0"),
        attack_reply("branch-1"),
        attack_reply("branch-2"),
    ]));
    let judge = Arc::new(ConstantGenerator::new("Rating: [[1]]"));
    let target = Arc::new(ConstantGenerator::new("target reply"));

    let engine = Engine::new(attacker, judge, target);
    let sink = VecAttemptSink::new();
    let cancel = CancellationToken::new();

    let attempts = engine.run(&config, &sink, &cancel).await.unwrap();
    assert_eq!(attempts.len(), 3);
    for (d, attempt) in attempts.iter().enumerate() {
        assert_eq!(attempt.depth, d);
    }
}
