//! The engine loop itself: branch -> (prune) -> query -> score -> (prune) ->
//! feedback, repeated for `depth` iterations or until early exit,
//! cancellation, or a fatal generator failure.

use std::sync::Arc;

use redteam_core::{AttemptSink, CancellationToken};
use redteam_generator::{Generator, GeneratorError};
use redteam_types::{AttemptRecord, Configuration, Dialog, StreamId};

use crate::candidates::{CandidateSet, prune};
use crate::conversation::Stream;
use crate::dispatch::fan_out;
use crate::parser::{parse_attack_result, parse_judge_rating, parse_on_topic};
use crate::templates;

/// The top-level failure a run can end with.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("run cancelled after {} attempt(s)", attempts.len())]
    Cancelled { attempts: Vec<AttemptRecord> },
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Drives the attack loop against three generator roles. The same engine
/// runs both strategies; `Configuration::pruning` is the only thing that
/// switches behavior.
pub struct Engine {
    attacker: Arc<dyn Generator>,
    judge: Arc<dyn Generator>,
    target: Arc<dyn Generator>,
}

impl Engine {
    #[must_use]
    pub fn new(attacker: Arc<dyn Generator>, judge: Arc<dyn Generator>, target: Arc<dyn Generator>) -> Self {
        Self { attacker, judge, target }
    }

    /// Run to completion. Returns every emitted attempt on success or early
    /// exit; on cancellation, returns the attempts accumulated so far
    /// alongside the cancellation error.
    pub async fn run(
        &self,
        config: &Configuration,
        sink: &dyn AttemptSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<AttemptRecord>, EngineError> {
        let mut streams: Vec<Stream> = (0..config.n_streams)
            .map(|i| Stream::new(StreamId::new(i), templates::attacker_system_prompt(&config.goal, &config.target_str)))
            .collect();
        let mut feedback: Vec<String> = vec![templates::init_message(&config.goal); config.n_streams];
        let mut attempts: Vec<AttemptRecord> = Vec::new();

        for depth in 0..config.depth {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled { attempts });
            }

            let set = self.branch(config, cancel, &streams, &feedback, depth, &attempts).await?;
            let Some(mut set) = set else {
                tracing::debug!(depth, "no branch produced a parseable candidate, retaining streams");
                continue;
            };

            if config.pruning {
                let on_topic = self.score_on_topic(&config.goal, cancel, &set).await;
                set.on_topic_scores = Some(on_topic.clone());
                set = prune(&set, &on_topic, config.width);
                tracing::debug!(depth, survivors = set.len(), "phase-1 prune complete");
            }

            let targets = self.query_target(cancel, &set).await;
            set.target_outputs = Some(targets.clone());

            let ratings = self.score_judge(&config.goal, cancel, &set, &targets).await;
            set.judge_scores = Some(ratings.clone());

            for i in 0..set.len() {
                let judge_score = ratings[i];
                let record = AttemptRecord {
                    depth,
                    goal: config.goal.clone(),
                    improvement: set.improvements[i].clone(),
                    prompt: set.prompts[i].clone(),
                    target_output: targets[i].clone(),
                    judge_score,
                    score: f64::from(judge_score) / 10.0,
                };
                sink.record(record.clone());
                attempts.push(record);
            }

            if ratings.iter().any(|&score| score >= config.judge_success_score) {
                tracing::debug!(depth, "early exit: judge success threshold met");
                return Ok(attempts);
            }

            if config.pruning {
                let judge_keys: Vec<f64> = ratings.iter().map(|&s| f64::from(s)).collect();
                set = prune(&set, &judge_keys, config.width);
                tracing::debug!(depth, survivors = set.len(), "phase-2 prune complete");
            }

            let (next_streams, next_feedback) = self.build_feedback(config, &set);
            streams = next_streams;
            feedback = next_feedback;
        }

        Ok(attempts)
    }

    /// Branch every current stream into `branching_factor` candidates,
    /// retrying unparseable attacker replies up to `attack_max_attempts`.
    /// Returns `Ok(None)` when no branch across any stream survived (the
    /// empty-candidate guard).
    async fn branch(
        &self,
        config: &Configuration,
        cancel: &CancellationToken,
        streams: &[Stream],
        feedback: &[String],
        depth: usize,
        attempts: &[AttemptRecord],
    ) -> Result<Option<CandidateSet>, EngineError> {
        let mut set = CandidateSet::default();

        for (s, stream) in streams.iter().enumerate() {
            let mut base = stream.clone();
            base.push_user(feedback[s].clone());

            for b in 0..config.branching_factor {
                let mut branch = base.branch(depth, b);
                let mut accepted = None;

                for attempt in 0..config.attack_max_attempts {
                    let dialog = branch.to_dialog();
                    match self.attacker.generate(cancel, &dialog, 1).await {
                        Ok(replies) => {
                            let text = replies.into_iter().next().unwrap_or_default();
                            if let Some(result) = parse_attack_result(&text) {
                                accepted = Some((text, result));
                                break;
                            }
                            tracing::debug!(stream = s, branch = b, depth, attempt, "attacker reply unparseable, retrying");
                        }
                        Err(GeneratorError::Cancelled) => {
                            return Err(EngineError::Cancelled {
                                attempts: attempts.to_vec(),
                            });
                        }
                        Err(err @ GeneratorError::Transport(_)) => {
                            return Err(EngineError::Generator(err));
                        }
                    }
                }

                match accepted {
                    Some((text, result)) => {
                        branch.push_assistant(text);
                        set.push_branch(result.prompt.as_str().to_string(), result.improvement.clone(), branch, result);
                    }
                    None => {
                        tracing::warn!(stream = s, branch = b, depth, "branch dropped: attacker retries exhausted");
                    }
                }
            }
        }

        Ok(if set.is_empty() { None } else { Some(set) })
    }

    async fn score_on_topic(&self, goal: &str, cancel: &CancellationToken, set: &CandidateSet) -> Vec<f64> {
        let goal = goal.to_string();
        fan_out(set.len(), cancel, 1.0, |i| {
            let judge = Arc::clone(&self.judge);
            let goal = goal.clone();
            let prompt = set.prompts[i].clone();
            let cancel = cancel.clone();
            async move {
                let dialog = Dialog {
                    system: templates::on_topic_system_prompt(&goal),
                    turns: Vec::new(),
                    open_turn: Some(templates::on_topic_user_prompt(&prompt)),
                };
                match judge.generate(&cancel, &dialog, 1).await {
                    Ok(replies) => parse_on_topic(&replies.into_iter().next().unwrap_or_default()),
                    Err(_) => 1.0,
                }
            }
        })
        .await
    }

    async fn query_target(&self, cancel: &CancellationToken, set: &CandidateSet) -> Vec<String> {
        fan_out(set.len(), cancel, String::new(), |i| {
            let target = Arc::clone(&self.target);
            let prompt = set.prompts[i].clone();
            let cancel = cancel.clone();
            async move {
                let dialog = Dialog {
                    system: String::new(),
                    turns: Vec::new(),
                    open_turn: Some(prompt),
                };
                match target.generate(&cancel, &dialog, 1).await {
                    Ok(replies) => replies.into_iter().next().unwrap_or_default(),
                    Err(_) => String::new(),
                }
            }
        })
        .await
    }

    async fn score_judge(&self, goal: &str, cancel: &CancellationToken, set: &CandidateSet, targets: &[String]) -> Vec<i32> {
        let goal = goal.to_string();
        fan_out(set.len(), cancel, 1, |i| {
            let judge = Arc::clone(&self.judge);
            let goal = goal.clone();
            let prompt = set.prompts[i].clone();
            let target_output = targets[i].clone();
            let cancel = cancel.clone();
            async move {
                let dialog = Dialog {
                    system: templates::judge_system_prompt(&goal),
                    turns: Vec::new(),
                    open_turn: Some(templates::judge_user_prompt(&prompt, &target_output)),
                };
                match judge.generate(&cancel, &dialog, 1).await {
                    Ok(replies) => parse_judge_rating(&replies.into_iter().next().unwrap_or_default()),
                    Err(_) => 1,
                }
            }
        })
        .await
    }

    /// Feedback for each surviving candidate: the formatted
    /// target/goal/score string, plus its truncated conversation as the
    /// next depth's stream.
    fn build_feedback(&self, config: &Configuration, set: &CandidateSet) -> (Vec<Stream>, Vec<String>) {
        let target_outputs = set.target_outputs.clone().unwrap_or_default();
        let judge_scores = set.judge_scores.clone().unwrap_or_default();

        let mut next_streams = Vec::with_capacity(set.len());
        let mut next_feedback = Vec::with_capacity(set.len());
        for i in 0..set.len() {
            let mut conversation = set.conversations[i].clone();
            conversation.truncate(config.keep_last_n);
            next_feedback.push(templates::feedback_message(&config.goal, &target_outputs[i], judge_scores[i]));
            next_streams.push(conversation);
        }
        (next_streams, next_feedback)
    }
}
