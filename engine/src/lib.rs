//! THE CORE: the iterative adversarial probing engine. Conversation state,
//! candidate set, attacker/judge parsers, prompt templates, the
//! bounded-parallel dispatcher, and the engine loop that ties them together.

mod candidates;
mod conversation;
mod dispatch;
mod engine;
mod parser;
mod templates;

pub use candidates::{CandidateSet, prune, prune_indices};
pub use conversation::Stream;
pub use dispatch::fan_out;
pub use engine::{Engine, EngineError};
pub use parser::{extract_balanced_json, parse_attack_result, parse_judge_rating, parse_on_topic};
pub use templates::{
    attacker_system_prompt, feedback_message, init_message, judge_system_prompt, judge_user_prompt, on_topic_system_prompt,
    on_topic_user_prompt,
};
