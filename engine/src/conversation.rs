//! Per-stream attacker conversation state and the dialog shape built from
//! it for each generator call.

use redteam_types::{BranchId, CompletedTurn, Dialog, Role, StreamId, Turn};

/// A single attacker conversation, persistent across depths until it is
/// either pruned away or cloned into a branch.
///
/// *Cloning note*: sibling branches must not share history, so a
/// stream is cloned once per branch before the branch appends its own
/// attacker reply. `Clone` here is a shallow copy of the message list; the
/// messages themselves are immutable strings, so sharing the underlying
/// allocations across clones would be safe too, but plain `Vec` clone keeps
/// the type simple and the cost is bounded by `keep_last_n`.
#[derive(Debug, Clone)]
pub struct Stream {
    pub messages: Vec<Turn>,
    pub self_id: BranchId,
    pub parent_id: Option<BranchId>,
    pub system_prompt: String,
}

impl Stream {
    /// A fresh stream with empty history, identified as branch 0 at depth 0
    /// of `stream`.
    #[must_use]
    pub fn new(stream: StreamId, system_prompt: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            self_id: BranchId::new(stream, 0, 0),
            parent_id: None,
            system_prompt: system_prompt.into(),
        }
    }

    #[must_use]
    pub fn stream_id(&self) -> StreamId {
        self.self_id.stream()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Turn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Turn::assistant(content));
    }

    /// Produce a branch clone: same history, fresh lineage labels.
    #[must_use]
    pub fn branch(&self, depth: usize, branch: usize) -> Self {
        Self {
            messages: self.messages.clone(),
            self_id: BranchId::new(self.stream_id(), depth, branch),
            parent_id: Some(self.self_id),
            system_prompt: self.system_prompt.clone(),
        }
    }

    /// Retain only the newest `2 * keep_last_n` messages.
    pub fn truncate(&mut self, keep_last_n: usize) {
        let limit = 2 * keep_last_n;
        if self.messages.len() > limit {
            let drop_count = self.messages.len() - limit;
            self.messages.drain(0..drop_count);
        }
    }

    /// Build the dialog a generator consumes from this stream's history:
    /// the system prompt, then (user, assistant) pairs as completed turns,
    /// with a trailing unanswered user message (if any) as the open turn.
    #[must_use]
    pub fn to_dialog(&self) -> Dialog {
        let mut turns = Vec::with_capacity(self.messages.len() / 2);
        let mut pairs = self.messages.chunks_exact(2);
        for pair in &mut pairs {
            turns.push(CompletedTurn {
                user: pair[0].content.clone(),
                assistant: pair[1].content.clone(),
            });
        }
        let open_turn = pairs.remainder().first().map(|turn| {
            debug_assert_eq!(turn.role, Role::User);
            turn.content.clone()
        });
        Dialog {
            system: self.system_prompt.clone(),
            turns,
            open_turn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_assigns_fresh_lineage() {
        let stream = Stream::new(StreamId::new(0), "system");
        let branch = stream.branch(3, 1);
        assert_eq!(branch.self_id.depth(), 3);
        assert_eq!(branch.self_id.branch(), 1);
        assert_eq!(branch.parent_id, Some(stream.self_id));
        assert_eq!(branch.stream_id(), stream.stream_id());
    }

    #[test]
    fn truncate_keeps_newest_window() {
        let mut stream = Stream::new(StreamId::new(0), "system");
        for i in 0..10 {
            stream.push_user(format!("u{i}"));
            stream.push_assistant(format!("a{i}"));
        }
        stream.truncate(2);
        assert_eq!(stream.messages.len(), 4);
        assert_eq!(stream.messages[0].content, "u8");
        assert_eq!(stream.messages[3].content, "a9");
    }

    #[test]
    fn truncate_is_a_no_op_when_already_short() {
        let mut stream = Stream::new(StreamId::new(0), "system");
        stream.push_user("u0");
        stream.truncate(4);
        assert_eq!(stream.messages.len(), 1);
    }

    #[test]
    fn dialog_pairs_completed_turns_and_leaves_open_turn() {
        let mut stream = Stream::new(StreamId::new(0), "system");
        stream.push_user("feedback 1");
        stream.push_assistant("reply 1");
        stream.push_user("feedback 2");

        let dialog = stream.to_dialog();
        assert_eq!(dialog.system, "system");
        assert_eq!(dialog.turns.len(), 1);
        assert_eq!(dialog.turns[0].user, "feedback 1");
        assert_eq!(dialog.turns[0].assistant, "reply 1");
        assert_eq!(dialog.open_turn.as_deref(), Some("feedback 2"));
    }

    #[test]
    fn dialog_has_no_open_turn_on_even_history() {
        let mut stream = Stream::new(StreamId::new(0), "system");
        stream.push_user("feedback 1");
        stream.push_assistant("reply 1");
        let dialog = stream.to_dialog();
        assert!(dialog.open_turn.is_none());
    }
}
