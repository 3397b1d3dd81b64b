//! Lineage identifiers for attacker streams and branches.
//!
//! `StreamId` and `BranchId` are opaque labels used for trace/debug only:
//! the engine never branches on their values, only on the conversation
//! state they are attached to.

use std::fmt;

/// Identifies one of the `n_streams` independent attacker conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct StreamId(usize);

impl StreamId {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stream-{}", self.0)
    }
}

/// Identifies a single branch produced from a stream at a given depth.
///
/// Encodes `(stream, depth, branch)` so two branches never collide even
/// when produced on the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct BranchId {
    stream: StreamId,
    depth: usize,
    branch: usize,
}

impl BranchId {
    #[must_use]
    pub fn new(stream: StreamId, depth: usize, branch: usize) -> Self {
        Self {
            stream,
            depth,
            branch,
        }
    }

    #[must_use]
    pub fn stream(self) -> StreamId {
        self.stream
    }

    #[must_use]
    pub fn depth(self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn branch(self) -> usize {
        self.branch
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.stream.0, self.depth, self.branch)
    }
}
