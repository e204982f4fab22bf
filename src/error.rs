//! Error types for the replicated text core
//!
//! Two kinds of failure are distinguished: caller contract violations
//! (invalid ranges) and structural inconsistencies (positions or
//! predecessors referencing nodes the sequence does not know about, which
//! indicate a broken causal-delivery precondition or corrupted state).
//! Stale timestamped writes are never errors; they are idempotent no-ops.

use crate::crdt::split_text::SplitNodeId;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, TextError>;

/// Error type for text sequence operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    /// Range violates the caller contract: `from > to` or an offset outside
    /// the visible length. Never silently clamped.
    #[error("invalid range {from}..{to} (visible length: {visible_len})")]
    InvalidRange {
        from: usize,
        to: usize,
        visible_len: usize,
    },

    /// A position or anchor references a node absent from the sequence index
    #[error("node not found: {id}")]
    NodeNotFound { id: SplitNodeId },

    /// Split offset outside `[0, len]` for the named node
    #[error("invalid split of node {id} (length {len}) at offset {offset}")]
    InvalidSplit {
        id: SplitNodeId,
        offset: usize,
        len: usize,
    },

    /// An insertion predecessor failed to resolve, either while anchoring a
    /// boundary on a split fragment or while re-resolving during deep copy
    #[error("insertion predecessor missing for node {id}")]
    MissingPredecessor { id: SplitNodeId },
}
