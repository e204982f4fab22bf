//! CoEdit Core - Replicated text for real-time collaborative editing
//!
//! This crate implements the replicated sequence at the heart of a
//! collaborative document engine:
//! - Split-node replicated sequence (an RGA variant with mid-node splitting)
//! - The `Text` element built on top of it, with per-actor selections
//! - Logical tickets for ordering and gating concurrent operations
//! - An operation log so edits replay bit-for-bit on remote replicas
//!
//! Every replica applies operations one at a time against its own sequence.
//! Given causal delivery, replicas converge regardless of the arrival order
//! of causally independent edits.
//!
//! # Examples
//!
//! ```rust
//! use coedit_core::{ChangeContext, Text, TextHandle};
//!
//! let mut ctx = ChangeContext::new("actor-a".to_string());
//! let mut text = Text::new(ctx.issue_ticket());
//!
//! let mut handle = TextHandle::new(&mut text, &mut ctx);
//! handle.edit(0, 0, "Hello World").unwrap();
//! handle.edit(0, 5, "Hi").unwrap();
//!
//! assert_eq!(text.content(), "Hi World");
//! ```

pub mod change;
pub mod crdt;
pub mod error;
pub mod operation;
pub mod ticket;

// Re-exports for convenience
pub use change::{ChangeContext, TextHandle};
pub use crdt::split_text::{Selection, SplitNode, SplitNodeId, SplitNodePos, SplitSequence, Text};
pub use error::{Result, TextError};
pub use operation::{EditOp, Operation, SelectOp};
pub use ticket::Ticket;

/// Actor (replica) identifier type
pub type ActorId = String;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_import() {
        // Smoke test that modules compile
        let _actor: ActorId = "test-actor".to_string();
        let _ticket = Ticket::initial();
    }
}
