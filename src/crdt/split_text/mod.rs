//! Split-node replicated text sequence
//!
//! An RGA variant where each node holds a run of text inserted in one
//! operation and can be split mid-run, so that any edit boundary falls
//! exactly at a node edge. Deleted nodes become tombstones rather than being
//! removed; concurrent deletions are gated on the editor's per-actor
//! "latest known creation" map so an edit never deletes content it could
//! not have seen.
//!
//! # Convergence
//!
//! Two rules make replicas converge independent of arrival order:
//! 1. Insertions at an occupied anchor skip forward past nodes created
//!    strictly after the inserting ticket, ordering repeated inserts at one
//!    point most-recent-first as a pure function of the tickets involved.
//! 2. A delete only tombstones nodes whose creation the editing actor had
//!    observed; concurrently inserted content survives.
//!
//! # Example
//!
//! ```rust
//! use coedit_core::{SplitSequence, Ticket};
//!
//! let mut seq = SplitSequence::new();
//! let t1 = Ticket::new(1, "a".to_string());
//! let (from, to) = seq.resolve_range(0, 0).unwrap();
//! seq.apply_edit(&from, &to, None, "Hello", &t1).unwrap();
//!
//! assert_eq!(seq.content(), "Hello");
//! ```

mod node;
mod sequence;
mod text;

pub use node::{SplitNode, SplitNodeId, SplitNodePos, TextValue};
pub use sequence::SplitSequence;
pub use text::{Selection, Text};
