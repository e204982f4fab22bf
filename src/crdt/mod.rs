//! CRDT (Conflict-free Replicated Data Type) implementations
//!
//! This module contains the replicated data structures the document engine
//! is built on. Currently that is the split-node text sequence; element
//! types share the ticket-gated tombstone model so that concurrent edits
//! converge without coordination.

pub mod split_text;

pub use split_text::Text;
