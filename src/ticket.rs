//! Ticket: logical timestamp with total ordering
//!
//! A ticket combines a monotonically increasing Lamport counter with the
//! identity of the actor that issued it. Tickets totally order all
//! operations in a document: first by counter, then by actor identity as a
//! deterministic tiebreaker for concurrent operations. Everything in the
//! replicated sequence (node identity, tombstoning, selection LWW, element
//! removal) is gated on this order.

use crate::ActorId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Logical timestamp carrying an actor identity and a Lamport counter
///
/// # Ordering
///
/// Tickets are ordered by `(lamport, actor)` lexicographically. Two tickets
/// are equal only when both fields match, so the order is total across all
/// replicas of a document.
///
/// # Example
///
/// ```rust
/// use coedit_core::Ticket;
///
/// let a = Ticket::new(1, "actor-a".to_string());
/// let b = Ticket::new(1, "actor-b".to_string());
/// let c = Ticket::new(2, "actor-a".to_string());
///
/// assert!(b.after(&a)); // same counter, actor breaks the tie
/// assert!(c.after(&b));
/// assert!(!a.after(&a)); // strict: a ticket never follows itself
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    /// Lamport counter (monotonically increasing per actor)
    lamport: u64,

    /// Identity of the issuing actor
    actor: ActorId,
}

impl Ticket {
    /// Create a new ticket
    pub fn new(lamport: u64, actor: ActorId) -> Self {
        Self { lamport, actor }
    }

    /// The sentinel timestamp preceding every real ticket
    ///
    /// Used for the head sentinel of a sequence and as the "creator unknown"
    /// bound when gating removals.
    pub fn initial() -> Self {
        Self {
            lamport: 0,
            actor: ActorId::new(),
        }
    }

    /// Lamport counter of this ticket
    pub fn lamport(&self) -> u64 {
        self.lamport
    }

    /// Identity of the issuing actor
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Whether this ticket strictly follows `other` in the total order
    pub fn after(&self, other: &Ticket) -> bool {
        self > other
    }
}

impl Ord for Ticket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lamport
            .cmp(&other.lamport)
            .then_with(|| self.actor.cmp(&other.actor))
    }
}

impl PartialOrd for Ticket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.actor, self.lamport)
    }
}
