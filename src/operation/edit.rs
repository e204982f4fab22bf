//! Edit operation: replace a structural range with new content

use crate::crdt::split_text::{SplitNodePos, Text};
use crate::error::Result;
use crate::ticket::Ticket;
use crate::ActorId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Replaces the range `[from, to)` of a text element with `content`
///
/// Carries the per-actor latest-creation map captured when the edit ran
/// locally. On replay the map gates removals so the edit only tombstones
/// content its issuer had observed, which is what keeps concurrent inserts
/// alive on every replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOp {
    parent_created_at: Ticket,
    from: SplitNodePos,
    to: SplitNodePos,
    max_created_at_by_actor: HashMap<ActorId, Ticket>,
    content: String,
    executed_at: Ticket,
}

impl EditOp {
    /// Create an edit operation
    pub fn new(
        parent_created_at: Ticket,
        from: SplitNodePos,
        to: SplitNodePos,
        max_created_at_by_actor: HashMap<ActorId, Ticket>,
        content: String,
        executed_at: Ticket,
    ) -> Self {
        Self {
            parent_created_at,
            from,
            to,
            max_created_at_by_actor,
            content,
            executed_at,
        }
    }

    /// Apply this edit to a replica of the target element
    pub fn execute(&self, text: &mut Text) -> Result<()> {
        text.edit(
            &self.from,
            &self.to,
            Some(&self.max_created_at_by_actor),
            &self.content,
            &self.executed_at,
        )?;
        text.set_updated_at(self.executed_at.clone());
        Ok(())
    }

    /// Creation ticket of the element this operation targets
    pub fn parent_created_at(&self) -> &Ticket {
        &self.parent_created_at
    }

    /// Start of the replaced range
    pub fn from(&self) -> &SplitNodePos {
        &self.from
    }

    /// End of the replaced range
    pub fn to(&self) -> &SplitNodePos {
        &self.to
    }

    /// Latest creation the issuer had observed, per actor
    pub fn max_created_at_by_actor(&self) -> &HashMap<ActorId, Ticket> {
        &self.max_created_at_by_actor
    }

    /// Content inserted in place of the range
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Ticket at which this edit was issued
    pub fn executed_at(&self) -> &Ticket {
        &self.executed_at
    }
}
