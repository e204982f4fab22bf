//! Select operation: broadcast an actor's cursor range

use crate::crdt::split_text::{SplitNodePos, Text};
use crate::error::Result;
use crate::ticket::Ticket;
use serde::{Deserialize, Serialize};

/// Sets the issuing actor's selection on a text element
///
/// Selections are ephemeral presence state; replay is last-writer-wins per
/// actor and never fails on stale tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOp {
    parent_created_at: Ticket,
    from: SplitNodePos,
    to: SplitNodePos,
    executed_at: Ticket,
}

impl SelectOp {
    /// Create a select operation
    pub fn new(
        parent_created_at: Ticket,
        from: SplitNodePos,
        to: SplitNodePos,
        executed_at: Ticket,
    ) -> Self {
        Self {
            parent_created_at,
            from,
            to,
            executed_at,
        }
    }

    /// Apply this selection to a replica of the target element
    pub fn execute(&self, text: &mut Text) -> Result<()> {
        text.select(self.from.clone(), self.to.clone(), &self.executed_at);
        Ok(())
    }

    /// Creation ticket of the element this operation targets
    pub fn parent_created_at(&self) -> &Ticket {
        &self.parent_created_at
    }

    /// Start of the selected range
    pub fn from(&self) -> &SplitNodePos {
        &self.from
    }

    /// End of the selected range
    pub fn to(&self) -> &SplitNodePos {
        &self.to
    }

    /// Ticket at which this selection was issued
    pub fn executed_at(&self) -> &Ticket {
        &self.executed_at
    }
}
