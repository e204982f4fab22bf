//! Operations: the replayable record of local edits
//!
//! Every local mutation produces an operation carrying structural positions
//! and the tickets a remote replica needs to apply it identically. Integer
//! offsets never cross the wire; they are resolved into positions on the
//! replica that issued the edit.

mod edit;
mod select;

pub use edit::EditOp;
pub use select::SelectOp;

use crate::crdt::split_text::Text;
use crate::error::Result;
use crate::ticket::Ticket;
use serde::{Deserialize, Serialize};

/// One recorded mutation against a text element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    Edit(EditOp),
    Select(SelectOp),
}

impl Operation {
    /// Apply this operation to a replica of the target element
    pub fn execute(&self, text: &mut Text) -> Result<()> {
        match self {
            Operation::Edit(op) => op.execute(text),
            Operation::Select(op) => op.execute(text),
        }
    }

    /// Creation ticket of the element this operation targets
    pub fn parent_created_at(&self) -> &Ticket {
        match self {
            Operation::Edit(op) => op.parent_created_at(),
            Operation::Select(op) => op.parent_created_at(),
        }
    }

    /// Ticket at which this operation was issued
    pub fn executed_at(&self) -> &Ticket {
        match self {
            Operation::Edit(op) => op.executed_at(),
            Operation::Select(op) => op.executed_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crdt::split_text::SplitNodePos;
    use std::collections::HashMap;

    fn ticket(lamport: u64, actor: &str) -> Ticket {
        Ticket::new(lamport, actor.to_string())
    }

    #[test]
    fn test_operation_round_trips_through_json() {
        let mut source = Text::new(ticket(1, "a"));
        let (from, to) = source.create_range(0, 0).unwrap();
        let edited_at = ticket(2, "a");
        let (_, updated) = source.edit(&from, &to, None, "Hello", &edited_at).unwrap();

        let op = Operation::Edit(EditOp::new(
            ticket(1, "a"),
            from,
            to,
            updated,
            "Hello".to_string(),
            edited_at,
        ));

        let json = serde_json::to_string(&op).unwrap();
        let decoded: Operation = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, op);

        let mut replica = Text::new(ticket(1, "a"));
        decoded.execute(&mut replica).unwrap();
        assert_eq!(replica.content(), "Hello");
    }

    #[test]
    fn test_operation_accessors() {
        let pos = SplitNodePos::new(crate::SplitNodeId::initial(), 0);
        let op = Operation::Select(SelectOp::new(
            ticket(1, "a"),
            pos.clone(),
            pos,
            ticket(4, "a"),
        ));

        assert_eq!(op.parent_created_at(), &ticket(1, "a"));
        assert_eq!(op.executed_at(), &ticket(4, "a"));
    }

    #[test]
    fn test_edit_replay_gates_on_recorded_map() {
        // Replica b inserted at lamport 9, after a's edit was issued at 8.
        // Replaying a's edit must not tombstone b's content.
        let mut a = Text::new(ticket(1, "a"));
        let mut b = Text::new(ticket(1, "a"));

        let (from, to) = a.create_range(0, 0).unwrap();
        let t2 = ticket(2, "a");
        let (_, map) = a.edit(&from, &to, None, "Hello", &t2).unwrap();
        let seed = Operation::Edit(EditOp::new(
            ticket(1, "a"),
            from,
            to,
            map,
            "Hello".to_string(),
            t2,
        ));
        seed.execute(&mut b).unwrap();

        let (bf, bt) = b.create_range(5, 5).unwrap();
        b.edit(&bf, &bt, None, "!", &ticket(9, "b")).unwrap();

        let (af, at) = a.create_range(0, 5).unwrap();
        let t8 = ticket(8, "a");
        let (_, map) = a.edit(&af, &at, None, "", &t8).unwrap();
        let delete = Operation::Edit(EditOp::new(
            ticket(1, "a"),
            af,
            at,
            map,
            String::new(),
            t8,
        ));
        delete.execute(&mut b).unwrap();

        assert_eq!(b.content(), "!");
    }

    #[test]
    fn test_replay_with_empty_map_blocks_removal() {
        let mut text = Text::new(ticket(1, "a"));
        let (from, to) = text.create_range(0, 0).unwrap();
        text.edit(&from, &to, None, "Hello", &ticket(2, "a")).unwrap();

        // An absent entry for the node's actor gates with the initial ticket,
        // so nothing is tombstoned.
        let (from, to) = text.create_range(0, 5).unwrap();
        let op = Operation::Edit(EditOp::new(
            ticket(1, "a"),
            from,
            to,
            HashMap::new(),
            String::new(),
            ticket(3, "b"),
        ));
        op.execute(&mut text).unwrap();

        assert_eq!(text.content(), "Hello");
    }
}
