//! Text: the editable element built on one split sequence
//!
//! Owns the sequence, per-actor selections, and the element lifecycle
//! tickets. Selections are ephemeral last-writer-wins state: they never
//! merge, never error, and are excluded from document content.

use super::node::{SplitNode, SplitNodePos};
use super::sequence::SplitSequence;
use crate::error::Result;
use crate::ticket::Ticket;
use crate::ActorId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An actor's cursor range, timestamped for last-writer-wins replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    from: SplitNodePos,
    to: SplitNodePos,
    updated_at: Ticket,
}

impl Selection {
    /// Create a selection
    pub fn new(from: SplitNodePos, to: SplitNodePos, updated_at: Ticket) -> Self {
        Self {
            from,
            to,
            updated_at,
        }
    }

    /// Start of the selected range
    pub fn from(&self) -> &SplitNodePos {
        &self.from
    }

    /// End of the selected range
    pub fn to(&self) -> &SplitNodePos {
        &self.to
    }

    /// Ticket that set this selection
    pub fn updated_at(&self) -> &Ticket {
        &self.updated_at
    }
}

/// Replicated text element
///
/// # Example
///
/// ```rust
/// use coedit_core::{Text, Ticket};
///
/// let t1 = Ticket::new(1, "a".to_string());
/// let mut text = Text::new(t1);
///
/// let t2 = Ticket::new(2, "a".to_string());
/// let (from, to) = text.create_range(0, 0).unwrap();
/// text.edit(&from, &to, None, "Hello", &t2).unwrap();
///
/// assert_eq!(text.content(), "Hello");
/// assert_eq!(text.marshal(), "\"Hello\"");
/// ```
#[derive(Debug, Clone)]
pub struct Text {
    sequence: SplitSequence,
    selections: HashMap<ActorId, Selection>,
    created_at: Ticket,
    updated_at: Option<Ticket>,
    removed_at: Option<Ticket>,
}

impl Text {
    /// Create an empty text element
    pub fn new(created_at: Ticket) -> Self {
        Self {
            sequence: SplitSequence::new(),
            selections: HashMap::new(),
            created_at,
            updated_at: None,
            removed_at: None,
        }
    }

    /// Creation ticket of this element
    pub fn created_at(&self) -> &Ticket {
        &self.created_at
    }

    /// Ticket of the last mutation, as recorded by the owning layer
    pub fn updated_at(&self) -> Option<&Ticket> {
        self.updated_at.as_ref()
    }

    /// Record the ticket of the latest mutation
    pub fn set_updated_at(&mut self, updated_at: Ticket) {
        self.updated_at = Some(updated_at);
    }

    /// Removal ticket, if the whole element is tombstoned
    pub fn removed_at(&self) -> Option<&Ticket> {
        self.removed_at.as_ref()
    }

    /// Whether the whole element is tombstoned
    pub fn is_removed(&self) -> bool {
        self.removed_at.is_some()
    }

    /// Tombstone the whole element
    ///
    /// Applies only when unset or when `removed_at` strictly follows the
    /// stored ticket; returns whether the tombstone was applied. A stale
    /// ticket is an idempotent no-op, not an error.
    pub fn remove(&mut self, removed_at: &Ticket) -> bool {
        match &self.removed_at {
            Some(current) if !removed_at.after(current) => false,
            _ => {
                self.removed_at = Some(removed_at.clone());
                true
            }
        }
    }

    /// Resolve integer rune offsets into structural positions
    pub fn create_range(&mut self, from: usize, to: usize) -> Result<(SplitNodePos, SplitNodePos)> {
        self.sequence.resolve_range(from, to)
    }

    /// Apply an edit between two structural positions
    ///
    /// Delegates to the sequence and returns the cursor plus the per-actor
    /// latest-creation map a replica needs to replay the edit identically.
    pub fn edit(
        &mut self,
        from: &SplitNodePos,
        to: &SplitNodePos,
        latest_created_at_by_actor: Option<&HashMap<ActorId, Ticket>>,
        content: &str,
        edited_at: &Ticket,
    ) -> Result<(SplitNodePos, HashMap<ActorId, Ticket>)> {
        let result = self.sequence.apply_edit(
            from,
            to,
            latest_created_at_by_actor,
            content,
            edited_at,
        )?;
        tracing::debug!(
            actor = edited_at.actor(),
            sequence = %self.sequence.annotated_string(),
            "applied edit"
        );
        Ok(result)
    }

    /// Set an actor's selection, last-writer-wins per actor
    ///
    /// A ticket not strictly later than the stored one is silently dropped.
    pub fn select(&mut self, from: SplitNodePos, to: SplitNodePos, updated_at: &Ticket) {
        let stale = self
            .selections
            .get(updated_at.actor())
            .is_some_and(|prev| !updated_at.after(prev.updated_at()));
        if stale {
            return;
        }

        tracing::debug!(actor = updated_at.actor(), "selection updated");
        self.selections.insert(
            updated_at.actor().to_string(),
            Selection::new(from, to, updated_at.clone()),
        );
    }

    /// Current selection of an actor, if any
    pub fn selection(&self, actor: &str) -> Option<&Selection> {
        self.selections.get(actor)
    }

    /// Structurally independent copy of this element
    ///
    /// Copies the sequence in two passes (structure, then predecessor
    /// resolution against the copy's own index). Selections are ephemeral
    /// and not carried over.
    pub fn deep_copy(&self) -> Result<Text> {
        Ok(Text {
            sequence: self.sequence.deep_copy()?,
            selections: HashMap::new(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
            removed_at: self.removed_at.clone(),
        })
    }

    /// Visible content in chain order
    pub fn content(&self) -> String {
        self.sequence.content()
    }

    /// Rune count of the visible content
    pub fn visible_len(&self) -> usize {
        self.sequence.visible_len()
    }

    /// Visible content as a quoted string with reserved characters escaped
    pub fn marshal(&self) -> String {
        serde_json::Value::String(self.sequence.content()).to_string()
    }

    /// Nodes in chain order, tombstones included, for rendering and
    /// diagnostics
    pub fn nodes(&self) -> impl Iterator<Item = &SplitNode> {
        self.sequence.nodes()
    }

    /// Diagnostic rendering of the underlying sequence
    pub fn annotated_string(&self) -> String {
        self.sequence.annotated_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crdt::split_text::SplitNodeId;
    use crate::error::TextError;

    fn ticket(lamport: u64, actor: &str) -> Ticket {
        Ticket::new(lamport, actor.to_string())
    }

    fn edit(text: &mut Text, from: usize, to: usize, content: &str, at: &Ticket) {
        let (from_pos, to_pos) = text.create_range(from, to).unwrap();
        text.edit(&from_pos, &to_pos, None, content, at).unwrap();
    }

    #[test]
    fn test_edit_and_content() {
        let mut text = Text::new(ticket(1, "a"));
        edit(&mut text, 0, 0, "Hello World", &ticket(2, "a"));
        edit(&mut text, 0, 5, "Hi", &ticket(3, "a"));

        assert_eq!(text.content(), "Hi World");
        assert_eq!(text.visible_len(), 8);
    }

    #[test]
    fn test_create_range_rejects_bad_input() {
        let mut text = Text::new(ticket(1, "a"));
        assert!(matches!(
            text.create_range(1, 0),
            Err(TextError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_marshal_escapes_reserved_characters() {
        let mut text = Text::new(ticket(1, "a"));
        edit(&mut text, 0, 0, "say \"hi\"\n", &ticket(2, "a"));

        assert_eq!(text.marshal(), "\"say \\\"hi\\\"\\n\"");
    }

    #[test]
    fn test_selection_last_writer_wins() {
        let mut text = Text::new(ticket(1, "a"));
        edit(&mut text, 0, 0, "Hello", &ticket(2, "a"));
        let (from, to) = text.create_range(0, 2).unwrap();

        text.select(from.clone(), to.clone(), &ticket(3, "a"));
        assert_eq!(text.selection("a").unwrap().updated_at(), &ticket(3, "a"));

        // A strictly later ticket replaces the stored selection.
        let (from2, to2) = text.create_range(1, 4).unwrap();
        text.select(from2.clone(), to2.clone(), &ticket(5, "a"));
        let stored = text.selection("a").unwrap();
        assert_eq!(stored.updated_at(), &ticket(5, "a"));
        assert_eq!(stored.from(), &from2);
        assert_eq!(stored.to(), &to2);

        // Stale and equal tickets are silently dropped.
        text.select(from, to, &ticket(4, "a"));
        assert_eq!(text.selection("a").unwrap().updated_at(), &ticket(5, "a"));
        text.select(from2, to2, &ticket(5, "a"));
        assert_eq!(text.selection("a").unwrap().updated_at(), &ticket(5, "a"));
    }

    #[test]
    fn test_selections_are_per_actor() {
        let mut text = Text::new(ticket(1, "a"));
        edit(&mut text, 0, 0, "Hello", &ticket(2, "a"));

        let (from, to) = text.create_range(0, 1).unwrap();
        text.select(from.clone(), to.clone(), &ticket(3, "a"));
        text.select(from, to, &ticket(3, "b"));

        assert!(text.selection("a").is_some());
        assert!(text.selection("b").is_some());
        assert!(text.selection("c").is_none());
    }

    #[test]
    fn test_remove_is_monotonic() {
        let mut text = Text::new(ticket(1, "a"));

        assert!(text.remove(&ticket(3, "a")));
        assert!(text.is_removed());

        // Stale or equal tickets are no-ops signalled by the return value.
        assert!(!text.remove(&ticket(2, "b")));
        assert!(!text.remove(&ticket(3, "a")));
        assert_eq!(text.removed_at(), Some(&ticket(3, "a")));

        assert!(text.remove(&ticket(4, "b")));
        assert_eq!(text.removed_at(), Some(&ticket(4, "b")));
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let mut text = Text::new(ticket(1, "a"));
        let t2 = ticket(2, "a");
        edit(&mut text, 0, 0, "Hello World", &t2);
        // Force a split so the copy has predecessor relations to resolve.
        text.create_range(0, 5).unwrap();
        let (from, to) = text.create_range(0, 2).unwrap();
        text.select(from, to, &ticket(3, "a"));

        let mut copy = text.deep_copy().unwrap();
        assert_eq!(copy.content(), text.content());
        assert_eq!(copy.annotated_string(), text.annotated_string());
        assert_eq!(copy.created_at(), text.created_at());
        assert!(copy.selection("a").is_none(), "selections are ephemeral");

        // Fragments keep their identity across the copy.
        let id = SplitNodeId::new(t2, 5);
        assert_eq!(
            copy.nodes().find(|n| n.id() == &id).unwrap().content(),
            " World"
        );

        edit(&mut copy, 0, 5, "Howdy", &ticket(4, "a"));
        assert_eq!(copy.content(), "Howdy World");
        assert_eq!(text.content(), "Hello World");
    }

    #[test]
    fn test_lifecycle_tickets() {
        let mut text = Text::new(ticket(1, "a"));
        assert_eq!(text.created_at(), &ticket(1, "a"));
        assert_eq!(text.updated_at(), None);

        text.set_updated_at(ticket(2, "a"));
        assert_eq!(text.updated_at(), Some(&ticket(2, "a")));
    }
}
