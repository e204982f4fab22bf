//! Split-node identity, positions, and content segments
//!
//! A node is a fragment of one original insertion. Its identity is the
//! ticket that created the insertion plus the rune offset where this
//! fragment begins, so all fragments of one insertion stay identifiable as
//! a single lineage after any number of splits.

use crate::ticket::Ticket;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Arena index of a node inside its owning [`SplitSequence`](super::SplitSequence)
///
/// Nodes are tombstoned rather than removed, so references stay valid for
/// the lifetime of the sequence.
pub(crate) type NodeRef = usize;

/// Identity of a split node: creating ticket plus fragment offset
///
/// # Ordering
///
/// Ids order by `(created_at, offset)`. The sequence index relies on this to
/// answer floor queries when a remote position names an offset that falls
/// inside a locally unsplit node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SplitNodeId {
    created_at: Ticket,
    offset: usize,
}

impl SplitNodeId {
    /// Create a node id
    pub fn new(created_at: Ticket, offset: usize) -> Self {
        Self { created_at, offset }
    }

    /// Id of the head sentinel of every sequence
    pub fn initial() -> Self {
        Self {
            created_at: Ticket::initial(),
            offset: 0,
        }
    }

    /// Ticket of the insertion this node descends from
    pub fn created_at(&self) -> &Ticket {
        &self.created_at
    }

    /// Rune offset of this fragment within the original insertion
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Id of the fragment starting `offset` runes further into the lineage
    pub fn split(&self, offset: usize) -> Self {
        Self {
            created_at: self.created_at.clone(),
            offset: self.offset + offset,
        }
    }

    /// Whether both ids descend from the same original insertion
    pub fn has_same_created_at(&self, other: &SplitNodeId) -> bool {
        self.created_at == other.created_at
    }
}

impl Ord for SplitNodeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.offset.cmp(&other.offset))
    }
}

impl PartialOrd for SplitNodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for SplitNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.created_at, self.offset)
    }
}

/// Structural position inside a sequence: node identity plus in-node offset
///
/// Unlike a raw integer offset, a position stays valid while unrelated edits
/// land elsewhere in the document. Edits are recorded and replayed using
/// positions for exactly that reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitNodePos {
    id: SplitNodeId,
    relative_offset: usize,
}

impl SplitNodePos {
    /// Create a position
    pub fn new(id: SplitNodeId, relative_offset: usize) -> Self {
        Self {
            id,
            relative_offset,
        }
    }

    /// Identity of the anchoring node
    pub fn id(&self) -> &SplitNodeId {
        &self.id
    }

    /// Rune offset within the anchoring node
    pub fn relative_offset(&self) -> usize {
        self.relative_offset
    }

    /// Lineage id of the exact rune boundary this position names
    ///
    /// The anchoring node may have been split differently on another
    /// replica; the absolute id is what both sides agree on.
    pub fn absolute_id(&self) -> SplitNodeId {
        self.id.split(self.relative_offset)
    }
}

impl std::fmt::Display for SplitNodePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}+{}", self.id, self.relative_offset)
    }
}

/// A mutable run of text held by one node
///
/// Lengths and split offsets count runes (`char`s), never bytes; multi-byte
/// characters count as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextValue(String);

impl TextValue {
    /// Create a value from a string
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Rune count of this value
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether the value holds no runes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the content
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Keep runes `[0, at)` in place and return a value holding `[at, end)`
    ///
    /// Callers must validate `at <= len()`; an out-of-range offset is an
    /// invariant violation surfaced by the owning sequence.
    pub(crate) fn split(&mut self, at: usize) -> TextValue {
        let byte_at = self
            .0
            .char_indices()
            .nth(at)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        TextValue(self.0.split_off(byte_at))
    }
}

impl std::fmt::Display for TextValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One link in the replicated sequence
///
/// Carries the node identity, the content segment, the tombstone marker, and
/// two kinds of links: `next` is the chain link the sequence owns, while
/// `ins_prev` is a back-reference recording which node this one was inserted
/// immediately after. The back-reference only breaks ties among nodes
/// inserted at the same anchor; it may point at a node that is no longer
/// adjacent in the chain.
#[derive(Debug, Clone)]
pub struct SplitNode {
    id: SplitNodeId,
    value: TextValue,
    removed_at: Option<Ticket>,
    pub(crate) ins_prev: Option<NodeRef>,
    pub(crate) next: Option<NodeRef>,
}

impl SplitNode {
    /// Create a detached node
    pub fn new(id: SplitNodeId, value: TextValue) -> Self {
        Self {
            id,
            value,
            removed_at: None,
            ins_prev: None,
            next: None,
        }
    }

    /// Identity of this node
    pub fn id(&self) -> &SplitNodeId {
        &self.id
    }

    /// Ticket of the insertion this node descends from
    pub fn created_at(&self) -> &Ticket {
        self.id.created_at()
    }

    /// Identity of the actor that created this node
    pub fn actor(&self) -> &str {
        self.id.created_at().actor()
    }

    /// Content of this node, tombstoned or not
    pub fn content(&self) -> &str {
        self.value.as_str()
    }

    /// Rune count of the content
    pub fn content_len(&self) -> usize {
        self.value.len()
    }

    /// Rune count contributed to the visible text (zero once tombstoned)
    pub fn visible_len(&self) -> usize {
        if self.is_removed() {
            0
        } else {
            self.value.len()
        }
    }

    /// Whether this node is tombstoned
    pub fn is_removed(&self) -> bool {
        self.removed_at.is_some()
    }

    /// Ticket that tombstoned this node, if any
    pub fn removed_at(&self) -> Option<&Ticket> {
        self.removed_at.as_ref()
    }

    /// Tombstone this node with `edited_at` if the editor had observed its
    /// creation and no equal-or-later tombstone is already in place
    ///
    /// `latest_created_at` is the editor's recorded latest known creation for
    /// this node's actor; a creation strictly after it is content the editor
    /// could not have intended to delete. `None` means the edit is local and
    /// unrestricted. Returns whether the tombstone was applied, so repeating
    /// the same edit ticket is a no-op.
    pub(crate) fn remove(&mut self, edited_at: &Ticket, latest_created_at: Option<&Ticket>) -> bool {
        if let Some(latest) = latest_created_at {
            if self.created_at().after(latest) {
                return false;
            }
        }
        match &self.removed_at {
            Some(removed_at) if !edited_at.after(removed_at) => false,
            _ => {
                self.removed_at = Some(edited_at.clone());
                true
            }
        }
    }

    /// Split the content at `at`, returning the detached right fragment
    ///
    /// The fragment keeps this node's lineage (`id.split(at)`) and tombstone
    /// state; the caller splices it into the chain immediately after this
    /// node. `at` must already be validated against `content_len()`.
    pub(crate) fn split(&mut self, at: usize) -> SplitNode {
        SplitNode {
            id: self.id.split(at),
            value: self.value.split(at),
            removed_at: self.removed_at.clone(),
            ins_prev: None,
            next: None,
        }
    }

    /// Structurally independent copy with the same identity, content, and
    /// tombstone state
    ///
    /// The insertion predecessor is intentionally dropped; the owning
    /// sequence re-resolves it by id against the copy's index in a second
    /// pass.
    pub fn deep_copy(&self) -> SplitNode {
        SplitNode {
            id: self.id.clone(),
            value: self.value.clone(),
            removed_at: self.removed_at.clone(),
            ins_prev: None,
            next: None,
        }
    }
}
