//! SplitSequence: the ordered chain of split nodes
//!
//! The sequence owns every node in an arena rooted at a head sentinel and
//! keeps an ordered id index alongside the chain. The index answers exact
//! lookups and, because ids order by `(created_at, offset)`, floor lookups:
//! a remote position may name a rune boundary inside a node this replica has
//! not split yet, and the floor query finds the fragment the boundary falls
//! into so it can be split on demand.

use super::node::{NodeRef, SplitNode, SplitNodeId, SplitNodePos, TextValue};
use crate::error::{Result, TextError};
use crate::ticket::Ticket;
use crate::ActorId;
use std::collections::{BTreeMap, HashMap};

/// Arena index of the head sentinel
const HEAD: NodeRef = 0;

/// Ordered, singly-linked chain of [`SplitNode`]s rooted at a head sentinel
///
/// Nodes are never deallocated; deletion tombstones them in place so that
/// concurrent operations can still resolve structural references into the
/// chain. Visible content is the concatenation of non-tombstoned nodes in
/// chain order.
#[derive(Debug, Clone)]
pub struct SplitSequence {
    /// Node arena; the chain is threaded through `next` links
    nodes: Vec<SplitNode>,

    /// Id index kept in sync with every structural mutation
    index: BTreeMap<SplitNodeId, NodeRef>,
}

impl SplitSequence {
    /// Create an empty sequence holding only the head sentinel
    pub fn new() -> Self {
        let head = SplitNode::new(SplitNodeId::initial(), TextValue::default());
        let mut index = BTreeMap::new();
        index.insert(head.id().clone(), HEAD);
        Self {
            nodes: vec![head],
            index,
        }
    }

    /// Look up a node by id
    pub fn find_node(&self, id: &SplitNodeId) -> Option<&SplitNode> {
        self.index.get(id).map(|&r| &self.nodes[r])
    }

    /// Splice `node` into the chain immediately after the node named by
    /// `anchor` and register it in the index
    ///
    /// An anchor absent from this sequence is a structural inconsistency and
    /// fails hard rather than guessing a position.
    pub fn insert_after(&mut self, anchor: &SplitNodeId, node: SplitNode) -> Result<&SplitNode> {
        let anchor_ref = *self
            .index
            .get(anchor)
            .ok_or_else(|| TextError::NodeNotFound { id: anchor.clone() })?;
        let r = self.splice_after(anchor_ref, node);
        Ok(&self.nodes[r])
    }

    /// Nodes in chain order, head sentinel excluded, tombstones included
    pub fn nodes(&self) -> impl Iterator<Item = &SplitNode> {
        NodeIter {
            seq: self,
            cur: self.nodes[HEAD].next,
        }
    }

    /// Rune count of the visible content
    pub fn visible_len(&self) -> usize {
        self.nodes().map(|n| n.visible_len()).sum()
    }

    /// Visible content in chain order
    pub fn content(&self) -> String {
        self.nodes()
            .filter(|n| !n.is_removed())
            .map(|n| n.content())
            .collect()
    }

    /// Diagnostic rendering of every node including tombstones
    ///
    /// Visible nodes render as `[id content]`, tombstoned ones as
    /// `{id content}`. Not a stable wire format.
    pub fn annotated_string(&self) -> String {
        let mut out = String::new();
        for node in self.nodes() {
            if node.is_removed() {
                out.push_str(&format!("{{{} {}}}", node.id(), node.content()));
            } else {
                out.push_str(&format!("[{} {}]", node.id(), node.content()));
            }
        }
        out
    }

    /// Resolve integer rune offsets into structural positions
    ///
    /// Walks the visible content; a boundary falling strictly inside a node
    /// splits it in place, so every returned position names the end of an
    /// existing node (or the head sentinel at offset zero). Requires
    /// `from <= to` and both offsets within `[0, visible_len]`; violations
    /// fail fast and never clamp.
    pub fn resolve_range(
        &mut self,
        from: usize,
        to: usize,
    ) -> Result<(SplitNodePos, SplitNodePos)> {
        let visible_len = self.visible_len();
        if from > to || to > visible_len {
            return Err(TextError::InvalidRange {
                from,
                to,
                visible_len,
            });
        }

        let from_pos = self.find_boundary(from)?;
        if from == to {
            return Ok((from_pos.clone(), from_pos));
        }
        let to_pos = self.find_boundary(to)?;
        Ok((from_pos, to_pos))
    }

    /// Apply one edit: tombstone the range, then insert the new content
    ///
    /// `latest_created_at_by_actor` is the editing actor's record of the
    /// latest creation it had observed per actor; `None` marks a local edit
    /// with no restriction. Nodes created by actors the editor had not yet
    /// observed (absent entry, or a creation strictly after the recorded
    /// ticket) are concurrent insertions the editor could not have intended
    /// to delete, and survive.
    ///
    /// Returns the cursor position after the edit and the per-actor map of
    /// the latest creations this edit visited; a remote replica replaying
    /// the edit with that map reproduces the identical outcome.
    pub fn apply_edit(
        &mut self,
        from: &SplitNodePos,
        to: &SplitNodePos,
        latest_created_at_by_actor: Option<&HashMap<ActorId, Ticket>>,
        content: &str,
        edited_at: &Ticket,
    ) -> Result<(SplitNodePos, HashMap<ActorId, Ticket>)> {
        // 01. split nodes at both boundaries
        let (to_left, to_right) = self.find_node_with_split(to, edited_at)?;
        let (from_left, from_right) = self.find_node_with_split(from, edited_at)?;

        // 02. tombstone nodes strictly between the boundaries
        let mut updated: HashMap<ActorId, Ticket> = HashMap::new();
        let mut cur = from_right;
        while cur != to_right {
            let Some(r) = cur else { break };

            let actor = self.nodes[r].actor().to_string();
            let created_at = self.nodes[r].created_at().clone();
            let gate = latest_created_at_by_actor
                .map(|m| m.get(&actor).cloned().unwrap_or_else(Ticket::initial));
            self.nodes[r].remove(edited_at, gate.as_ref());

            // Record every visited creation so a replay sees what this edit saw.
            updated
                .entry(actor)
                .and_modify(|t| {
                    if created_at.after(t) {
                        *t = created_at.clone();
                    }
                })
                .or_insert(created_at);

            cur = self.nodes[r].next;
        }

        // 03. insert the new content after the from boundary
        let cursor = if content.is_empty() {
            let caret = to_right.unwrap_or(to_left);
            SplitNodePos::new(self.nodes[caret].id().clone(), 0)
        } else {
            let node = SplitNode::new(
                SplitNodeId::new(edited_at.clone(), 0),
                TextValue::new(content),
            );
            let inserted = self.splice_after(from_left, node);
            self.nodes[inserted].ins_prev = Some(from_left);
            SplitNodePos::new(
                self.nodes[inserted].id().clone(),
                self.nodes[inserted].content_len(),
            )
        };

        Ok((cursor, updated))
    }

    /// Structurally independent copy of the whole chain
    ///
    /// Two clearly separated passes: first a structural copy of every node
    /// in chain order after a fresh sentinel, then a relation-resolution
    /// pass that re-resolves each insertion predecessor by id against the
    /// copy's index. Resolving against a partially built index would be
    /// unsound, hence the strict separation. An unresolved predecessor is a
    /// structural inconsistency in the source and fails hard.
    pub fn deep_copy(&self) -> Result<SplitSequence> {
        let mut copy = SplitSequence::new();

        // Pass 1: structural copy in chain order.
        let mut anchor = SplitNodeId::initial();
        for node in self.nodes() {
            copy.insert_after(&anchor, node.deep_copy())?;
            anchor = node.id().clone();
        }

        // Pass 2: resolve predecessor relations in the new index.
        let mut cur = self.nodes[HEAD].next;
        while let Some(r) = cur {
            if let Some(p) = self.nodes[r].ins_prev {
                let pred_id = self.nodes[p].id().clone();
                let new_pred = *copy
                    .index
                    .get(&pred_id)
                    .ok_or(TextError::MissingPredecessor { id: pred_id })?;
                let new_ref = *copy
                    .index
                    .get(self.nodes[r].id())
                    .ok_or_else(|| TextError::NodeNotFound {
                        id: self.nodes[r].id().clone(),
                    })?;
                copy.nodes[new_ref].ins_prev = Some(new_pred);
            }
            cur = self.nodes[r].next;
        }

        Ok(copy)
    }

    /// Splice a detached node into the chain right after `anchor`
    ///
    /// Every id enters the index exactly once; a duplicate means a creation
    /// was replayed and would leave the index pointing away from a node
    /// still in the chain.
    fn splice_after(&mut self, anchor: NodeRef, mut node: SplitNode) -> NodeRef {
        let r = self.nodes.len();
        node.next = self.nodes[anchor].next;
        let displaced = self.index.insert(node.id().clone(), r);
        debug_assert!(displaced.is_none(), "duplicate node id {}", node.id());
        self.nodes.push(node);
        self.nodes[anchor].next = Some(r);
        r
    }

    /// Resolve a visible rune offset to the node whose content ends there,
    /// splitting that node when the offset falls strictly inside it
    ///
    /// Offset zero resolves to the head sentinel. The caller has already
    /// validated the offset against the visible length.
    fn find_boundary(&mut self, offset: usize) -> Result<SplitNodePos> {
        let mut cur = HEAD;
        let mut remaining = offset;

        while remaining > 0 {
            let Some(next) = self.nodes[cur].next else {
                // Unreachable after range validation; report rather than panic.
                return Err(TextError::InvalidRange {
                    from: offset,
                    to: offset,
                    visible_len: self.visible_len(),
                });
            };
            let len = self.nodes[next].visible_len();
            if len == 0 {
                cur = next;
                continue;
            }
            if remaining < len {
                self.split_in_place(next, remaining)?;
            }
            if remaining <= len {
                cur = next;
                break;
            }
            remaining -= len;
            cur = next;
        }

        Ok(SplitNodePos::new(
            self.nodes[cur].id().clone(),
            self.nodes[cur].content_len(),
        ))
    }

    /// Split the node at `r` so a boundary falls at rune `offset` within it
    ///
    /// No-op when the offset already coincides with the node's start or end.
    /// The right fragment records the left one as its insertion predecessor,
    /// keeping split lineage reconstructible.
    fn split_in_place(&mut self, r: NodeRef, offset: usize) -> Result<()> {
        let len = self.nodes[r].content_len();
        if offset > len {
            return Err(TextError::InvalidSplit {
                id: self.nodes[r].id().clone(),
                offset,
                len,
            });
        }
        if offset == 0 || offset == len {
            return Ok(());
        }

        let right = self.nodes[r].split(offset);
        let right_ref = self.splice_after(r, right);
        self.nodes[right_ref].ins_prev = Some(r);
        Ok(())
    }

    /// Resolve a structural position to its boundary in this chain
    ///
    /// Computes the position's absolute lineage id, finds the fragment the
    /// boundary falls into via a floor lookup (preferring the left fragment
    /// when the boundary coincides with a fragment start), splits on demand,
    /// then skips forward past nodes created strictly after `edited_at`.
    /// That last step is the deterministic tie-break for concurrent
    /// insertions at one anchor: an older edit arriving late steps past
    /// newer content, so repeated inserts at one point order
    /// most-recent-first on every replica.
    ///
    /// Returns the node ending at the boundary and its successor.
    fn find_node_with_split(
        &mut self,
        pos: &SplitNodePos,
        edited_at: &Ticket,
    ) -> Result<(NodeRef, Option<NodeRef>)> {
        let abs = pos.absolute_id();
        let mut r = self.find_floor_prefer_left(&abs)?;

        let relative = abs.offset() - self.nodes[r].id().offset();
        self.split_in_place(r, relative)?;

        while let Some(next) = self.nodes[r].next {
            if !self.nodes[next].created_at().after(edited_at) {
                break;
            }
            r = next;
        }

        Ok((r, self.nodes[r].next))
    }

    /// Greatest fragment of `id`'s lineage starting at or before `id`,
    /// stepping to the preceding fragment when `id` names a fragment start
    ///
    /// A boundary that coincides with a fragment start belongs to the end of
    /// the fragment on its left; anchoring there keeps boundary positions
    /// end-inclusive. Missing lineage entries indicate a broken
    /// causal-delivery precondition and fail hard.
    fn find_floor_prefer_left(&self, id: &SplitNodeId) -> Result<NodeRef> {
        let r = self
            .find_floor(id)
            .ok_or_else(|| TextError::NodeNotFound { id: id.clone() })?;

        if id.offset() > 0 && self.nodes[r].id().offset() == id.offset() {
            return self
                .index
                .range(..id.clone())
                .next_back()
                .filter(|(k, _)| k.has_same_created_at(id))
                .map(|(_, &left)| left)
                .ok_or_else(|| TextError::MissingPredecessor { id: id.clone() });
        }

        Ok(r)
    }

    /// Greatest index entry `<= id` within the same lineage
    fn find_floor(&self, id: &SplitNodeId) -> Option<NodeRef> {
        self.index
            .range(..=id.clone())
            .next_back()
            .filter(|(k, _)| k.has_same_created_at(id))
            .map(|(_, &r)| r)
    }
}

impl Default for SplitSequence {
    fn default() -> Self {
        Self::new()
    }
}

struct NodeIter<'a> {
    seq: &'a SplitSequence,
    cur: Option<NodeRef>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a SplitNode;

    fn next(&mut self) -> Option<Self::Item> {
        let r = self.cur?;
        let node = &self.seq.nodes[r];
        self.cur = node.next;
        Some(node)
    }
}
