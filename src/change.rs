//! Change context and the integer-offset editing facade
//!
//! A [`ChangeContext`] owns one actor's lamport counter and accumulates the
//! operations its local edits produce. [`TextHandle`] is the ergonomic
//! surface callers edit through: it takes rune offsets, resolves them into
//! structural positions against the local sequence, applies the edit, and
//! records the operation for broadcast.

use crate::crdt::split_text::Text;
use crate::error::Result;
use crate::operation::{EditOp, Operation, SelectOp};
use crate::ticket::Ticket;
use crate::ActorId;

/// One actor's editing session: lamport counter plus pending operations
#[derive(Debug, Clone)]
pub struct ChangeContext {
    actor: ActorId,
    lamport: u64,
    operations: Vec<Operation>,
}

impl ChangeContext {
    /// Create a context for an actor, starting at lamport zero
    pub fn new(actor: ActorId) -> Self {
        Self {
            actor,
            lamport: 0,
            operations: Vec::new(),
        }
    }

    /// Identity of the actor this context belongs to
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Current lamport value
    pub fn lamport(&self) -> u64 {
        self.lamport
    }

    /// Issue the next ticket for a local operation
    pub fn issue_ticket(&mut self) -> Ticket {
        self.lamport += 1;
        Ticket::new(self.lamport, self.actor.clone())
    }

    /// Advance the lamport counter past a remote ticket
    ///
    /// Call on receipt of every remote operation so tickets issued here
    /// afterwards compare later than everything already observed.
    pub fn acknowledge(&mut self, remote: &Ticket) {
        self.lamport = self.lamport.max(remote.lamport());
    }

    /// Operations recorded since the last drain
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Take the recorded operations, leaving the log empty
    pub fn drain_operations(&mut self) -> Vec<Operation> {
        std::mem::take(&mut self.operations)
    }

    fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }
}

/// Integer-offset editing facade over one text element
///
/// # Example
///
/// ```rust
/// use coedit_core::{ChangeContext, Text, TextHandle};
///
/// let mut ctx = ChangeContext::new("a".to_string());
/// let mut text = Text::new(ctx.issue_ticket());
///
/// TextHandle::new(&mut text, &mut ctx)
///     .edit(0, 0, "Hello")
///     .unwrap();
///
/// assert_eq!(text.content(), "Hello");
/// assert_eq!(ctx.operations().len(), 1);
/// ```
#[derive(Debug)]
pub struct TextHandle<'a> {
    text: &'a mut Text,
    ctx: &'a mut ChangeContext,
}

impl<'a> TextHandle<'a> {
    /// Wrap a text element and the editing actor's context
    pub fn new(text: &'a mut Text, ctx: &'a mut ChangeContext) -> Self {
        Self { text, ctx }
    }

    /// Replace the rune range `[from, to)` with `content`
    ///
    /// Applies the edit locally and records an [`EditOp`] carrying the
    /// structural positions and latest-creation map remote replicas need.
    /// A reversed or out-of-bounds range is rejected before any mutation.
    pub fn edit(&mut self, from: usize, to: usize, content: &str) -> Result<&mut Self> {
        let (from_pos, to_pos) = self.text.create_range(from, to)?;
        let executed_at = self.ctx.issue_ticket();

        let (_, max_created_at_by_actor) =
            self.text
                .edit(&from_pos, &to_pos, None, content, &executed_at)?;
        self.text.set_updated_at(executed_at.clone());

        self.ctx.push(Operation::Edit(EditOp::new(
            self.text.created_at().clone(),
            from_pos,
            to_pos,
            max_created_at_by_actor,
            content.to_string(),
            executed_at,
        )));
        Ok(self)
    }

    /// Select the rune range `[from, to)` as this actor's cursor
    pub fn select(&mut self, from: usize, to: usize) -> Result<&mut Self> {
        let (from_pos, to_pos) = self.text.create_range(from, to)?;
        let executed_at = self.ctx.issue_ticket();

        self.text
            .select(from_pos.clone(), to_pos.clone(), &executed_at);

        self.ctx.push(Operation::Select(SelectOp::new(
            self.text.created_at().clone(),
            from_pos,
            to_pos,
            executed_at,
        )));
        Ok(self)
    }

    /// Visible content of the wrapped element
    pub fn content(&self) -> String {
        self.text.content()
    }
}
