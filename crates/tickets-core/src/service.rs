//! The six ticket operations, each a single read-modify-write on one ticket.

use crate::error::TicketError;
use crate::model::{Conversation, NoteId, Ticket, TicketId, TicketStatus};
use crate::store::TicketStore;
use tracing::{debug, info, warn};

fn log_failure(op: &'static str, id: &TicketId, err: &TicketError) {
    if err.is_not_found() {
        warn!(op, ticket = %id, error = %err, "addressed ticket or note does not exist");
    } else {
        warn!(op, ticket = %id, code = %err.code(), error = %err, "ticket operation failed");
    }
}

/// Aggregate operations over an injected [`TicketStore`].
///
/// Inputs are assumed to be validated already (see [`crate::api::TicketApi`]);
/// this layer enforces only the aggregate's own rules.
#[derive(Debug, Default)]
pub struct TicketService<S> {
    store: S,
}

impl<S: TicketStore> TicketService<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Open a new unassigned ticket with a fresh id.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub fn create(&self, conversation: Option<Conversation>) -> Result<Ticket, TicketError> {
        let ticket = Ticket::open(TicketId::generate(), conversation);
        let ticket = self.store.insert(ticket).inspect_err(|err| {
            warn!(op = "create", code = %err.code(), error = %err, "ticket create failed");
        })?;
        info!(
            ticket = %ticket.id(),
            conversations = ticket.conversations().len(),
            "ticket created"
        );
        Ok(ticket)
    }

    /// # Errors
    ///
    /// [`TicketError::TicketNotFound`] or a storage failure.
    pub fn read(&self, id: &TicketId) -> Result<Ticket, TicketError> {
        let ticket = self
            .store
            .get(id)
            .inspect_err(|err| log_failure("read", id, err))?;
        debug!(ticket = %id, "ticket read");
        Ok(ticket)
    }

    /// # Errors
    ///
    /// [`TicketError::TicketNotFound`] or a storage failure.
    pub fn add_conversation(
        &self,
        id: &TicketId,
        conversation: Conversation,
    ) -> Result<Ticket, TicketError> {
        let (ticket, ()) = self
            .store
            .update(id, |ticket| {
                ticket.add_conversation(conversation);
                Ok(())
            })
            .inspect_err(|err| log_failure("add_conversation", id, err))?;
        info!(
            ticket = %id,
            conversations = ticket.conversations().len(),
            "conversation added"
        );
        Ok(ticket)
    }

    /// Append an open note. A server id is allocated when `note_id` is `None`.
    ///
    /// # Errors
    ///
    /// [`TicketError::TicketNotFound`], [`TicketError::Conflict`] for a
    /// reused note id, or a storage failure.
    pub fn add_note(
        &self,
        id: &TicketId,
        note_id: Option<NoteId>,
        content: String,
    ) -> Result<Ticket, TicketError> {
        let note_id = note_id.unwrap_or_else(NoteId::generate);
        let (ticket, ()) = self
            .store
            .update(id, |ticket| {
                ticket.add_note(note_id.clone(), content)?;
                Ok(())
            })
            .inspect_err(|err| log_failure("add_note", id, err))?;
        info!(ticket = %id, note = %note_id, "note added");
        Ok(ticket)
    }

    /// Set the ticket status from its ordinal.
    ///
    /// The ticket is resolved before the ordinal is checked, so an unknown
    /// ticket reports not-found even when the status is also invalid.
    ///
    /// # Errors
    ///
    /// [`TicketError::TicketNotFound`], [`TicketError::InvalidStatus`], or a
    /// storage failure.
    pub fn update_status(&self, id: &TicketId, status: i64) -> Result<Ticket, TicketError> {
        let (ticket, previous) = self
            .store
            .update(id, |ticket| {
                let status = TicketStatus::try_from(status)?;
                Ok(ticket.set_status(status))
            })
            .inspect_err(|err| log_failure("update_status", id, err))?;
        info!(
            ticket = %id,
            from = %previous,
            to = %ticket.status(),
            "ticket status updated"
        );
        Ok(ticket)
    }

    /// Toggle a note between open and closed.
    ///
    /// # Errors
    ///
    /// [`TicketError::TicketNotFound`], [`TicketError::NoteNotFound`], or a
    /// storage failure.
    pub fn update_note_status(
        &self,
        id: &TicketId,
        note_id: &NoteId,
    ) -> Result<Ticket, TicketError> {
        let (ticket, closed) = self
            .store
            .update(id, |ticket| ticket.toggle_note(note_id))
            .inspect_err(|err| log_failure("update_note_status", id, err))?;
        info!(ticket = %id, note = %note_id, closed, "note status toggled");
        Ok(ticket)
    }
}
