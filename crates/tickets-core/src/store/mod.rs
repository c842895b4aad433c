//! Ticket persistence behind a single transactional interface.
//!
//! The service never mutates a stored ticket in place. It hands a closure to
//! [`TicketStore::update`], which runs it against a draft copy and commits
//! the draft only if the closure succeeds. Each store decides how updates on
//! the same ticket are serialized:
//!
//! - [`MemoryStore`] keeps one mutex per ticket, so unrelated tickets never
//!   contend.
//! - [`FileStore`] holds an advisory file lock around each read-modify-write
//!   of the JSON snapshot, which also serializes separate processes.

mod file;
mod memory;

pub use file::{FileStore, SNAPSHOT_FILE, SNAPSHOT_VERSION};
pub use memory::MemoryStore;

use crate::error::TicketError;
use crate::model::{Ticket, TicketId};
use std::sync::Arc;

pub trait TicketStore: Send + Sync {
    /// Persist a new ticket.
    ///
    /// # Errors
    ///
    /// [`TicketError::Conflict`] if a ticket with the same id exists, or a
    /// storage failure.
    fn insert(&self, ticket: Ticket) -> Result<Ticket, TicketError>;

    /// Load a snapshot of one ticket.
    ///
    /// # Errors
    ///
    /// [`TicketError::TicketNotFound`] if no ticket has `id`, or a storage failure.
    fn get(&self, id: &TicketId) -> Result<Ticket, TicketError>;

    /// Atomically read, modify, and write one ticket.
    ///
    /// `apply` runs on a draft; the draft replaces the stored ticket only when
    /// `apply` returns `Ok`. Returns the committed ticket with `apply`'s output.
    ///
    /// # Errors
    ///
    /// [`TicketError::TicketNotFound`], any error returned by `apply`, or a
    /// storage failure.
    fn update<R, F>(&self, id: &TicketId, apply: F) -> Result<(Ticket, R), TicketError>
    where
        F: FnOnce(&mut Ticket) -> Result<R, TicketError>;
}

impl<T: TicketStore> TicketStore for Arc<T> {
    fn insert(&self, ticket: Ticket) -> Result<Ticket, TicketError> {
        (**self).insert(ticket)
    }

    fn get(&self, id: &TicketId) -> Result<Ticket, TicketError> {
        (**self).get(id)
    }

    fn update<R, F>(&self, id: &TicketId, apply: F) -> Result<(Ticket, R), TicketError>
    where
        F: FnOnce(&mut Ticket) -> Result<R, TicketError>,
    {
        (**self).update(id, apply)
    }
}
