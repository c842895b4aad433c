use super::TicketStore;
use crate::error::TicketError;
use crate::model::{Ticket, TicketId};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, RwLock};

type Slot = Arc<Mutex<Ticket>>;

/// Process-local store with per-ticket locking.
///
/// The index lock is only held to look up or insert a slot; all reads and
/// writes of ticket contents go through that ticket's own mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tickets: RwLock<HashMap<TicketId, Slot>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tickets.
    ///
    /// # Errors
    ///
    /// [`TicketError::Poisoned`] if a writer panicked while holding the index.
    pub fn len(&self) -> Result<usize, TicketError> {
        let index = self.tickets.read().map_err(|_| TicketError::Poisoned)?;
        Ok(index.len())
    }

    /// # Errors
    ///
    /// [`TicketError::Poisoned`] if a writer panicked while holding the index.
    pub fn is_empty(&self) -> Result<bool, TicketError> {
        Ok(self.len()? == 0)
    }

    fn slot(&self, id: &TicketId) -> Result<Slot, TicketError> {
        let index = self.tickets.read().map_err(|_| TicketError::Poisoned)?;
        index
            .get(id)
            .cloned()
            .ok_or_else(|| TicketError::TicketNotFound { id: id.clone() })
    }
}

impl TicketStore for MemoryStore {
    fn insert(&self, ticket: Ticket) -> Result<Ticket, TicketError> {
        let mut index = self.tickets.write().map_err(|_| TicketError::Poisoned)?;
        match index.entry(ticket.id().clone()) {
            Entry::Occupied(entry) => Err(TicketError::Conflict {
                what: "ticket",
                id: entry.key().to_string(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(ticket.clone())));
                Ok(ticket)
            }
        }
    }

    fn get(&self, id: &TicketId) -> Result<Ticket, TicketError> {
        let slot = self.slot(id)?;
        let ticket = slot.lock().map_err(|_| TicketError::Poisoned)?;
        Ok(ticket.clone())
    }

    fn update<R, F>(&self, id: &TicketId, apply: F) -> Result<(Ticket, R), TicketError>
    where
        F: FnOnce(&mut Ticket) -> Result<R, TicketError>,
    {
        let slot = self.slot(id)?;
        let mut stored = slot.lock().map_err(|_| TicketError::Poisoned)?;
        let mut draft = stored.clone();
        let output = apply(&mut draft)?;
        *stored = draft.clone();
        Ok((draft, output))
    }
}
