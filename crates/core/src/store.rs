//! In-memory collection of live tickets.

use tracing::{debug, error};

use crate::{error::StoreError, models::Ticket};

/// Ordered ticket collection keyed by id.
///
/// Enumeration follows insertion order. Lookups are case-insensitive and scan
/// linearly; the store holds at most a few hundred tickets per run. Not safe for
/// concurrent mutation: a multi-user driver must wrap it in a single lock.
#[derive(Debug, Default)]
pub struct TicketStore {
    tickets: Vec<Ticket>,
}

impl TicketStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a ticket. A second ticket with the same id is rejected.
    pub fn insert(&mut self, ticket: Ticket) -> Result<(), StoreError> {
        if self.position(ticket.id().as_str()).is_some() {
            error!(ticket_id = %ticket.id(), "Refusing duplicate ticket id");
            return Err(StoreError::DuplicateId(ticket.id().clone()));
        }
        self.tickets.push(ticket);
        Ok(())
    }

    /// First ticket whose id matches `id`, ignoring case.
    pub fn find_by_id(&self, id: &str) -> Option<&Ticket> {
        let found = self.tickets.iter().find(|ticket| ticket.id().matches(id));
        if found.is_none() {
            debug!(query = id, "No ticket matches lookup");
        }
        found
    }

    /// Remove and return the ticket with the given id.
    pub fn remove(&mut self, id: &str) -> Result<Ticket, StoreError> {
        match self.position(id) {
            Some(index) => Ok(self.tickets.remove(index)),
            None => Err(StoreError::NotFound(id.trim().to_string())),
        }
    }

    /// Number of live tickets.
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    /// True when no tickets are held.
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Tickets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.iter()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tickets.iter().position(|ticket| ticket.id().matches(id))
    }
}
