//! Ticket aggregate types.

pub mod ids;
pub mod ticket;

pub use ids::{NoteId, ParseIdError, TicketId};
pub use ticket::{Conversation, InvalidStatus, Note, ParseStatusError, Ticket, TicketStatus};
