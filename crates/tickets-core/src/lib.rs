//! tickets-core library.
//!
//! The [`model::Ticket`] aggregate and its lifecycle rules, the
//! [`store::TicketStore`] abstraction with in-memory and file-backed
//! implementations, the [`service::TicketService`] operations, and the
//! validating [`api::TicketApi`] request layer.
//!
//! # Conventions
//!
//! - **Errors**: [`TicketError`] for ticket operations; `anyhow::Result` for config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod api;
pub mod config;
pub mod error;
pub mod lock;
pub mod model;
pub mod service;
pub mod store;
pub mod validate;

pub use error::{ErrorCode, TicketError};
pub use model::{Conversation, Note, NoteId, Ticket, TicketId, TicketStatus};
pub use service::TicketService;
