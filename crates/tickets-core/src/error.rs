use crate::lock::LockError;
use crate::model::{InvalidStatus, NoteId, TicketId};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    TicketNotFound,
    NoteNotFound,
    InvalidStatus,
    ValidationFailed,
    DuplicateId,
    StoreCorrupt,
    StoreWriteFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::TicketNotFound => "E2001",
            Self::NoteNotFound => "E2002",
            Self::InvalidStatus => "E2003",
            Self::ValidationFailed => "E2004",
            Self::DuplicateId => "E2005",
            Self::StoreCorrupt => "E3001",
            Self::StoreWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short public summary, reported instead of the detailed message for
    /// storage failures.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::TicketNotFound => "Ticket not found",
            Self::NoteNotFound => "Note not found",
            Self::InvalidStatus => "Invalid ticket status",
            Self::ValidationFailed => "Invalid request payload",
            Self::DuplicateId => "Identifier already in use",
            Self::StoreCorrupt => "Corrupt ticket snapshot",
            Self::StoreWriteFailed => "Ticket store write failed",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `tk init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .tickets/config.toml and retry."),
            Self::TicketNotFound | Self::NoteNotFound => None,
            Self::InvalidStatus => Some(
                "Use 0 (unassigned), 1 (assigned), 2 (in-progress), 3 (resolved) or 4 (closed).",
            ),
            Self::ValidationFailed => Some("Fix the reported field and resend the request."),
            Self::DuplicateId => Some("Omit the id to let the server allocate one."),
            Self::StoreCorrupt => {
                Some("Restore .tickets/tickets.json from a backup or fix the JSON by hand.")
            }
            Self::StoreWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `tk` process releases its lock."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Every failure an aggregate operation can report.
///
/// A failed operation never leaves a partially applied change behind.
#[derive(Debug, Error)]
pub enum TicketError {
    #[error("ticket '{id}' not found")]
    TicketNotFound { id: TicketId },

    #[error("note '{note_id}' not found on ticket '{ticket_id}'")]
    NoteNotFound { ticket_id: TicketId, note_id: NoteId },

    #[error("invalid ticket status '{value}'")]
    InvalidStatus { value: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("{what} '{id}' already exists")]
    Conflict { what: &'static str, id: String },

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt ticket snapshot at {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("ticket lock poisoned by a panicked writer")]
    Poisoned,
}

impl TicketError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::TicketNotFound { .. } => ErrorCode::TicketNotFound,
            Self::NoteNotFound { .. } => ErrorCode::NoteNotFound,
            Self::InvalidStatus { .. } => ErrorCode::InvalidStatus,
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::Conflict { .. } => ErrorCode::DuplicateId,
            Self::Lock(err) => err.code(),
            Self::Io { .. } => ErrorCode::StoreWriteFailed,
            Self::Corrupt { .. } => ErrorCode::StoreCorrupt,
            Self::Poisoned => ErrorCode::InternalUnexpected,
        }
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }

    /// True when the addressed ticket or note does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TicketNotFound { .. } | Self::NoteNotFound { .. }
        )
    }
}

impl From<InvalidStatus> for TicketError {
    fn from(err: InvalidStatus) -> Self {
        Self::InvalidStatus {
            value: err.value.to_string(),
        }
    }
}
