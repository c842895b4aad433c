use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Longest identifier accepted from callers.
pub const MAX_ID_LEN: usize = 128;

/// Error returned when parsing a caller-supplied identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    pub kind: &'static str,
    pub got: String,
    pub reason: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} '{}': {}", self.kind, self.got, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

fn check_id(kind: &'static str, raw: &str) -> Result<(), ParseIdError> {
    let reason = if raw.trim().is_empty() {
        Some("must not be empty")
    } else if raw.trim() != raw {
        Some("must not start or end with whitespace")
    } else if raw.chars().count() > MAX_ID_LEN {
        Some("is too long")
    } else if raw.chars().any(char::is_control) {
        Some("must not contain control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ParseIdError {
            kind,
            got: raw.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Server-assigned ticket identity. Opaque to callers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Allocate a fresh random identity.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap a string without validation. Intended for stores and tests.
    #[must_use]
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TicketId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        check_id("ticket id", s)?;
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Note identity, unique within its ticket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for NoteId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        check_id("note id", s)?;
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteId, TicketId};
    use std::collections::HashSet;
    use std::str::FromStr;

    #[test]
    fn generated_ids_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..1_000 {
            assert!(seen.insert(TicketId::generate()));
        }
    }

    #[test]
    fn generated_ids_parse_back() {
        let id = TicketId::generate();
        assert_eq!(TicketId::from_str(id.as_str()).unwrap(), id);

        let note = NoteId::generate();
        assert_eq!(NoteId::from_str(&note.to_string()).unwrap(), note);
    }

    #[test]
    fn parse_rejects_blank_and_padded_values() {
        assert!(TicketId::from_str("").is_err());
        assert!(TicketId::from_str("   ").is_err());
        assert!(TicketId::from_str(" abc").is_err());
        assert!(NoteId::from_str("a\u{0}b").is_err());
        assert!(NoteId::from_str(&"x".repeat(200)).is_err());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = TicketId::new_unchecked("t-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"t-1\"");
        let back: TicketId = serde_json::from_str("\"t-1\"").unwrap();
        assert_eq!(back, id);
    }
}
