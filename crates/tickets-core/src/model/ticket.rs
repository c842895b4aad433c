use super::ids::{NoteId, TicketId};
use crate::error::TicketError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Ticket workflow states, serialized as their ordinal.
///
/// Any member may be set from any other; there is no transition graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum TicketStatus {
    #[default]
    Unassigned,
    Assigned,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ALL: [Self; 5] = [
        Self::Unassigned,
        Self::Assigned,
        Self::InProgress,
        Self::Resolved,
        Self::Closed,
    ];

    #[must_use]
    pub const fn ordinal(self) -> i64 {
        match self {
            Self::Unassigned => 0,
            Self::Assigned => 1,
            Self::InProgress => 2,
            Self::Resolved => 3,
            Self::Closed => 4,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::Assigned => "assigned",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

/// Error returned when an ordinal is outside the status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidStatus {
    pub value: i64,
}

impl fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not a ticket status", self.value)
    }
}

impl std::error::Error for InvalidStatus {}

impl TryFrom<i64> for TicketStatus {
    type Error = InvalidStatus;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|status| status.ordinal() == value)
            .ok_or(InvalidStatus { value })
    }
}

impl From<TicketStatus> for i64 {
    fn from(status: TicketStatus) -> Self {
        status.ordinal()
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when status text is neither an ordinal nor a known name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    pub got: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid ticket status: '{}'", self.got)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for TicketStatus {
    type Err = ParseStatusError;

    /// Accepts the ordinal (`"2"`) or the name (`"in-progress"`, `"In_Progress"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseStatusError { got: s.to_string() };
        let trimmed = s.trim();
        if let Ok(ordinal) = trimmed.parse::<i64>() {
            return Self::try_from(ordinal).map_err(|_| err());
        }

        let normalized = trimmed.to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "unassigned" => Ok(Self::Unassigned),
            "assigned" => Ok(Self::Assigned),
            "in-progress" | "inprogress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(err()),
        }
    }
}

/// A titled message on a ticket. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub title: String,
    pub content: String,
}

impl Conversation {
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// An annotation with its own open/closed flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    id: NoteId,
    content: String,
    closed: bool,
}

impl Note {
    /// Every note starts open.
    #[must_use]
    pub fn open(id: NoteId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            closed: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &NoteId {
        &self.id
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    const fn toggle(&mut self) -> bool {
        self.closed = !self.closed;
        self.closed
    }
}

/// The ticket aggregate.
///
/// Fields are private so that the lifecycle rules hold for every caller:
/// the id never changes, conversations and notes are append-only, new notes
/// are open, and status or note flags change only through their dedicated
/// mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    id: TicketId,
    status: TicketStatus,
    #[serde(default)]
    conversations: Vec<Conversation>,
    #[serde(default)]
    notes: Vec<Note>,
}

impl Ticket {
    /// Start a new, unassigned ticket, optionally seeded with its first conversation.
    #[must_use]
    pub fn open(id: TicketId, conversation: Option<Conversation>) -> Self {
        Self {
            id,
            status: TicketStatus::Unassigned,
            conversations: conversation.into_iter().collect(),
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> &TicketId {
        &self.id
    }

    #[must_use]
    pub const fn status(&self) -> TicketStatus {
        self.status
    }

    #[must_use]
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == *id)
    }

    pub fn add_conversation(&mut self, conversation: Conversation) {
        self.conversations.push(conversation);
    }

    /// Append an open note.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Conflict`] if the ticket already has a note with `id`.
    pub fn add_note(&mut self, id: NoteId, content: impl Into<String>) -> Result<&Note, TicketError> {
        if self.note(&id).is_some() {
            return Err(TicketError::Conflict {
                what: "note",
                id: id.to_string(),
            });
        }
        self.notes.push(Note::open(id, content));
        let index = self.notes.len() - 1;
        Ok(&self.notes[index])
    }

    /// Set the status, returning the previous one.
    pub const fn set_status(&mut self, status: TicketStatus) -> TicketStatus {
        let previous = self.status;
        self.status = status;
        previous
    }

    /// Flip a note between open and closed, returning the new `closed` value.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::NoteNotFound`] if no note on this ticket has `note_id`.
    pub fn toggle_note(&mut self, note_id: &NoteId) -> Result<bool, TicketError> {
        let ticket_id = &self.id;
        self.notes
            .iter_mut()
            .find(|note| note.id == *note_id)
            .map(Note::toggle)
            .ok_or_else(|| TicketError::NoteNotFound {
                ticket_id: ticket_id.clone(),
                note_id: note_id.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{Conversation, InvalidStatus, NoteId, Ticket, TicketId, TicketStatus};
    use crate::error::TicketError;
    use std::str::FromStr;

    fn hello() -> Conversation {
        Conversation::new("Hello", "World")
    }

    #[test]
    fn status_serializes_as_ordinal() {
        assert_eq!(serde_json::to_string(&TicketStatus::Unassigned).unwrap(), "0");
        assert_eq!(serde_json::to_string(&TicketStatus::Closed).unwrap(), "4");
        assert_eq!(
            serde_json::from_str::<TicketStatus>("2").unwrap(),
            TicketStatus::InProgress
        );
        assert!(serde_json::from_str::<TicketStatus>("9").is_err());
    }

    #[test]
    fn status_ordinals_are_dense_from_zero() {
        for (index, status) in TicketStatus::ALL.into_iter().enumerate() {
            assert_eq!(status.ordinal(), i64::try_from(index).unwrap());
            assert_eq!(TicketStatus::try_from(status.ordinal()), Ok(status));
        }
        assert_eq!(TicketStatus::try_from(-1), Err(InvalidStatus { value: -1 }));
        assert_eq!(TicketStatus::try_from(5), Err(InvalidStatus { value: 5 }));
    }

    #[test]
    fn status_parses_names_and_ordinals() {
        assert_eq!(TicketStatus::from_str("3").unwrap(), TicketStatus::Resolved);
        assert_eq!(
            TicketStatus::from_str("In_Progress").unwrap(),
            TicketStatus::InProgress
        );
        assert_eq!(
            TicketStatus::from_str(&TicketStatus::Assigned.to_string()).unwrap(),
            TicketStatus::Assigned
        );
        assert!(TicketStatus::from_str("7").is_err());
        assert!(TicketStatus::from_str("escalated").is_err());
    }

    #[test]
    fn open_with_conversation_is_unassigned() {
        let ticket = Ticket::open(TicketId::new_unchecked("t"), Some(hello()));
        assert_eq!(ticket.status(), TicketStatus::Unassigned);
        assert_eq!(ticket.conversations(), &[hello()]);
        assert!(ticket.notes().is_empty());
    }

    #[test]
    fn open_without_conversation_is_empty() {
        let ticket = Ticket::open(TicketId::new_unchecked("t"), None);
        assert!(ticket.conversations().is_empty());
    }

    #[test]
    fn conversations_append_in_order() {
        let mut ticket = Ticket::open(TicketId::new_unchecked("t"), Some(hello()));
        let second = Conversation::new("Re: Hello", "Again");
        ticket.add_conversation(second.clone());
        assert_eq!(ticket.conversations().len(), 2);
        assert_eq!(ticket.conversations()[0], hello());
        assert_eq!(ticket.conversations()[1], second);
    }

    #[test]
    fn notes_start_open_and_toggle_both_ways() {
        let mut ticket = Ticket::open(TicketId::new_unchecked("t"), None);
        let note_id = NoteId::new_unchecked("n1");
        let note = ticket.add_note(note_id.clone(), "New note").unwrap();
        assert!(!note.is_closed());

        assert!(ticket.toggle_note(&note_id).unwrap());
        assert!(ticket.note(&note_id).unwrap().is_closed());
        assert!(!ticket.toggle_note(&note_id).unwrap());
        assert!(!ticket.note(&note_id).unwrap().is_closed());
    }

    #[test]
    fn duplicate_note_id_is_rejected() {
        let mut ticket = Ticket::open(TicketId::new_unchecked("t"), None);
        let note_id = NoteId::new_unchecked("n1");
        ticket.add_note(note_id.clone(), "first").unwrap();
        let err = ticket.add_note(note_id, "second").unwrap_err();
        assert!(matches!(err, TicketError::Conflict { what: "note", .. }));
        assert_eq!(ticket.notes().len(), 1);
    }

    #[test]
    fn toggling_unknown_note_fails() {
        let mut ticket = Ticket::open(TicketId::new_unchecked("t"), None);
        let err = ticket.toggle_note(&NoteId::new_unchecked("missing")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn set_status_returns_previous() {
        let mut ticket = Ticket::open(TicketId::new_unchecked("t"), None);
        assert_eq!(
            ticket.set_status(TicketStatus::Resolved),
            TicketStatus::Unassigned
        );
        assert_eq!(ticket.set_status(TicketStatus::Assigned), TicketStatus::Resolved);
        assert_eq!(ticket.status(), TicketStatus::Assigned);
    }

    #[test]
    fn ticket_json_shape() {
        let mut ticket = Ticket::open(TicketId::new_unchecked("t-1"), Some(hello()));
        ticket.add_note(NoteId::new_unchecked("n-1"), "New note").unwrap();
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "t-1",
                "status": 0,
                "conversations": [{"title": "Hello", "content": "World"}],
                "notes": [{"id": "n-1", "content": "New note", "closed": false}],
            })
        );
    }
}
