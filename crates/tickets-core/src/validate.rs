//! Payload checks run before a request reaches a ticket.

use crate::config::Limits;
use crate::error::TicketError;
use crate::model::{Conversation, NoteId, TicketId};
use std::str::FromStr;

fn check_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
    allow_breaks: bool,
) -> Result<(), TicketError> {
    let count = value.chars().count();
    if count > max_chars {
        return Err(TicketError::validation(
            field,
            format!("must be <= {max_chars} characters (got {count})"),
        ));
    }

    let bad_control = |ch: char| ch.is_control() && !(allow_breaks && (ch == '\n' || ch == '\t'));
    if value.chars().any(bad_control) {
        return Err(TicketError::validation(
            field,
            "must not contain control characters",
        ));
    }

    Ok(())
}

/// Titles are single-line and bounded by `limits.max_title_chars`. Text is
/// stored verbatim, so blank or padded titles such as `"Re: "` are kept.
///
/// # Errors
///
/// Returns [`TicketError::Validation`] naming the `title` field.
pub fn validate_title(title: &str, limits: &Limits) -> Result<(), TicketError> {
    check_text("title", title, limits.max_title_chars, false)
}

/// Content may span lines and may be empty.
///
/// # Errors
///
/// Returns [`TicketError::Validation`] naming the `content` field.
pub fn validate_content(content: &str, limits: &Limits) -> Result<(), TicketError> {
    check_text("content", content, limits.max_content_chars, true)
}

/// # Errors
///
/// Returns [`TicketError::Validation`] for the first offending field.
pub fn validate_conversation(
    conversation: &Conversation,
    limits: &Limits,
) -> Result<(), TicketError> {
    validate_title(&conversation.title, limits)?;
    validate_content(&conversation.content, limits)
}

/// Parse a caller-supplied ticket id.
///
/// # Errors
///
/// Returns [`TicketError::Validation`] naming `field`.
pub fn parse_ticket_id(field: &'static str, raw: &str) -> Result<TicketId, TicketError> {
    TicketId::from_str(raw).map_err(|err| TicketError::validation(field, err.reason))
}

/// Parse a caller-supplied note id.
///
/// # Errors
///
/// Returns [`TicketError::Validation`] naming `field`.
pub fn parse_note_id(field: &'static str, raw: &str) -> Result<NoteId, TicketError> {
    NoteId::from_str(raw).map_err(|err| TicketError::validation(field, err.reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> Limits {
        Limits {
            max_title_chars: 10,
            max_content_chars: 20,
        }
    }

    fn field_of(err: &TicketError) -> &'static str {
        match err {
            TicketError::Validation { field, .. } => *field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_reasonable_conversation() {
        let conversation = Conversation::new("Hello", "World\n\tindented");
        assert!(validate_conversation(&conversation, &limits()).is_ok());
    }

    #[test]
    fn blank_and_padded_text_is_kept_verbatim() {
        let cases = [
            ("", "x"),
            ("t", ""),
            ("t", "  \n"),
            ("Re: ", "World"),
            (" ", " "),
        ];
        for (title, content) in cases {
            let conversation = Conversation::new(title, content);
            assert!(
                validate_conversation(&conversation, &limits()).is_ok(),
                "rejected {title:?} / {content:?}"
            );
        }
    }

    #[test]
    fn padding_still_counts_toward_limits() {
        let err = validate_title(" 123456789 ", &limits()).unwrap_err();
        assert_eq!(field_of(&err), "title");
        let err = validate_conversation(&Conversation::new("Re: ", "\u{0}"), &limits()).unwrap_err();
        assert_eq!(field_of(&err), "content");
    }

    #[test]
    fn enforces_length_limits_in_chars() {
        assert!(validate_title("éééééééééé", &limits()).is_ok());
        assert!(validate_title("ééééééééééé", &limits()).is_err());
        let err = validate_content(&"x".repeat(21), &limits()).unwrap_err();
        assert!(err.to_string().contains("<= 20"));
    }

    #[test]
    fn newlines_only_allowed_in_content() {
        assert!(validate_title("a\nb", &limits()).is_err());
        assert!(validate_content("a\nb", &limits()).is_ok());
        assert!(validate_content("a\u{7}b", &limits()).is_err());
    }

    #[test]
    fn id_parsing_reports_field() {
        let err = parse_ticket_id("id", "").unwrap_err();
        assert_eq!(field_of(&err), "id");
        let err = parse_note_id("noteId", " x ").unwrap_err();
        assert_eq!(field_of(&err), "noteId");
        assert_eq!(parse_note_id("noteId", "n-1").unwrap().as_str(), "n-1");
    }
}
