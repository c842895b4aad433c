//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `output` in the user config
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};
use tickets_core::{Ticket, TicketError, config};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, visual framing).
    Pretty,
    /// Token-efficient plain text for agents and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    fn from_name(name: &str) -> Self {
        match name {
            "json" => Self::Json,
            "text" => Self::Text,
            _ => Self::Pretty,
        }
    }
}

/// Resolve the output mode from CLI flags, environment, user config, and TTY.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    let env_val = std::env::var("FORMAT").ok();
    let user = config::load_user_config().unwrap_or_else(|err| {
        tracing::warn!("ignoring user config: {err:#}");
        config::UserConfig::default()
    });
    OutputMode::from_name(config::resolve_output(
        json_flag,
        user.output.as_deref(),
        env_val.as_deref(),
    ))
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E2001").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        suggestion: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(suggestion.into()),
            error_code: Some(error_code.into()),
        }
    }
}

impl From<&TicketError> for CliError {
    fn from(err: &TicketError) -> Self {
        Self {
            message: err.to_string(),
            suggestion: err.hint().map(str::to_string),
            error_code: Some(err.code().code().to_string()),
        }
    }
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode, the value is serialized with `serde_json`. In pretty/text mode,
/// the provided `human_fn` closure is called to produce text output.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            human_fn(value, &mut out)?;
        }
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Render one ticket: the wire JSON shape, or a readable summary.
pub fn render_ticket(mode: OutputMode, ticket: &Ticket) -> anyhow::Result<()> {
    render(mode, ticket, |ticket, w| match mode {
        OutputMode::Pretty => write_ticket_pretty(ticket, w),
        _ => write_ticket_text(ticket, w),
    })
}

fn write_ticket_pretty(ticket: &Ticket, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Ticket {}", ticket.id()))?;
    pretty_kv(w, "Status", ticket.status().to_string())?;
    pretty_kv(w, "Threads", ticket.conversations().len().to_string())?;
    pretty_kv(w, "Notes", ticket.notes().len().to_string())?;

    if !ticket.conversations().is_empty() {
        writeln!(w)?;
        pretty_section(w, "Conversations")?;
        for (index, conversation) in ticket.conversations().iter().enumerate() {
            writeln!(w, "[{}] {}", index + 1, conversation.title)?;
            for line in conversation.content.lines() {
                writeln!(w, "    {line}")?;
            }
        }
    }

    if !ticket.notes().is_empty() {
        writeln!(w)?;
        pretty_section(w, "Notes")?;
        for note in ticket.notes() {
            let mark = if note.is_closed() { "x" } else { " " };
            writeln!(w, "[{mark}] {}  {}", note.id(), note.content())?;
        }
    }
    Ok(())
}

fn write_ticket_text(ticket: &Ticket, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}  {}", ticket.id(), ticket.status())?;
    for conversation in ticket.conversations() {
        writeln!(w, "conversation  {}  {}", conversation.title, conversation.content)?;
    }
    for note in ticket.notes() {
        let state = if note.is_closed() { "closed" } else { "open" };
        writeln!(w, "note  {}  {state}  {}", note.id(), note.content())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickets_core::{Conversation, NoteId, TicketId, TicketStatus};

    fn sample() -> Ticket {
        let mut ticket = Ticket::open(
            TicketId::new_unchecked("t-1"),
            Some(Conversation::new("Hello", "World")),
        );
        ticket
            .add_note(NoteId::new_unchecked("n-1"), "New note")
            .unwrap();
        ticket.set_status(TicketStatus::InProgress);
        ticket
    }

    #[test]
    fn output_mode_names() {
        assert_eq!(OutputMode::from_name("json"), OutputMode::Json);
        assert_eq!(OutputMode::from_name("text"), OutputMode::Text);
        assert_eq!(OutputMode::from_name("pretty"), OutputMode::Pretty);
    }

    #[test]
    fn explicit_format_flag_wins() {
        assert_eq!(
            resolve_output_mode(Some(OutputMode::Text), true),
            OutputMode::Text
        );
    }

    #[test]
    fn cli_error_from_ticket_error_carries_code_and_hint() {
        let err = TicketError::TicketNotFound {
            id: TicketId::new_unchecked("t-9"),
        };
        let cli = CliError::from(&err);
        assert!(cli.message.contains("t-9"));
        assert_eq!(cli.error_code.as_deref(), Some("E2001"));
        assert!(cli.suggestion.is_none());

        let cli = CliError::from(&TicketError::validation("title", "must not contain control characters"));
        assert_eq!(cli.error_code.as_deref(), Some("E2004"));
        assert!(cli.suggestion.is_some());
    }

    #[test]
    fn cli_error_json_skips_missing_fields() {
        let json = serde_json::to_value(CliError::new("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "boom" }));
    }

    #[test]
    fn pretty_ticket_lists_conversations_and_notes() {
        let mut buf = Vec::new();
        write_ticket_pretty(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Ticket t-1"));
        assert!(text.contains("in-progress"));
        assert!(text.contains("[1] Hello"));
        assert!(text.contains("[ ] n-1  New note"));
    }

    #[test]
    fn text_ticket_is_one_line_per_entry() {
        let mut buf = Vec::new();
        write_ticket_text(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("note  n-1  open"));
    }
}
