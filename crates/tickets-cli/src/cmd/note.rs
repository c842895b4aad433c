//! `tk note`: add an open note to a ticket.

use crate::output::OutputMode;
use clap::Args;
use std::path::Path;
use tickets_core::api::NotePayload;

#[derive(Args, Debug)]
pub struct NoteArgs {
    /// Ticket ID to annotate.
    pub id: String,

    /// Note text.
    pub content: String,

    /// Use this note ID instead of a generated one.
    #[arg(long)]
    pub note_id: Option<String>,
}

pub fn run_note(args: &NoteArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let api = super::open_api(project_root, output)?;
    let payload = NotePayload {
        id: args.note_id.clone(),
        content: args.content.clone(),
        closed: None,
    };
    super::finish(output, api.add_note(&args.id, payload))
}
