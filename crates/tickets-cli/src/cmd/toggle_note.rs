//! `tk toggle-note`: flip a note between open and closed.

use crate::output::OutputMode;
use clap::Args;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ToggleNoteArgs {
    /// Ticket ID that owns the note.
    pub id: String,

    /// Note ID to toggle.
    pub note_id: String,
}

pub fn run_toggle_note(
    args: &ToggleNoteArgs,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let api = super::open_api(project_root, output)?;
    super::finish(output, api.update_note(&args.id, &args.note_id))
}
