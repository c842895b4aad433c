//! `tk show`: display one ticket.

use crate::output::OutputMode;
use clap::Args;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Ticket ID to display.
    pub id: String,
}

pub fn run_show(args: &ShowArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let api = super::open_api(project_root, output)?;
    super::finish(output, api.read(&args.id))
}
