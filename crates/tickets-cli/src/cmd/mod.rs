pub mod api;
pub mod completions;
pub mod converse;
pub mod create;
pub mod init;
pub mod note;
pub mod show;
pub mod status;
pub mod toggle_note;

use crate::output::{CliError, OutputMode, render_error, render_ticket};
use anyhow::Result;
use std::path::Path;
use tickets_core::api::TicketApi;
use tickets_core::config::{self, TICKETS_DIR};
use tickets_core::error::ErrorCode;
use tickets_core::store::FileStore;
use tickets_core::{Ticket, TicketError, TicketService};

/// Open the file-backed API for the project containing `project_root`.
///
/// # Errors
///
/// Returns an error (already rendered) if no `.tickets/` directory is found
/// above `project_root` or its config does not parse.
pub fn open_api(project_root: &Path, output: OutputMode) -> Result<TicketApi<FileStore>> {
    let Some(tickets_dir) = config::find_tickets_dir(project_root) else {
        let code = ErrorCode::NotInitialized;
        let msg = format!("Not a tickets project: {TICKETS_DIR}/ directory not found");
        render_error(
            output,
            &CliError::with_details(&msg, code.hint().unwrap_or_default(), code.code()),
        )?;
        anyhow::bail!(msg);
    };

    let cfg = match config::load_project_config(&tickets_dir) {
        Ok(cfg) => cfg,
        Err(err) => {
            let code = ErrorCode::ConfigParseError;
            render_error(
                output,
                &CliError::with_details(
                    format!("{err:#}"),
                    code.hint().unwrap_or_default(),
                    code.code(),
                ),
            )?;
            return Err(err);
        }
    };

    tracing::debug!(dir = %tickets_dir.display(), "opened ticket store");
    let store = FileStore::new(tickets_dir, cfg.store.lock_timeout());
    Ok(TicketApi::new(TicketService::new(store), cfg.limits))
}

/// Render the outcome of one ticket operation.
///
/// # Errors
///
/// Returns the operation's error after rendering it to stderr.
pub fn finish(output: OutputMode, result: Result<Ticket, TicketError>) -> Result<()> {
    match result {
        Ok(ticket) => render_ticket(output, &ticket),
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            Err(err.into())
        }
    }
}
