//! `tk status`: set a ticket's status.

use crate::output::OutputMode;
use clap::Args;
use std::path::Path;
use tickets_core::TicketStatus;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Ticket ID to update.
    pub id: String,

    /// New status: an ordinal (0-4) or a name such as `in-progress`.
    #[arg(allow_hyphen_values = true)]
    pub status: String,
}

/// Status names map to their ordinal; anything else is passed through as-is
/// so the service reports it.
fn status_ordinal(raw: &str) -> String {
    raw.parse::<TicketStatus>()
        .map_or_else(|_| raw.to_string(), |status| status.ordinal().to_string())
}

pub fn run_status(args: &StatusArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let api = super::open_api(project_root, output)?;
    super::finish(output, api.update_status(&args.id, &status_ordinal(&args.status)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_map_to_ordinals() {
        assert_eq!(status_ordinal("assigned"), "1");
        assert_eq!(status_ordinal("In_Progress"), "2");
        assert_eq!(status_ordinal("4"), "4");
    }

    #[test]
    fn unknown_values_pass_through() {
        assert_eq!(status_ordinal("9"), "9");
        assert_eq!(status_ordinal("-1"), "-1");
        assert_eq!(status_ordinal("done"), "done");
    }
}
