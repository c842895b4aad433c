//! `tk converse`: append a conversation to a ticket.

use crate::output::OutputMode;
use clap::Args;
use std::path::Path;
use tickets_core::api::ConversationPayload;

#[derive(Args, Debug)]
pub struct ConverseArgs {
    /// Ticket ID to append to.
    pub id: String,

    /// Conversation title.
    #[arg(short, long)]
    pub title: String,

    /// Conversation content.
    #[arg(short, long)]
    pub content: String,
}

pub fn run_converse(
    args: &ConverseArgs,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let api = super::open_api(project_root, output)?;
    let payload = ConversationPayload {
        title: args.title.clone(),
        content: args.content.clone(),
    };
    super::finish(output, api.add_conversation(&args.id, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ConverseArgs,
    }

    #[test]
    fn title_and_content_are_required() {
        assert!(Wrapper::try_parse_from(["test", "t-1", "--title", "Hi"]).is_err());
        let w = Wrapper::parse_from(["test", "t-1", "-t", "Hi", "-c", "There"]);
        assert_eq!(w.args.id, "t-1");
        assert_eq!(w.args.title, "Hi");
        assert_eq!(w.args.content, "There");
    }
}
