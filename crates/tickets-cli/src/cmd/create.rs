//! `tk create`: open a new ticket, optionally with a first conversation.

use crate::output::OutputMode;
use clap::Args;
use std::path::Path;
use tickets_core::api::ConversationPayload;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Title of the first conversation.
    #[arg(short, long, requires = "content")]
    pub title: Option<String>,

    /// Content of the first conversation.
    #[arg(short, long, requires = "title")]
    pub content: Option<String>,
}

impl CreateArgs {
    fn payload(&self) -> Option<ConversationPayload> {
        match (&self.title, &self.content) {
            (Some(title), Some(content)) => Some(ConversationPayload {
                title: title.clone(),
                content: content.clone(),
            }),
            _ => None,
        }
    }
}

pub fn run_create(args: &CreateArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let api = super::open_api(project_root, output)?;
    super::finish(output, api.create(args.payload()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: CreateArgs,
    }

    #[test]
    fn create_without_conversation() {
        let w = Wrapper::parse_from(["test"]);
        assert!(w.args.payload().is_none());
    }

    #[test]
    fn create_with_conversation() {
        let w = Wrapper::parse_from(["test", "--title", "Hello", "--content", "World"]);
        let payload = w.args.payload().unwrap();
        assert_eq!(payload.title, "Hello");
        assert_eq!(payload.content, "World");
    }

    #[test]
    fn title_requires_content() {
        assert!(Wrapper::try_parse_from(["test", "--title", "Hello"]).is_err());
    }
}
