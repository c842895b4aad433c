#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tk: tickets with conversations, notes, and status",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides `--json`, `FORMAT`, and user config).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Project",
        about = "Initialize a tickets project",
        long_about = "Create .tickets/ with a default config and an empty ticket snapshot.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    tk init\n\n    # Reset the config, keeping existing tickets\n    tk init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Tickets",
        about = "Create a new ticket",
        long_about = "Create a new unassigned ticket, optionally with a first conversation.",
        after_help = "EXAMPLES:\n    # Create a ticket with a conversation\n    tk create --title \"Hello\" --content \"World\"\n\n    # Create an empty ticket\n    tk create\n\n    # Emit machine-readable output\n    tk create --title \"Hello\" --content \"World\" --json"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Tickets",
        about = "Show one ticket",
        long_about = "Show a ticket with its conversations and notes.",
        after_help = "EXAMPLES:\n    # Show a ticket\n    tk show 3f2b...\n\n    # Emit machine-readable output\n    tk show 3f2b... --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Tickets",
        about = "Append a conversation",
        long_about = "Append a titled conversation to the end of a ticket's thread.",
        after_help = "EXAMPLES:\n    # Reply on a ticket\n    tk converse 3f2b... --title \"Follow-up\" --content \"Any news?\""
    )]
    Converse(cmd::converse::ConverseArgs),

    #[command(
        next_help_heading = "Notes",
        about = "Add a note",
        long_about = "Add an open note to a ticket.",
        after_help = "EXAMPLES:\n    # Add a note with a generated id\n    tk note 3f2b... \"Call the customer back\"\n\n    # Choose the note id\n    tk note 3f2b... \"Call back\" --note-id callback"
    )]
    Note(cmd::note::NoteArgs),

    #[command(
        next_help_heading = "Notes",
        about = "Open or close a note",
        long_about = "Flip a note between open and closed.",
        after_help = "EXAMPLES:\n    # Close (or reopen) a note\n    tk toggle-note 3f2b... callback"
    )]
    ToggleNote(cmd::toggle_note::ToggleNoteArgs),

    #[command(
        next_help_heading = "Tickets",
        about = "Set a ticket's status",
        long_about = "Set the status to any of: 0 unassigned, 1 assigned, 2 in-progress, 3 resolved, 4 closed.",
        after_help = "EXAMPLES:\n    # By name\n    tk status 3f2b... in-progress\n\n    # By ordinal\n    tk status 3f2b... 3"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Project",
        about = "Send one raw API request",
        long_about = "Run a request against /api/Tickets/* and print the status and JSON body.",
        after_help = "EXAMPLES:\n    # Create\n    tk api POST /api/Tickets/create --body '{\"title\":\"Hello\",\"content\":\"World\"}'\n\n    # Read\n    tk api GET /api/Tickets/read -q id=3f2b..."
    )]
    Api(cmd::api::ApiArgs),

    #[command(
        next_help_heading = "Project",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    tk completions bash\n\n    # Generate zsh completions\n    tk completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TICKETS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "tickets=debug,info"
        } else {
            "tickets=info,warn"
        })
    });

    let format = env::var("TICKETS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let output = cli.output_mode();

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, output, &project_root),
        Commands::Create(ref args) => cmd::create::run_create(args, output, &project_root),
        Commands::Show(ref args) => cmd::show::run_show(args, output, &project_root),
        Commands::Converse(ref args) => cmd::converse::run_converse(args, output, &project_root),
        Commands::Note(ref args) => cmd::note::run_note(args, output, &project_root),
        Commands::ToggleNote(ref args) => {
            cmd::toggle_note::run_toggle_note(args, output, &project_root)
        }
        Commands::Status(ref args) => cmd::status::run_status(args, output, &project_root),
        Commands::Api(ref args) => cmd::api::run_api(args, output, &project_root),
        Commands::Completions(args) => {
            cmd::completions::run_completions(args.shell, &mut Cli::command())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["tk", "show", "t-1", "--json"]);
        assert!(cli.json);
        assert_eq!(cli.output_mode(), OutputMode::Json);
    }

    #[test]
    fn format_flag_wins_over_json() {
        let cli = Cli::parse_from(["tk", "--json", "--format", "text", "show", "t-1"]);
        assert_eq!(cli.output_mode(), OutputMode::Text);
    }

    #[test]
    fn status_accepts_negative_values() {
        let cli = Cli::parse_from(["tk", "status", "t-1", "-1"]);
        let Commands::Status(args) = cli.command else {
            panic!("expected status command");
        };
        assert_eq!(args.status, "-1");
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["tk", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["tk", "init"],
            vec!["tk", "create"],
            vec!["tk", "create", "--title", "Hello", "--content", "World"],
            vec!["tk", "show", "x"],
            vec!["tk", "converse", "x", "--title", "t", "--content", "c"],
            vec!["tk", "note", "x", "text"],
            vec!["tk", "toggle-note", "x", "n"],
            vec!["tk", "status", "x", "assigned"],
            vec!["tk", "api", "GET", "/api/Tickets/read", "-q", "id=x"],
            vec!["tk", "completions", "zsh"],
        ];
        for args in subcommands {
            assert!(
                Cli::try_parse_from(&args).is_ok(),
                "failed to parse: {args:?}"
            );
        }
    }
}
