use crate::output::{OutputMode, render};
use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tickets_core::config::{self, CONFIG_FILE, TICKETS_DIR};
use tickets_core::store::{FileStore, SNAPSHOT_FILE};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force re-initialization even if `.tickets/` already exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct InitOutput {
    ok: bool,
    path: String,
}

/// Execute `tk init`. Creates the project skeleton:
///
/// ```text
/// .tickets/
///   config.toml     (default project config)
///   tickets.json    (empty snapshot)
/// ```
///
/// `--force` rewrites the config with defaults but keeps existing tickets.
///
/// # Errors
///
/// Returns an error if `.tickets/` already exists and `--force` is not set,
/// or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let tickets_dir = project_root.join(TICKETS_DIR);

    if tickets_dir.exists() && !args.force {
        anyhow::bail!("{TICKETS_DIR}/ already exists. Use `tk init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&tickets_dir)
        .with_context(|| format!("Failed to create {}", tickets_dir.display()))?;

    let config_path = tickets_dir.join(CONFIG_FILE);
    std::fs::write(&config_path, config::default_project_config_toml()?)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let cfg = config::load_project_config(&tickets_dir)?;
    FileStore::new(&tickets_dir, cfg.store.lock_timeout()).initialize()?;
    tracing::info!(dir = %tickets_dir.display(), "initialized ticket project");

    let result = InitOutput {
        ok: true,
        path: tickets_dir.display().to_string(),
    };
    render(output, &result, |r, w| {
        writeln!(w, "✓ Initialized {TICKETS_DIR}/ in {}", r.path)?;
        writeln!(w)?;
        writeln!(w, "  Config:   {TICKETS_DIR}/{CONFIG_FILE}")?;
        writeln!(w, "  Tickets:  {TICKETS_DIR}/{SNAPSHOT_FILE}")?;
        writeln!(w)?;
        writeln!(w, "Create your first ticket:")?;
        writeln!(w, "  tk create --title \"Hello\" --content \"World\"")
    })
}
