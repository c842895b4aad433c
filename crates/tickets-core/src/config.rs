use crate::error::ErrorCode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-project state directory.
pub const TICKETS_DIR: &str = ".tickets";

/// Project config file name inside [`TICKETS_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub limits: Limits,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl StoreConfig {
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Size limits applied to request payloads before they reach a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default = "default_max_title_chars")]
    pub max_title_chars: usize,
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_title_chars: default_max_title_chars(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

/// Load `.tickets/config.toml`, falling back to defaults when it is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(tickets_dir: &Path) -> Result<ProjectConfig> {
    let path = tickets_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content).with_context(|| {
        format!(
            "{}: failed to parse {}",
            ErrorCode::ConfigParseError.code(),
            path.display()
        )
    })
}

/// Load the per-user config from the platform config dir, if any.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("tickets/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Render the default project config, used when initializing a directory.
///
/// # Errors
///
/// Returns an error if TOML serialization fails.
pub fn default_project_config_toml() -> Result<String> {
    toml::to_string_pretty(&ProjectConfig::default()).context("Failed to render default config")
}

/// Walk up from `start` to the nearest directory containing [`TICKETS_DIR`].
#[must_use]
pub fn find_tickets_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(TICKETS_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Resolve the output mode name (`pretty`, `text`, or `json`).
///
/// Precedence: `--json`, then `FORMAT`, then user config, then TTY detection.
#[must_use]
pub fn resolve_output(
    cli_json: bool,
    user_output: Option<&str>,
    env_format: Option<&str>,
) -> &'static str {
    resolve_output_inner(
        cli_json,
        user_output,
        env_format,
        std::io::stdout().is_terminal(),
    )
}

fn resolve_output_inner(
    cli_json: bool,
    user_output: Option<&str>,
    env_format: Option<&str>,
    is_tty: bool,
) -> &'static str {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json";
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode;
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode;
    }

    if is_tty { "pretty" } else { "text" }
}

const fn default_lock_timeout_ms() -> u64 {
    5_000
}

const fn default_max_title_chars() -> usize {
    200
}

const fn default_max_content_chars() -> usize {
    8_192
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_project_config_uses_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let cfg = load_project_config(dir.path()).expect("load should succeed");
        assert_eq!(cfg, ProjectConfig::default());
        assert_eq!(cfg.store.lock_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.limits.max_title_chars, 200);
        assert_eq!(cfg.limits.max_content_chars, 8_192);
    }

    #[test]
    fn partial_project_config_fills_defaults() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[limits]\nmax_content_chars = 64\n",
        )
        .expect("write config");

        let cfg = load_project_config(dir.path()).expect("load should succeed");
        assert_eq!(cfg.limits.max_content_chars, 64);
        assert_eq!(cfg.limits.max_title_chars, 200);
        assert_eq!(cfg.store.lock_timeout_ms, 5_000);
    }

    #[test]
    fn malformed_project_config_reports_code() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join(CONFIG_FILE), "[store\n").expect("write config");

        let err = load_project_config(dir.path()).expect_err("parse should fail");
        assert!(format!("{err:#}").contains(ErrorCode::ConfigParseError.code()));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let rendered = default_project_config_toml().expect("render");
        let parsed: ProjectConfig = toml::from_str(&rendered).expect("parse");
        assert_eq!(parsed, ProjectConfig::default());
    }

    #[test]
    fn find_tickets_dir_walks_up() {
        let dir = TempDir::new().expect("temp dir");
        let tickets = dir.path().join(TICKETS_DIR);
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&tickets).expect("create .tickets");
        std::fs::create_dir_all(&nested).expect("create nested");

        assert_eq!(find_tickets_dir(&nested), Some(tickets));
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        assert_eq!(resolve_output_inner(true, Some("pretty"), Some("text"), true), "json");
    }

    #[test]
    fn env_beats_user_config() {
        assert_eq!(resolve_output_inner(false, Some("json"), Some("text"), true), "text");
        assert_eq!(resolve_output_inner(false, Some("json"), Some("bogus"), true), "json");
    }

    #[test]
    fn tty_detection_is_the_fallback() {
        assert_eq!(resolve_output_inner(false, None, None, true), "pretty");
        assert_eq!(resolve_output_inner(false, None, None, false), "text");
        assert_eq!(resolve_output_inner(false, Some("table"), None, true), "text");
    }
}
