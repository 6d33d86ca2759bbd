//! Path resolution for config and store files.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, read_config, RemoteSection};

/// Everything a command needs to know about where data lives.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub store_path: PathBuf,
    pub owner: Option<String>,
    pub remote: RemoteSection,
    pub export_dir: Option<PathBuf>,
}

/// Resolve the config file path, checking BUDGET_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("BUDGET_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Merge CLI flags (and their env fallbacks) over the config file.
///
/// The config file is optional when `--store` is given; otherwise it must
/// exist and name the store.
pub fn resolve_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let config_path = resolve_config_path()?;
    let config = if config_path.exists() {
        Some(read_config(&config_path)?)
    } else {
        None
    };

    let store_path = match (cli.store.as_deref(), config.as_ref()) {
        (Some(path), _) => expand_home(path),
        (None, Some(config)) => expand_home(&config.store.path),
        (None, None) => return Err(anyhow::anyhow!(missing_config_message(&config_path))),
    };

    let owner = cli
        .owner
        .clone()
        .filter(|o| !o.trim().is_empty())
        .or_else(|| config.as_ref().and_then(|c| c.identity.owner.clone()));

    let (remote, export_dir) = match config {
        Some(config) => (
            config.remote,
            config.export.dir.as_deref().map(expand_home),
        ),
        None => (RemoteSection::default(), None),
    };

    Ok(Settings {
        store_path,
        owner,
        remote,
        export_dir,
    })
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

/// Error message when the store file is missing.
pub fn missing_store_message(path: &Path) -> String {
    format!(
        "No budget store found at {}\n\nRun:\n  budget init\n\nOr specify a store path:\n  BUDGET_STORE=/path/to/budget.db budget init",
        path.display()
    )
}

/// Error message when config file is missing.
pub fn missing_config_message(config_path: &Path) -> String {
    format!(
        "No budget config found at {}\n\nRun:\n  budget init\n\nOr specify a store path:\n  BUDGET_STORE=/path/to/budget.db budget init",
        config_path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/var/budget.db"), PathBuf::from("/var/budget.db"));
    }

    #[test]
    fn test_messages_name_the_path_and_init() {
        let message = missing_store_message(Path::new("/tmp/nope.db"));
        assert!(message.contains("/tmp/nope.db"));
        assert!(message.contains("budget init"));
    }
}
