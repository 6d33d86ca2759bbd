use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const APP_DIR: &str = "budget-tracker";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub store: StoreSection,
    #[serde(default)]
    pub identity: IdentitySection,
    #[serde(default)]
    pub remote: RemoteSection,
    #[serde(default)]
    pub export: ExportSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentitySection {
    pub owner: Option<String>,
}

/// Absent `url` means the store runs local only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteSection {
    pub url: Option<String>,
    pub token: Option<String>,
    /// Seconds before a remote request gives up; unset waits indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSection {
    pub dir: Option<String>,
}

impl BudgetConfig {
    pub fn new(
        store_path: PathBuf,
        owner: Option<String>,
        remote: RemoteSection,
        export_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            store: StoreSection {
                path: store_path.to_string_lossy().to_string(),
            },
            identity: IdentitySection {
                owner: owner.filter(|o| !o.trim().is_empty()),
            },
            remote,
            export: ExportSection {
                dir: export_dir.map(|dir| dir.to_string_lossy().to_string()),
            },
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("budget.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<BudgetConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &BudgetConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    budget_core::fs::write_atomic(path, contents.as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join(APP_DIR));
        }
    }
    Ok(home_dir()?.join(".config").join(APP_DIR))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join(APP_DIR));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join(APP_DIR))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = BudgetConfig::new(
            PathBuf::from("/tmp/budget.db"),
            Some("u1".to_string()),
            RemoteSection {
                url: Some("https://docs.example.com/v1".to_string()),
                token: None,
                timeout_secs: Some(10),
            },
            None,
        );

        write_config(&path, &config).unwrap();
        assert_eq!(read_config(&path).unwrap(), config);
    }

    #[test]
    fn test_optional_sections_default_when_missing() {
        let config: BudgetConfig = toml::from_str("[store]\npath = \"/tmp/b.db\"\n").unwrap();
        assert_eq!(config.identity.owner, None);
        assert_eq!(config.remote, RemoteSection::default());
        assert_eq!(config.export.dir, None);
    }

    #[test]
    fn test_remote_timeout_is_optional() {
        let config: BudgetConfig = toml::from_str(
            "[store]\npath = \"/tmp/b.db\"\n[remote]\nurl = \"https://docs.example.com\"\n",
        )
        .unwrap();
        assert_eq!(config.remote.timeout_secs, None);

        let config: BudgetConfig = toml::from_str(
            "[store]\npath = \"/tmp/b.db\"\n[remote]\nurl = \"https://docs.example.com\"\ntimeout_secs = 15\n",
        )
        .unwrap();
        assert_eq!(config.remote.timeout_secs, Some(15));
    }

    #[test]
    fn test_blank_owner_is_dropped() {
        let config = BudgetConfig::new(
            PathBuf::from("/tmp/b.db"),
            Some("  ".to_string()),
            RemoteSection::default(),
            None,
        );
        assert_eq!(config.identity.owner, None);
    }
}
