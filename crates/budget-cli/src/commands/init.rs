use std::path::PathBuf;
use std::sync::Arc;

use budget_core::{Repository, SqliteStore};

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_store_path, write_config, BudgetConfig, RemoteSection};

pub fn handle_init(ctx: &AppContext<'_>, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path()?;
    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {}\nHint: Pass --force to overwrite it.",
            config_path.display()
        ));
    }

    let target = match args.path.as_deref().or(ctx.cli().store.as_deref()) {
        Some(path) => PathBuf::from(path),
        None => default_store_path()?,
    };
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!("Failed to create store directory {}: {}", parent.display(), e)
        })?;
    }

    let store = SqliteStore::open(&target)?;
    let repo = Repository::local_only(Arc::new(store));
    let owner = ctx.cli().owner.clone().filter(|o| !o.trim().is_empty());
    let seeded = repo.ensure_default_categories(owner.as_deref())?;

    let store_path = std::fs::canonicalize(&target).unwrap_or(target);
    let config = BudgetConfig::new(
        store_path.clone(),
        owner,
        RemoteSection {
            url: args.remote_url.clone(),
            token: args.remote_token.clone(),
            timeout_secs: None,
        },
        args.export_dir.as_ref().map(PathBuf::from),
    );
    write_config(&config_path, &config)?;

    if !ctx.quiet() {
        println!("Initialized budget store at {}", store_path.display());
        if seeded {
            println!("Added default categories");
        }
        println!("Wrote config to {}", config_path.display());
    }
    Ok(())
}
