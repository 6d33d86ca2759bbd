//! Application context for the Budget CLI.
//!
//! Bundles CLI arguments with lazily-resolved settings and the repository
//! so handlers never open the store more than once.

use std::sync::Arc;
use std::time::Duration;

use once_cell::unsync::OnceCell;

use budget_core::remote::HttpRemoteStore;
use budget_core::repository::DEFAULT_OWNER;
use budget_core::{IdentityProvider, Repository, SqliteStore, StaticIdentity};

use crate::cli::Cli;

use super::resolver::{missing_store_message, resolve_settings, Settings};

pub struct AppContext<'a> {
    cli: &'a Cli,
    settings: OnceCell<Settings>,
    identity: OnceCell<StaticIdentity>,
    repo: OnceCell<Repository<SqliteStore>>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            settings: OnceCell::new(),
            identity: OnceCell::new(),
            repo: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Resolved settings, loading the config file on first use.
    pub fn settings(&self) -> anyhow::Result<&Settings> {
        self.settings.get_or_try_init(|| resolve_settings(self.cli))
    }

    pub fn identity(&self) -> anyhow::Result<&StaticIdentity> {
        self.identity
            .get_or_try_init(|| Ok(StaticIdentity::new(self.settings()?.owner.clone())))
    }

    /// Active owner; empty when none is configured, which also keeps
    /// writes out of the remote mirror.
    pub fn owner(&self) -> anyhow::Result<String> {
        Ok(self.identity()?.owner_or_empty())
    }

    /// Owner whose categories are listed and resolved. Without a configured
    /// owner this is the owner the seed categories were tagged with.
    pub fn category_owner(&self) -> anyhow::Result<String> {
        let owner = self.owner()?;
        if owner.is_empty() {
            return Ok(DEFAULT_OWNER.to_string());
        }
        Ok(owner)
    }

    /// Open the store, attach the remote mirror if one is configured and
    /// seed default categories into an empty store.
    pub fn repo(&self) -> anyhow::Result<&Repository<SqliteStore>> {
        self.repo.get_or_try_init(|| {
            let settings = self.settings()?;
            if !settings.store_path.exists() {
                return Err(anyhow::anyhow!(missing_store_message(&settings.store_path)));
            }

            let local = Arc::new(SqliteStore::open(&settings.store_path)?);
            let repo = match settings.remote.url.as_deref() {
                Some(url) if !url.trim().is_empty() => {
                    let token = settings.remote.token.clone();
                    let remote = match settings.remote.timeout_secs {
                        Some(secs) => {
                            HttpRemoteStore::with_timeout(url, token, Duration::from_secs(secs))?
                        }
                        None => HttpRemoteStore::new(url, token)?,
                    };
                    tracing::debug!("Mirroring writes to {}", url);
                    Repository::new(local, Arc::new(remote))
                }
                _ => Repository::local_only(local),
            };

            let owner = self.identity()?.current_owner();
            repo.ensure_default_categories(owner.as_deref())?;
            Ok(repo)
        })
    }
}
