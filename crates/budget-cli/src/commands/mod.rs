//! Command handlers, one module per command group.

mod budgets;
mod categories;
mod export;
mod init;
mod misc;
mod profile;
mod reports;
mod sync;
mod transactions;

pub use budgets::handle_budget;
pub use categories::handle_category;
pub use export::handle_export;
pub use init::handle_init;
pub use misc::handle_completions;
pub use profile::handle_profile;
pub use reports::handle_report;
pub use sync::handle_sync;
pub use transactions::{handle_add, handle_delete, handle_edit, handle_list};

use std::io::IsTerminal;

use budget_core::{MirrorHandle, MirrorOutcome};

use crate::app::AppContext;

/// Wait for a remote mirror before the process exits.
///
/// A failed mirror never fails the command; the local write already stands.
pub(crate) async fn settle_mirror(ctx: &AppContext<'_>, handle: MirrorHandle) {
    if !handle.is_spawned() {
        return;
    }
    if handle.wait().await == MirrorOutcome::Failed && !ctx.quiet() {
        eprintln!("Warning: saved locally, but the remote copy was not updated");
    }
}

/// Ask before a destructive action when a user is at the terminal.
pub(crate) fn confirm(ctx: &AppContext<'_>, prompt: String, assume_yes: bool) -> anyhow::Result<bool> {
    if assume_yes || ctx.quiet() || !std::io::stdin().is_terminal() {
        return Ok(true);
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
