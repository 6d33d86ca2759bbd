use budget_core::repository::EntitySyncCounts;

use crate::app::AppContext;

pub async fn handle_sync(ctx: &AppContext<'_>) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    if !repo.has_remote() {
        return Err(anyhow::anyhow!(
            "No remote store configured.\nHint: Set [remote] url in the config file."
        ));
    }

    let owner = ctx.owner()?;
    let report = repo.sync_from_remote(&owner).await;
    if let Some(error) = report.error.as_deref() {
        return Err(anyhow::anyhow!("Sync failed: {}", error));
    }

    if !ctx.quiet() {
        print_counts("Transactions", &report.transactions);
        print_counts("Budgets", &report.budgets);
        print_counts("Categories", &report.categories);
    }
    if report.failed() > 0 {
        eprintln!(
            "Warning: {} records could not be applied; see BUDGET_LOG=warn output",
            report.failed()
        );
    }
    Ok(())
}

fn print_counts(label: &str, counts: &EntitySyncCounts) {
    println!(
        "{:<14}{} new, {} updated",
        format!("{}:", label),
        counts.inserted,
        counts.updated
    );
}
