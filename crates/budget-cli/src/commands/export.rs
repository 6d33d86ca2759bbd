use std::path::PathBuf;

use chrono::Local;

use budget_core::export::export_to_dir;
use budget_core::storage::TransactionFilter;

use crate::app::AppContext;
use crate::cli::ExportArgs;
use crate::config::xdg_data_dir;

pub fn handle_export(ctx: &AppContext<'_>, args: &ExportArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;

    let dir = match (args.dir.as_deref(), ctx.settings()?.export_dir.as_ref()) {
        (Some(dir), _) => PathBuf::from(dir),
        (None, Some(dir)) => dir.clone(),
        (None, None) => xdg_data_dir()?.join("exports"),
    };

    let transactions = repo.transactions(&owner, TransactionFilter::new()).current()?;
    let categories = repo.category_map(&ctx.category_owner()?).current()?;
    let path = export_to_dir(&dir, &transactions, &categories, &Local::now())?;

    if ctx.quiet() {
        println!("{}", path.display());
    } else {
        println!(
            "Exported {} transactions to {}",
            transactions.len(),
            path.display()
        );
    }
    Ok(())
}
