use chrono::{Datelike, Utc};

use budget_core::commands::{add_budget, edit_budget};
use budget_core::report::{budget_progress, category_spending, current_month_range};
use budget_core::storage::{Budget, TransactionFilter};

use crate::app::AppContext;
use crate::cli::{
    BudgetCommands, BudgetEditArgs, BudgetListArgs, BudgetSetArgs, DeleteArgs, JsonArgs,
};
use crate::helpers::{parse_amount, parse_month, resolve_category};
use crate::output::{json, print_json, text};

use super::{confirm, settle_mirror};

const REJECTED_HINT: &str = "amount must be above zero and a category must be chosen";

pub async fn handle_budget(ctx: &AppContext<'_>, command: &BudgetCommands) -> anyhow::Result<()> {
    match command {
        BudgetCommands::Set(args) => handle_set(ctx, args).await,
        BudgetCommands::Edit(args) => handle_edit(ctx, args).await,
        BudgetCommands::Delete(args) => handle_delete(ctx, args).await,
        BudgetCommands::List(args) => handle_list(ctx, args),
        BudgetCommands::Progress(args) => handle_progress(ctx, args),
    }
}

async fn handle_set(ctx: &AppContext<'_>, args: &BudgetSetArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;
    let now = Utc::now();

    let amount = parse_amount(&args.amount)?;
    let category_id = resolve_category(repo, &ctx.category_owner()?, &args.category)?;
    let saved = add_budget(repo, &owner, amount, category_id, now)?
        .ok_or_else(|| anyhow::anyhow!("Budget not saved: {}", REJECTED_HINT))?;
    let id = saved.record.id;
    settle_mirror(ctx, saved.mirror).await;

    if !ctx.quiet() {
        println!("Added budget {} for {}-{:02}", id, now.year(), now.month());
    }
    Ok(())
}

async fn handle_edit(ctx: &AppContext<'_>, args: &BudgetEditArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;
    let mut budget: Budget = repo.require(args.id)?;

    if let Some(ref amount) = args.amount {
        budget.amount = parse_amount(amount)?;
    }
    if let Some(ref category) = args.category {
        budget.category_id = resolve_category(repo, &ctx.category_owner()?, category)?;
    }

    let saved = edit_budget(repo, &owner, budget)?
        .ok_or_else(|| anyhow::anyhow!("Budget not saved: {}", REJECTED_HINT))?;
    let id = saved.record.id;
    settle_mirror(ctx, saved.mirror).await;

    if !ctx.quiet() {
        println!("Updated budget {}", id);
    }
    Ok(())
}

async fn handle_delete(ctx: &AppContext<'_>, args: &DeleteArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;
    let budget: Budget = repo.require(args.id)?;

    let prompt = format!(
        "Delete budget {} ({}-{:02})?",
        budget.id, budget.year, budget.month
    );
    if !confirm(ctx, prompt, args.yes)? {
        return Err(anyhow::anyhow!("Delete cancelled"));
    }

    let mirror = repo.delete(&owner, &budget)?;
    settle_mirror(ctx, mirror).await;

    if !ctx.quiet() {
        println!("Deleted budget {}", budget.id);
    }
    Ok(())
}

fn handle_list(ctx: &AppContext<'_>, args: &BudgetListArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;

    let budgets = match args.month.as_deref() {
        Some(value) => {
            let (year, month) = parse_month(value)?;
            repo.budgets_for_month(&owner, month, year).current()?
        }
        None => repo.budgets(&owner).current()?,
    };
    let categories = repo.category_map(&ctx.category_owner()?).current()?;

    if args.json {
        return print_json(&json::budgets_json(&budgets, &categories));
    }
    text::print_budgets(&budgets, &categories);
    Ok(())
}

fn handle_progress(ctx: &AppContext<'_>, args: &JsonArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;

    let month = current_month_range(Utc::now());
    let transactions = repo
        .transactions(&owner, TransactionFilter::new().range(month).income(false))
        .current()?;
    let spending = category_spending(&transactions);
    let budgets = repo.budgets_for_current_month(&owner).current()?;
    let progress = budget_progress(&budgets, &spending);

    if args.json {
        return print_json(&progress);
    }
    let categories = repo.category_map(&ctx.category_owner()?).current()?;
    text::print_progress(&progress, &categories);
    Ok(())
}
