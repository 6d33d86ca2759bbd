use chrono::Utc;

use budget_core::commands::{add_transaction, edit_transaction, TransactionDraft};
use budget_core::report::month_range;
use budget_core::storage::{DateRange, Transaction, TransactionFilter};

use crate::app::AppContext;
use crate::cli::{AddArgs, DeleteArgs, EditArgs, ListArgs};
use crate::helpers::{parse_amount, parse_datetime, parse_month, resolve_category};
use crate::output::{json, print_json, text};

use super::{confirm, settle_mirror};

const DEFAULT_LIST_LIMIT: usize = 20;

const REJECTED_HINT: &str = "amount must be above zero, the description must not be blank, \
the date must not be in the future and a category must be chosen";

pub async fn handle_add(ctx: &AppContext<'_>, args: &AddArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;
    let now = Utc::now();

    let draft = TransactionDraft {
        amount: parse_amount(&args.amount)?,
        description: args.description.clone(),
        date: match args.date.as_deref() {
            Some(value) => parse_datetime(value)?,
            None => now,
        },
        category_id: resolve_category(repo, &ctx.category_owner()?, &args.category)?,
        is_income: args.income,
    };

    let saved = add_transaction(repo, &owner, draft, now)?
        .ok_or_else(|| anyhow::anyhow!("Transaction not saved: {}", REJECTED_HINT))?;
    let id = saved.record.id;
    settle_mirror(ctx, saved.mirror).await;

    if !ctx.quiet() {
        println!("Added transaction {}", id);
    }
    Ok(())
}

pub async fn handle_edit(ctx: &AppContext<'_>, args: &EditArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;
    let mut tx: Transaction = repo.require(args.id)?;

    if let Some(ref amount) = args.amount {
        tx.amount = parse_amount(amount)?;
    }
    if let Some(ref description) = args.description {
        tx.description = description.clone();
    }
    if let Some(ref category) = args.category {
        tx.category_id = resolve_category(repo, &ctx.category_owner()?, category)?;
    }
    if let Some(ref date) = args.date {
        tx.date = parse_datetime(date)?;
    }
    if args.income {
        tx.is_income = true;
    } else if args.expense {
        tx.is_income = false;
    }

    let saved = edit_transaction(repo, &owner, tx, Utc::now())?
        .ok_or_else(|| anyhow::anyhow!("Transaction not saved: {}", REJECTED_HINT))?;
    let record = saved.record.clone();
    settle_mirror(ctx, saved.mirror).await;

    if !ctx.quiet() {
        let categories = repo.category_map(&ctx.category_owner()?).current()?;
        text::print_transaction(&record, &categories);
    }
    Ok(())
}

pub async fn handle_delete(ctx: &AppContext<'_>, args: &DeleteArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;
    let tx: Transaction = repo.require(args.id)?;

    let prompt = format!("Delete transaction {} ({})?", tx.id, tx.description);
    if !confirm(ctx, prompt, args.yes)? {
        return Err(anyhow::anyhow!("Delete cancelled"));
    }

    let mirror = repo.delete(&owner, &tx)?;
    settle_mirror(ctx, mirror).await;

    if !ctx.quiet() {
        println!("Deleted transaction {}", tx.id);
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext<'_>, args: &ListArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;

    let mut filter = TransactionFilter::new();
    if let Some(ref month) = args.month {
        let (year, month) = parse_month(month)?;
        let range = month_range(year, month)
            .ok_or_else(|| anyhow::anyhow!("Invalid month: {}-{:02}", year, month))?;
        filter = filter.range(range);
    } else if args.since.is_some() || args.until.is_some() {
        let start = match args.since.as_deref() {
            Some(value) => parse_datetime(value)?,
            None => chrono::DateTime::<Utc>::MIN_UTC,
        };
        let end = match args.until.as_deref() {
            Some(value) => parse_datetime(value)?,
            None => Utc::now(),
        };
        filter = filter.range(DateRange::new(start, end));
    }
    if let Some(ref category) = args.category {
        filter = filter.category(resolve_category(repo, &ctx.category_owner()?, category)?);
    }
    if args.income {
        filter = filter.income(true);
    } else if args.expenses {
        filter = filter.income(false);
    }
    if let Some(limit) = args.limit {
        filter = filter.limit(limit);
    } else if args.month.is_none() && args.since.is_none() && args.until.is_none() {
        filter = filter.limit(DEFAULT_LIST_LIMIT);
    }

    let transactions = repo.transactions(&owner, filter).current()?;
    let categories = repo.category_map(&ctx.category_owner()?).current()?;

    if args.json {
        return print_json(&json::transactions_json(&transactions, &categories));
    }
    text::print_transactions(&transactions, &categories);
    Ok(())
}
