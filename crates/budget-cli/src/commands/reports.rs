use chrono::{Datelike, Months, Utc};
use serde_json::json;

use budget_core::report::{
    budget_overview, category_expense_report, category_spending, current_month_range,
    month_range, monthly_trend, saturating_sum, TrendKind, TREND_MONTHS,
};
use budget_core::storage::{DateRange, TransactionFilter};

use crate::app::AppContext;
use crate::cli::{JsonArgs, ReportCommands, SpendingArgs, TrendArgs};
use crate::helpers::parse_month;
use crate::output::{print_json, text};

pub fn handle_report(ctx: &AppContext<'_>, command: &ReportCommands) -> anyhow::Result<()> {
    match command {
        ReportCommands::Spending(args) => handle_spending(ctx, args),
        ReportCommands::Trend(args) => handle_trend(ctx, args),
        ReportCommands::Overview(args) => handle_overview(ctx, args),
    }
}

fn handle_spending(ctx: &AppContext<'_>, args: &SpendingArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;

    let range = match args.month.as_deref() {
        Some(value) => {
            let (year, month) = parse_month(value)?;
            month_range(year, month)
                .ok_or_else(|| anyhow::anyhow!("Invalid month: {}", value))?
        }
        None => current_month_range(Utc::now()),
    };

    let transactions = repo
        .transactions(&owner, TransactionFilter::new().range(range))
        .current()?;
    let spending = category_spending(&transactions);
    let categories = repo.categories(&ctx.category_owner()?).current()?;
    let slices = category_expense_report(&categories, &spending);
    let total = saturating_sum(slices.iter().map(|slice| slice.amount));

    if args.json {
        return print_json(&json!({
            "month": range.start.format("%Y-%m").to_string(),
            "total": format!("{:.2}", total),
            "categories": slices,
        }));
    }
    text::print_spending(&slices, total);
    Ok(())
}

fn handle_trend(ctx: &AppContext<'_>, args: &TrendArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;
    let now = Utc::now();

    let kind = if args.income {
        TrendKind::Income
    } else {
        TrendKind::Expense
    };

    // Oldest month of the trend window.
    let first = now
        .with_day(1)
        .and_then(|d| d.checked_sub_months(Months::new(TREND_MONTHS as u32 - 1)))
        .unwrap_or(now);
    let window = DateRange::new(
        current_month_range(first).start,
        current_month_range(now).end,
    );
    let transactions = repo
        .transactions(&owner, TransactionFilter::new().range(window))
        .current()?;

    let points = monthly_trend(&transactions, now, kind);
    if args.json {
        return print_json(&points);
    }
    text::print_trend(&points);
    Ok(())
}

fn handle_overview(ctx: &AppContext<'_>, args: &JsonArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;

    let income = repo.total_income(&owner).current()?;
    let expenses = repo.total_expenses(&owner).current()?;

    let month = current_month_range(Utc::now());
    let transactions = repo
        .transactions(&owner, TransactionFilter::new().range(month))
        .current()?;
    let spending = category_spending(&transactions);
    let budgets = repo.budgets_for_current_month(&owner).current()?;
    let overview = budget_overview(&budgets, &spending);

    if args.json {
        return print_json(&json!({
            "income": format!("{:.2}", income),
            "expenses": format!("{:.2}", expenses),
            "balance": format!("{:.2}", income.saturating_sub(expenses)),
            "month": format!("{}-{:02}", month.start.year(), month.start.month()),
            "budgets": overview,
        }));
    }
    text::print_overview(income, expenses, &overview);
    Ok(())
}
