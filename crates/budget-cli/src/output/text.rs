//! Table output for the terminal.

use std::collections::HashMap;
use std::io::IsTerminal;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use owo_colors::OwoColorize;
use rust_decimal::Decimal;

use budget_core::export::UNKNOWN_CATEGORY;
use budget_core::report::{
    format_currency, BudgetOverview, BudgetProgress, CategorySlice, MonthlyPoint,
};
use budget_core::storage::{Budget, Category, Transaction};

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

fn amount_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn color_enabled() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn category_name(categories: &HashMap<i64, Category>, id: i64) -> &str {
    categories
        .get(&id)
        .map(|c| c.name.as_str())
        .unwrap_or(UNKNOWN_CATEGORY)
}

/// Signed amount: income positive, expenses negative.
fn signed_amount(tx: &Transaction) -> String {
    let amount = if tx.is_income { tx.amount } else { -tx.amount };
    let text = format_currency(amount);
    if !color_enabled() {
        return text;
    }
    if tx.is_income {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

pub fn print_transactions(transactions: &[Transaction], categories: &HashMap<i64, Category>) {
    if transactions.is_empty() {
        println!("No transactions.");
        return;
    }
    let mut table = new_table(&["ID", "Date", "Category", "Description", "Amount"]);
    for tx in transactions {
        table.add_row(vec![
            Cell::new(tx.id),
            Cell::new(tx.date.format("%Y-%m-%d")),
            Cell::new(category_name(categories, tx.category_id)),
            Cell::new(&tx.description),
            amount_cell(signed_amount(tx)),
        ]);
    }
    println!("{table}");
}

pub fn print_transaction(tx: &Transaction, categories: &HashMap<i64, Category>) {
    println!("ID: {}", tx.id);
    println!("Date: {}", tx.date.format("%Y-%m-%d %H:%M"));
    println!("Category: {}", category_name(categories, tx.category_id));
    println!("Description: {}", tx.description);
    println!("Amount: {}", signed_amount(tx));
}

pub fn print_budgets(budgets: &[Budget], categories: &HashMap<i64, Category>) {
    if budgets.is_empty() {
        println!("No budgets.");
        return;
    }
    let mut table = new_table(&["ID", "Month", "Category", "Limit"]);
    for budget in budgets {
        table.add_row(vec![
            Cell::new(budget.id),
            Cell::new(format!("{}-{:02}", budget.year, budget.month)),
            Cell::new(category_name(categories, budget.category_id)),
            amount_cell(format_currency(budget.amount)),
        ]);
    }
    println!("{table}");
}

fn progress_status(progress: &BudgetProgress) -> String {
    let color = color_enabled();
    if progress.over_limit {
        if color {
            return "over".red().bold().to_string();
        }
        "over".to_string()
    } else if progress.near_limit {
        if color {
            return "near".yellow().to_string();
        }
        "near".to_string()
    } else {
        "ok".to_string()
    }
}

pub fn print_progress(progress: &[BudgetProgress], categories: &HashMap<i64, Category>) {
    if progress.is_empty() {
        println!("No budgets for this month.");
        return;
    }
    let mut table = new_table(&["Category", "Spent", "Limit", "Remaining", "Used", "Status"]);
    for item in progress {
        table.add_row(vec![
            Cell::new(category_name(categories, item.category_id)),
            amount_cell(format_currency(item.spent)),
            amount_cell(format_currency(item.limit)),
            amount_cell(format_currency(item.remaining())),
            amount_cell(format!("{}%", item.percentage.round_dp(0))),
            Cell::new(progress_status(item)),
        ]);
    }
    println!("{table}");
}

pub fn print_categories(categories: &[Category]) {
    let mut table = new_table(&["ID", "Name", "Color", "Icon", "Owner"]);
    for category in categories {
        table.add_row(vec![
            Cell::new(category.id),
            Cell::new(&category.name),
            Cell::new(category.color_hex()),
            Cell::new(category.icon.as_deref().unwrap_or("")),
            Cell::new(category.owner_id.as_deref().unwrap_or("shared")),
        ]);
    }
    println!("{table}");
}

pub fn print_spending(slices: &[CategorySlice], total: Decimal) {
    let mut table = new_table(&["Category", "Spent", "Share"]);
    for slice in slices {
        let share = slice
            .amount
            .checked_div(total)
            .map(|ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO);
        table.add_row(vec![
            Cell::new(&slice.name),
            amount_cell(format_currency(slice.amount)),
            amount_cell(format!("{}%", share.round_dp(1))),
        ]);
    }
    println!("{table}");
    println!("Total: {}", format_currency(total));
}

pub fn print_trend(points: &[MonthlyPoint]) {
    let mut table = new_table(&["Month", "Amount", "Change"]);
    for point in points {
        let change = if point.percentage_change.is_zero() {
            "-".to_string()
        } else {
            let arrow = if point.is_increase { "+" } else { "" };
            format!("{}{}%", arrow, point.percentage_change.round_dp(1))
        };
        table.add_row(vec![
            Cell::new(format!("{} {}", point.label, point.year)),
            amount_cell(format_currency(point.amount)),
            amount_cell(change),
        ]);
    }
    println!("{table}");
}

pub fn print_overview(income: Decimal, expenses: Decimal, budgets: &BudgetOverview) {
    println!("{:<18}{}", "Income:", format_currency(income));
    println!("{:<18}{}", "Expenses:", format_currency(expenses));
    println!("{:<18}{}", "Balance:", format_currency(income.saturating_sub(expenses)));
    println!();
    println!("{:<18}{}", "Budgeted:", format_currency(budgets.total_budget));
    println!("{:<18}{}", "Spent in budgets:", format_currency(budgets.total_spent));
    let remaining = format_currency(budgets.remaining);
    if budgets.remaining.is_sign_negative() && color_enabled() {
        println!("{:<18}{}", "Remaining:", remaining.red());
    } else {
        println!("{:<18}{}", "Remaining:", remaining);
    }
}
