//! Reporting and aggregation.
//!
//! Everything here is a pure function of a snapshot of store results. Feed
//! them from a [`LiveQuery`](crate::storage::LiveQuery) to recompute on
//! every change.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::repository::INCOME_CATEGORY_ID;
use crate::storage::{Budget, Category, DateRange, Transaction};

/// Number of months in a trend window.
pub const TREND_MONTHS: usize = 6;

/// Percentage at which a budget counts as nearly spent.
const NEAR_LIMIT_PERCENT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);
const OVER_LIMIT_PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// Sum that pins at `Decimal::MAX` instead of overflowing.
pub fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |total, amount| total.saturating_add(amount))
}

/// Expenses summed per category. Income is ignored.
///
/// Sums saturate rather than overflow.
pub fn category_spending(transactions: &[Transaction]) -> BTreeMap<i64, Decimal> {
    let mut spending = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| !tx.is_income) {
        let total = spending.entry(tx.category_id).or_insert(Decimal::ZERO);
        *total = total.saturating_add(tx.amount);
    }
    spending
}

/// One slice of the per-category expense chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    pub category_id: i64,
    pub name: String,
    pub color: String,
    /// Actual spending; zero when the category has none.
    pub amount: Decimal,
    /// Relative size for display. Every slice weighs 1 when nothing has been
    /// spent so the chart is never empty.
    pub weight: Decimal,
}

/// Slices for every category except the income category, in input order.
pub fn category_expense_report(
    categories: &[Category],
    spending: &BTreeMap<i64, Decimal>,
) -> Vec<CategorySlice> {
    let total = saturating_sum(
        spending
            .iter()
            .filter(|(id, _)| **id != INCOME_CATEGORY_ID)
            .map(|(_, amount)| *amount),
    );

    categories
        .iter()
        .filter(|category| category.id != INCOME_CATEGORY_ID)
        .map(|category| {
            let amount = spending.get(&category.id).copied().unwrap_or(Decimal::ZERO);
            let weight = if total.is_zero() { Decimal::ONE } else { amount };
            CategorySlice {
                category_id: category.id,
                name: category.name.clone(),
                color: category.color_hex(),
                amount,
                weight,
            }
        })
        .collect()
}

/// How much of a budget has been spent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    pub budget_id: i64,
    pub category_id: i64,
    pub limit: Decimal,
    pub spent: Decimal,
    pub percentage: Decimal,
    pub near_limit: bool,
    pub over_limit: bool,
}

impl BudgetProgress {
    pub fn remaining(&self) -> Decimal {
        self.limit.saturating_sub(self.spent)
    }
}

/// Spent percentage of `spent` against `limit`; zero when the limit is not
/// positive. Saturates at `Decimal::MAX` for tiny limits.
pub fn budget_percentage(spent: Decimal, limit: Decimal) -> Decimal {
    if limit <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    spent
        .checked_div(limit)
        .map(|ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::MAX)
}

pub fn budget_progress(
    budgets: &[Budget],
    spending: &BTreeMap<i64, Decimal>,
) -> Vec<BudgetProgress> {
    budgets
        .iter()
        .map(|budget| {
            let spent = spending
                .get(&budget.category_id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let percentage = budget_percentage(spent, budget.amount);
            BudgetProgress {
                budget_id: budget.id,
                category_id: budget.category_id,
                limit: budget.amount,
                spent,
                percentage,
                near_limit: percentage >= NEAR_LIMIT_PERCENT,
                over_limit: percentage > OVER_LIMIT_PERCENT,
            }
        })
        .collect()
}

/// Totals across a month's budgets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetOverview {
    pub total_budget: Decimal,
    pub total_spent: Decimal,
    pub remaining: Decimal,
}

/// Spending counts only for categories that have a budget.
pub fn budget_overview(budgets: &[Budget], spending: &BTreeMap<i64, Decimal>) -> BudgetOverview {
    let total_budget = saturating_sum(budgets.iter().map(|b| b.amount));
    let mut budgeted: Vec<i64> = budgets.iter().map(|b| b.category_id).collect();
    budgeted.sort_unstable();
    budgeted.dedup();
    let total_spent = saturating_sum(budgeted.iter().filter_map(|id| spending.get(id)).copied());

    BudgetOverview {
        total_budget,
        total_spent,
        remaining: total_budget.saturating_sub(total_spent),
    }
}

/// Which transactions a trend sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendKind {
    Income,
    Expense,
}

impl TrendKind {
    fn includes(self, tx: &Transaction) -> bool {
        match self {
            TrendKind::Income => tx.is_income,
            TrendKind::Expense => !tx.is_income,
        }
    }
}

/// One month of a trend series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    /// Short month name, e.g. "Jan"
    pub label: String,
    pub month: u32,
    pub year: i32,
    pub amount: Decimal,
    /// Change against the previous point; zero for the first point and
    /// whenever the previous amount is zero.
    pub percentage_change: Decimal,
    pub is_increase: bool,
}

/// `(year, month)` stepped back `offset` months from `(year, month)`.
fn months_back(year: i32, month: u32, offset: u32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 - offset as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Change from `prev` to `amount` in percent; `prev` must be non-zero.
fn percentage_change(prev: Decimal, amount: Decimal) -> Decimal {
    let delta = amount.saturating_sub(prev);
    match delta.checked_div(prev) {
        Some(ratio) => ratio.saturating_mul(Decimal::ONE_HUNDRED),
        None if delta.is_sign_negative() == prev.is_sign_negative() => Decimal::MAX,
        None => Decimal::MIN,
    }
}

/// The trailing six months ending at `anchor`'s month, oldest first.
pub fn monthly_trend(
    transactions: &[Transaction],
    anchor: DateTime<Utc>,
    kind: TrendKind,
) -> Vec<MonthlyPoint> {
    let mut points: Vec<MonthlyPoint> = Vec::with_capacity(TREND_MONTHS);

    for offset in (0..TREND_MONTHS as u32).rev() {
        let (year, month) = months_back(anchor.year(), anchor.month(), offset);
        let Some(range) = month_range(year, month) else {
            continue;
        };
        let amount = saturating_sum(
            transactions
                .iter()
                .filter(|tx| kind.includes(tx) && range.contains(tx.date))
                .map(|tx| tx.amount),
        );

        let previous = points.last().map(|p| p.amount);
        let (percentage_change, is_increase) = match previous {
            Some(prev) if !prev.is_zero() => {
                (percentage_change(prev, amount), amount > prev)
            }
            Some(prev) => (Decimal::ZERO, amount > prev),
            None => (Decimal::ZERO, false),
        };

        points.push(MonthlyPoint {
            label: range.start.format("%b").to_string(),
            month,
            year,
            amount,
            percentage_change,
            is_increase,
        });
    }

    points
}

/// Inclusive window from the first to the last millisecond of a month.
///
/// Returns `None` for an invalid month.
pub fn month_range(year: i32, month: u32) -> Option<DateRange> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;

    let start = Utc.from_utc_datetime(&first.and_hms_opt(0, 0, 0)?);
    let end = Utc.from_utc_datetime(&next.and_hms_opt(0, 0, 0)?) - Duration::milliseconds(1);
    Some(DateRange::new(start, end))
}

/// The month containing `today`.
pub fn current_month_range(today: DateTime<Utc>) -> DateRange {
    // A date that exists always yields a valid month.
    month_range(today.year(), today.month())
        .unwrap_or_else(|| DateRange::new(today, today))
}

/// US-style currency: `$1,234.56`, negatives as `-$1,234.56`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .abs();
    let text = format!("{:.2}", rounded);
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}${}.{}", sign, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn expense(amount: Decimal, category_id: i64, date: DateTime<Utc>) -> Transaction {
        Transaction::new(amount, "x", date, category_id, "u1")
    }

    #[test]
    fn test_category_spending_ignores_income() {
        let txs = vec![
            expense(dec!(10), 1, at(2024, 3, 1)),
            expense(dec!(5.5), 1, at(2024, 3, 2)),
            expense(dec!(20), 2, at(2024, 3, 3)),
            expense(dec!(999), 8, at(2024, 3, 3)).income(),
        ];

        let spending = category_spending(&txs);
        assert_eq!(spending.len(), 2);
        assert_eq!(spending[&1], dec!(15.5));
        assert_eq!(spending[&2], dec!(20));

        let total: Decimal = spending.values().copied().sum();
        let expected: Decimal = txs.iter().filter(|t| !t.is_income).map(|t| t.amount).sum();
        assert_eq!(total, expected);
        assert_eq!(category_spending(&txs), spending);
    }

    #[test]
    fn test_expense_report_equal_slices_when_nothing_spent() {
        let categories = vec![
            Category::new("Food", 0x558B2F).with_id(1),
            Category::new("Utilities", 0x4CAF50).with_id(5),
            Category::new("Paycheck", 0xF44336).with_id(8),
        ];

        let slices = category_expense_report(&categories, &BTreeMap::new());
        assert_eq!(slices.len(), 2);
        assert!(slices.iter().all(|s| s.weight == Decimal::ONE && s.amount.is_zero()));

        let spending = BTreeMap::from([(5, dec!(50))]);
        let slices = category_expense_report(&categories, &spending);
        assert_eq!(slices[0].weight, Decimal::ZERO);
        assert_eq!(slices[1].weight, dec!(50));
        assert_eq!(slices[1].color, "#4CAF50");
    }

    #[test]
    fn test_budget_progress_thresholds() {
        let budgets = vec![
            Budget::new(dec!(100), 1, 3, 2024, "u1"),
            Budget::new(dec!(100), 2, 3, 2024, "u1"),
            Budget::new(dec!(100), 3, 3, 2024, "u1"),
            Budget::new(dec!(0), 4, 3, 2024, "u1"),
        ];
        let spending = BTreeMap::from([(1, dec!(79.99)), (2, dec!(100)), (3, dec!(100.01)), (4, dec!(5))]);

        let progress = budget_progress(&budgets, &spending);
        assert!(!progress[0].near_limit);
        assert_eq!(progress[1].percentage, dec!(100));
        assert!(progress[1].near_limit && !progress[1].over_limit);
        assert!(progress[2].over_limit);
        assert_eq!(progress[3].percentage, Decimal::ZERO);
        assert!(!progress[3].near_limit);
    }

    #[test]
    fn test_budget_percentage_negative_limit() {
        assert_eq!(budget_percentage(dec!(10), dec!(-5)), Decimal::ZERO);
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let budgets = vec![Budget::new(dec!(0.01), 1, 3, 2024, "u1")];
        let spending = BTreeMap::from([(1, dec!(1e25))]);
        let progress = budget_progress(&budgets, &spending);
        assert_eq!(progress[0].percentage, Decimal::MAX);
        assert!(progress[0].over_limit);

        let txs = vec![
            expense(Decimal::MAX, 1, at(2024, 3, 1)),
            expense(Decimal::MAX, 1, at(2024, 3, 2)),
        ];
        let spending = category_spending(&txs);
        assert_eq!(spending[&1], Decimal::MAX);

        let overview = budget_overview(&budgets, &spending);
        assert_eq!(overview.total_spent, Decimal::MAX);
        assert!(overview.remaining.is_sign_negative());

        let points = monthly_trend(&txs, at(2024, 3, 20), TrendKind::Expense);
        assert_eq!(points[5].amount, Decimal::MAX);
        assert_eq!(points[5].percentage_change, Decimal::ZERO);
        assert_eq!(percentage_change(dec!(0.0001), Decimal::MAX), Decimal::MAX);
    }

    #[test]
    fn test_budget_overview() {
        let budgets = vec![
            Budget::new(dec!(100), 1, 3, 2024, "u1"),
            Budget::new(dec!(200), 2, 3, 2024, "u1"),
        ];
        let spending = BTreeMap::from([(1, dec!(40)), (7, dec!(1000))]);

        let overview = budget_overview(&budgets, &spending);
        assert_eq!(overview.total_budget, dec!(300));
        assert_eq!(overview.total_spent, dec!(40));
        assert_eq!(overview.remaining, dec!(260));
    }

    #[test]
    fn test_monthly_trend_wraps_year() {
        let txs = vec![
            expense(dec!(30), 1, at(2023, 11, 15)),
            expense(dec!(60), 1, at(2024, 2, 1)),
            expense(dec!(10), 1, at(2024, 2, 29)).income(),
        ];

        let points = monthly_trend(&txs, at(2024, 2, 10), TrendKind::Expense);
        let labels: Vec<_> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);
        assert_eq!(points[0].year, 2023);
        assert_eq!(points[5].year, 2024);
        assert_eq!(points[2].amount, dec!(30));
        assert_eq!(points[5].amount, dec!(60));
        assert!(points[5].is_increase);
        assert!(!points[3].is_increase);
        assert_eq!(points[3].percentage_change, dec!(-100));

        let income = monthly_trend(&txs, at(2024, 2, 10), TrendKind::Income);
        assert_eq!(income[5].amount, dec!(10));
    }

    #[test]
    fn test_month_range_bounds() {
        let feb = month_range(2024, 2).unwrap();
        assert_eq!(feb.start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(
            feb.end,
            Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap() + Duration::milliseconds(999)
        );
        assert!(month_range(2024, 13).is_none());

        let dec_range = current_month_range(at(2023, 12, 31));
        assert_eq!(dec_range.end.year(), 2023);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(50)), "$50.00");
        assert_eq!(format_currency(dec!(1234.5)), "$1,234.50");
        assert_eq!(format_currency(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(dec!(-999.995)), "-$1,000.00");
        assert_eq!(format_currency(dec!(100)), "$100.00");
    }
}
