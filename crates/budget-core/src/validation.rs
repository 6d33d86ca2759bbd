//! Entry-time validation.
//!
//! These rules apply when a user enters or edits a record. The store itself
//! accepts anything, so records pulled from the remote side are never
//! checked.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::storage::{Budget, Transaction};

/// Why an entry was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    #[error("description must not be blank")]
    BlankDescription,

    #[error("date must not be in the future")]
    FutureDate,

    #[error("a category must be selected")]
    MissingCategory,
}

fn check_amount(amount: Decimal) -> Result<(), ValidationIssue> {
    if amount <= Decimal::ZERO {
        return Err(ValidationIssue::NonPositiveAmount);
    }
    Ok(())
}

fn check_category(category_id: i64) -> Result<(), ValidationIssue> {
    if category_id <= 0 {
        return Err(ValidationIssue::MissingCategory);
    }
    Ok(())
}

/// Checks run in field order; the first failure is reported.
pub fn validate_transaction(tx: &Transaction, now: DateTime<Utc>) -> Result<(), ValidationIssue> {
    check_amount(tx.amount)?;
    if tx.description.trim().is_empty() {
        return Err(ValidationIssue::BlankDescription);
    }
    if tx.date > now {
        return Err(ValidationIssue::FutureDate);
    }
    check_category(tx.category_id)
}

pub fn validate_budget(budget: &Budget) -> Result<(), ValidationIssue> {
    check_amount(budget.amount)?;
    check_category(budget.category_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transaction_rules() {
        let now = Utc::now();
        let ok = Transaction::new(dec!(1), "Bread", now, 1, "u1");
        assert_eq!(validate_transaction(&ok, now), Ok(()));

        let mut bad = ok.clone();
        bad.amount = Decimal::ZERO;
        assert_eq!(validate_transaction(&bad, now), Err(ValidationIssue::NonPositiveAmount));

        let mut bad = ok.clone();
        bad.description = "   ".to_string();
        assert_eq!(validate_transaction(&bad, now), Err(ValidationIssue::BlankDescription));

        let mut bad = ok.clone();
        bad.date = now + Duration::seconds(1);
        assert_eq!(validate_transaction(&bad, now), Err(ValidationIssue::FutureDate));

        let mut bad = ok;
        bad.category_id = 0;
        assert_eq!(validate_transaction(&bad, now), Err(ValidationIssue::MissingCategory));
    }

    #[test]
    fn test_budget_rules() {
        assert!(validate_budget(&Budget::new(dec!(100), 5, 3, 2024, "u1")).is_ok());
        assert_eq!(
            validate_budget(&Budget::new(dec!(-1), 5, 3, 2024, "u1")),
            Err(ValidationIssue::NonPositiveAmount)
        );
        assert_eq!(
            validate_budget(&Budget::new(dec!(1), -2, 3, 2024, "u1")),
            Err(ValidationIssue::MissingCategory)
        );
    }
}
