//! JSON output for scripting.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde_json::{json, Value};

use budget_core::export::UNKNOWN_CATEGORY;
use budget_core::storage::{Budget, Category, Transaction, UserProfile};

fn category_name(categories: &HashMap<i64, Category>, id: i64) -> String {
    categories
        .get(&id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}

/// Amounts render as strings with two decimals.
fn money(amount: Decimal) -> Value {
    Value::String(format!("{:.2}", amount))
}

pub fn transaction_json(tx: &Transaction, categories: &HashMap<i64, Category>) -> Value {
    json!({
        "id": tx.id,
        "date": tx.date.to_rfc3339(),
        "category_id": tx.category_id,
        "category": category_name(categories, tx.category_id),
        "description": tx.description,
        "amount": money(tx.amount),
        "is_income": tx.is_income,
        "owner_id": tx.owner_id,
    })
}

pub fn transactions_json(
    transactions: &[Transaction],
    categories: &HashMap<i64, Category>,
) -> Vec<Value> {
    transactions
        .iter()
        .map(|tx| transaction_json(tx, categories))
        .collect()
}

pub fn budgets_json(budgets: &[Budget], categories: &HashMap<i64, Category>) -> Vec<Value> {
    budgets
        .iter()
        .map(|budget| {
            json!({
                "id": budget.id,
                "month": budget.month,
                "year": budget.year,
                "category_id": budget.category_id,
                "category": category_name(categories, budget.category_id),
                "amount": money(budget.amount),
            })
        })
        .collect()
}

pub fn categories_json(categories: &[Category]) -> Vec<Value> {
    categories
        .iter()
        .map(|category| {
            json!({
                "id": category.id,
                "name": category.name,
                "color": category.color_hex(),
                "icon": category.icon,
                "owner_id": category.owner_id,
            })
        })
        .collect()
}

pub fn profile_json(profile: &UserProfile) -> Value {
    json!({
        "id": profile.id,
        "name": profile.name,
        "email": profile.email,
        "phone": profile.phone,
        "avatar_url": profile.avatar_url,
        "birthday": profile.birthday,
    })
}

/// Pretty-print any serializable value.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_transaction_json_names_category() {
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let tx = Transaction::new(dec!(12.5), "Lunch", date, 1, "u1").with_id(4);
        let mut categories = HashMap::new();
        categories.insert(1, Category::new("Food", 0x4CAF50).with_id(1));

        let value = transaction_json(&tx, &categories);
        assert_eq!(value["category"], "Food");
        assert_eq!(value["amount"], "12.50");
        assert_eq!(value["id"], 4);

        let orphan = transaction_json(&tx, &HashMap::new());
        assert_eq!(orphan["category"], UNKNOWN_CATEGORY);
    }
}
