//! Core data types for the storage layer.
//!
//! Field names double as the remote document contract: each entity
//! serializes to the same camelCase keys in every remote collection.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier value meaning "not yet assigned by the local store".
pub const UNASSIGNED_ID: i64 = 0;

/// A single income or expense record.
///
/// `amount` is always a positive magnitude; direction is carried by
/// `is_income`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: i64,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub category_id: i64,
    #[serde(default)]
    pub is_income: bool,
    #[serde(default)]
    pub owner_id: String,
}

impl Transaction {
    /// Build a new, unsaved expense.
    pub fn new(
        amount: Decimal,
        description: impl Into<String>,
        date: DateTime<Utc>,
        category_id: i64,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            id: UNASSIGNED_ID,
            amount,
            description: description.into(),
            date,
            category_id,
            is_income: false,
            owner_id: owner_id.into(),
        }
    }

    pub fn income(mut self) -> Self {
        self.is_income = true;
        self
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }
}

/// A monthly spending limit for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(default)]
    pub id: i64,
    pub amount: Decimal,
    #[serde(default)]
    pub category_id: i64,
    /// 1 = January ... 12 = December
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub owner_id: String,
}

impl Budget {
    pub fn new(
        amount: Decimal,
        category_id: i64,
        month: u32,
        year: i32,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            id: UNASSIGNED_ID,
            amount,
            category_id,
            month,
            year,
            owner_id: owner_id.into(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }
}

/// A spending category.
///
/// Categories without an owner are global and visible to everyone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    /// Packed 0xRRGGBB value used for charts.
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, color: u32) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            color,
            icon: None,
            owner_id: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Render the packed color as `#RRGGBB`.
    pub fn color_hex(&self) -> String {
        format!("#{:06X}", self.color & 0x00FF_FFFF)
    }
}

/// Remote-only user profile. Never cached in the local store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub avatar_url: String,
    pub birthday: String,
}

/// Inclusive date window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Filter for querying transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Restrict to a date window (inclusive)
    pub range: Option<DateRange>,

    /// Restrict to one category
    pub category_id: Option<i64>,

    /// Restrict to income (`true`) or expenses (`false`)
    pub is_income: Option<bool>,

    /// Maximum number of results
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn income(mut self, is_income: bool) -> Self {
        self.is_income = Some(is_income);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Parameters of an amount-sum query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SumQuery {
    pub is_income: bool,
    pub category_id: Option<i64>,
    pub range: Option<DateRange>,
}

impl SumQuery {
    pub fn income() -> Self {
        Self {
            is_income: true,
            category_id: None,
            range: None,
        }
    }

    pub fn expenses() -> Self {
        Self {
            is_income: false,
            category_id: None,
            range: None,
        }
    }

    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transaction_document_shape() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let tx = Transaction::new(dec!(50.0), "Electricity bill", date, 5, "u1").with_id(7);

        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["categoryId"], 5);
        assert_eq!(value["isIncome"], false);
        assert_eq!(value["ownerId"], "u1");
        assert_eq!(value["date"], date.timestamp_millis());
    }

    #[test]
    fn test_category_color_hex() {
        let category = Category::new("Food", 0x558B2F);
        assert_eq!(category.color_hex(), "#558B2F");
    }

    #[test]
    fn test_transaction_filter_builder() {
        let now = Utc::now();
        let filter = TransactionFilter::new()
            .range(DateRange::new(now, now))
            .category(3)
            .income(false)
            .limit(10);

        assert_eq!(filter.category_id, Some(3));
        assert_eq!(filter.is_income, Some(false));
        assert_eq!(filter.limit, Some(10));
        assert!(filter.range.is_some());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let range = DateRange::new(start, end);

        assert!(range.contains(start));
        assert!(range.contains(end));
        assert!(!range.contains(end + chrono::Duration::seconds(1)));
    }
}
