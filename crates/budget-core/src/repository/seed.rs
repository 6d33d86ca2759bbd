//! Default category bootstrap.

use super::Repository;
use crate::error::Result;
use crate::storage::{Category, LocalStore};

/// Owner recorded on seeded categories when no one is signed in.
pub const DEFAULT_OWNER: &str = "default_user";

/// Identifier of the income category; reports leave it out of expenses.
pub const INCOME_CATEGORY_ID: i64 = 8;

const SEED: [(i64, &str, u32); 8] = [
    (1, "Food", 0x558B2F),
    (2, "Transportation", 0x3F51B5),
    (3, "Housing", 0x5D4037),
    (4, "Entertainment", 0xFFA000),
    (5, "Utilities", 0x4CAF50),
    (6, "Healthcare", 0x7C4DFF),
    (7, "Others", 0x8BC34A),
    (8, "Paycheck", 0xF44336),
];

/// The eight seed categories, tagged with `owner`.
pub fn default_categories(owner: &str) -> Vec<Category> {
    SEED.iter()
        .map(|&(id, name, color)| Category::new(name, color).with_id(id).with_owner(owner))
        .collect()
}

impl<S: LocalStore + 'static> Repository<S> {
    /// Seed the default categories when the categories table is empty.
    ///
    /// The check is a count over every row, so it is accurate even before
    /// any live query has produced a value. Seeding is local only.
    ///
    /// # Returns
    ///
    /// Whether seeding happened.
    pub fn ensure_default_categories(&self, owner: Option<&str>) -> Result<bool> {
        let existing = self.local.count_categories()?;
        if existing > 0 {
            tracing::debug!("{} categories present; skipping seed", existing);
            return Ok(false);
        }

        let owner = owner.filter(|o| !o.is_empty()).unwrap_or(DEFAULT_OWNER);
        self.local.insert_categories(&default_categories(owner))?;
        tracing::debug!("Seeded default categories for {}", owner);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use std::sync::Arc;

    fn repo() -> Repository<SqliteStore> {
        Repository::local_only(Arc::new(SqliteStore::open_in_memory().unwrap()))
    }

    #[test]
    fn test_seeds_once() {
        let repo = repo();

        assert!(repo.ensure_default_categories(Some("u1")).unwrap());
        assert!(!repo.ensure_default_categories(Some("u1")).unwrap());

        let categories = repo.local().list_categories("u1").unwrap();
        assert_eq!(categories.len(), 8);
        let paycheck = repo.local().get_category(INCOME_CATEGORY_ID).unwrap().unwrap();
        assert_eq!(paycheck.name, "Paycheck");
        assert_eq!(paycheck.color_hex(), "#F44336");
    }

    #[test]
    fn test_unknown_owner_uses_default_user() {
        let repo = repo();
        repo.ensure_default_categories(None).unwrap();

        let food = repo.local().get_category(1).unwrap().unwrap();
        assert_eq!(food.owner_id.as_deref(), Some(DEFAULT_OWNER));
        assert_eq!(food.color_hex(), "#558B2F");
    }

    #[test]
    fn test_existing_category_blocks_seed() {
        let repo = repo();
        repo.local()
            .insert_category(&Category::new("Mine", 0).with_owner("u1"))
            .unwrap();

        assert!(!repo.ensure_default_categories(Some("u1")).unwrap());
        assert_eq!(repo.local().count_categories().unwrap(), 1);
    }
}
