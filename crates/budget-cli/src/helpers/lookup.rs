//! Resolve user-supplied references to stored records.

use budget_core::{Repository, SqliteStore};

/// Accept a category id or a case-insensitive category name.
pub fn resolve_category(
    repo: &Repository<SqliteStore>,
    owner: &str,
    value: &str,
) -> anyhow::Result<i64> {
    let categories = repo.categories(owner).current()?;

    if let Ok(id) = value.trim().parse::<i64>() {
        if categories.iter().any(|c| c.id == id) {
            return Ok(id);
        }
        return Err(anyhow::anyhow!(
            "Category {} not found.\nHint: Run `budget category list` to see categories.",
            id
        ));
    }

    categories
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(value.trim()))
        .map(|c| c.id)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Category \"{}\" not found.\nHint: Run `budget category list` to see categories.",
                value
            )
        })
}
