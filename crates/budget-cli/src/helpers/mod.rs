//! Input and parsing helper functions for the CLI.
//!
//! This module provides utilities for:
//! - Amount, date, month and color parsing (`parsing`)
//! - Resolving user-supplied category references (`lookup`)

mod lookup;
mod parsing;

// Re-export public API
pub use lookup::resolve_category;
pub use parsing::{parse_amount, parse_color, parse_datetime, parse_month};
