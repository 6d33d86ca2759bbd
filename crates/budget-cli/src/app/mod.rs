//! Application-level utilities for the Budget CLI.
//!
//! This module provides:
//! - Path resolution for config and store files
//! - The lazily-built command context

mod context;
mod resolver;

// Re-export public API
pub use context::AppContext;
pub use resolver::resolve_config_path;
