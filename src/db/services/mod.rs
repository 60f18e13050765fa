//! Query functions over the sample table. `LogStore` wraps these behind a
//! connection it owns; they take a plain `DatabaseConnection` so other callers
//! can reuse them.

pub mod system_log_service;

pub use system_log_service::*;
