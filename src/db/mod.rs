//! Database layer
//!
//! SQLite-backed persistence for Scriptum:
//! - connection pool factory (`pool`)
//! - embedded code-based migrations (`migrations`)
//! - repository traits and their sqlx implementations (`repositories`)

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
