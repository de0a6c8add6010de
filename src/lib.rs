//! Scriptum - a small blog engine
//!
//! Posts with categories, tags, and moderated comments, plus user accounts
//! with avatars and an email subscriber list, backed by SQLite.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
