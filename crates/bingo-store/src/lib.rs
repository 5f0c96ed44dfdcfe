//! Session repositories for the collaborative bingo board.
//!
//! Provides an in-process repository for single-process use and tests, and a
//! SQLite-backed repository for a durable local store.

pub mod memory_session_repository;
pub mod schema;
pub mod sqlite_session_repository;
