#![forbid(unsafe_code)]

//! Persistence for the academy domain: repository contracts, an in-memory
//! implementation for tests, and a `SQLite` adapter built on `sqlx`.

pub mod repository;
pub mod sqlite;
