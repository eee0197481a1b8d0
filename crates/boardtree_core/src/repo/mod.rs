//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store adapter contract consumed by the board service.
//! - Isolate SQLite query details from business orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`BoardNotFound`) in addition
//!   to DB transport errors.
//! - Every mutation is a single atomic statement.

pub mod board_repo;
