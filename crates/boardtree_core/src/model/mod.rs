//! Domain model for the board forest.
//!
//! # Responsibility
//! - Define the canonical persisted record for one board.
//! - Keep the wire shape in one place for REST and pub/sub payloads.
//!
//! # Invariants
//! - Every board is identified by a stable `BoardId`.
//! - Deletion is a hard cascade; there is no tombstone state.

pub mod board;
