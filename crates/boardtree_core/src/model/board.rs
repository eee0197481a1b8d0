//! Board domain model.
//!
//! # Responsibility
//! - Define the persisted record for one node of the board forest.
//!
//! # Invariants
//! - `id` is stable and never reused for another board.
//! - `parent_id` is a weak reference; `None` means root-level.
//! - `updated_at` moves forward on every parent change.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one board.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type BoardId = Uuid;

/// One node of the board forest, as stored.
///
/// The hierarchical `children` view is never part of this record; it is
/// assembled on read by the tree engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Store-assigned stable ID, immutable after creation.
    pub id: BoardId,
    /// Non-empty display name.
    pub name: String,
    /// Parent board id. `None` means root-level.
    pub parent_id: Option<BoardId>,
    /// Unix epoch milliseconds, set by the store on insert.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed by the store on every move.
    pub updated_at: i64,
}
