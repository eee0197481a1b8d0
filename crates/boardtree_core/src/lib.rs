//! Core domain logic for boardtree.
//! This crate is the single source of truth for tree-integrity invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tree;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::{Board, BoardId};
pub use repo::board_repo::{
    BoardRepoError, BoardRepoResult, BoardRepository, SqliteBoardRepository,
};
pub use service::board_service::{
    BoardEvent, BoardNotifier, BoardService, BoardServiceError,
};
pub use tree::engine::{BoardNode, TreeError, TreeSnapshot, MAX_BOARD_DEPTH};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
