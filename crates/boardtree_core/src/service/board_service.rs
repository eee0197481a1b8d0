//! Board use-case service.
//!
//! # Responsibility
//! - Validate tree invariants above the repository layer.
//! - Provide create, remove, move, and hierarchy read operations.
//! - Emit one specific event plus one generic update per committed mutation.
//!
//! # Invariants
//! - A parent must exist before anything is created or moved under it.
//! - Move operations must not create cycles or exceed the depth bound.
//! - Notifier calls happen after the store write succeeds, never before.

use crate::model::board::{Board, BoardId};
use crate::repo::board_repo::{BoardRepoError, BoardRepository};
use crate::tree::engine::{BoardNode, TreeError, TreeSnapshot, MAX_BOARD_DEPTH};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One committed board mutation, as broadcast to clients.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    /// A board was created; payload is the stored row.
    Created(Board),
    /// A board (and transitively its subtree) was deleted.
    Deleted { id: BoardId },
    /// A board was re-parented; payload is the refreshed row.
    Moved(Board),
}

impl BoardEvent {
    /// Wire name of the specific event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created(_) => "board:created",
            Self::Deleted { .. } => "board:deleted",
            Self::Moved(_) => "board:moved",
        }
    }
}

/// Outbound notification contract.
///
/// Two explicit calls per mutation: the typed event first, then the generic
/// catch-all update clients use to invalidate cached views. Test doubles can
/// assert both were sent.
pub trait BoardNotifier {
    /// Publishes the specific event (`board:created` etc.).
    fn board_event(&self, event: &BoardEvent);
    /// Publishes the generic `board:update` envelope for the same mutation.
    fn board_update(&self, event: &BoardEvent);
}

/// Errors from board service operations.
#[derive(Debug)]
pub enum BoardServiceError {
    /// Board name is blank after trim.
    InvalidName,
    /// Target board does not exist.
    BoardNotFound(BoardId),
    /// Requested parent does not exist.
    ParentNotFound(BoardId),
    /// Move target equals the board itself.
    SelfParent(BoardId),
    /// Move target lies inside the board's own subtree.
    DescendantCycle {
        id: BoardId,
        new_parent_id: BoardId,
    },
    /// Create or move would push a chain past the depth bound.
    DepthExceeded { would_reach: u32 },
    /// Stored parent link points at a board that no longer exists.
    InvalidParentRef(BoardId),
    /// Stored parent chain contains a cycle.
    ParentChainLoop(BoardId),
    /// Repository-level failure.
    Repo(BoardRepoError),
}

impl Display for BoardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "board name must not be blank"),
            Self::BoardNotFound(id) => write!(f, "board not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent board not found: {id}"),
            Self::SelfParent(id) => write!(f, "board cannot be its own parent: {id}"),
            Self::DescendantCycle { id, new_parent_id } => write!(
                f,
                "move would create cycle: board {id} under descendant {new_parent_id}"
            ),
            Self::DepthExceeded { would_reach } => write!(
                f,
                "maximum board depth ({MAX_BOARD_DEPTH}) exceeded: chain would reach {would_reach}"
            ),
            Self::InvalidParentRef(id) => {
                write!(f, "parent reference to nonexistent board: {id}")
            }
            Self::ParentChainLoop(id) => write!(f, "parent chain loops at board: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BoardRepoError> for BoardServiceError {
    fn from(value: BoardRepoError) -> Self {
        match value {
            BoardRepoError::BoardNotFound(id) => Self::BoardNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<TreeError> for BoardServiceError {
    fn from(value: TreeError) -> Self {
        match value {
            TreeError::MissingBoard(id) => Self::InvalidParentRef(id),
            TreeError::ParentChainLoop(id) => Self::ParentChainLoop(id),
        }
    }
}

/// Board service facade.
///
/// Store adapter and notifier are injected at construction; tests substitute
/// fakes for either side.
pub struct BoardService<R: BoardRepository, N: BoardNotifier> {
    repo: R,
    notifier: N,
}

impl<R: BoardRepository, N: BoardNotifier> BoardService<R, N> {
    /// Creates service from repository and notifier implementations.
    pub fn new(repo: R, notifier: N) -> Self {
        Self { repo, notifier }
    }

    /// Creates one board under an optional parent.
    ///
    /// The new board is a leaf at creation, so the depth check only needs
    /// the parent's chain length.
    pub fn create_board(
        &self,
        name: impl Into<String>,
        parent_id: Option<BoardId>,
    ) -> Result<Board, BoardServiceError> {
        let name = normalize_board_name(name.into())?;

        if let Some(parent_id) = parent_id {
            let snapshot = self.snapshot()?;
            if snapshot.board(parent_id).is_none() {
                return Err(BoardServiceError::ParentNotFound(parent_id));
            }
            let parent_depth = snapshot.depth_of(Some(parent_id))?;
            if parent_depth >= MAX_BOARD_DEPTH {
                return Err(BoardServiceError::DepthExceeded {
                    would_reach: parent_depth + 1,
                });
            }
        }

        let board = self.repo.insert(name.as_str(), parent_id)?;
        self.emit(BoardEvent::Created(board.clone()));
        Ok(board)
    }

    /// Deletes one board; the store cascades to its subtree.
    ///
    /// Existence check and delete are one atomic statement: a delete that
    /// touches zero rows reports `BoardNotFound`.
    pub fn remove_board(&self, id: BoardId) -> Result<(), BoardServiceError> {
        self.repo.remove(id)?;
        self.emit(BoardEvent::Deleted { id });
        Ok(())
    }

    /// Re-parents one board, carrying its whole subtree.
    pub fn move_board(
        &self,
        id: BoardId,
        new_parent_id: Option<BoardId>,
    ) -> Result<Board, BoardServiceError> {
        let snapshot = self.snapshot()?;
        if snapshot.board(id).is_none() {
            return Err(BoardServiceError::BoardNotFound(id));
        }

        if let Some(parent_id) = new_parent_id {
            if snapshot.board(parent_id).is_none() {
                return Err(BoardServiceError::ParentNotFound(parent_id));
            }
            if parent_id == id {
                return Err(BoardServiceError::SelfParent(id));
            }
            if snapshot.is_descendant(id, parent_id) {
                return Err(BoardServiceError::DescendantCycle {
                    id,
                    new_parent_id: parent_id,
                });
            }
            let parent_depth = snapshot.depth_of(Some(parent_id))?;
            let height = snapshot.subtree_height(id);
            if parent_depth + height >= MAX_BOARD_DEPTH {
                return Err(BoardServiceError::DepthExceeded {
                    would_reach: parent_depth + height + 1,
                });
            }
        }

        let board = self.repo.set_parent(id, new_parent_id)?;
        self.emit(BoardEvent::Moved(board.clone()));
        Ok(board)
    }

    /// Assembles the full forest, rooted at boards without a parent.
    pub fn list_boards(&self) -> Result<Vec<BoardNode>, BoardServiceError> {
        Ok(self.snapshot()?.build_hierarchy(None))
    }

    /// Loads one board with its assembled subtree.
    pub fn get_board(&self, id: BoardId) -> Result<BoardNode, BoardServiceError> {
        let snapshot = self.snapshot()?;
        let board = snapshot
            .board(id)
            .cloned()
            .ok_or(BoardServiceError::BoardNotFound(id))?;
        let children = snapshot.build_hierarchy(Some(id));
        Ok(BoardNode { board, children })
    }

    fn snapshot(&self) -> Result<TreeSnapshot, BoardServiceError> {
        Ok(TreeSnapshot::new(self.repo.list_all()?))
    }

    fn emit(&self, event: BoardEvent) {
        self.notifier.board_event(&event);
        self.notifier.board_update(&event);
    }
}

fn normalize_board_name(value: String) -> Result<String, BoardServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardServiceError::InvalidName);
    }
    Ok(trimmed.to_string())
}
