//! Snapshot-based tree computations.
//!
//! # Responsibility
//! - Hold one immutable copy of the board set plus derived adjacency.
//! - Answer depth, descendant, height, and hierarchy queries without
//!   touching the store.
//!
//! # Invariants
//! - Child order inside one parent follows the input order of the snapshot
//!   (the repository lists boards by creation time).
//! - Upward walks guard against revisits, so corrupted parent chains
//!   terminate with an error instead of spinning.

use crate::model::board::{Board, BoardId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Deepest allowed chain, counted in boards from a root down to a leaf.
pub const MAX_BOARD_DEPTH: u32 = 10;

/// Errors raised by snapshot traversals over corrupted board data.
///
/// Both variants are unreachable while the store's foreign key and the
/// serialized mutation path hold; they exist so a broken store surfaces
/// loudly instead of being read as "no parent".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// A parent link points at a board absent from the snapshot.
    MissingBoard(BoardId),
    /// An upward walk revisited a board, meaning the stored forest has a
    /// cycle.
    ParentChainLoop(BoardId),
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBoard(id) => {
                write!(f, "parent reference to nonexistent board: {id}")
            }
            Self::ParentChainLoop(id) => {
                write!(f, "parent chain loops at board: {id}")
            }
        }
    }
}

impl Error for TreeError {}

/// One board with its assembled subtree, the hierarchical read view.
///
/// Serializes as the board's own fields plus a `children` array, matching
/// the REST payload shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardNode {
    #[serde(flatten)]
    pub board: Board,
    pub children: Vec<BoardNode>,
}

/// Immutable copy of the full board set plus derived adjacency.
///
/// Built once per operation from `BoardRepository::list_all`, queried many
/// times, then dropped. Holding it does not block the store.
pub struct TreeSnapshot {
    boards: HashMap<BoardId, Board>,
    children: HashMap<Option<BoardId>, Vec<BoardId>>,
}

impl TreeSnapshot {
    /// Builds the snapshot from boards in creation order.
    ///
    /// Rows whose `parent_id` does not resolve stay in the board map (upward
    /// walks will report them) but are never attached to the hierarchy.
    pub fn new(boards: Vec<Board>) -> Self {
        let mut by_id = HashMap::with_capacity(boards.len());
        let mut children: HashMap<Option<BoardId>, Vec<BoardId>> = HashMap::new();
        for board in boards {
            children.entry(board.parent_id).or_default().push(board.id);
            by_id.insert(board.id, board);
        }
        Self {
            boards: by_id,
            children,
        }
    }

    /// Looks up one board by id.
    pub fn board(&self, id: BoardId) -> Option<&Board> {
        self.boards.get(&id)
    }

    /// Returns the ids directly under `parent_id`, in creation order.
    pub fn child_ids(&self, parent_id: Option<BoardId>) -> &[BoardId] {
        self.children
            .get(&parent_id)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Number of boards in the snapshot.
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    /// Returns whether the snapshot holds no boards.
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    /// Counts the boards on the chain from `id` up to and including its
    /// root. `None` yields 0, a root board 1, its children 2, and so on.
    ///
    /// # Errors
    /// - `TreeError::MissingBoard` when a parent link leaves the snapshot.
    /// - `TreeError::ParentChainLoop` when the chain revisits a board.
    pub fn depth_of(&self, id: Option<BoardId>) -> Result<u32, TreeError> {
        let mut depth = 0u32;
        let mut visited = HashSet::new();
        let mut cursor = id;
        while let Some(current) = cursor {
            if !visited.insert(current) {
                return Err(TreeError::ParentChainLoop(current));
            }
            let board = self
                .boards
                .get(&current)
                .ok_or(TreeError::MissingBoard(current))?;
            depth += 1;
            cursor = board.parent_id;
        }
        Ok(depth)
    }

    /// Returns true when `target` equals `ancestor` or lies anywhere in
    /// `ancestor`'s subtree.
    ///
    /// The self-case counts as a descendant here: move validation rejects
    /// "under itself" and "under own descendant" with this one predicate.
    pub fn is_descendant(&self, ancestor: BoardId, target: BoardId) -> bool {
        if ancestor == target {
            return true;
        }
        let mut visited = HashSet::new();
        let mut stack = vec![ancestor];
        while let Some(current) = stack.pop() {
            for child in self.child_ids(Some(current)) {
                if *child == target {
                    return true;
                }
                if visited.insert(*child) {
                    stack.push(*child);
                }
            }
        }
        false
    }

    /// Number of levels below `id`: 0 for a leaf, otherwise one more than
    /// the tallest child subtree.
    ///
    /// This is how many extra levels relocating `id` (with its whole
    /// subtree) would introduce under a new parent.
    pub fn subtree_height(&self, id: BoardId) -> u32 {
        let mut height = 0u32;
        let mut visited = HashSet::new();
        let mut stack = vec![(id, 0u32)];
        while let Some((current, depth)) = stack.pop() {
            for child in self.child_ids(Some(current)) {
                if visited.insert(*child) {
                    height = height.max(depth + 1);
                    stack.push((*child, depth + 1));
                }
            }
        }
        height
    }

    /// Assembles the hierarchical view of every board under `parent_id`.
    ///
    /// Pre-order collection with an explicit stack, then children folded
    /// parent-ward in reverse visit order, so each node's child list is
    /// complete before the node itself is built.
    pub fn build_hierarchy(&self, parent_id: Option<BoardId>) -> Vec<BoardNode> {
        let mut visit = Vec::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<BoardId> = Vec::new();
        for id in self.child_ids(parent_id).iter().rev() {
            stack.push(*id);
        }
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            visit.push(id);
            for child in self.child_ids(Some(id)).iter().rev() {
                stack.push(*child);
            }
        }

        let mut assembled: HashMap<Option<BoardId>, Vec<BoardNode>> = HashMap::new();
        for id in visit.into_iter().rev() {
            let board = match self.boards.get(&id) {
                Some(board) => board,
                None => continue,
            };
            let mut children = assembled.remove(&Some(id)).unwrap_or_default();
            children.reverse();
            assembled.entry(board.parent_id).or_default().push(BoardNode {
                board: board.clone(),
                children,
            });
        }

        let mut roots = assembled.remove(&parent_id).unwrap_or_default();
        roots.reverse();
        roots
    }
}

#[cfg(test)]
mod tests {
    use super::{TreeError, TreeSnapshot};
    use crate::model::board::{Board, BoardId};
    use uuid::Uuid;

    fn board(id: BoardId, parent_id: Option<BoardId>, name: &str) -> Board {
        Board {
            id,
            name: name.to_string(),
            parent_id,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn chain(len: usize) -> (Vec<Board>, Vec<BoardId>) {
        let mut boards = Vec::new();
        let mut ids = Vec::new();
        let mut parent = None;
        for index in 0..len {
            let id = Uuid::new_v4();
            boards.push(board(id, parent, &format!("b{index}")));
            ids.push(id);
            parent = Some(id);
        }
        (boards, ids)
    }

    #[test]
    fn depth_counts_boards_on_the_chain() {
        let (boards, ids) = chain(3);
        let snapshot = TreeSnapshot::new(boards);

        assert_eq!(snapshot.depth_of(None).unwrap(), 0);
        assert_eq!(snapshot.depth_of(Some(ids[0])).unwrap(), 1);
        assert_eq!(snapshot.depth_of(Some(ids[1])).unwrap(), 2);
        assert_eq!(snapshot.depth_of(Some(ids[2])).unwrap(), 3);
    }

    #[test]
    fn depth_raises_on_dangling_parent_link() {
        let missing = Uuid::new_v4();
        let orphan = Uuid::new_v4();
        let snapshot = TreeSnapshot::new(vec![board(orphan, Some(missing), "orphan")]);

        let err = snapshot.depth_of(Some(orphan)).unwrap_err();
        assert_eq!(err, TreeError::MissingBoard(missing));
    }

    #[test]
    fn depth_raises_on_parent_chain_loop() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let snapshot = TreeSnapshot::new(vec![board(a, Some(b), "a"), board(b, Some(a), "b")]);

        let err = snapshot.depth_of(Some(a)).unwrap_err();
        assert!(matches!(err, TreeError::ParentChainLoop(_)));
    }

    #[test]
    fn is_descendant_covers_self_and_subtree() {
        let (boards, ids) = chain(3);
        let snapshot = TreeSnapshot::new(boards);

        assert!(snapshot.is_descendant(ids[0], ids[0]));
        assert!(snapshot.is_descendant(ids[0], ids[2]));
        assert!(snapshot.is_descendant(ids[1], ids[2]));
        assert!(!snapshot.is_descendant(ids[2], ids[0]));
        assert!(!snapshot.is_descendant(ids[1], ids[0]));
    }

    #[test]
    fn is_descendant_false_across_separate_trees() {
        let (mut boards, ids_a) = chain(2);
        let (other, ids_b) = chain(2);
        boards.extend(other);
        let snapshot = TreeSnapshot::new(boards);

        assert!(!snapshot.is_descendant(ids_a[0], ids_b[1]));
        assert!(!snapshot.is_descendant(ids_b[0], ids_a[0]));
    }

    #[test]
    fn subtree_height_counts_levels_below() {
        let root = Uuid::new_v4();
        let left = Uuid::new_v4();
        let right = Uuid::new_v4();
        let deep = Uuid::new_v4();
        let snapshot = TreeSnapshot::new(vec![
            board(root, None, "root"),
            board(left, Some(root), "left"),
            board(right, Some(root), "right"),
            board(deep, Some(left), "deep"),
        ]);

        assert_eq!(snapshot.subtree_height(deep), 0);
        assert_eq!(snapshot.subtree_height(right), 0);
        assert_eq!(snapshot.subtree_height(left), 1);
        assert_eq!(snapshot.subtree_height(root), 2);
    }

    #[test]
    fn build_hierarchy_nests_children_in_creation_order() {
        let root_a = Uuid::new_v4();
        let root_b = Uuid::new_v4();
        let child_one = Uuid::new_v4();
        let child_two = Uuid::new_v4();
        let grandchild = Uuid::new_v4();
        let snapshot = TreeSnapshot::new(vec![
            board(root_a, None, "A"),
            board(root_b, None, "B"),
            board(child_one, Some(root_a), "A1"),
            board(child_two, Some(root_a), "A2"),
            board(grandchild, Some(child_one), "A1a"),
        ]);

        let forest = snapshot.build_hierarchy(None);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].board.id, root_a);
        assert_eq!(forest[1].board.id, root_b);
        assert_eq!(forest[0].children.len(), 2);
        assert_eq!(forest[0].children[0].board.id, child_one);
        assert_eq!(forest[0].children[1].board.id, child_two);
        assert_eq!(forest[0].children[0].children[0].board.id, grandchild);
        assert!(forest[1].children.is_empty());
    }

    #[test]
    fn build_hierarchy_scopes_to_requested_parent() {
        let (boards, ids) = chain(3);
        let snapshot = TreeSnapshot::new(boards);

        let subtree = snapshot.build_hierarchy(Some(ids[0]));
        assert_eq!(subtree.len(), 1);
        assert_eq!(subtree[0].board.id, ids[1]);
        assert_eq!(subtree[0].children[0].board.id, ids[2]);
    }

    #[test]
    fn build_hierarchy_never_attaches_orphaned_rows() {
        let root = Uuid::new_v4();
        let orphan = Uuid::new_v4();
        let snapshot = TreeSnapshot::new(vec![
            board(root, None, "root"),
            board(orphan, Some(Uuid::new_v4()), "orphan"),
        ]);

        let forest = snapshot.build_hierarchy(None);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].board.id, root);
        assert_eq!(snapshot.len(), 2);
    }
}
