//! Tree integrity engine for the board forest.
//!
//! # Responsibility
//! - Compute ancestor depth, descendant reachability, subtree height, and
//!   the hierarchical read view over one immutable snapshot of all boards.
//!
//! # Invariants
//! - All traversals are iterative with explicit stacks; no recursion.
//! - A snapshot is loaded once per operation and never mutated.
//! - An upward walk that leaves the snapshot raises instead of reading as
//!   "no parent".

pub mod engine;
