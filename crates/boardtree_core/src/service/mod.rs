//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate tree-integrity checks around repository calls.
//! - Keep transport layers decoupled from storage and traversal details.

pub mod board_service;
