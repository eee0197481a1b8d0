//! Shared application state.
//!
//! # Responsibility
//! - Hold the single SQLite connection behind a mutex plus the broadcast bus.
//!
//! # Invariants
//! - Every service call (snapshot, validation, write) runs while the
//!   connection lock is held, so mutations are serialized in-process.
//! - The lock is never held across an await point.

use crate::events::EventBus;
use rusqlite::Connection;
use std::sync::Mutex;

/// Process-wide state handed to every handler as `Arc<AppState>`.
pub struct AppState {
    /// Exclusive handle to the boards database.
    pub db: Mutex<Connection>,
    /// Broadcast bus feeding the SSE endpoint.
    pub bus: EventBus,
}

impl AppState {
    /// Wraps an opened connection together with a fresh event bus.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
            bus: EventBus::default(),
        }
    }
}
