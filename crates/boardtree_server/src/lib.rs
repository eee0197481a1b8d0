//! HTTP surface for the board tree service.
//!
//! # Responsibility
//! - Own the process-level pieces around `boardtree_core`: runtime
//!   configuration, the shared SQLite connection, the broadcast event bus,
//!   and the REST/SSE router.
//!
//! # Invariants
//! - Handlers never touch SQLite directly; every operation goes through
//!   `BoardService` built over the locked connection.
//! - The core crate stays free of HTTP and async concerns; everything
//!   tokio-flavored lives here.

pub mod config;
pub mod events;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use events::{spawn_heartbeat, BusEvent, EventBus};
pub use routes::create_router;
pub use state::AppState;
