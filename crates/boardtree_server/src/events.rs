//! Broadcast event bus bridging board mutations to subscribers.
//!
//! # Responsibility
//! - Fan out named events over a `tokio::sync::broadcast` channel.
//! - Implement the core `BoardNotifier` contract: one specific event plus one
//!   generic `board:update` envelope per committed mutation.
//! - Emit the periodic `notification` heartbeat.
//!
//! # Invariants
//! - Publishing never blocks and never fails the caller; with no subscribers
//!   the event is dropped.
//! - Slow subscribers lose events rather than slowing producers.

use boardtree_core::{BoardEvent, BoardNotifier};
use chrono::{Local, Utc};
use log::debug;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const BUS_CAPACITY: usize = 256;

/// One named event as it travels over the bus and onto the SSE wire.
#[derive(Debug, Clone)]
pub struct BusEvent {
    /// Wire name (`board:created`, `board:update`, `notification`, ...).
    pub event: String,
    /// JSON payload sent as the event data line.
    pub data: Value,
}

/// Broadcast bus shared by all handlers and the heartbeat task.
///
/// Clones publish into the same underlying channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BusEvent>,
}

impl EventBus {
    /// Creates a bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes one event to all current subscribers.
    pub fn publish(&self, event: &str, data: Value) {
        debug!(
            "event=bus_publish module=events status=ok name={event} subscribers={}",
            self.tx.receiver_count()
        );
        let _ = self.tx.send(BusEvent {
            event: event.to_string(),
            data,
        });
    }

    /// Opens an independent subscription starting at the current position.
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.tx.subscribe()
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BUS_CAPACITY)
    }
}

impl BoardNotifier for EventBus {
    fn board_event(&self, event: &BoardEvent) {
        self.publish(event.name(), event_payload(event));
    }

    fn board_update(&self, event: &BoardEvent) {
        self.publish(
            "board:update",
            json!({
                "type": event.name(),
                "payload": event_payload(event),
                "timestamp": Utc::now().to_rfc3339(),
            }),
        );
    }
}

fn event_payload(event: &BoardEvent) -> Value {
    match event {
        BoardEvent::Created(board) | BoardEvent::Moved(board) => json!(board),
        BoardEvent::Deleted { id } => json!({ "id": id }),
    }
}

/// Spawns the 1-second informational heartbeat broadcast.
pub fn spawn_heartbeat(bus: EventBus) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            ticker.tick().await;
            bus.publish(
                "notification",
                json!({
                    "message": format!(
                        "Server notification: {}",
                        Local::now().format("%Y-%m-%d %H:%M:%S")
                    ),
                }),
            );
        }
    })
}
