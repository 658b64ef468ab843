use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::entities::movement::MovementStatus;

/// Domain events emitted by the services. Delivery is best-effort; the
/// lifecycle itself never depends on an event reaching a consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    MovementCreated {
        movement_id: i32,
        product_id: i32,
        origin_branch_id: i32,
        destination_branch_id: i32,
        quantity: i32,
    },
    MovementStatusChanged {
        movement_id: i32,
        old_status: MovementStatus,
        new_status: MovementStatus,
    },
    MovementDeleted {
        movement_id: i32,
    },
    StockDebited {
        product_id: i32,
        branch_id: i32,
        quantity: i32,
        remaining: i32,
    },
    UserRegistered {
        user_id: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging (but otherwise ignoring) delivery failure.
    pub async fn send_best_effort(&self, event: Event) {
        if let Err(err) = self.send(event).await {
            warn!("Dropping domain event: {}", err);
        }
    }
}

/// Creates a bounded channel plus its sender wrapper.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Consumes events off the channel and logs them. Runs until all senders
/// are dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::MovementCreated {
                movement_id,
                product_id,
                quantity,
                ..
            } => info!(
                movement_id,
                product_id, quantity, "movement created"
            ),
            Event::MovementStatusChanged {
                movement_id,
                old_status,
                new_status,
            } => info!(
                movement_id,
                old_status = %old_status,
                new_status = %new_status,
                "movement status changed"
            ),
            Event::MovementDeleted { movement_id } => {
                info!(movement_id, "movement deleted")
            }
            Event::StockDebited {
                product_id,
                branch_id,
                quantity,
                remaining,
            } => info!(
                product_id,
                branch_id, quantity, remaining, "stock debited"
            ),
            Event::UserRegistered { user_id } => info!(user_id, "user registered"),
        }
    }
}
