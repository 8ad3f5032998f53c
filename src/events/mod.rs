use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// A forecast run finished and the prediction cache was rewritten
    DishParTrained {
        org_id: Uuid,
        target_date: NaiveDate,
        items_predicted: usize,
        covers: i64,
    },
    /// A batch of historical-sales rows was imported
    SalesImported { org_id: Uuid, rows: usize },
    /// A forecast run short-circuited because no covers resolved
    DishParSkipped {
        org_id: Uuid,
        target_date: NaiveDate,
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
}

/// Background consumer for domain events. Events are observational; the
/// forecast result does not depend on this task keeping up.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::DishParTrained {
                org_id,
                target_date,
                items_predicted,
                covers,
            } => {
                info!(
                    %org_id,
                    %target_date,
                    items_predicted,
                    covers,
                    "dish par predictions trained"
                );
            }
            Event::SalesImported { org_id, rows } => {
                info!(%org_id, rows, "historical sales rows imported");
            }
            Event::DishParSkipped { org_id, target_date } => {
                info!(%org_id, %target_date, "forecast skipped: no covers for date");
            }
        }
    }
    warn!("Event channel closed; event processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_sender_delivers_to_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::SalesImported {
                org_id: Uuid::new_v4(),
                rows: 12,
            })
            .await
            .expect("send should succeed");

        match rx.recv().await {
            Some(Event::SalesImported { rows, .. }) => assert_eq!(rows, 12),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn event_sender_errors_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        let result = sender
            .send(Event::DishParSkipped {
                org_id: Uuid::new_v4(),
                target_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            })
            .await;
        assert!(result.is_err());
    }
}
