//! Broadcast channel carrying row-level change events to realtime subscribers.

use shared::ChangeEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Default number of events buffered per subscriber before it starts lagging
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Having no subscribers is fine.
    pub fn publish(&self, event: ChangeEvent) {
        debug!(
            "Publishing {:?} on {:?} for user {}",
            event.event_type,
            event.table(),
            event.user_id
        );
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Record, SavingsGoal, Table};

    fn goal() -> SavingsGoal {
        SavingsGoal {
            id: "g1".to_string(),
            user_id: "alice".to_string(),
            title: "Bike".to_string(),
            target_amount: 500.0,
            current_amount: 0.0,
            target_date: "2025-12-01".to_string(),
            icon: "target".to_string(),
            color: "#6B7280".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let feed = ChangeFeed::new();
        assert_eq!(feed.subscriber_count(), 0);
        feed.publish(ChangeEvent::insert(Record::SavingsGoals(goal())));
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let feed = ChangeFeed::new();
        let mut first = feed.subscribe();
        let mut second = feed.subscribe();

        feed.publish(ChangeEvent::insert(Record::SavingsGoals(goal())));

        let a = first.recv().await.expect("first subscriber event");
        let b = second.recv().await.expect("second subscriber event");
        assert_eq!(a, b);
        assert_eq!(a.table(), Some(Table::SavingsGoals));
    }
}
