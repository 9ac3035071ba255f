//! # Data hooks
//!
//! Each hook mirrors one remote table for the signed-in user. State lives
//! behind a `tokio::sync::RwLock` and is never locked across a remote call,
//! so readers always see a consistent snapshot while a request is in flight.
//!
//! Hooks stay usable without a user: fetches finish with `loading = false`
//! and mutations return `"User not authenticated"`.

pub mod use_budgets;
pub mod use_categories;
pub mod use_savings_goals;
pub mod use_transactions;

pub use use_budgets::{BudgetsHook, BudgetsState, SpentRefresh};
pub use use_categories::CategoriesHook;
pub use use_savings_goals::SavingsGoalsHook;
pub use use_transactions::TransactionsHook;

use std::future::Future;

use shared::ChangeEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const NOT_AUTHENTICATED: &str = "User not authenticated";

/// Mirrored list plus request status
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> ListState<T> {
    /// Nothing loaded yet; `loading` starts out true
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// What a realtime listener receives
#[derive(Debug)]
pub(crate) enum Signal {
    Change(ChangeEvent),
    /// Events were dropped; the mirror must resync from scratch
    Lagged,
}

/// Drive `handler` with every event until the feed closes
pub(crate) fn spawn_listener<F, Fut>(
    name: &'static str,
    mut receiver: broadcast::Receiver<ChangeEvent>,
    handler: F,
) -> JoinHandle<()>
where
    F: Fn(Signal) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => handler(Signal::Change(event)).await,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("{} listener lagged, skipped {} events", name, skipped);
                    handler(Signal::Lagged).await;
                }
                Err(RecvError::Closed) => {
                    debug!("{} listener stopped: change feed closed", name);
                    break;
                }
            }
        }
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::test_support::goal_for;
    use finance_tracker_backend::storage::ChangeFeed;
    use shared::Record;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_listener_reports_lag_then_resumes() {
        let feed = ChangeFeed::with_capacity(1);
        let receiver = feed.subscribe();
        for id in ["g1", "g2", "g3"] {
            feed.publish(ChangeEvent::insert(Record::SavingsGoals(goal_for("alice", id))));
        }
        drop(feed);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let handle = spawn_listener("test", receiver, move |signal| {
            let log = log.clone();
            async move {
                let entry = match signal {
                    Signal::Change(event) => match event.new {
                        Some(Record::SavingsGoals(goal)) => Some(goal.id),
                        _ => None,
                    },
                    Signal::Lagged => Some("lagged".to_string()),
                };
                log.lock().unwrap().extend(entry);
            }
        });

        // The listener stops once the feed is gone
        handle.await.expect("listener task");
        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen, vec!["lagged".to_string(), "g3".to_string()]);
    }
}
