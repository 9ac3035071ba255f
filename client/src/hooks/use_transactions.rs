use std::sync::Arc;

use shared::{ChangeEvent, ChangeType, NewTransaction, Record, Table, Transaction, TEMP_ID_PREFIX};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::{spawn_listener, ListState, Signal, NOT_AUTHENTICATED};
use crate::services::{Clock, FinanceApi};

/// Newest-first mirror of the user's transactions with optimistic writes
#[derive(Clone)]
pub struct TransactionsHook {
    api: Arc<dyn FinanceApi>,
    clock: Arc<dyn Clock>,
    user_id: Option<String>,
    state: Arc<RwLock<ListState<Transaction>>>,
}

impl TransactionsHook {
    pub fn new(api: Arc<dyn FinanceApi>, clock: Arc<dyn Clock>, user_id: Option<String>) -> Self {
        Self {
            api,
            clock,
            user_id,
            state: Arc::new(RwLock::new(ListState::new())),
        }
    }

    pub async fn state(&self) -> ListState<Transaction> {
        self.state.read().await.clone()
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.read().await.items.clone()
    }

    /// Replace the mirror with the remote list
    pub async fn fetch_transactions(&self) -> Result<(), String> {
        let Some(user_id) = self.user_id.as_deref() else {
            self.state.write().await.loading = false;
            return Ok(());
        };

        self.state.write().await.loading = true;
        let result = self.api.list_transactions(user_id).await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(transactions) => {
                debug!("Fetched {} transactions", transactions.len());
                state.items = transactions;
                state.error = None;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching transactions: {}", e);
                state.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Show the transaction immediately, then reconcile with the stored row
    pub async fn add_transaction(&self, request: NewTransaction) -> Result<Transaction, String> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Err(NOT_AUTHENTICATED.to_string());
        };

        let request = request.with_default_description();
        let now = self.clock.now_timestamp();
        let placeholder = Transaction {
            id: format!("{}{}", TEMP_ID_PREFIX, self.clock.now_millis()),
            user_id: user_id.to_string(),
            transaction_type: request.transaction_type,
            amount: request.amount,
            category: request.category.clone(),
            description: request.description.clone(),
            date: request.date.clone(),
            created_at: now.clone(),
            updated_at: now,
        };
        let placeholder_id = placeholder.id.clone();

        debug!("Adding optimistic transaction {}", placeholder_id);
        self.state.write().await.items.insert(0, placeholder);

        let result = self.api.create_transaction(user_id, request).await;

        let mut state = self.state.write().await;
        match result {
            Ok(stored) => {
                // The realtime feed may already have delivered the stored row
                if state.items.iter().any(|t| t.id == stored.id) {
                    state.items.retain(|t| t.id != placeholder_id);
                } else if let Some(slot) = state.items.iter_mut().find(|t| t.id == placeholder_id) {
                    *slot = stored.clone();
                } else {
                    state.items.insert(0, stored.clone());
                }
                info!("Transaction {} saved", stored.id);
                Ok(stored)
            }
            Err(e) => {
                error!("Error saving transaction: {}", e);
                state.items.retain(|t| t.id != placeholder_id);
                Err(e)
            }
        }
    }

    /// Remove immediately; put the row back at the front if the delete fails
    pub async fn delete_transaction(&self, transaction_id: &str) -> Result<(), String> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Err(NOT_AUTHENTICATED.to_string());
        };

        let removed = {
            let mut state = self.state.write().await;
            let position = state.items.iter().position(|t| t.id == transaction_id);
            position.map(|index| state.items.remove(index))
        };

        match self.api.delete_transaction(user_id, transaction_id).await {
            Ok(()) => {
                info!("Transaction {} deleted", transaction_id);
                Ok(())
            }
            Err(e) => {
                error!("Error deleting transaction {}: {}", transaction_id, e);
                if let Some(transaction) = removed {
                    let mut state = self.state.write().await;
                    if !state.items.iter().any(|t| t.id == transaction.id) {
                        state.items.insert(0, transaction);
                    }
                }
                Err(e)
            }
        }
    }

    /// Fold one realtime event into the mirror
    pub async fn apply_change(&self, event: &ChangeEvent) {
        let Some(user_id) = self.user_id.as_deref() else {
            return;
        };
        if !event.matches(user_id, Table::Transactions) {
            return;
        }

        let mut state = self.state.write().await;
        match (event.event_type, &event.new, &event.old) {
            (ChangeType::Insert, Some(Record::Transactions(row)), _) => {
                if !state.items.iter().any(|t| t.id == row.id) {
                    state.items.insert(0, row.clone());
                }
            }
            (ChangeType::Update, Some(Record::Transactions(row)), _) => {
                if let Some(slot) = state.items.iter_mut().find(|t| t.id == row.id) {
                    *slot = row.clone();
                }
            }
            (ChangeType::Delete, _, Some(Record::Transactions(row))) => {
                state.items.retain(|t| t.id != row.id);
            }
            _ => {}
        }
    }

    /// Apply transaction events on a background task; `None` without a user
    pub fn spawn_realtime(&self) -> Option<JoinHandle<()>> {
        self.user_id.as_ref()?;
        let hook = self.clone();
        Some(spawn_listener("transactions", self.api.subscribe(), move |signal| {
            let hook = hook.clone();
            async move {
                match signal {
                    Signal::Change(event) => hook.apply_change(&event).await,
                    Signal::Lagged => {
                        let _ = hook.fetch_transactions().await;
                    }
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::test_support::{clock, embedded, expense, FlakyApi};
    use std::time::Duration;

    fn hook_for(api: Arc<dyn FinanceApi>, user: Option<&str>) -> TransactionsHook {
        TransactionsHook::new(api, clock(), user.map(str::to_string))
    }

    #[tokio::test]
    async fn test_add_replaces_placeholder_with_stored_row() {
        let api = embedded().await;
        let hook = hook_for(api.clone(), Some("alice"));
        hook.fetch_transactions().await.expect("Failed to fetch");

        let stored = hook
            .add_transaction(expense(42.0, "Shopping", "2025-06-14"))
            .await
            .expect("Failed to add");

        let items = hook.transactions().await;
        assert_eq!(items, vec![stored.clone()]);
        assert!(!stored.is_pending());
        assert_eq!(stored.description, "Expense - Shopping");
    }

    #[tokio::test]
    async fn test_failed_add_rolls_back() {
        let flaky = Arc::new(FlakyApi::new(embedded().await));
        let hook = hook_for(flaky.clone(), Some("alice"));
        hook.add_transaction(expense(10.0, "Housing", "2025-06-01")).await.unwrap();

        flaky.set_failing(true);
        let err = hook
            .add_transaction(expense(5.0, "Housing", "2025-06-02"))
            .await
            .unwrap_err();
        assert_eq!(err, "Network request failed");

        let items = hook.transactions().await;
        assert_eq!(items.len(), 1);
        assert!(items.iter().all(|t| !t.is_pending()));
    }

    #[tokio::test]
    async fn test_failed_delete_restores_row_at_front() {
        let flaky = Arc::new(FlakyApi::new(embedded().await));
        let hook = hook_for(flaky.clone(), Some("alice"));
        let first = hook.add_transaction(expense(1.0, "Food & Dining", "2025-06-01")).await.unwrap();
        let second = hook.add_transaction(expense(2.0, "Food & Dining", "2025-06-02")).await.unwrap();

        flaky.set_failing(true);
        assert!(hook.delete_transaction(&first.id).await.is_err());

        let ids: Vec<_> = hook.transactions().await.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first.id.clone(), second.id.clone()]);

        flaky.set_failing(false);
        hook.delete_transaction(&first.id).await.expect("Failed to delete");
        assert_eq!(hook.transactions().await, vec![second]);
    }

    #[tokio::test]
    async fn test_realtime_events_are_deduplicated() {
        let api = embedded().await;
        let hook = hook_for(api.clone(), Some("alice"));
        let handle = hook.spawn_realtime().expect("listener");

        // A write made elsewhere for the same user
        let other_device = hook_for(api.clone(), Some("alice"));
        let stored = other_device
            .add_transaction(expense(7.5, "Transportation", "2025-06-10"))
            .await
            .unwrap();
        // And one for someone else
        hook_for(api.clone(), Some("bob"))
            .add_transaction(expense(3.0, "Transportation", "2025-06-10"))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hook.transactions().await, vec![stored.clone()]);

        // Redelivering the same insert changes nothing
        hook.apply_change(&ChangeEvent::insert(Record::Transactions(stored.clone()))).await;
        assert_eq!(hook.transactions().await.len(), 1);

        hook.apply_change(&ChangeEvent::delete(Record::Transactions(stored))).await;
        assert!(hook.transactions().await.is_empty());
        handle.abort();
    }

    #[tokio::test]
    async fn test_without_user() {
        let hook = hook_for(embedded().await, None);
        assert!(hook.state().await.loading);
        hook.fetch_transactions().await.unwrap();
        assert!(!hook.state().await.loading);

        let err = hook
            .add_transaction(expense(1.0, "Shopping", "2025-06-01"))
            .await
            .unwrap_err();
        assert_eq!(err, NOT_AUTHENTICATED);
        assert!(hook.spawn_realtime().is_none());
    }
}
