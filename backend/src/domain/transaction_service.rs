//! Transaction service domain logic for the finance tracker.
//!
//! Validates and stores income/expense records. The description defaults to
//! "Income - <category>" or "Expense - <category>" when left blank.

use std::sync::Arc;

use shared::{NewTransaction, Table, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

use super::errors::{DomainError, DomainResult};
use super::validation;
use crate::storage::{now_timestamp, Connection, TransactionStorage};

#[derive(Clone)]
pub struct TransactionService<C: Connection> {
    transaction_repository: C::TransactionRepository,
}

impl<C: Connection> TransactionService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let transaction_repository = connection.create_transaction_repository();
        Self {
            transaction_repository,
        }
    }

    /// All transactions of the user, newest first
    pub async fn list_transactions(&self, user_id: &str) -> DomainResult<Vec<Transaction>> {
        Ok(self.transaction_repository.list_transactions(user_id).await?)
    }

    /// Expenses dated within `month`, optionally for a single category
    pub async fn list_expenses(
        &self,
        user_id: &str,
        month: &str,
        category: Option<&str>,
    ) -> DomainResult<Vec<Transaction>> {
        validation::month(month)?;
        Ok(self
            .transaction_repository
            .list_expenses_in_month(user_id, month, category)
            .await?)
    }

    pub async fn create_transaction(
        &self,
        user_id: &str,
        request: NewTransaction,
    ) -> DomainResult<Transaction> {
        let request = NewTransaction {
            category: request.category.trim().to_string(),
            ..request
        }
        .with_default_description();

        validation::positive_amount("Amount", request.amount)?;
        validation::non_empty("Category", &request.category)?;
        validation::description(&request.description)?;
        validation::date("Date", &request.date)?;

        let now = now_timestamp();
        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            transaction_type: request.transaction_type,
            amount: request.amount,
            category: request.category,
            description: request.description,
            date: request.date,
            created_at: now.clone(),
            updated_at: now,
        };

        self.transaction_repository.store_transaction(&transaction).await?;
        info!(
            "Created {} transaction {} for user {}: {:.2} in {}",
            transaction.transaction_type, transaction.id, user_id, transaction.amount, transaction.category
        );
        Ok(transaction)
    }

    pub async fn delete_transaction(&self, user_id: &str, transaction_id: &str) -> DomainResult<Transaction> {
        match self
            .transaction_repository
            .delete_transaction(user_id, transaction_id)
            .await?
        {
            Some(deleted) => {
                info!("Deleted transaction {} for user {}", transaction_id, user_id);
                Ok(deleted)
            }
            None => {
                warn!("Transaction {} not found for user {}", transaction_id, user_id);
                Err(DomainError::not_found(Table::Transactions, transaction_id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbConnection;
    use shared::TransactionType;

    async fn setup_test() -> TransactionService<DbConnection> {
        let db = DbConnection::init_in_memory().await.expect("Failed to create test database");
        TransactionService::new(Arc::new(db))
    }

    fn request(amount: f64, description: &str) -> NewTransaction {
        NewTransaction {
            transaction_type: TransactionType::Expense,
            amount,
            category: "Food & Dining".to_string(),
            description: description.to_string(),
            date: "2025-06-14".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_fills_default_description() {
        let service = setup_test().await;

        let created = service
            .create_transaction("alice", request(12.5, ""))
            .await
            .expect("Failed to create transaction");

        assert_eq!(created.description, "Expense - Food & Dining");
        assert_eq!(created.user_id, "alice");
        assert!(!created.is_pending());

        let listed = service.list_transactions("alice").await.expect("Failed to list");
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn test_default_description_uses_trimmed_category() {
        let service = setup_test().await;
        let mut padded = request(30.0, "  ");
        padded.category = " Shopping ".to_string();

        let created = service.create_transaction("alice", padded).await.expect("Failed to create transaction");
        assert_eq!(created.category, "Shopping");
        assert_eq!(created.description, "Expense - Shopping");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let service = setup_test().await;

        for bad in [request(0.0, "Lunch"), request(-5.0, "Lunch")] {
            let err = service.create_transaction("alice", bad).await.unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }

        let mut bad_date = request(5.0, "Lunch");
        bad_date.date = "14/06/2025".to_string();
        assert!(matches!(
            service.create_transaction("alice", bad_date).await,
            Err(DomainError::Validation(_))
        ));

        let long = request(5.0, &"x".repeat(300));
        assert!(service.create_transaction("alice", long).await.is_err());
        assert!(service.list_transactions("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_expenses_rejects_bad_month() {
        let service = setup_test().await;
        assert!(matches!(
            service.list_expenses("alice", "June", None).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_other_users_transaction_is_not_found() {
        let service = setup_test().await;
        let created = service.create_transaction("alice", request(9.0, "Taxi")).await.unwrap();

        let err = service.delete_transaction("bob", &created.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { table: Table::Transactions, .. }));

        let deleted = service.delete_transaction("alice", &created.id).await.unwrap();
        assert_eq!(deleted.id, created.id);
    }
}
