//! # Storage Traits
//!
//! Storage abstraction traits used by the domain layer. Every method that
//! reads or writes rows is scoped to one user id.

use anyhow::Result;
use async_trait::async_trait;
use shared::{Budget, Category, ChangeEvent, SavingsGoal, Transaction, UserSettings};
use tokio::sync::broadcast;

#[async_trait]
pub trait TransactionStorage: Send + Sync {
    /// All transactions of a user, newest first (created_at descending)
    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>>;

    /// Expense rows dated within a `YYYY-MM` month, optionally for one category
    async fn list_expenses_in_month(
        &self,
        user_id: &str,
        month: &str,
        category: Option<&str>,
    ) -> Result<Vec<Transaction>>;

    async fn get_transaction(&self, user_id: &str, transaction_id: &str) -> Result<Option<Transaction>>;

    async fn store_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Delete a transaction, returning the removed row if it existed
    async fn delete_transaction(&self, user_id: &str, transaction_id: &str) -> Result<Option<Transaction>>;
}

#[async_trait]
pub trait CategoryStorage: Send + Sync {
    /// All categories of a user, oldest first
    async fn list_categories(&self, user_id: &str) -> Result<Vec<Category>>;

    async fn store_category(&self, category: &Category) -> Result<()>;

    /// Store several categories in one database transaction
    async fn store_categories(&self, categories: &[Category]) -> Result<()>;
}

#[async_trait]
pub trait BudgetStorage: Send + Sync {
    /// Budgets of a user for a `YYYY-MM` month, ordered by category name
    async fn list_budgets(&self, user_id: &str, month: &str) -> Result<Vec<Budget>>;

    async fn get_budget(&self, user_id: &str, budget_id: &str) -> Result<Option<Budget>>;

    async fn store_budget(&self, budget: &Budget) -> Result<()>;

    /// Overwrite limit and spent. Returns false when no such row exists.
    async fn update_budget(&self, budget: &Budget) -> Result<bool>;

    async fn delete_budget(&self, user_id: &str, budget_id: &str) -> Result<Option<Budget>>;
}

#[async_trait]
pub trait GoalStorage: Send + Sync {
    /// Savings goals of a user, newest first
    async fn list_goals(&self, user_id: &str) -> Result<Vec<SavingsGoal>>;

    async fn get_goal(&self, user_id: &str, goal_id: &str) -> Result<Option<SavingsGoal>>;

    async fn store_goal(&self, goal: &SavingsGoal) -> Result<()>;

    async fn update_goal(&self, goal: &SavingsGoal) -> Result<bool>;

    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<Option<SavingsGoal>>;
}

#[async_trait]
pub trait SettingsStorage: Send + Sync {
    async fn get_settings(&self, user_id: &str) -> Result<Option<UserSettings>>;

    async fn store_settings(&self, settings: &UserSettings) -> Result<()>;

    async fn update_settings(&self, settings: &UserSettings) -> Result<bool>;
}

/// Trait defining the interface for storage connections
///
/// Factory for the per-table repositories plus access to the change feed,
/// so the domain layer works with any storage backend.
pub trait Connection: Send + Sync + Clone + 'static {
    type TransactionRepository: TransactionStorage + Clone + 'static;
    type CategoryRepository: CategoryStorage + Clone + 'static;
    type BudgetRepository: BudgetStorage + Clone + 'static;
    type GoalRepository: GoalStorage + Clone + 'static;
    type SettingsRepository: SettingsStorage + Clone + 'static;

    fn create_transaction_repository(&self) -> Self::TransactionRepository;
    fn create_category_repository(&self) -> Self::CategoryRepository;
    fn create_budget_repository(&self) -> Self::BudgetRepository;
    fn create_goal_repository(&self) -> Self::GoalRepository;
    fn create_settings_repository(&self) -> Self::SettingsRepository;

    /// Receive every change event published after a successful write
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
