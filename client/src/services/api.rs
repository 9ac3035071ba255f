use std::sync::Arc;

use async_trait::async_trait;
use finance_tracker_backend::{storage::Connection, AppState, DomainError};
use shared::{
    Budget, BudgetUpdate, Category, ChangeEvent, NewBudget, NewCategory, NewSavingsGoal, NewTransaction,
    NewUserSettings, SavingsGoal, SavingsGoalUpdate, Transaction, UserSettings, UserSettingsUpdate,
};
use tokio::sync::broadcast;
use tracing::warn;

/// Remote operations the hooks rely on, scoped to one user per call.
///
/// Errors are the message to show the user.
#[async_trait]
pub trait FinanceApi: Send + Sync {
    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, String>;
    async fn list_expenses(
        &self,
        user_id: &str,
        month: &str,
        category: Option<&str>,
    ) -> Result<Vec<Transaction>, String>;
    async fn create_transaction(&self, user_id: &str, request: NewTransaction) -> Result<Transaction, String>;
    async fn delete_transaction(&self, user_id: &str, transaction_id: &str) -> Result<(), String>;

    async fn list_categories(&self, user_id: &str) -> Result<Vec<Category>, String>;
    async fn create_category(&self, user_id: &str, request: NewCategory) -> Result<Category, String>;
    async fn create_categories(&self, user_id: &str, requests: Vec<NewCategory>) -> Result<Vec<Category>, String>;

    async fn list_budgets(&self, user_id: &str, month: &str) -> Result<Vec<Budget>, String>;
    async fn create_budget(&self, user_id: &str, request: NewBudget) -> Result<Budget, String>;
    async fn update_budget(&self, user_id: &str, budget_id: &str, update: BudgetUpdate) -> Result<Budget, String>;
    async fn delete_budget(&self, user_id: &str, budget_id: &str) -> Result<(), String>;

    async fn list_goals(&self, user_id: &str) -> Result<Vec<SavingsGoal>, String>;
    async fn create_goal(&self, user_id: &str, request: NewSavingsGoal) -> Result<SavingsGoal, String>;
    async fn update_goal(
        &self,
        user_id: &str,
        goal_id: &str,
        update: SavingsGoalUpdate,
    ) -> Result<SavingsGoal, String>;
    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<(), String>;

    async fn get_settings(&self, user_id: &str) -> Result<Option<UserSettings>, String>;
    async fn create_settings(&self, user_id: &str, request: NewUserSettings) -> Result<UserSettings, String>;
    async fn update_settings(&self, user_id: &str, update: UserSettingsUpdate) -> Result<UserSettings, String>;

    /// Every change event published by the backend, for all users
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}

/// Runs the backend services in-process
#[derive(Clone)]
pub struct EmbeddedApi {
    state: AppState,
}

impl EmbeddedApi {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Backend over a fresh in-memory database
    pub async fn in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(AppState::in_memory().await?))
    }

    pub fn into_shared(self) -> Arc<dyn FinanceApi> {
        Arc::new(self)
    }
}

fn message(action: &str, error: DomainError) -> String {
    warn!("Failed to {}: {}", action, error);
    error.to_string()
}

#[async_trait]
impl FinanceApi for EmbeddedApi {
    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, String> {
        self.state
            .transaction_service
            .list_transactions(user_id)
            .await
            .map_err(|e| message("list transactions", e))
    }

    async fn list_expenses(
        &self,
        user_id: &str,
        month: &str,
        category: Option<&str>,
    ) -> Result<Vec<Transaction>, String> {
        self.state
            .transaction_service
            .list_expenses(user_id, month, category)
            .await
            .map_err(|e| message("list expenses", e))
    }

    async fn create_transaction(&self, user_id: &str, request: NewTransaction) -> Result<Transaction, String> {
        self.state
            .transaction_service
            .create_transaction(user_id, request)
            .await
            .map_err(|e| message("create transaction", e))
    }

    async fn delete_transaction(&self, user_id: &str, transaction_id: &str) -> Result<(), String> {
        self.state
            .transaction_service
            .delete_transaction(user_id, transaction_id)
            .await
            .map(|_| ())
            .map_err(|e| message("delete transaction", e))
    }

    async fn list_categories(&self, user_id: &str) -> Result<Vec<Category>, String> {
        self.state
            .category_service
            .list_categories(user_id)
            .await
            .map_err(|e| message("list categories", e))
    }

    async fn create_category(&self, user_id: &str, request: NewCategory) -> Result<Category, String> {
        self.state
            .category_service
            .create_category(user_id, request)
            .await
            .map_err(|e| message("create category", e))
    }

    async fn create_categories(&self, user_id: &str, requests: Vec<NewCategory>) -> Result<Vec<Category>, String> {
        self.state
            .category_service
            .create_categories(user_id, requests)
            .await
            .map_err(|e| message("create categories", e))
    }

    async fn list_budgets(&self, user_id: &str, month: &str) -> Result<Vec<Budget>, String> {
        self.state
            .budget_service
            .list_budgets(user_id, month)
            .await
            .map_err(|e| message("list budgets", e))
    }

    async fn create_budget(&self, user_id: &str, request: NewBudget) -> Result<Budget, String> {
        self.state
            .budget_service
            .create_budget(user_id, request)
            .await
            .map_err(|e| message("create budget", e))
    }

    async fn update_budget(&self, user_id: &str, budget_id: &str, update: BudgetUpdate) -> Result<Budget, String> {
        self.state
            .budget_service
            .update_budget(user_id, budget_id, update)
            .await
            .map_err(|e| message("update budget", e))
    }

    async fn delete_budget(&self, user_id: &str, budget_id: &str) -> Result<(), String> {
        self.state
            .budget_service
            .delete_budget(user_id, budget_id)
            .await
            .map(|_| ())
            .map_err(|e| message("delete budget", e))
    }

    async fn list_goals(&self, user_id: &str) -> Result<Vec<SavingsGoal>, String> {
        self.state
            .goal_service
            .list_goals(user_id)
            .await
            .map_err(|e| message("list goals", e))
    }

    async fn create_goal(&self, user_id: &str, request: NewSavingsGoal) -> Result<SavingsGoal, String> {
        self.state
            .goal_service
            .create_goal(user_id, request)
            .await
            .map_err(|e| message("create goal", e))
    }

    async fn update_goal(
        &self,
        user_id: &str,
        goal_id: &str,
        update: SavingsGoalUpdate,
    ) -> Result<SavingsGoal, String> {
        self.state
            .goal_service
            .update_goal(user_id, goal_id, update)
            .await
            .map_err(|e| message("update goal", e))
    }

    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<(), String> {
        self.state
            .goal_service
            .delete_goal(user_id, goal_id)
            .await
            .map(|_| ())
            .map_err(|e| message("delete goal", e))
    }

    async fn get_settings(&self, user_id: &str) -> Result<Option<UserSettings>, String> {
        self.state
            .settings_service
            .get_settings(user_id)
            .await
            .map_err(|e| message("get settings", e))
    }

    async fn create_settings(&self, user_id: &str, request: NewUserSettings) -> Result<UserSettings, String> {
        self.state
            .settings_service
            .create_settings(user_id, request)
            .await
            .map_err(|e| message("create settings", e))
    }

    async fn update_settings(&self, user_id: &str, update: UserSettingsUpdate) -> Result<UserSettings, String> {
        self.state
            .settings_service
            .update_settings(user_id, update)
            .await
            .map_err(|e| message("update settings", e))
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.state.connection.subscribe()
    }
}
