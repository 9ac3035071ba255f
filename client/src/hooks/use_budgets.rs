//! Budgets for the current month together with the user's settings.
//!
//! The stored `spent` of a budget is derived from expense transactions.
//! It is recomputed here after a budget is added and whenever the realtime
//! feed reports a transaction change, once no further transaction change has
//! arrived for the configured settle delay. The wait runs in its own task so
//! budget events keep flowing meanwhile. Only budgets whose stored value is
//! off by more than a cent are written back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use shared::aggregation::{spent_by_category, spent_differs, spent_for_category};
use shared::{
    Budget, BudgetUpdate, ChangeEvent, NewBudget, NewUserSettings, Table, UserSettings, UserSettingsUpdate,
};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{spawn_listener, CategoriesHook, Signal, NOT_AUTHENTICATED};
use crate::config::ClientConfig;
use crate::services::{Clock, FinanceApi};

pub const UNKNOWN_CATEGORY: &str =
    "Category must exist in your categories list first. Please add it in the transactions tab.";
pub const DUPLICATE_BUDGET: &str = "Budget already exists for this category";
pub const SETTINGS_NOT_LOADED: &str = "User not authenticated or settings not loaded";

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetsState {
    pub budgets: Vec<Budget>,
    pub user_settings: Option<UserSettings>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for BudgetsState {
    fn default() -> Self {
        Self {
            budgets: Vec::new(),
            user_settings: None,
            loading: true,
            error: None,
        }
    }
}

/// Outcome of recomputing every budget's spent amount
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpentRefresh {
    pub updated: usize,
    /// First failed write; the remaining budgets were still attempted
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct BudgetsHook {
    api: Arc<dyn FinanceApi>,
    clock: Arc<dyn Clock>,
    config: ClientConfig,
    categories: CategoriesHook,
    user_id: Option<String>,
    state: Arc<RwLock<BudgetsState>>,
    /// Bumped by every transaction event; only the latest pending refresh runs
    settle_generation: Arc<AtomicU64>,
}

impl BudgetsHook {
    pub fn new(
        api: Arc<dyn FinanceApi>,
        clock: Arc<dyn Clock>,
        config: ClientConfig,
        categories: CategoriesHook,
        user_id: Option<String>,
    ) -> Self {
        Self {
            api,
            clock,
            config,
            categories,
            user_id,
            state: Arc::new(RwLock::new(BudgetsState::default())),
            settle_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn state(&self) -> BudgetsState {
        self.state.read().await.clone()
    }

    pub async fn budgets(&self) -> Vec<Budget> {
        self.state.read().await.budgets.clone()
    }

    pub async fn user_settings(&self) -> Option<UserSettings> {
        self.state.read().await.user_settings.clone()
    }

    /// Budgets of the current month, ordered by category
    pub async fn fetch_budgets(&self) -> Result<(), String> {
        let Some(user_id) = self.user_id.as_deref() else {
            self.state.write().await.loading = false;
            return Ok(());
        };

        self.state.write().await.loading = true;
        let month = self.clock.current_month();
        let result = self.api.list_budgets(user_id, &month).await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(budgets) => {
                debug!("Fetched {} budgets for {}", budgets.len(), month);
                state.budgets = budgets;
                state.error = None;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching budgets: {}", e);
                state.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Load the settings row, creating the defaults when there is none
    pub async fn fetch_user_settings(&self) -> Result<(), String> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Ok(());
        };

        let result = match self.api.get_settings(user_id).await {
            Ok(Some(settings)) => Ok(settings),
            Ok(None) => {
                info!("Creating default settings for user {}", user_id);
                self.api
                    .create_settings(user_id, NewUserSettings::defaults(&self.clock.today_string()))
                    .await
            }
            Err(e) => Err(e),
        };

        let mut state = self.state.write().await;
        match result {
            Ok(settings) => {
                state.user_settings = Some(settings);
                Ok(())
            }
            Err(e) => {
                error!("Error fetching user settings: {}", e);
                state.error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub async fn update_budget(&self, budget_id: &str, update: BudgetUpdate) -> Result<Budget, String> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Err(NOT_AUTHENTICATED.to_string());
        };

        let budget = self.api.update_budget(user_id, budget_id, update).await?;
        let mut state = self.state.write().await;
        if let Some(slot) = state.budgets.iter_mut().find(|b| b.id == budget.id) {
            *slot = budget.clone();
        }
        Ok(budget)
    }

    /// Start budgeting an existing category for the current month
    pub async fn add_budget_category(&self, category: &str, limit_amount: f64) -> Result<Budget, String> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Err(NOT_AUTHENTICATED.to_string());
        };
        if !self.categories.exists(category).await {
            return Err(UNKNOWN_CATEGORY.to_string());
        }
        if self.state.read().await.budgets.iter().any(|b| b.category == category) {
            return Err(DUPLICATE_BUDGET.to_string());
        }

        let request = NewBudget {
            category: category.to_string(),
            limit_amount,
            spent: 0.0,
            month: self.clock.current_month(),
        };
        let budget = self.api.create_budget(user_id, request).await?;
        {
            let mut state = self.state.write().await;
            if !state.budgets.iter().any(|b| b.id == budget.id) {
                state.budgets.push(budget.clone());
            }
        }
        info!("Added budget for '{}' with limit {:.2}", category, limit_amount);

        match self.update_spent_for_category(&budget.id, category).await {
            Ok(updated) => Ok(updated),
            Err(e) => {
                warn!("Failed to compute spent for new budget {}: {}", budget.id, e);
                Ok(budget)
            }
        }
    }

    pub async fn delete_budget_category(&self, budget_id: &str) -> Result<(), String> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Err(NOT_AUTHENTICATED.to_string());
        };

        self.api.delete_budget(user_id, budget_id).await?;
        self.state.write().await.budgets.retain(|b| b.id != budget_id);
        Ok(())
    }

    pub async fn update_user_settings(&self, update: UserSettingsUpdate) -> Result<UserSettings, String> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Err(SETTINGS_NOT_LOADED.to_string());
        };
        if self.state.read().await.user_settings.is_none() {
            return Err(SETTINGS_NOT_LOADED.to_string());
        }

        let settings = self.api.update_settings(user_id, update).await?;
        self.state.write().await.user_settings = Some(settings.clone());
        Ok(settings)
    }

    /// Recompute one budget's spent amount from this month's expenses
    pub async fn update_spent_for_category(&self, budget_id: &str, category: &str) -> Result<Budget, String> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Err(NOT_AUTHENTICATED.to_string());
        };

        let month = self.clock.current_month();
        let expenses = self.api.list_expenses(user_id, &month, Some(category)).await?;
        let spent = spent_for_category(&expenses, category, &month);
        debug!("Spent on '{}' in {}: {:.2}", category, month, spent);

        self.update_budget(budget_id, BudgetUpdate::spent(spent)).await
    }

    /// Bring every budget of the month in line with the expenses, using a
    /// single expense query. Each stale budget is written independently, so
    /// one failed write does not hold back the others.
    pub async fn update_spent_amounts(&self) -> Result<SpentRefresh, String> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Err(NOT_AUTHENTICATED.to_string());
        };

        let budgets = self.budgets().await;
        if budgets.is_empty() {
            return Ok(SpentRefresh::default());
        }

        let month = self.clock.current_month();
        let expenses = match self.api.list_expenses(user_id, &month, None).await {
            Ok(expenses) => expenses,
            Err(e) => {
                error!("Error updating spent amounts: {}", e);
                self.state.write().await.error = Some(e.clone());
                return Err(e);
            }
        };
        let spent = spent_by_category(&expenses, &month);

        let mut refresh = SpentRefresh::default();
        for budget in budgets {
            let computed = spent.get(&budget.category).copied().unwrap_or(0.0);
            if !spent_differs(budget.spent, computed) {
                continue;
            }
            match self.update_budget(&budget.id, BudgetUpdate::spent(computed)).await {
                Ok(_) => refresh.updated += 1,
                Err(e) => {
                    error!("Error updating spent for budget {}: {}", budget.id, e);
                    refresh.error.get_or_insert(e);
                }
            }
        }

        if refresh.updated > 0 {
            info!("Updated spent amounts for {} budgets", refresh.updated);
        }
        if let Some(e) = &refresh.error {
            self.state.write().await.error = Some(e.clone());
        }
        Ok(refresh)
    }

    /// Recompute spent amounts once transaction events have been quiet for
    /// the settle delay. Returns the task waiting out the delay.
    pub fn schedule_spent_refresh(&self) -> JoinHandle<()> {
        let generation = self.settle_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let hook = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(hook.config.realtime_settle_delay).await;
            if hook.settle_generation.load(Ordering::SeqCst) != generation {
                debug!("Spent refresh superseded by a newer transaction event");
                return;
            }
            let _ = hook.update_spent_amounts().await;
        })
    }

    /// Budget changes re-fetch; transaction changes schedule a spent refresh
    pub async fn apply_change(&self, event: &ChangeEvent) {
        let Some(user_id) = self.user_id.as_deref() else {
            return;
        };

        if event.matches(user_id, Table::Budgets) {
            let _ = self.fetch_budgets().await;
        } else if event.matches(user_id, Table::Transactions) {
            self.schedule_spent_refresh();
        }
    }

    pub fn spawn_realtime(&self) -> Option<JoinHandle<()>> {
        self.user_id.as_ref()?;
        let hook = self.clone();
        Some(spawn_listener("budgets", self.api.subscribe(), move |signal| {
            let hook = hook.clone();
            async move {
                match signal {
                    Signal::Change(event) => hook.apply_change(&event).await,
                    Signal::Lagged => {
                        let _ = hook.fetch_budgets().await;
                        let _ = hook.update_spent_amounts().await;
                    }
                }
            }
        }))
    }
}
