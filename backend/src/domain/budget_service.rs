//! Budget service domain logic.
//!
//! A budget is a spending limit for one category in one `YYYY-MM` month.
//! At most one budget exists per (user, category, month). The `spent` column
//! is a derived value that callers recompute from expense transactions and
//! write back through [`BudgetService::update_budget`].

use std::sync::Arc;

use shared::{Budget, BudgetUpdate, NewBudget, Table};
use tracing::{info, warn};
use uuid::Uuid;

use super::errors::{DomainError, DomainResult};
use super::validation;
use crate::storage::{now_timestamp, BudgetStorage, Connection};

const DUPLICATE_BUDGET: &str = "Budget already exists for this category";

#[derive(Clone)]
pub struct BudgetService<C: Connection> {
    budget_repository: C::BudgetRepository,
}

impl<C: Connection> BudgetService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let budget_repository = connection.create_budget_repository();
        Self { budget_repository }
    }

    /// Budgets for `month`, ordered by category name
    pub async fn list_budgets(&self, user_id: &str, month: &str) -> DomainResult<Vec<Budget>> {
        validation::month(month)?;
        Ok(self.budget_repository.list_budgets(user_id, month).await?)
    }

    pub async fn create_budget(&self, user_id: &str, request: NewBudget) -> DomainResult<Budget> {
        validation::non_empty("Category", &request.category)?;
        validation::non_negative_amount("Limit", request.limit_amount)?;
        validation::non_negative_amount("Spent", request.spent)?;
        validation::month(&request.month)?;

        let category = request.category.trim().to_string();
        let existing = self.budget_repository.list_budgets(user_id, &request.month).await?;
        if existing.iter().any(|b| b.category == category) {
            warn!(
                "Budget for '{}' in {} already exists for user {}",
                category, request.month, user_id
            );
            return Err(DomainError::Conflict(DUPLICATE_BUDGET.to_string()));
        }

        let now = now_timestamp();
        let budget = Budget {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            category,
            limit_amount: request.limit_amount,
            spent: request.spent,
            month: request.month,
            created_at: now.clone(),
            updated_at: now,
        };

        // A concurrent create can still slip past the check above
        self.budget_repository
            .store_budget(&budget)
            .await
            .map_err(|e| DomainError::from_insert(e, DUPLICATE_BUDGET))?;
        info!(
            "Created budget {} for '{}' ({}) limit {:.2}",
            budget.id, budget.category, budget.month, budget.limit_amount
        );
        Ok(budget)
    }

    /// Apply a partial update; fields left as `None` keep their value
    pub async fn update_budget(
        &self,
        user_id: &str,
        budget_id: &str,
        update: BudgetUpdate,
    ) -> DomainResult<Budget> {
        if let Some(limit) = update.limit_amount {
            validation::non_negative_amount("Limit", limit)?;
        }
        if let Some(spent) = update.spent {
            validation::non_negative_amount("Spent", spent)?;
        }

        let mut budget = self
            .budget_repository
            .get_budget(user_id, budget_id)
            .await?
            .ok_or_else(|| DomainError::not_found(Table::Budgets, budget_id))?;

        if let Some(limit) = update.limit_amount {
            budget.limit_amount = limit;
        }
        if let Some(spent) = update.spent {
            budget.spent = spent;
        }
        budget.updated_at = now_timestamp();

        if !self.budget_repository.update_budget(&budget).await? {
            return Err(DomainError::not_found(Table::Budgets, budget_id));
        }
        info!(
            "Updated budget {}: limit {:.2}, spent {:.2}",
            budget.id, budget.limit_amount, budget.spent
        );
        Ok(budget)
    }

    pub async fn delete_budget(&self, user_id: &str, budget_id: &str) -> DomainResult<Budget> {
        let deleted = self
            .budget_repository
            .delete_budget(user_id, budget_id)
            .await?
            .ok_or_else(|| DomainError::not_found(Table::Budgets, budget_id))?;
        info!("Deleted budget {} ({})", deleted.id, deleted.category);
        Ok(deleted)
    }
}
