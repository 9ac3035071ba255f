//! Savings goal service.
//!
//! Goals carry a target amount and date plus the amount saved so far.
//! Progress is tracked by overwriting `current_amount`; there is no
//! contribution history.

use std::sync::Arc;

use shared::{NewSavingsGoal, SavingsGoal, SavingsGoalUpdate, Table};
use tracing::info;
use uuid::Uuid;

use super::errors::{DomainError, DomainResult};
use super::validation;
use crate::storage::{now_timestamp, Connection, GoalStorage};

#[derive(Clone)]
pub struct GoalService<C: Connection> {
    goal_repository: C::GoalRepository,
}

impl<C: Connection> GoalService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let goal_repository = connection.create_goal_repository();
        Self { goal_repository }
    }

    /// Goals of the user, newest first
    pub async fn list_goals(&self, user_id: &str) -> DomainResult<Vec<SavingsGoal>> {
        Ok(self.goal_repository.list_goals(user_id).await?)
    }

    pub async fn create_goal(&self, user_id: &str, request: NewSavingsGoal) -> DomainResult<SavingsGoal> {
        validation::non_empty("Title", &request.title)?;
        validation::positive_amount("Target amount", request.target_amount)?;
        validation::non_negative_amount("Current amount", request.current_amount)?;
        validation::date("Target date", &request.target_date)?;

        let now = now_timestamp();
        let goal = SavingsGoal {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: request.title.trim().to_string(),
            target_amount: request.target_amount,
            current_amount: request.current_amount,
            target_date: request.target_date,
            icon: request.icon,
            color: request.color,
            created_at: now.clone(),
            updated_at: now,
        };

        self.goal_repository.store_goal(&goal).await?;
        info!(
            "Created goal {} '{}' target {:.2} by {}",
            goal.id, goal.title, goal.target_amount, goal.target_date
        );
        Ok(goal)
    }

    pub async fn update_goal(
        &self,
        user_id: &str,
        goal_id: &str,
        update: SavingsGoalUpdate,
    ) -> DomainResult<SavingsGoal> {
        let mut goal = self
            .goal_repository
            .get_goal(user_id, goal_id)
            .await?
            .ok_or_else(|| DomainError::not_found(Table::SavingsGoals, goal_id))?;

        if let Some(title) = update.title {
            validation::non_empty("Title", &title)?;
            goal.title = title.trim().to_string();
        }
        if let Some(target) = update.target_amount {
            validation::positive_amount("Target amount", target)?;
            goal.target_amount = target;
        }
        if let Some(current) = update.current_amount {
            validation::non_negative_amount("Current amount", current)?;
            goal.current_amount = current;
        }
        if let Some(target_date) = update.target_date {
            validation::date("Target date", &target_date)?;
            goal.target_date = target_date;
        }
        if let Some(icon) = update.icon {
            goal.icon = icon;
        }
        if let Some(color) = update.color {
            goal.color = color;
        }
        goal.updated_at = now_timestamp();

        if !self.goal_repository.update_goal(&goal).await? {
            return Err(DomainError::not_found(Table::SavingsGoals, goal_id));
        }
        info!("Updated goal {}: {:.2} of {:.2}", goal.id, goal.current_amount, goal.target_amount);
        Ok(goal)
    }

    pub async fn delete_goal(&self, user_id: &str, goal_id: &str) -> DomainResult<SavingsGoal> {
        let deleted = self
            .goal_repository
            .delete_goal(user_id, goal_id)
            .await?
            .ok_or_else(|| DomainError::not_found(Table::SavingsGoals, goal_id))?;
        info!("Deleted goal {} '{}'", deleted.id, deleted.title);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbConnection;

    async fn setup_test() -> GoalService<DbConnection> {
        let db = DbConnection::init_in_memory().await.expect("Failed to create test database");
        GoalService::new(Arc::new(db))
    }

    fn request(title: &str, target: f64) -> NewSavingsGoal {
        NewSavingsGoal {
            title: title.to_string(),
            target_amount: target,
            current_amount: 0.0,
            target_date: "2026-01-31".to_string(),
            icon: "plane".to_string(),
            color: "#3B82F6".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let service = setup_test().await;
        let goal = service.create_goal("alice", request("Trip to Japan", 3000.0)).await.unwrap();

        let update = SavingsGoalUpdate {
            current_amount: Some(750.0),
            ..Default::default()
        };
        let updated = service.update_goal("alice", &goal.id, update).await.expect("Failed to update");
        assert_eq!(updated.current_amount, 750.0);
        assert_eq!(updated.title, "Trip to Japan");

        let listed = service.list_goals("alice").await.unwrap();
        assert_eq!(listed, vec![updated]);
    }

    #[tokio::test]
    async fn test_validation() {
        let service = setup_test().await;
        assert!(matches!(
            service.create_goal("alice", request("", 100.0)).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            service.create_goal("alice", request("Car", 0.0)).await,
            Err(DomainError::Validation(_))
        ));

        let goal = service.create_goal("alice", request("Car", 100.0)).await.unwrap();
        let bad = SavingsGoalUpdate {
            current_amount: Some(-10.0),
            ..Default::default()
        };
        assert!(service.update_goal("alice", &goal.id, bad).await.is_err());
        assert!(matches!(
            service.delete_goal("bob", &goal.id).await,
            Err(DomainError::NotFound { table: Table::SavingsGoals, .. })
        ));
    }
}
