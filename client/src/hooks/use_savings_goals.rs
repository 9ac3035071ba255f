use std::sync::Arc;

use shared::{ChangeEvent, NewSavingsGoal, SavingsGoal, SavingsGoalUpdate, Table};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::{spawn_listener, ListState, Signal, NOT_AUTHENTICATED};
use crate::services::FinanceApi;

pub const INVALID_AMOUNT: &str = "Please enter a valid amount";

#[derive(Clone)]
pub struct SavingsGoalsHook {
    api: Arc<dyn FinanceApi>,
    user_id: Option<String>,
    state: Arc<RwLock<ListState<SavingsGoal>>>,
}

impl SavingsGoalsHook {
    pub fn new(api: Arc<dyn FinanceApi>, user_id: Option<String>) -> Self {
        Self {
            api,
            user_id,
            state: Arc::new(RwLock::new(ListState::new())),
        }
    }

    pub async fn state(&self) -> ListState<SavingsGoal> {
        self.state.read().await.clone()
    }

    pub async fn goals(&self) -> Vec<SavingsGoal> {
        self.state.read().await.items.clone()
    }

    pub async fn fetch_goals(&self) -> Result<(), String> {
        let Some(user_id) = self.user_id.as_deref() else {
            self.state.write().await.loading = false;
            return Ok(());
        };

        self.state.write().await.loading = true;
        let result = self.api.list_goals(user_id).await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(goals) => {
                debug!("Fetched {} savings goals", goals.len());
                state.items = goals;
                state.error = None;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching savings goals: {}", e);
                state.error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub async fn add_goal(&self, request: NewSavingsGoal) -> Result<SavingsGoal, String> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Err(NOT_AUTHENTICATED.to_string());
        };

        let goal = self.api.create_goal(user_id, request).await?;
        let mut state = self.state.write().await;
        if !state.items.iter().any(|g| g.id == goal.id) {
            state.items.insert(0, goal.clone());
        }
        info!("Added savings goal {}", goal.id);
        Ok(goal)
    }

    pub async fn update_goal(&self, goal_id: &str, update: SavingsGoalUpdate) -> Result<SavingsGoal, String> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Err(NOT_AUTHENTICATED.to_string());
        };

        let goal = self.api.update_goal(user_id, goal_id, update).await?;
        let mut state = self.state.write().await;
        if let Some(slot) = state.items.iter_mut().find(|g| g.id == goal.id) {
            *slot = goal.clone();
        }
        Ok(goal)
    }

    pub async fn delete_goal(&self, goal_id: &str) -> Result<(), String> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Err(NOT_AUTHENTICATED.to_string());
        };

        self.api.delete_goal(user_id, goal_id).await?;
        self.state.write().await.items.retain(|g| g.id != goal_id);
        Ok(())
    }

    /// Add `amount` to the goal's saved total
    pub async fn add_money(&self, goal_id: &str, amount: f64) -> Result<SavingsGoal, String> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(INVALID_AMOUNT.to_string());
        }

        let current = self
            .state
            .read()
            .await
            .items
            .iter()
            .find(|g| g.id == goal_id)
            .map(|g| g.current_amount)
            .ok_or_else(|| "Goal not found".to_string())?;

        let update = SavingsGoalUpdate {
            current_amount: Some(current + amount),
            ..Default::default()
        };
        self.update_goal(goal_id, update).await
    }

    pub async fn apply_change(&self, event: &ChangeEvent) {
        let Some(user_id) = self.user_id.as_deref() else {
            return;
        };
        if event.matches(user_id, Table::SavingsGoals) {
            let _ = self.fetch_goals().await;
        }
    }

    pub fn spawn_realtime(&self) -> Option<JoinHandle<()>> {
        self.user_id.as_ref()?;
        let hook = self.clone();
        Some(spawn_listener("savings_goals", self.api.subscribe(), move |signal| {
            let hook = hook.clone();
            async move {
                match signal {
                    Signal::Change(event) => hook.apply_change(&event).await,
                    Signal::Lagged => {
                        let _ = hook.fetch_goals().await;
                    }
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::test_support::{embedded, embedded_with_feed, goal_for};
    use shared::Record;
    use std::time::Duration;

    fn request(title: &str, target: f64) -> NewSavingsGoal {
        NewSavingsGoal {
            title: title.to_string(),
            target_amount: target,
            current_amount: 0.0,
            target_date: "2025-12-31".to_string(),
            icon: "target".to_string(),
            color: "#10B981".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_money_accumulates() {
        let hook = SavingsGoalsHook::new(embedded().await, Some("alice".to_string()));
        let goal = hook.add_goal(request("Emergency fund", 1000.0)).await.unwrap();

        hook.add_money(&goal.id, 150.0).await.expect("Failed to add money");
        let updated = hook.add_money(&goal.id, 50.5).await.expect("Failed to add money");
        assert_eq!(updated.current_amount, 200.5);
        assert_eq!(hook.goals().await, vec![updated]);
    }

    #[tokio::test]
    async fn test_add_money_rejects_bad_amounts() {
        let hook = SavingsGoalsHook::new(embedded().await, Some("alice".to_string()));
        let goal = hook.add_goal(request("Laptop", 1500.0)).await.unwrap();

        for amount in [0.0, -20.0, f64::NAN] {
            assert_eq!(hook.add_money(&goal.id, amount).await.unwrap_err(), INVALID_AMOUNT);
        }
        assert_eq!(hook.goals().await[0].current_amount, 0.0);
    }

    #[tokio::test]
    async fn test_new_goals_first_and_delete() {
        let hook = SavingsGoalsHook::new(embedded().await, Some("alice".to_string()));
        let first = hook.add_goal(request("Bike", 400.0)).await.unwrap();
        let second = hook.add_goal(request("Camera", 900.0)).await.unwrap();

        let ids: Vec<_> = hook.goals().await.into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![second.id.clone(), first.id.clone()]);

        hook.delete_goal(&second.id).await.unwrap();
        assert_eq!(hook.goals().await, vec![first]);
    }

    #[tokio::test]
    async fn test_realtime_refetch() {
        let api = embedded().await;
        let hook = SavingsGoalsHook::new(api.clone(), Some("alice".to_string()));
        let handle = hook.spawn_realtime().expect("listener");

        let elsewhere = SavingsGoalsHook::new(api.clone(), Some("alice".to_string()));
        let goal = elsewhere.add_goal(request("Holiday", 2000.0)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hook.goals().await, vec![goal]);
        handle.abort();
    }

    #[tokio::test]
    async fn test_lagged_listener_resyncs_from_store() {
        let (api, db) = embedded_with_feed(2).await;
        let goal = api.create_goal("alice", request("Car", 5000.0)).await.unwrap();
        let hook = SavingsGoalsHook::new(api.clone(), Some("alice".to_string()));
        let handle = hook.spawn_realtime().expect("listener");

        // Another user's events overflow the buffer; none of them match this
        // hook, so only the resync can bring in alice's goal
        for i in 0..5 {
            let other = goal_for("bob", &format!("bob-{}", i));
            db.change_feed().publish(ChangeEvent::insert(Record::SavingsGoals(other)));
        }

        let mut goals = Vec::new();
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            goals = hook.goals().await;
            if !goals.is_empty() {
                break;
            }
        }
        assert_eq!(goals, vec![goal]);
        handle.abort();
    }
}
