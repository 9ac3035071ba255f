use anyhow::Result;
use async_trait::async_trait;
use shared::{Budget, ChangeEvent, Record};
use sqlx::{sqlite::SqliteRow, Row};

use crate::storage::connection::DbConnection;
use crate::storage::traits::BudgetStorage;

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, category, limit_amount, spent, month, created_at, updated_at FROM budgets";

/// Repository for monthly budget rows
#[derive(Clone)]
pub struct BudgetRepository {
    db: DbConnection,
}

impl BudgetRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Budget> {
        Ok(Budget {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            category: row.try_get("category")?,
            limit_amount: row.try_get("limit_amount")?,
            spent: row.try_get("spent")?,
            month: row.try_get("month")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl BudgetStorage for BudgetRepository {
    async fn list_budgets(&self, user_id: &str, month: &str) -> Result<Vec<Budget>> {
        let rows = sqlx::query(&format!(
            "{} WHERE user_id = ? AND month = ? ORDER BY category ASC",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .bind(month)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn get_budget(&self, user_id: &str, budget_id: &str) -> Result<Option<Budget>> {
        let row = sqlx::query(&format!("{} WHERE user_id = ? AND id = ?", SELECT_COLUMNS))
            .bind(user_id)
            .bind(budget_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn store_budget(&self, budget: &Budget) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO budgets (id, user_id, category, limit_amount, spent, month, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&budget.id)
        .bind(&budget.user_id)
        .bind(&budget.category)
        .bind(budget.limit_amount)
        .bind(budget.spent)
        .bind(&budget.month)
        .bind(&budget.created_at)
        .bind(&budget.updated_at)
        .execute(self.db.pool())
        .await?;

        self.db.publish(ChangeEvent::insert(Record::Budgets(budget.clone())));
        Ok(())
    }

    async fn update_budget(&self, budget: &Budget) -> Result<bool> {
        let Some(previous) = self.get_budget(&budget.user_id, &budget.id).await? else {
            return Ok(false);
        };

        let result = sqlx::query(
            r#"
            UPDATE budgets
            SET limit_amount = ?, spent = ?, updated_at = ?
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(budget.limit_amount)
        .bind(budget.spent)
        .bind(&budget.updated_at)
        .bind(&budget.user_id)
        .bind(&budget.id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        self.db.publish(ChangeEvent::update(
            Record::Budgets(previous),
            Record::Budgets(budget.clone()),
        ));
        Ok(true)
    }

    async fn delete_budget(&self, user_id: &str, budget_id: &str) -> Result<Option<Budget>> {
        let Some(existing) = self.get_budget(user_id, budget_id).await? else {
            return Ok(None);
        };

        let result = sqlx::query("DELETE FROM budgets WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(budget_id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.db.publish(ChangeEvent::delete(Record::Budgets(existing.clone())));
        Ok(Some(existing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connection::now_timestamp;
    use shared::ChangeType;

    fn budget(id: &str, category: &str, month: &str) -> Budget {
        let now = now_timestamp();
        Budget {
            id: id.to_string(),
            user_id: "alice".to_string(),
            category: category.to_string(),
            limit_amount: 200.0,
            spent: 0.0,
            month: month.to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_list_for_month_sorted_by_category() {
        let db = DbConnection::init_in_memory().await.expect("Failed to create test database");
        let repo = BudgetRepository::new(db);

        for b in [
            budget("b1", "Shopping", "2025-06"),
            budget("b2", "Food & Dining", "2025-06"),
            budget("b3", "Housing", "2025-05"),
        ] {
            repo.store_budget(&b).await.expect("Failed to store budget");
        }

        let june = repo.list_budgets("alice", "2025-06").await.expect("Failed to list");
        let categories: Vec<_> = june.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(categories, ["Food & Dining", "Shopping"]);
    }

    #[tokio::test]
    async fn test_unique_category_per_month() {
        let db = DbConnection::init_in_memory().await.expect("Failed to create test database");
        let repo = BudgetRepository::new(db);

        repo.store_budget(&budget("b1", "Shopping", "2025-06")).await.expect("Failed to store budget");
        assert!(repo.store_budget(&budget("b2", "Shopping", "2025-06")).await.is_err());
        repo.store_budget(&budget("b3", "Shopping", "2025-07")).await.expect("Next month is allowed");
    }

    #[tokio::test]
    async fn test_update_publishes_old_and_new() {
        let db = DbConnection::init_in_memory().await.expect("Failed to create test database");
        let repo = BudgetRepository::new(db.clone());
        let original = budget("b1", "Shopping", "2025-06");
        repo.store_budget(&original).await.expect("Failed to store budget");

        let mut events = db.change_feed().subscribe();
        let updated = Budget { spent: 42.0, ..original.clone() };
        assert!(repo.update_budget(&updated).await.expect("Update failed"));

        let event = events.recv().await.expect("update event");
        assert_eq!(event.event_type, ChangeType::Update);
        assert_eq!(event.old, Some(Record::Budgets(original)));
        assert_eq!(event.new, Some(Record::Budgets(updated)));

        let missing = Budget { id: "nope".to_string(), ..budget("x", "Travel", "2025-06") };
        assert!(!repo.update_budget(&missing).await.expect("Update failed"));
    }
}
