use anyhow::Result;
use async_trait::async_trait;
use shared::{ChangeEvent, Record, SavingsGoal};
use sqlx::{sqlite::SqliteRow, Row};

use crate::storage::connection::DbConnection;
use crate::storage::traits::GoalStorage;

const SELECT_COLUMNS: &str = "SELECT id, user_id, title, target_amount, current_amount, target_date, icon, color, created_at, updated_at FROM savings_goals";

/// Repository for savings goals
#[derive(Clone)]
pub struct GoalRepository {
    db: DbConnection,
}

impl GoalRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<SavingsGoal> {
        Ok(SavingsGoal {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            target_amount: row.try_get("target_amount")?,
            current_amount: row.try_get("current_amount")?,
            target_date: row.try_get("target_date")?,
            icon: row.try_get("icon")?,
            color: row.try_get("color")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl GoalStorage for GoalRepository {
    async fn list_goals(&self, user_id: &str) -> Result<Vec<SavingsGoal>> {
        let rows = sqlx::query(&format!(
            "{} WHERE user_id = ? ORDER BY created_at DESC, ROWID DESC",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn get_goal(&self, user_id: &str, goal_id: &str) -> Result<Option<SavingsGoal>> {
        let row = sqlx::query(&format!("{} WHERE user_id = ? AND id = ?", SELECT_COLUMNS))
            .bind(user_id)
            .bind(goal_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn store_goal(&self, goal: &SavingsGoal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO savings_goals (id, user_id, title, target_amount, current_amount, target_date, icon, color, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&goal.id)
        .bind(&goal.user_id)
        .bind(&goal.title)
        .bind(goal.target_amount)
        .bind(goal.current_amount)
        .bind(&goal.target_date)
        .bind(&goal.icon)
        .bind(&goal.color)
        .bind(&goal.created_at)
        .bind(&goal.updated_at)
        .execute(self.db.pool())
        .await?;

        self.db.publish(ChangeEvent::insert(Record::SavingsGoals(goal.clone())));
        Ok(())
    }

    async fn update_goal(&self, goal: &SavingsGoal) -> Result<bool> {
        let Some(previous) = self.get_goal(&goal.user_id, &goal.id).await? else {
            return Ok(false);
        };

        let result = sqlx::query(
            r#"
            UPDATE savings_goals
            SET title = ?, target_amount = ?, current_amount = ?, target_date = ?, icon = ?, color = ?, updated_at = ?
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(&goal.title)
        .bind(goal.target_amount)
        .bind(goal.current_amount)
        .bind(&goal.target_date)
        .bind(&goal.icon)
        .bind(&goal.color)
        .bind(&goal.updated_at)
        .bind(&goal.user_id)
        .bind(&goal.id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        self.db.publish(ChangeEvent::update(
            Record::SavingsGoals(previous),
            Record::SavingsGoals(goal.clone()),
        ));
        Ok(true)
    }

    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<Option<SavingsGoal>> {
        let Some(existing) = self.get_goal(user_id, goal_id).await? else {
            return Ok(None);
        };

        let result = sqlx::query("DELETE FROM savings_goals WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(goal_id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.db.publish(ChangeEvent::delete(Record::SavingsGoals(existing.clone())));
        Ok(Some(existing))
    }
}
