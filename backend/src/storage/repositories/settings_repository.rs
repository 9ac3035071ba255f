use anyhow::Result;
use async_trait::async_trait;
use shared::{ChangeEvent, Record, UserSettings};
use sqlx::{sqlite::SqliteRow, Row};

use crate::storage::connection::DbConnection;
use crate::storage::traits::SettingsStorage;

/// Repository for the single settings row each user has
#[derive(Clone)]
pub struct SettingsRepository {
    db: DbConnection,
}

impl SettingsRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<UserSettings> {
        let salary_day: i64 = row.try_get("salary_day")?;
        Ok(UserSettings {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            monthly_income: row.try_get("monthly_income")?,
            salary_day: u32::try_from(salary_day)?,
            budget_period_start: row.try_get("budget_period_start")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl SettingsStorage for SettingsRepository {
    async fn get_settings(&self, user_id: &str) -> Result<Option<UserSettings>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, monthly_income, salary_day, budget_period_start, created_at, updated_at
            FROM user_settings
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn store_settings(&self, settings: &UserSettings) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_settings (id, user_id, monthly_income, salary_day, budget_period_start, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&settings.id)
        .bind(&settings.user_id)
        .bind(settings.monthly_income)
        .bind(settings.salary_day as i64)
        .bind(&settings.budget_period_start)
        .bind(&settings.created_at)
        .bind(&settings.updated_at)
        .execute(self.db.pool())
        .await?;

        self.db.publish(ChangeEvent::insert(Record::UserSettings(settings.clone())));
        Ok(())
    }

    async fn update_settings(&self, settings: &UserSettings) -> Result<bool> {
        let Some(previous) = self.get_settings(&settings.user_id).await? else {
            return Ok(false);
        };

        let result = sqlx::query(
            r#"
            UPDATE user_settings
            SET monthly_income = ?, salary_day = ?, budget_period_start = ?, updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(settings.monthly_income)
        .bind(settings.salary_day as i64)
        .bind(&settings.budget_period_start)
        .bind(&settings.updated_at)
        .bind(&settings.user_id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        self.db.publish(ChangeEvent::update(
            Record::UserSettings(previous),
            Record::UserSettings(settings.clone()),
        ));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connection::now_timestamp;

    fn settings(user_id: &str) -> UserSettings {
        let now = now_timestamp();
        UserSettings {
            id: format!("s-{}", user_id),
            user_id: user_id.to_string(),
            monthly_income: 0.0,
            salary_day: 1,
            budget_period_start: "2025-06-01".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_one_row_per_user() {
        let db = DbConnection::init_in_memory().await.expect("Failed to create test database");
        let repo = SettingsRepository::new(db);

        assert!(repo.get_settings("alice").await.expect("Get failed").is_none());
        repo.store_settings(&settings("alice")).await.expect("Failed to store settings");

        let mut second = settings("alice");
        second.id = "other".to_string();
        assert!(repo.store_settings(&second).await.is_err());

        let mut updated = settings("alice");
        updated.salary_day = 25;
        updated.monthly_income = 4200.0;
        assert!(repo.update_settings(&updated).await.expect("Update failed"));

        let fetched = repo.get_settings("alice").await.expect("Get failed").expect("settings exist");
        assert_eq!(fetched.salary_day, 25);
        assert_eq!(fetched.monthly_income, 4200.0);
        assert!(!repo.update_settings(&settings("bob")).await.expect("Update failed"));
    }
}
