use std::sync::Arc;

use shared::{NewUserSettings, Table, UserSettings, UserSettingsUpdate};
use tracing::{info, warn};
use uuid::Uuid;

use super::errors::{DomainError, DomainResult};
use super::validation;
use crate::storage::{now_timestamp, Connection, SettingsStorage};

const SETTINGS_EXIST: &str = "Settings already exist";

/// Monthly income and salary day, one row per user
#[derive(Clone)]
pub struct SettingsService<C: Connection> {
    settings_repository: C::SettingsRepository,
}

impl<C: Connection> SettingsService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let settings_repository = connection.create_settings_repository();
        Self {
            settings_repository,
        }
    }

    pub async fn get_settings(&self, user_id: &str) -> DomainResult<Option<UserSettings>> {
        Ok(self.settings_repository.get_settings(user_id).await?)
    }

    pub async fn create_settings(&self, user_id: &str, request: NewUserSettings) -> DomainResult<UserSettings> {
        validation::non_negative_amount("Monthly income", request.monthly_income)?;
        validation::salary_day(request.salary_day)?;
        validation::date("Budget period start", &request.budget_period_start)?;

        if self.settings_repository.get_settings(user_id).await?.is_some() {
            warn!("Settings already exist for user {}", user_id);
            return Err(DomainError::Conflict(SETTINGS_EXIST.to_string()));
        }

        let now = now_timestamp();
        let settings = UserSettings {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            monthly_income: request.monthly_income,
            salary_day: request.salary_day,
            budget_period_start: request.budget_period_start,
            created_at: now.clone(),
            updated_at: now,
        };

        self.settings_repository
            .store_settings(&settings)
            .await
            .map_err(|e| DomainError::from_insert(e, SETTINGS_EXIST))?;
        info!("Created settings for user {}", user_id);
        Ok(settings)
    }

    pub async fn update_settings(&self, user_id: &str, update: UserSettingsUpdate) -> DomainResult<UserSettings> {
        let mut settings = self
            .settings_repository
            .get_settings(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(Table::UserSettings, user_id))?;

        if let Some(income) = update.monthly_income {
            validation::non_negative_amount("Monthly income", income)?;
            settings.monthly_income = income;
        }
        if let Some(day) = update.salary_day {
            validation::salary_day(day)?;
            settings.salary_day = day;
        }
        if let Some(start) = update.budget_period_start {
            validation::date("Budget period start", &start)?;
            settings.budget_period_start = start;
        }
        settings.updated_at = now_timestamp();

        if !self.settings_repository.update_settings(&settings).await? {
            return Err(DomainError::not_found(Table::UserSettings, user_id));
        }
        info!(
            "Updated settings for user {}: income {:.2}, salary day {}",
            user_id, settings.monthly_income, settings.salary_day
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbConnection;

    async fn setup_test() -> SettingsService<DbConnection> {
        let db = DbConnection::init_in_memory().await.expect("Failed to create test database");
        SettingsService::new(Arc::new(db))
    }

    #[tokio::test]
    async fn test_defaults_then_update() {
        let service = setup_test().await;
        assert!(service.get_settings("alice").await.unwrap().is_none());

        let created = service
            .create_settings("alice", NewUserSettings::defaults("2025-06-14"))
            .await
            .expect("Failed to create settings");
        assert_eq!(created.salary_day, 1);
        assert_eq!(created.monthly_income, 0.0);

        let update = UserSettingsUpdate {
            monthly_income: Some(5200.0),
            salary_day: Some(25),
            ..Default::default()
        };
        let updated = service.update_settings("alice", update).await.expect("Failed to update");
        assert_eq!(updated.salary_day, 25);
        assert_eq!(updated.budget_period_start, "2025-06-14");
        assert_eq!(service.get_settings("alice").await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_second_create_conflicts() {
        let service = setup_test().await;
        service.create_settings("alice", NewUserSettings::defaults("2025-06-14")).await.unwrap();
        assert!(matches!(
            service.create_settings("alice", NewUserSettings::defaults("2025-06-14")).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_creates_yield_one_conflict() {
        let service = setup_test().await;
        let (first, second) = tokio::join!(
            service.create_settings("alice", NewUserSettings::defaults("2025-06-14")),
            service.create_settings("alice", NewUserSettings::defaults("2025-06-14")),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(DomainError::Conflict(_)))));
    }

    #[tokio::test]
    async fn test_update_validation_and_missing_row() {
        let service = setup_test().await;
        let update = UserSettingsUpdate {
            salary_day: Some(12),
            ..Default::default()
        };
        assert!(matches!(
            service.update_settings("alice", update).await,
            Err(DomainError::NotFound { table: Table::UserSettings, .. })
        ));

        service.create_settings("alice", NewUserSettings::defaults("2025-06-14")).await.unwrap();
        let bad = UserSettingsUpdate {
            salary_day: Some(32),
            ..Default::default()
        };
        assert!(matches!(
            service.update_settings("alice", bad).await,
            Err(DomainError::Validation(_))
        ));
    }
}
