use std::sync::Arc;

use shared::{default_categories, Category, ChangeEvent, NewCategory, Table, TransactionType, DEFAULT_CATEGORY_ICON};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::{spawn_listener, ListState, Signal, NOT_AUTHENTICATED};
use crate::services::FinanceApi;

/// The user's categories, seeded with the defaults on first load
#[derive(Clone)]
pub struct CategoriesHook {
    api: Arc<dyn FinanceApi>,
    user_id: Option<String>,
    state: Arc<RwLock<ListState<Category>>>,
}

impl CategoriesHook {
    pub fn new(api: Arc<dyn FinanceApi>, user_id: Option<String>) -> Self {
        Self {
            api,
            user_id,
            state: Arc::new(RwLock::new(ListState::new())),
        }
    }

    pub async fn state(&self) -> ListState<Category> {
        self.state.read().await.clone()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.state.read().await.items.clone()
    }

    pub async fn fetch_categories(&self) -> Result<(), String> {
        let Some(user_id) = self.user_id.as_deref() else {
            self.state.write().await.loading = false;
            return Ok(());
        };

        self.state.write().await.loading = true;
        let result = match self.api.list_categories(user_id).await {
            Ok(categories) if categories.is_empty() => {
                info!("No categories for user {}, seeding defaults", user_id);
                self.api.create_categories(user_id, default_categories()).await
            }
            other => other,
        };

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(categories) => {
                debug!("Fetched {} categories", categories.len());
                state.items = categories;
                state.error = None;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching categories: {}", e);
                state.error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub async fn add_category(&self, request: NewCategory) -> Result<Category, String> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Err(NOT_AUTHENTICATED.to_string());
        };

        let category = self.api.create_category(user_id, request).await?;
        let mut state = self.state.write().await;
        if !state.items.iter().any(|c| c.id == category.id) {
            state.items.push(category.clone());
        }
        Ok(category)
    }

    pub async fn exists(&self, name: &str) -> bool {
        self.state.read().await.items.iter().any(|c| c.name == name)
    }

    pub async fn by_type(&self, category_type: TransactionType) -> Vec<Category> {
        self.state
            .read()
            .await
            .items
            .iter()
            .filter(|c| c.category_type == category_type)
            .cloned()
            .collect()
    }

    /// Icon of the named category, or the generic one when unknown
    pub async fn icon_for(&self, name: &str) -> String {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.icon.clone())
            .unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string())
    }

    /// Any category change for the user triggers a full re-fetch
    pub async fn apply_change(&self, event: &ChangeEvent) {
        let Some(user_id) = self.user_id.as_deref() else {
            return;
        };
        if event.matches(user_id, Table::Categories) {
            let _ = self.fetch_categories().await;
        }
    }

    pub fn spawn_realtime(&self) -> Option<JoinHandle<()>> {
        self.user_id.as_ref()?;
        let hook = self.clone();
        Some(spawn_listener("categories", self.api.subscribe(), move |signal| {
            let hook = hook.clone();
            async move {
                match signal {
                    Signal::Change(event) => hook.apply_change(&event).await,
                    Signal::Lagged => {
                        let _ = hook.fetch_categories().await;
                    }
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::test_support::{embedded, FlakyApi};

    #[tokio::test]
    async fn test_first_fetch_seeds_defaults_once() {
        let api = embedded().await;
        let hook = CategoriesHook::new(api.clone(), Some("alice".to_string()));

        hook.fetch_categories().await.expect("Failed to fetch");
        assert_eq!(hook.categories().await.len(), 13);
        assert_eq!(hook.by_type(TransactionType::Income).await.len(), 5);

        hook.fetch_categories().await.expect("Failed to re-fetch");
        assert_eq!(api.list_categories("alice").await.unwrap().len(), 13);
    }

    #[tokio::test]
    async fn test_lookup_helpers() {
        let hook = CategoriesHook::new(embedded().await, Some("alice".to_string()));
        hook.fetch_categories().await.unwrap();

        assert!(hook.exists("Shopping").await);
        assert!(!hook.exists("shopping").await);
        assert_eq!(hook.icon_for("Transportation").await, "car");
        assert_eq!(hook.icon_for("Pets").await, DEFAULT_CATEGORY_ICON);

        let pets = hook
            .add_category(NewCategory::new("Pets", "heart", "#EC4899", TransactionType::Expense))
            .await
            .expect("Failed to add category");
        assert_eq!(hook.categories().await.last(), Some(&pets));
        assert_eq!(hook.icon_for("Pets").await, "heart");
    }

    #[tokio::test]
    async fn test_failed_seed_records_error() {
        let flaky = Arc::new(FlakyApi::new(embedded().await));
        flaky.set_failing(true);
        let hook = CategoriesHook::new(flaky, Some("alice".to_string()));

        assert!(hook.fetch_categories().await.is_err());
        let state = hook.state().await;
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Network request failed"));
        assert!(state.items.is_empty());
    }
}
