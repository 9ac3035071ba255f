use std::sync::Arc;

use shared::{Category, NewCategory};
use tracing::info;
use uuid::Uuid;

use super::errors::DomainResult;
use super::validation;
use crate::storage::{now_timestamp, CategoryStorage, Connection};

/// Per-user income and expense categories
#[derive(Clone)]
pub struct CategoryService<C: Connection> {
    category_repository: C::CategoryRepository,
}

impl<C: Connection> CategoryService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let category_repository = connection.create_category_repository();
        Self {
            category_repository,
        }
    }

    pub async fn list_categories(&self, user_id: &str) -> DomainResult<Vec<Category>> {
        Ok(self.category_repository.list_categories(user_id).await?)
    }

    pub async fn create_category(&self, user_id: &str, request: NewCategory) -> DomainResult<Category> {
        let category = Self::build(user_id, request)?;
        self.category_repository.store_category(&category).await?;
        info!("Created category '{}' for user {}", category.name, user_id);
        Ok(category)
    }

    /// Insert several categories atomically, returning them in request order
    pub async fn create_categories(
        &self,
        user_id: &str,
        requests: Vec<NewCategory>,
    ) -> DomainResult<Vec<Category>> {
        let categories = requests
            .into_iter()
            .map(|request| Self::build(user_id, request))
            .collect::<DomainResult<Vec<_>>>()?;

        self.category_repository.store_categories(&categories).await?;
        info!("Created {} categories for user {}", categories.len(), user_id);
        Ok(categories)
    }

    fn build(user_id: &str, request: NewCategory) -> DomainResult<Category> {
        validation::non_empty("Category name", &request.name)?;
        Ok(Category {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: request.name.trim().to_string(),
            icon: request.icon,
            color: request.color,
            category_type: request.category_type,
            created_at: now_timestamp(),
        })
    }
}
