use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{Category, ChangeEvent, Record, TransactionType};
use sqlx::{sqlite::SqliteRow, Row};

use crate::storage::connection::DbConnection;
use crate::storage::traits::CategoryStorage;

/// Repository for category operations
#[derive(Clone)]
pub struct CategoryRepository {
    db: DbConnection,
}

impl CategoryRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Category> {
        let category_type: String = row.try_get("type")?;
        Ok(Category {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            icon: row.try_get("icon")?,
            color: row.try_get("color")?,
            category_type: category_type
                .parse::<TransactionType>()
                .map_err(|e| anyhow!(e))?,
            created_at: row.try_get("created_at")?,
        })
    }
}

const INSERT_CATEGORY: &str = r#"
    INSERT INTO categories (id, user_id, name, icon, color, type, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

#[async_trait]
impl CategoryStorage for CategoryRepository {
    async fn list_categories(&self, user_id: &str) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, name, icon, color, type, created_at
            FROM categories
            WHERE user_id = ?
            ORDER BY created_at ASC, ROWID ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn store_category(&self, category: &Category) -> Result<()> {
        sqlx::query(INSERT_CATEGORY)
            .bind(&category.id)
            .bind(&category.user_id)
            .bind(&category.name)
            .bind(&category.icon)
            .bind(&category.color)
            .bind(category.category_type.as_str())
            .bind(&category.created_at)
            .execute(self.db.pool())
            .await?;

        self.db
            .publish(ChangeEvent::insert(Record::Categories(category.clone())));
        Ok(())
    }

    async fn store_categories(&self, categories: &[Category]) -> Result<()> {
        if categories.is_empty() {
            return Ok(());
        }

        let mut tx = self.db.pool().begin().await?;
        for category in categories {
            sqlx::query(INSERT_CATEGORY)
                .bind(&category.id)
                .bind(&category.user_id)
                .bind(&category.name)
                .bind(&category.icon)
                .bind(&category.color)
                .bind(category.category_type.as_str())
                .bind(&category.created_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        for category in categories {
            self.db
                .publish(ChangeEvent::insert(Record::Categories(category.clone())));
        }
        Ok(())
    }
}
