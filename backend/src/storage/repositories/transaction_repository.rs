use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{dates::month_bounds, ChangeEvent, Record, Transaction, TransactionType};
use sqlx::{sqlite::SqliteRow, Row};

use crate::storage::connection::DbConnection;
use crate::storage::traits::TransactionStorage;

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, type, amount, category, description, date, created_at, updated_at FROM transactions";

/// Repository for transaction operations
#[derive(Clone)]
pub struct TransactionRepository {
    db: DbConnection,
}

impl TransactionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Transaction> {
        let transaction_type: String = row.try_get("type")?;
        Ok(Transaction {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            transaction_type: transaction_type
                .parse::<TransactionType>()
                .map_err(|e| anyhow!(e))?,
            amount: row.try_get("amount")?,
            category: row.try_get("category")?,
            description: row.try_get("description")?,
            date: row.try_get("date")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl TransactionStorage for TransactionRepository {
    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            "{} WHERE user_id = ? ORDER BY created_at DESC, ROWID DESC",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn list_expenses_in_month(
        &self,
        user_id: &str,
        month: &str,
        category: Option<&str>,
    ) -> Result<Vec<Transaction>> {
        let (start, end) = month_bounds(month).ok_or_else(|| anyhow!("Invalid month: {}", month))?;

        let rows = match category {
            Some(category) => {
                sqlx::query(&format!(
                    "{} WHERE user_id = ? AND type = 'expense' AND category = ? AND date >= ? AND date < ? ORDER BY date ASC",
                    SELECT_COLUMNS
                ))
                .bind(user_id)
                .bind(category)
                .bind(&start)
                .bind(&end)
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "{} WHERE user_id = ? AND type = 'expense' AND date >= ? AND date < ? ORDER BY date ASC",
                    SELECT_COLUMNS
                ))
                .bind(user_id)
                .bind(&start)
                .bind(&end)
                .fetch_all(self.db.pool())
                .await?
            }
        };

        rows.iter().map(Self::map_row).collect()
    }

    async fn get_transaction(&self, user_id: &str, transaction_id: &str) -> Result<Option<Transaction>> {
        let row = sqlx::query(&format!("{} WHERE user_id = ? AND id = ?", SELECT_COLUMNS))
            .bind(user_id)
            .bind(transaction_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn store_transaction(&self, transaction: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, user_id, type, amount, category, description, date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.user_id)
        .bind(transaction.transaction_type.as_str())
        .bind(transaction.amount)
        .bind(&transaction.category)
        .bind(&transaction.description)
        .bind(&transaction.date)
        .bind(&transaction.created_at)
        .bind(&transaction.updated_at)
        .execute(self.db.pool())
        .await?;

        self.db
            .publish(ChangeEvent::insert(Record::Transactions(transaction.clone())));
        Ok(())
    }

    async fn delete_transaction(&self, user_id: &str, transaction_id: &str) -> Result<Option<Transaction>> {
        let Some(existing) = self.get_transaction(user_id, transaction_id).await? else {
            return Ok(None);
        };

        let result = sqlx::query("DELETE FROM transactions WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(transaction_id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.db
            .publish(ChangeEvent::delete(Record::Transactions(existing.clone())));
        Ok(Some(existing))
    }
}
