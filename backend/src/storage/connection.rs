use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use shared::ChangeEvent;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::SqlitePoolOptions,
    Sqlite, SqlitePool,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use super::change_feed::ChangeFeed;
use super::repositories::{
    BudgetRepository, CategoryRepository, GoalRepository, SettingsRepository,
    TransactionRepository,
};
use super::traits::Connection;

// The database URL used when nothing is configured
pub const DEFAULT_DATABASE_URL: &str = "sqlite:finance.db";

/// DbConnection owns the SQLite pool and the change feed every write publishes to
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
    change_feed: ChangeFeed,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database at {}", url);
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
            change_feed: ChangeFeed::new(),
        })
    }

    /// Isolated in-memory database.
    ///
    /// The pool is pinned to a single connection that never expires, since an
    /// in-memory SQLite database lives only as long as its connection.
    pub async fn init_in_memory() -> Result<Self> {
        Self::init_in_memory_with_feed(ChangeFeed::new()).await
    }

    /// In-memory database publishing to `change_feed`
    pub async fn init_in_memory_with_feed(change_feed: ChangeFeed) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
            change_feed,
        })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn change_feed(&self) -> &ChangeFeed {
        &self.change_feed
    }

    pub(crate) fn publish(&self, event: ChangeEvent) {
        self.change_feed.publish(event);
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_user_created
            ON transactions(user_id, created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_user_date
            ON transactions(user_id, date);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                icon TEXT NOT NULL,
                color TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_categories_user_id
            ON categories(user_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS budgets (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                category TEXT NOT NULL,
                limit_amount REAL NOT NULL DEFAULT 0,
                spent REAL NOT NULL DEFAULT 0,
                month TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // One budget per category per month
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_budgets_user_category_month
            ON budgets(user_id, category, month);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS savings_goals (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                target_amount REAL NOT NULL,
                current_amount REAL NOT NULL DEFAULT 0,
                target_date TEXT NOT NULL,
                icon TEXT NOT NULL,
                color TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_savings_goals_user_id
            ON savings_goals(user_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_settings (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL UNIQUE,
                monthly_income REAL NOT NULL DEFAULT 0,
                salary_day INTEGER NOT NULL DEFAULT 1 CHECK (salary_day >= 1 AND salary_day <= 31),
                budget_period_start TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

impl Connection for DbConnection {
    type TransactionRepository = TransactionRepository;
    type CategoryRepository = CategoryRepository;
    type BudgetRepository = BudgetRepository;
    type GoalRepository = GoalRepository;
    type SettingsRepository = SettingsRepository;

    fn create_transaction_repository(&self) -> Self::TransactionRepository {
        TransactionRepository::new(self.clone())
    }

    fn create_category_repository(&self) -> Self::CategoryRepository {
        CategoryRepository::new(self.clone())
    }

    fn create_budget_repository(&self) -> Self::BudgetRepository {
        BudgetRepository::new(self.clone())
    }

    fn create_goal_repository(&self) -> Self::GoalRepository {
        GoalRepository::new(self.clone())
    }

    fn create_settings_repository(&self) -> Self::SettingsRepository {
        SettingsRepository::new(self.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.change_feed.subscribe()
    }
}

/// RFC 3339 UTC timestamp with fixed microsecond precision, so rows sort by string
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    #[tokio::test]
    async fn test_schema_created_in_memory() {
        let db = DbConnection::init_in_memory().await.expect("Failed to create test database");
        let rows = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(db.pool())
            .await
            .expect("Failed to list tables");
        let tables: Vec<String> = rows.iter().map(|r| r.get("name")).collect();
        for table in ["budgets", "categories", "savings_goals", "transactions", "user_settings"] {
            assert!(tables.contains(&table.to_string()), "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn test_creates_database_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("finance.db");
        let url = format!("sqlite:{}", path.display());

        DbConnection::new(&url).await.expect("Failed to open file database");
        assert!(path.exists());

        // Opening again reuses the existing schema
        DbConnection::new(&url).await.expect("Failed to reopen file database");
    }

    #[test]
    fn test_timestamps_sort_as_strings() {
        let first = now_timestamp();
        let second = now_timestamp();
        assert!(first <= second);
        assert!(first.ends_with('Z'));
    }
}
