//! # Storage Module
//!
//! Data persistence for the finance tracker: one SQLite table per entity,
//! every query scoped by user id, and a broadcast change feed that each
//! successful write publishes to.
//!
//! - **connection.rs** - pool setup, schema, change feed ownership
//! - **traits.rs** - storage traits the domain layer depends on
//! - **repositories/** - SQLite implementations, one per table
//! - **change_feed.rs** - the realtime event channel

pub mod change_feed;
pub mod connection;
pub mod repositories;
pub mod traits;

pub use change_feed::ChangeFeed;
pub use connection::{now_timestamp, DbConnection, DEFAULT_DATABASE_URL};
pub use repositories::{
    BudgetRepository, CategoryRepository, GoalRepository, SettingsRepository,
    TransactionRepository,
};
pub use traits::*;
