//! # Domain Module
//!
//! Business rules for the finance tracker, one service per table. Services
//! are generic over the storage [`Connection`](crate::storage::Connection)
//! and take the caller's user id on every operation; nothing here knows
//! about HTTP.
//!
//! ## Module Organization
//!
//! - **transaction_service**: income and expense records
//! - **category_service**: categories, including atomic batch inserts used for seeding
//! - **budget_service**: per-category monthly limits, unique per month
//! - **goal_service**: savings goals and their progress
//! - **settings_service**: monthly income and salary day
//! - **validation**: shared input checks
//! - **errors**: the `DomainError` type every service returns
//!
//! ## Business Rules
//!
//! - Amounts are finite; transaction amounts and goal targets are strictly positive
//! - Dates are `YYYY-MM-DD`, months are `YYYY-MM`
//! - Descriptions are 1-256 characters after the default is applied
//! - One budget per category per month, one settings row per user

pub mod budget_service;
pub mod category_service;
pub mod errors;
pub mod goal_service;
pub mod settings_service;
pub mod transaction_service;
pub mod validation;

pub use budget_service::BudgetService;
pub use category_service::CategoryService;
pub use errors::{DomainError, DomainResult};
pub use goal_service::GoalService;
pub use settings_service::SettingsService;
pub use transaction_service::TransactionService;
