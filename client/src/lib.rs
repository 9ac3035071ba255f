//! # Finance Tracker Client
//!
//! Client-side state for the finance tracker. Hooks mirror the remote tables
//! for the signed-in user, apply writes optimistically where the UI expects
//! instant feedback, and keep themselves current from the realtime change
//! feed. [`FinanceClient`] bundles them and derives the screen models.

pub mod config;
pub mod hooks;
pub mod services;
pub mod session;

pub use config::ClientConfig;
pub use hooks::{BudgetsHook, CategoriesHook, ListState, SavingsGoalsHook, TransactionsHook};
pub use services::{Clock, EmbeddedApi, FinanceApi, FixedClock, SystemClock};
pub use session::{BudgetsView, ChartsView, DashboardView, FinanceClient, GoalsView};
