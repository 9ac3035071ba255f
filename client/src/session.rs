//! One signed-in user's view of the finance data.
//!
//! [`FinanceClient`] owns the four hooks and derives the screen models
//! (dashboard, budgets, goals, charts) from their current snapshots.

use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;
use shared::aggregation::{
    self, budget_overview, budget_percentage, budget_status, goal_progress, goal_status, goals_overview,
    monthly_stats, spent_by_category, trailing_months, BudgetOverview, BudgetStatus, GoalStatus, GoalsOverview,
    MonthlyStat, Totals,
};
use shared::dates::{days_until, days_until_salary};
use shared::{Budget, Category, SavingsGoal, Transaction};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::hooks::{BudgetsHook, CategoriesHook, SavingsGoalsHook, TransactionsHook};
use crate::services::{Clock, EmbeddedApi, FinanceApi, SystemClock};

const RECENT_TRANSACTIONS: usize = 3;
const TRAILING_MONTHS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub totals: Totals,
    pub recent: Vec<Transaction>,
    pub monthly_income: f64,
    /// Days until the next salary, once settings are loaded
    pub days_until_salary: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLine {
    pub budget: Budget,
    pub status: BudgetStatus,
    pub label: &'static str,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetsView {
    pub month: String,
    pub lines: Vec<BudgetLine>,
    pub overview: BudgetOverview,
    /// Categories that can still get a budget this month
    pub available_categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalLine {
    pub goal: SavingsGoal,
    pub status: GoalStatus,
    pub label: &'static str,
    pub progress: f64,
    pub percent: u32,
    pub days_left: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalsView {
    pub lines: Vec<GoalLine>,
    pub overview: GoalsOverview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartsView {
    pub year: i32,
    pub monthly: Vec<MonthlyStat>,
    /// Six months ending with the current one, oldest first
    pub trailing: Vec<MonthlyStat>,
    /// Current-month spending per category, largest first
    pub spending_by_category: Vec<(String, f64)>,
}

pub struct FinanceClient {
    pub transactions: TransactionsHook,
    pub categories: CategoriesHook,
    pub budgets: BudgetsHook,
    pub goals: SavingsGoalsHook,
    clock: Arc<dyn Clock>,
}

impl FinanceClient {
    pub fn new(
        api: Arc<dyn FinanceApi>,
        clock: Arc<dyn Clock>,
        config: ClientConfig,
        user_id: Option<String>,
    ) -> Self {
        let categories = CategoriesHook::new(api.clone(), user_id.clone());
        Self {
            transactions: TransactionsHook::new(api.clone(), clock.clone(), user_id.clone()),
            budgets: BudgetsHook::new(api.clone(), clock.clone(), config, categories.clone(), user_id.clone()),
            goals: SavingsGoalsHook::new(api, user_id),
            categories,
            clock,
        }
    }

    /// Client over a private in-memory backend, using the system clock
    pub async fn embedded(user_id: &str) -> anyhow::Result<Self> {
        let api = EmbeddedApi::in_memory().await?.into_shared();
        Ok(Self::new(
            api,
            Arc::new(SystemClock),
            ClientConfig::default(),
            Some(user_id.to_string()),
        ))
    }

    /// Run every initial fetch. All fetches are attempted; the first error is returned.
    pub async fn load(&self) -> Result<(), String> {
        let results = [
            self.categories.fetch_categories().await,
            self.transactions.fetch_transactions().await,
            self.budgets.fetch_budgets().await,
            self.budgets.fetch_user_settings().await,
            self.goals.fetch_goals().await,
        ];
        let failures: Vec<String> = results.into_iter().filter_map(Result::err).collect();
        match failures.into_iter().next() {
            Some(first) => {
                warn!("Initial load finished with errors: {}", first);
                Err(first)
            }
            None => {
                info!("Initial load complete");
                Ok(())
            }
        }
    }

    /// One realtime listener per hook; drop or abort the handles to stop them
    pub fn start_realtime(&self) -> Vec<JoinHandle<()>> {
        [
            self.transactions.spawn_realtime(),
            self.categories.spawn_realtime(),
            self.budgets.spawn_realtime(),
            self.goals.spawn_realtime(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub async fn dashboard(&self) -> DashboardView {
        let transactions = self.transactions.transactions().await;
        let settings = self.budgets.user_settings().await;
        DashboardView {
            totals: aggregation::totals(&transactions),
            recent: aggregation::recent(&transactions, RECENT_TRANSACTIONS),
            monthly_income: settings.as_ref().map(|s| s.monthly_income).unwrap_or(0.0),
            days_until_salary: settings.map(|s| days_until_salary(self.clock.today(), s.salary_day)),
        }
    }

    pub async fn budgets_view(&self) -> BudgetsView {
        let budgets = self.budgets.budgets().await;
        let categories = self.categories.categories().await;
        BudgetsView {
            month: self.clock.current_month(),
            overview: budget_overview(&budgets),
            available_categories: aggregation::available_categories(&categories, &budgets)
                .into_iter()
                .cloned()
                .collect(),
            lines: budgets
                .into_iter()
                .map(|budget| {
                    let status = budget_status(budget.spent, budget.limit_amount);
                    BudgetLine {
                        status,
                        label: status.label(),
                        percentage: budget_percentage(budget.spent, budget.limit_amount),
                        budget,
                    }
                })
                .collect(),
        }
    }

    pub async fn goals_view(&self) -> GoalsView {
        let goals = self.goals.goals().await;
        let today = self.clock.today();
        GoalsView {
            overview: goals_overview(&goals),
            lines: goals
                .into_iter()
                .map(|goal| {
                    let (progress, percent) = goal_progress(goal.current_amount, goal.target_amount);
                    let status = goal_status(goal.current_amount, goal.target_amount);
                    GoalLine {
                        status,
                        label: status.label(),
                        progress,
                        percent,
                        days_left: days_until(today, &goal.target_date),
                        goal,
                    }
                })
                .collect(),
        }
    }

    pub async fn charts_view(&self, year: i32) -> ChartsView {
        let transactions = self.transactions.transactions().await;
        let today = self.clock.today();

        let mut spending: Vec<(String, f64)> = spent_by_category(&transactions, &self.clock.current_month())
            .into_iter()
            .collect();
        spending.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        ChartsView {
            year,
            monthly: monthly_stats(&transactions, year),
            trailing: trailing_months(&transactions, today.year(), today.month(), TRAILING_MONTHS),
            spending_by_category: spending,
        }
    }
}
