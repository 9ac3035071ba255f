//! Derived totals recomputed from the mirrored lists whenever they change.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::dates::{date_in_month, months_back, month_name, parse_date};
use crate::{Budget, Category, SavingsGoal, Transaction, TransactionType};
use chrono::Datelike;

/// Stored spent amounts closer than this to the computed value are left alone
pub const SPENT_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
}

pub fn totals(transactions: &[Transaction]) -> Totals {
    let total_income = sum_of_type(transactions, TransactionType::Income);
    let total_expenses = sum_of_type(transactions, TransactionType::Expense);
    Totals {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
    }
}

fn sum_of_type(transactions: &[Transaction], transaction_type: TransactionType) -> f64 {
    transactions
        .iter()
        .filter(|t| t.transaction_type == transaction_type)
        .map(|t| t.amount)
        .sum()
}

/// The first `count` rows of a newest-first list
pub fn recent(transactions: &[Transaction], count: usize) -> Vec<Transaction> {
    transactions.iter().take(count).cloned().collect()
}

/// Expense totals per category name for one `YYYY-MM` month
pub fn spent_by_category(transactions: &[Transaction], month: &str) -> HashMap<String, f64> {
    let mut spent = HashMap::new();
    for transaction in transactions
        .iter()
        .filter(|t| t.is_expense() && date_in_month(&t.date, month))
    {
        *spent.entry(transaction.category.clone()).or_insert(0.0) += transaction.amount;
    }
    spent
}

/// Expense total for one category in one month
pub fn spent_for_category(transactions: &[Transaction], category: &str, month: &str) -> f64 {
    transactions
        .iter()
        .filter(|t| t.is_expense() && t.category == category && date_in_month(&t.date, month))
        .map(|t| t.amount)
        .sum()
}

/// Whether a stored spent value should be rewritten
pub fn spent_differs(stored: f64, computed: f64) -> bool {
    (stored - computed).abs() > SPENT_EPSILON
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetStatus {
    NoLimit,
    OnTrack,
    CloseToLimit,
    OverBudget,
}

impl BudgetStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BudgetStatus::NoLimit => "No Limit Set",
            BudgetStatus::OnTrack => "On Track",
            BudgetStatus::CloseToLimit => "Close to Limit",
            BudgetStatus::OverBudget => "Over Budget",
        }
    }
}

pub fn budget_status(spent: f64, limit: f64) -> BudgetStatus {
    if limit == 0.0 {
        return BudgetStatus::NoLimit;
    }
    let percentage = spent / limit * 100.0;
    if percentage >= 100.0 {
        BudgetStatus::OverBudget
    } else if percentage >= 80.0 {
        BudgetStatus::CloseToLimit
    } else {
        BudgetStatus::OnTrack
    }
}

/// Spent as a percentage of the limit, 0 when no limit is set
pub fn budget_percentage(spent: f64, limit: f64) -> f64 {
    if limit == 0.0 { 0.0 } else { spent / limit * 100.0 }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetOverview {
    pub total_budget: f64,
    pub total_spent: f64,
    pub on_track: usize,
    pub has_over_budget: bool,
}

pub fn budget_overview(budgets: &[Budget]) -> BudgetOverview {
    BudgetOverview {
        total_budget: budgets.iter().map(|b| b.limit_amount).sum(),
        total_spent: budgets.iter().map(|b| b.spent).sum(),
        on_track: budgets
            .iter()
            .filter(|b| b.limit_amount > 0.0 && b.spent < b.limit_amount * 0.8)
            .count(),
        has_over_budget: budgets
            .iter()
            .any(|b| b.limit_amount > 0.0 && b.spent > b.limit_amount),
    }
}

/// Categories that don't have a budget yet
pub fn available_categories<'a>(categories: &'a [Category], budgets: &[Budget]) -> Vec<&'a Category> {
    categories
        .iter()
        .filter(|c| !budgets.iter().any(|b| b.category == c.name))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalStatus {
    Completed,
    AlmostThere,
    InProgress,
    GettingStarted,
}

impl GoalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GoalStatus::Completed => "Completed",
            GoalStatus::AlmostThere => "Almost There",
            GoalStatus::InProgress => "In Progress",
            GoalStatus::GettingStarted => "Getting Started",
        }
    }
}

pub fn goal_status(current: f64, target: f64) -> GoalStatus {
    let percentage = if target > 0.0 { current / target * 100.0 } else { 100.0 };
    if percentage >= 100.0 {
        GoalStatus::Completed
    } else if percentage >= 75.0 {
        GoalStatus::AlmostThere
    } else if percentage >= 50.0 {
        GoalStatus::InProgress
    } else {
        GoalStatus::GettingStarted
    }
}

/// Progress in [0, 1] and the matching whole percentage
pub fn goal_progress(current: f64, target: f64) -> (f64, u32) {
    let progress = if target > 0.0 {
        (current / target).clamp(0.0, 1.0)
    } else {
        1.0
    };
    (progress, (progress * 100.0).round() as u32)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalsOverview {
    pub total_saved: f64,
    pub total_target: f64,
    pub completed: usize,
}

pub fn goals_overview(goals: &[SavingsGoal]) -> GoalsOverview {
    GoalsOverview {
        total_saved: goals.iter().map(|g| g.current_amount).sum(),
        total_target: goals.iter().map(|g| g.target_amount).sum(),
        completed: goals
            .iter()
            .filter(|g| g.current_amount >= g.target_amount)
            .count(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStat {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub income: f64,
    pub expenses: f64,
    pub net_change: f64,
    pub is_positive: bool,
}

fn monthly_stat(transactions: &[Transaction], year: i32, month: u32) -> MonthlyStat {
    let mut income = 0.0;
    let mut expenses = 0.0;
    for transaction in transactions {
        let Some(date) = parse_date(&transaction.date) else {
            continue;
        };
        if date.year() != year || date.month() != month {
            continue;
        }
        match transaction.transaction_type {
            TransactionType::Income => income += transaction.amount,
            TransactionType::Expense => expenses += transaction.amount,
        }
    }
    let net_change = income - expenses;
    MonthlyStat {
        year,
        month,
        month_name: month_name(month).to_string(),
        income,
        expenses,
        net_change,
        is_positive: net_change >= 0.0,
    }
}

/// Income/expense per month, January through December of `year`
pub fn monthly_stats(transactions: &[Transaction], year: i32) -> Vec<MonthlyStat> {
    (1..=12).map(|month| monthly_stat(transactions, year, month)).collect()
}

/// The `count` months ending with (year, month), oldest first
pub fn trailing_months(transactions: &[Transaction], year: i32, month: u32, count: u32) -> Vec<MonthlyStat> {
    (0..count)
        .rev()
        .map(|offset| {
            let (y, m) = months_back(year, month, offset);
            monthly_stat(transactions, y, m)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl TypeFilter {
    fn accepts(&self, transaction_type: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Income => transaction_type == TransactionType::Income,
            TypeFilter::Expense => transaction_type == TransactionType::Expense,
        }
    }
}

/// Case-insensitive search over description and category, combined with a type filter
pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    query: &str,
    filter: TypeFilter,
) -> Vec<&'a Transaction> {
    let query = query.to_lowercase();
    transactions
        .iter()
        .filter(|t| {
            t.description.to_lowercase().contains(&query)
                || t.category.to_lowercase().contains(&query)
        })
        .filter(|t| filter.accepts(t.transaction_type))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, transaction_type: TransactionType, amount: f64, category: &str, date: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            user_id: "alice".to_string(),
            transaction_type,
            amount,
            category: category.to_string(),
            description: format!("{} {}", category, id),
            date: date.to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn budget(category: &str, limit_amount: f64, spent: f64) -> Budget {
        Budget {
            id: format!("b-{}", category),
            user_id: "alice".to_string(),
            category: category.to_string(),
            limit_amount,
            spent,
            month: "2025-06".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn sample() -> Vec<Transaction> {
        use TransactionType::{Expense, Income};
        vec![
            tx("1", Income, 3000.0, "Salary", "2025-06-01"),
            tx("2", Expense, 45.5, "Food & Dining", "2025-06-03"),
            tx("3", Expense, 20.0, "Food & Dining", "2025-06-20"),
            tx("4", Expense, 900.0, "Housing", "2025-06-01"),
            tx("5", Expense, 60.0, "Food & Dining", "2025-05-31"),
            tx("6", Income, 200.0, "Freelance", "2025-05-15"),
        ]
    }

    #[test]
    fn test_totals_and_balance() {
        let t = totals(&sample());
        assert_eq!(t.total_income, 3200.0);
        assert_eq!(t.total_expenses, 1025.5);
        assert_eq!(t.balance, 3200.0 - 1025.5);
        assert_eq!(totals(&[]), Totals::default());
    }

    #[test]
    fn test_recent_takes_front_of_list() {
        let recent = recent(&sample(), 3);
        let ids: Vec<_> = recent.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn test_spent_only_counts_expenses_in_month() {
        let spent = spent_by_category(&sample(), "2025-06");
        assert_eq!(spent.get("Food & Dining"), Some(&65.5));
        assert_eq!(spent.get("Housing"), Some(&900.0));
        assert!(spent.get("Salary").is_none());
        assert_eq!(spent_for_category(&sample(), "Food & Dining", "2025-05"), 60.0);
        assert_eq!(spent_for_category(&sample(), "Travel", "2025-06"), 0.0);
    }

    #[test]
    fn test_spent_differs_threshold() {
        assert!(!spent_differs(10.0, 10.005));
        assert!(spent_differs(10.0, 10.02));
    }

    #[test]
    fn test_budget_status_thresholds() {
        assert_eq!(budget_status(50.0, 0.0), BudgetStatus::NoLimit);
        assert_eq!(budget_status(79.0, 100.0), BudgetStatus::OnTrack);
        assert_eq!(budget_status(80.0, 100.0), BudgetStatus::CloseToLimit);
        assert_eq!(budget_status(100.0, 100.0), BudgetStatus::OverBudget);
        assert_eq!(BudgetStatus::CloseToLimit.label(), "Close to Limit");
    }

    #[test]
    fn test_budget_overview() {
        let budgets = vec![
            budget("Food & Dining", 200.0, 65.5),
            budget("Housing", 800.0, 900.0),
            budget("Shopping", 0.0, 40.0),
        ];
        let overview = budget_overview(&budgets);
        assert_eq!(overview.total_budget, 1000.0);
        assert_eq!(overview.total_spent, 1005.5);
        assert_eq!(overview.on_track, 1);
        assert!(overview.has_over_budget);
    }

    #[test]
    fn test_available_categories_excludes_budgeted() {
        let categories: Vec<Category> = crate::default_categories()
            .into_iter()
            .enumerate()
            .map(|(i, c)| Category {
                id: i.to_string(),
                user_id: "alice".to_string(),
                name: c.name,
                icon: c.icon,
                color: c.color,
                category_type: c.category_type,
                created_at: String::new(),
            })
            .collect();
        let budgets = vec![budget("Housing", 800.0, 0.0)];
        let available = available_categories(&categories, &budgets);
        assert_eq!(available.len(), categories.len() - 1);
        assert!(available.iter().all(|c| c.name != "Housing"));
    }

    #[test]
    fn test_goal_status_and_progress() {
        assert_eq!(goal_status(1000.0, 1000.0), GoalStatus::Completed);
        assert_eq!(goal_status(750.0, 1000.0), GoalStatus::AlmostThere);
        assert_eq!(goal_status(500.0, 1000.0), GoalStatus::InProgress);
        assert_eq!(goal_status(10.0, 1000.0), GoalStatus::GettingStarted);
        assert_eq!(goal_progress(1500.0, 1000.0), (1.0, 100));
        assert_eq!(goal_progress(333.0, 1000.0), (0.333, 33));
    }

    #[test]
    fn test_monthly_stats_cover_whole_year() {
        let stats = monthly_stats(&sample(), 2025);
        assert_eq!(stats.len(), 12);
        let june = &stats[5];
        assert_eq!(june.month_name, "June");
        assert_eq!(june.income, 3000.0);
        assert_eq!(june.expenses, 965.5);
        assert!(june.is_positive);
        let may = &stats[4];
        assert_eq!(may.net_change, 140.0);
        assert_eq!(stats[0].net_change, 0.0);
        assert!(stats[0].is_positive);
    }

    #[test]
    fn test_trailing_months_cross_year_boundary() {
        let months = trailing_months(&sample(), 2025, 2, 6);
        let keys: Vec<_> = months.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(keys, [(2024, 9), (2024, 10), (2024, 11), (2024, 12), (2025, 1), (2025, 2)]);
    }

    #[test]
    fn test_filter_transactions() {
        let data = sample();
        let found = filter_transactions(&data, "food", TypeFilter::All);
        assert_eq!(found.len(), 3);
        let found = filter_transactions(&data, "", TypeFilter::Income);
        assert_eq!(found.len(), 2);
        let found = filter_transactions(&data, "SALARY", TypeFilter::Expense);
        assert!(found.is_empty());
    }
}
