use serde::{Deserialize, Serialize};
use std::fmt;

pub mod aggregation;
pub mod dates;
pub mod events;

pub use events::{ChangeEvent, ChangeType, Record, Table};

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Label used when a transaction is saved without a description
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

/// A single income or expense record owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// UUID, or `temp-<epoch millis>` while an insert is still pending
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Always positive; the direction comes from `transaction_type`
    pub amount: f64,
    /// Category name (matched by name, not by id)
    pub category: String,
    pub description: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// RFC 3339
    pub created_at: String,
    pub updated_at: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    /// True for optimistic placeholders that have not been confirmed yet
    pub fn is_pending(&self) -> bool {
        self.id.starts_with(TEMP_ID_PREFIX)
    }
}

/// Prefix of ids given to optimistic placeholder rows
pub const TEMP_ID_PREFIX: &str = "temp-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
}

impl NewTransaction {
    /// Fill an empty description with "Income - <category>" / "Expense - <category>"
    pub fn with_default_description(mut self) -> Self {
        let trimmed = self.description.trim();
        if trimmed.is_empty() {
            self.description = format!("{} - {}", self.transaction_type.label(), self.category);
        } else if trimmed.len() != self.description.len() {
            self.description = trimmed.to_string();
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Icon key understood by the UI, e.g. "utensils"
    pub icon: String,
    /// Hex color, e.g. "#F59E0B"
    pub color: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
}

impl NewCategory {
    pub fn new(name: &str, icon: &str, color: &str, category_type: TransactionType) -> Self {
        Self {
            name: name.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
            category_type,
        }
    }
}

/// Categories every new user starts with, in seeding order
pub fn default_categories() -> Vec<NewCategory> {
    use TransactionType::{Expense, Income};
    vec![
        NewCategory::new("Food & Dining", "utensils", "#F59E0B", Expense),
        NewCategory::new("Transportation", "car", "#3B82F6", Expense),
        NewCategory::new("Shopping", "shopping-bag", "#EF4444", Expense),
        NewCategory::new("Housing", "home", "#10B981", Expense),
        NewCategory::new("Entertainment", "gamepad-2", "#8B5CF6", Expense),
        NewCategory::new("Healthcare", "heart", "#EC4899", Expense),
        NewCategory::new("Education", "book", "#6366F1", Expense),
        NewCategory::new("Utilities", "dollar-sign", "#059669", Expense),
        NewCategory::new("Salary", "briefcase", "#10B981", Income),
        NewCategory::new("Freelance", "dollar-sign", "#0891B2", Income),
        NewCategory::new("Investment", "trending-up", "#7C3AED", Income),
        NewCategory::new("Business", "briefcase", "#059669", Income),
        NewCategory::new("Other Income", "dollar-sign", "#6366F1", Income),
    ]
}

/// Icon used when a transaction's category is unknown
pub const DEFAULT_CATEGORY_ICON: &str = "dollar-sign";

/// Monthly spending limit for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    /// Category name this budget tracks
    pub category: String,
    pub limit_amount: f64,
    /// Derived from expense transactions; recomputed, not maintained
    pub spent: f64,
    /// `YYYY-MM`
    pub month: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBudget {
    pub category: String,
    pub limit_amount: f64,
    #[serde(default)]
    pub spent: f64,
    pub month: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spent: Option<f64>,
}

impl BudgetUpdate {
    pub fn spent(spent: f64) -> Self {
        Self {
            spent: Some(spent),
            ..Default::default()
        }
    }

    pub fn limit(limit_amount: f64) -> Self {
        Self {
            limit_amount: Some(limit_amount),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    /// `YYYY-MM-DD`
    pub target_date: String,
    pub icon: String,
    pub color: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSavingsGoal {
    pub title: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    pub target_date: String,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoalUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Per-user settings row, created with defaults on first load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub id: String,
    pub user_id: String,
    pub monthly_income: f64,
    /// Day of month the salary arrives (1-31)
    pub salary_day: u32,
    /// `YYYY-MM-DD`
    pub budget_period_start: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUserSettings {
    pub monthly_income: f64,
    pub salary_day: u32,
    pub budget_period_start: String,
}

impl NewUserSettings {
    /// Income 0, salary on the 1st, period starting `today`
    pub fn defaults(today: &str) -> Self {
        Self {
            monthly_income: 0.0,
            salary_day: 1,
            budget_period_start: today.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_period_start: Option<String>,
}
