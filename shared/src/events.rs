//! Row-level change notifications published by the backend after every write.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Budget, Category, SavingsGoal, Transaction, UserSettings};

/// Tables that publish change events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Transactions,
    Categories,
    Budgets,
    SavingsGoals,
    UserSettings,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Transactions => "transactions",
            Table::Categories => "categories",
            Table::Budgets => "budgets",
            Table::SavingsGoals => "savings_goals",
            Table::UserSettings => "user_settings",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transactions" => Ok(Table::Transactions),
            "categories" => Ok(Table::Categories),
            "budgets" => Ok(Table::Budgets),
            "savings_goals" => Ok(Table::SavingsGoals),
            "user_settings" => Ok(Table::UserSettings),
            other => Err(format!("Unknown table: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Insert,
    Update,
    Delete,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Insert => "INSERT",
            ChangeType::Update => "UPDATE",
            ChangeType::Delete => "DELETE",
        }
    }
}

/// A row from any of the change-publishing tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "table", content = "row", rename_all = "snake_case")]
pub enum Record {
    Transactions(Transaction),
    Categories(Category),
    Budgets(Budget),
    SavingsGoals(SavingsGoal),
    UserSettings(UserSettings),
}

impl Record {
    pub fn table(&self) -> Table {
        match self {
            Record::Transactions(_) => Table::Transactions,
            Record::Categories(_) => Table::Categories,
            Record::Budgets(_) => Table::Budgets,
            Record::SavingsGoals(_) => Table::SavingsGoals,
            Record::UserSettings(_) => Table::UserSettings,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::Transactions(r) => &r.id,
            Record::Categories(r) => &r.id,
            Record::Budgets(r) => &r.id,
            Record::SavingsGoals(r) => &r.id,
            Record::UserSettings(r) => &r.id,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            Record::Transactions(r) => &r.user_id,
            Record::Categories(r) => &r.user_id,
            Record::Budgets(r) => &r.user_id,
            Record::SavingsGoals(r) => &r.user_id,
            Record::UserSettings(r) => &r.user_id,
        }
    }
}

/// One INSERT/UPDATE/DELETE on one row.
///
/// INSERT carries `new`, DELETE carries `old`, UPDATE carries both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub event_type: ChangeType,
    pub user_id: String,
    pub new: Option<Record>,
    pub old: Option<Record>,
}

impl ChangeEvent {
    pub fn insert(record: Record) -> Self {
        Self {
            event_type: ChangeType::Insert,
            user_id: record.user_id().to_string(),
            new: Some(record),
            old: None,
        }
    }

    pub fn update(old: Record, new: Record) -> Self {
        Self {
            event_type: ChangeType::Update,
            user_id: new.user_id().to_string(),
            new: Some(new),
            old: Some(old),
        }
    }

    pub fn delete(record: Record) -> Self {
        Self {
            event_type: ChangeType::Delete,
            user_id: record.user_id().to_string(),
            new: None,
            old: Some(record),
        }
    }

    pub fn table(&self) -> Option<Table> {
        self.new
            .as_ref()
            .or(self.old.as_ref())
            .map(Record::table)
    }

    /// Whether a subscriber filtered on `user_id` and `table` should see this event
    pub fn matches(&self, user_id: &str, table: Table) -> bool {
        self.user_id == user_id && self.table() == Some(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransactionType;

    fn category() -> Category {
        Category {
            id: "c1".to_string(),
            user_id: "alice".to_string(),
            name: "Shopping".to_string(),
            icon: "shopping-bag".to_string(),
            color: "#EF4444".to_string(),
            category_type: TransactionType::Expense,
            created_at: "2025-06-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_event_table_and_filter() {
        let event = ChangeEvent::delete(Record::Categories(category()));
        assert_eq!(event.table(), Some(Table::Categories));
        assert!(event.matches("alice", Table::Categories));
        assert!(!event.matches("bob", Table::Categories));
        assert!(!event.matches("alice", Table::Budgets));
    }

    #[test]
    fn test_event_wire_format() {
        let event = ChangeEvent::insert(Record::Categories(category()));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event_type"], "INSERT");
        assert_eq!(value["new"]["table"], "categories");
        assert_eq!(value["new"]["row"]["name"], "Shopping");
        assert!(value["old"].is_null());
    }

    #[test]
    fn test_table_parse() {
        assert_eq!("savings_goals".parse::<Table>().unwrap(), Table::SavingsGoals);
        assert!("profiles".parse::<Table>().is_err());
    }
}
