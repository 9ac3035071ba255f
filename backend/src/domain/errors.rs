use shared::Table;
use thiserror::Error;

/// Errors surfaced by the domain services
#[derive(Debug, Error)]
pub enum DomainError {
    /// Input rejected before anything was written
    #[error("{0}")]
    Validation(String),

    #[error("{table} row '{id}' not found")]
    NotFound { table: Table, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(table: Table, id: impl Into<String>) -> Self {
        Self::NotFound {
            table,
            id: id.into(),
        }
    }

    /// A failed insert becomes `Conflict(message)` when a unique index rejected it
    pub fn from_insert(error: anyhow::Error, message: &str) -> Self {
        if is_unique_violation(&error) {
            Self::Conflict(message.to_string())
        } else {
            Self::Storage(error)
        }
    }
}

fn is_unique_violation(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            DomainError::validation("Amount must be greater than 0").to_string(),
            "Amount must be greater than 0"
        );
        assert_eq!(
            DomainError::not_found(Table::Budgets, "b1").to_string(),
            "budgets row 'b1' not found"
        );
        let storage: DomainError = anyhow::anyhow!("disk full").into();
        assert!(matches!(storage, DomainError::Storage(_)));
        assert_eq!(storage.to_string(), "disk full");
    }

    #[test]
    fn test_plain_insert_failure_stays_storage() {
        let error = DomainError::from_insert(anyhow::anyhow!("database is locked"), "Duplicate");
        assert!(matches!(error, DomainError::Storage(_)));
    }
}
