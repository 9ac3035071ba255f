pub mod budget_repository;
pub mod category_repository;
pub mod goal_repository;
pub mod settings_repository;
pub mod transaction_repository;

pub use budget_repository::BudgetRepository;
pub use category_repository::CategoryRepository;
pub use goal_repository::GoalRepository;
pub use settings_repository::SettingsRepository;
pub use transaction_repository::TransactionRepository;
