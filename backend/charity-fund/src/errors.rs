//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Project {0} not found")]
    ProjectNotFound(i64),

    #[error("A project named {0:?} already exists")]
    DuplicateProjectName(String),

    #[error("Project {0} is closed and cannot be edited")]
    ProjectClosed(i64),

    #[error("New full amount {requested} is below the already invested {invested}")]
    FullAmountBelowInvested { requested: i64, invested: i64 },

    #[error("Project {0} has received funds and cannot be deleted")]
    ProjectHasInvestments(i64),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
