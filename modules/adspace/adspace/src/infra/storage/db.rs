use sea_orm::{DbErr, SqlErr};

use crate::domain::error::DomainError;

/// Maps an insert failure, turning unique-key violations into `Conflict`.
pub(crate) fn insert_err(resource: &str, e: DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            DomainError::conflict(format!("{resource} already exists ({detail})"))
        }
        _ => DomainError::from(e),
    }
}
