use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    /// Classify a driver error: unique violations become `Conflict`, everything else `Db`.
    pub fn from_db(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => ModelError::Conflict(detail),
            _ => ModelError::Db(err.to_string()),
        }
    }
}
