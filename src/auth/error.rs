//! Error type shared by the authentication core and the services built on it.

use thiserror::Error;

use crate::domain::ActiveState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Identity not found")]
    IdentityNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Identity is {0}")]
    IdentityInactive(ActiveState),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        if err.downcast_ref::<sea_orm::DbErr>().is_some() {
            return Self::Database(format!("{err:#}"));
        }
        Self::Internal(format!("{err:#}"))
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("Blocking task failed: {err}"))
    }
}

/// Returns true when `err` is a unique-constraint violation reported by the backend.
#[must_use]
pub fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_errors_map_to_database() {
        let err: AuthError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, AuthError::Database(ref m) if m.contains("boom")));
    }

    #[test]
    fn wrapped_db_errors_keep_their_kind() {
        let err = anyhow::Error::new(sea_orm::DbErr::Custom("boom".to_string()))
            .context("Failed to load user");
        assert!(matches!(AuthError::from(err), AuthError::Database(_)));

        let err = anyhow::anyhow!("something else");
        assert!(matches!(AuthError::from(err), AuthError::Internal(_)));
    }

    #[test]
    fn custom_db_error_is_not_a_unique_violation() {
        assert!(!is_unique_violation(&sea_orm::DbErr::Custom("x".to_string())));
    }
}
