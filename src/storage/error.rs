// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Storage errors.
//!
//! Driver errors are classified here so that the HTTP layer never has to
//! look at SQLSTATE codes.

use thiserror::Error;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// PostgreSQL SQLSTATE for `check_violation`.
const CHECK_VIOLATION: &str = "23514";
/// PostgreSQL SQLSTATE for `string_data_right_truncation`.
const STRING_TOO_LONG: &str = "22001";
/// PostgreSQL SQLSTATE for `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write (e.g. duplicate external id)
    #[error("Already exists: {0}")]
    Conflict(String),

    /// A foreign key or check constraint rejected the write
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// A value does not fit its column (too long, out of range)
    #[error("Invalid value: {0}")]
    Invalid(String),

    /// Any other driver, pool or transaction failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Embedded migrations failed to apply
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StorageError {
    /// Classify a driver error raised while running `operation`.
    pub fn from_sqlx(operation: &str, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return StorageError::Conflict(format!("{operation}: {}", db_err.message()));
                }
                Some(FOREIGN_KEY_VIOLATION) | Some(CHECK_VIOLATION) => {
                    return StorageError::Constraint(format!(
                        "{operation}: {}",
                        db_err.message()
                    ));
                }
                Some(STRING_TOO_LONG) | Some(NUMERIC_OUT_OF_RANGE) => {
                    return StorageError::Invalid(format!("{operation}: {}", db_err.message()));
                }
                _ => {}
            }
        }
        StorageError::Database(err)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_stay_opaque() {
        let err = StorageError::from_sqlx("insert user", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StorageError::Database(sqlx::Error::PoolTimedOut)));
    }

    #[test]
    fn invalid_value_display() {
        let err = StorageError::Invalid(
            "insert user: value too long for type character varying(255)".into(),
        );
        assert_eq!(
            err.to_string(),
            "Invalid value: insert user: value too long for type character varying(255)"
        );
    }

    #[test]
    fn display_includes_context() {
        let err = StorageError::Conflict("insert user: duplicate key".into());
        assert_eq!(err.to_string(), "Already exists: insert user: duplicate key");
    }
}
