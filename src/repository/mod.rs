//! Database repository layer

pub mod catalog_repo;
pub mod memory;
pub mod user_repo;

pub use catalog_repo::CatalogRepository;
pub use memory::InMemoryCredentialStore;
pub use user_repo::{CredentialStore, UserRepository};

use crate::error::AppError;

/// Map unique / foreign-key violations to a domain error, everything else
/// stays a database error.
pub(crate) fn map_constraint_error(e: sqlx::Error, conflict_message: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
        {
            tracing::debug!(constraint = ?db_err.constraint(), "Constraint violation");
            AppError::Conflict(conflict_message.to_string())
        }
        _ => AppError::Database(e),
    }
}

/// Escape LIKE wildcards so user input matches literally
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("sepatu"), "sepatu");
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
    }

    #[test]
    fn test_non_constraint_errors_stay_database() {
        assert!(matches!(
            map_constraint_error(sqlx::Error::RowNotFound, "dup"),
            AppError::Database(_)
        ));
    }
}
