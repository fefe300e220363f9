//! Error types for Hostgate

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TenantError {
    /// Malformed input, detected before any side effect
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Tenant id already taken, owner already has a tenant, hostname bound elsewhere
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(String),

    /// Never fatal to a rebind; surfaced for logging only
    #[error("Cache invalidation failed: {0}")]
    CacheInvalidation(String),
}

impl From<sqlx::Error> for TenantError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => TenantError::NotFound("Row not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // PostgreSQL unique violation
                if db_err.code().as_deref() == Some("23505") {
                    let what = db_err.constraint().unwrap_or("unique constraint").to_string();
                    return TenantError::Conflict(format!("Violates {}", what));
                }
                TenantError::Store(db_err.to_string())
            }
            _ => TenantError::Store(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: TenantError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, TenantError::NotFound(_)));
    }

    #[test]
    fn test_pool_errors_map_to_store() {
        let err: TenantError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, TenantError::Store(_)));
    }
}
