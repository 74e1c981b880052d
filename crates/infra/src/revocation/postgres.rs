//! Postgres-backed revocation registry.
//!
//! Reads the `token_revocations` table maintained by the issuance side:
//!
//! ```sql
//! CREATE TABLE token_revocations (
//!     token_id   TEXT PRIMARY KEY,
//!     revoked    BOOLEAN NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```
//!
//! A token id with no row is not revoked. Every lookup goes to the database;
//! nothing is cached, so a revocation is visible on the next request.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use gatehouse_auth::{RevocationError, RevocationRegistry};
use gatehouse_core::TokenId;

/// Postgres-backed [`RevocationRegistry`].
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is `Send + Sync`; one instance is
/// shared by every request.
///
/// ## Failure Mode
///
/// Any database error surfaces as [`RevocationError::Unavailable`], which
/// the verifier turns into a rejection (fail closed).
#[derive(Debug, Clone)]
pub struct PostgresRevocationRegistry {
    pool: Arc<PgPool>,
}

impl PostgresRevocationRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` and make sure the table exists.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        let registry = Self::new(pool);
        registry.ensure_schema().await?;
        Ok(registry)
    }

    /// Create `token_revocations` if it is missing (dev/test convenience).
    pub async fn ensure_schema(&self) -> Result<(), RevocationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS token_revocations (
                token_id   TEXT PRIMARY KEY,
                revoked    BOOLEAN NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    /// Record a revocation (issuance-side helper; the gateway never calls it).
    pub async fn revoke(&self, token_id: &TokenId) -> Result<(), RevocationError> {
        self.set_revoked(token_id, true).await
    }

    /// Clear a revocation by flipping the flag back.
    pub async fn reinstate(&self, token_id: &TokenId) -> Result<(), RevocationError> {
        self.set_revoked(token_id, false).await
    }

    async fn set_revoked(&self, token_id: &TokenId, revoked: bool) -> Result<(), RevocationError> {
        sqlx::query(
            r#"
            INSERT INTO token_revocations (token_id, revoked, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (token_id)
            DO UPDATE SET revoked = EXCLUDED.revoked, updated_at = now()
            "#,
        )
        .bind(token_id.as_str())
        .bind(revoked)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("set_revoked", e))?;

        tracing::info!(token_id = %token_id, revoked, "revocation record updated");
        Ok(())
    }
}

#[async_trait]
impl RevocationRegistry for PostgresRevocationRegistry {
    async fn is_revoked(&self, token_id: &TokenId) -> Result<bool, RevocationError> {
        let row = sqlx::query("SELECT revoked FROM token_revocations WHERE token_id = $1")
            .bind(token_id.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("is_revoked", e))?;

        match row {
            Some(row) => row
                .try_get::<bool, _>("revoked")
                .map_err(|e| map_sqlx_error("is_revoked", e)),
            None => Ok(false),
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RevocationError {
    let msg = match &err {
        sqlx::Error::Database(db_err) => {
            format!("database error in {}: {}", operation, db_err.message())
        }
        sqlx::Error::PoolTimedOut => format!("connection pool timed out in {}", operation),
        other => format!("{} failed: {}", operation, other),
    };
    tracing::error!(operation, error = %err, "revocation store error");
    RevocationError::Unavailable(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeouts_map_to_unavailable() {
        let err = map_sqlx_error("is_revoked", sqlx::Error::PoolTimedOut);
        assert_eq!(
            err,
            RevocationError::Unavailable("connection pool timed out in is_revoked".to_string())
        );
    }

    #[test]
    fn other_errors_name_the_operation() {
        let RevocationError::Unavailable(msg) = map_sqlx_error("set_revoked", sqlx::Error::RowNotFound);
        assert!(msg.starts_with("set_revoked failed"));
    }

    /// Runs only when `DATABASE_URL` points at a disposable Postgres.
    #[tokio::test]
    async fn revoke_and_reinstate_against_live_database() {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };
        let registry = PostgresRevocationRegistry::connect(&url).await.unwrap();
        let token_id = TokenId::generate();

        assert_eq!(registry.is_revoked(&token_id).await, Ok(false));
        registry.revoke(&token_id).await.unwrap();
        assert_eq!(registry.is_revoked(&token_id).await, Ok(true));
        registry.reinstate(&token_id).await.unwrap();
        assert_eq!(registry.is_revoked(&token_id).await, Ok(false));
    }
}
