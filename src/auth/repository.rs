// Database repositories for users and refresh tokens

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::auth::error::AuthError;
use crate::auth::models::{RefreshToken, Role, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, is_email_verified, \
     verification_token_hash, verification_token_expires_at, created_at";

/// Hash a raw token with SHA-256 (hex-encoded)
///
/// Raw refresh and verification tokens are never persisted; a database
/// compromise alone must not yield usable tokens.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new unverified user with a pending verification token hash
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        verification_token_hash: &str,
        verification_expires_at: DateTime<Utc>,
    ) -> Result<User, AuthError> {
        let query = format!(
            "INSERT INTO users \
               (name, email, password_hash, role, verification_token_hash, verification_token_expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .bind(role)
            .bind(verification_token_hash)
            .bind(verification_expires_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AuthError::EmailAlreadyExists;
                    }
                }
                AuthError::DatabaseError(e.to_string())
            })?;

        Ok(user)
    }

    /// Find a user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AuthError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Confirm a pending email verification in one conditional update
    ///
    /// Matches the stored token hash only while unexpired and unconsumed,
    /// flips the verified flag, and clears the token columns. Returns the
    /// verified user's id, or None when no row matched.
    pub async fn confirm_email(&self, token_hash: &str) -> Result<Option<i32>, AuthError> {
        let user_id: Option<i32> = sqlx::query_scalar(
            "UPDATE users \
             SET is_email_verified = TRUE, \
                 verification_token_hash = NULL, \
                 verification_token_expires_at = NULL \
             WHERE verification_token_hash = $1 \
               AND verification_token_expires_at > NOW() \
               AND is_email_verified = FALSE \
             RETURNING id",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id)
    }
}

/// Token repository for refresh token operations
///
/// Rows are an append-only audit trail: revocation flips a flag, nothing is
/// deleted.
#[derive(Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a refresh token's SHA-256 hash with revoked = false
    pub async fn store_refresh_token(
        &self,
        user_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(hash_token(token))
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Look up a refresh token row by the raw token's hash
    ///
    /// Revoked rows are returned as well: the caller distinguishes "never
    /// existed" from "already rotated" to drive the reuse cascade.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, AuthError> {
        let row = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token_hash, revoked, expires_at, created_at \
             FROM refresh_tokens WHERE token_hash = $1",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Atomically revoke a token row if it is still active
    ///
    /// Returns true when this call performed the revocation. Two concurrent
    /// rotations of the same token race here; the conditional update
    /// guarantees exactly one of them wins.
    pub async fn revoke_if_active(&self, id: i32) -> Result<bool, AuthError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE id = $1 AND revoked = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Revoke the row matching a raw token, if any (logout path)
    pub async fn revoke_by_token(&self, token: &str) -> Result<bool, AuthError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE token_hash = $1 AND revoked = FALSE",
        )
        .bind(hash_token(token))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Revoke every token owned by a user (reuse-detected response)
    pub async fn revoke_all_for_user(&self, user_id: i32) -> Result<u64, AuthError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1 AND revoked = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_deterministic() {
        let token = "some.refresh.token";
        assert_eq!(hash_token(token), hash_token(token));
    }

    #[test]
    fn test_hash_token_is_sha256_hex() {
        let hash = hash_token("some.refresh.token");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(hash, "some.refresh.token");
    }

    #[test]
    fn test_distinct_tokens_hash_differently() {
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }
}
