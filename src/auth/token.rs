// JWT token generation and validation service
//
// Access and refresh tokens are signed with separate secrets so leaking
// one secret does not allow forging the other token type.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::auth::models::Role;

/// Access token claims: user identity plus role, short-lived
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: i32,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Refresh token claims: user identity only, long-lived
///
/// `jti` makes every refresh token unique even when two are minted for the
/// same user within the same second, so the SHA-256 hash stored for it is
/// unique as well.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: i32,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly minted access/refresh pair
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Decode and validate an access token against the given secret
///
/// Standalone so the request extractor can validate without constructing a
/// full TokenService.
pub fn decode_access_token(token: &str, secret: &str) -> Result<AccessClaims, AuthError> {
    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })
}

/// Generate a raw email-verification token (64 random alphanumeric chars)
///
/// The raw value goes into the verification link; only its SHA-256 hash is
/// persisted.
pub fn generate_verification_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Token service for JWT operations
pub struct TokenService {
    access_secret: String,
    refresh_secret: String,
    access_token_duration: i64,  // in seconds
    refresh_token_duration: i64, // in seconds
}

impl TokenService {
    /// Create a new TokenService with separate access and refresh secrets
    /// Access tokens expire in 15 minutes, refresh tokens in 7 days
    pub fn new(access_secret: String, refresh_secret: String) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_token_duration: 900,     // 15 minutes
            refresh_token_duration: 604800, // 7 days
        }
    }

    /// Generate an access token carrying user id and role
    pub fn generate_access_token(&self, user_id: i32, role: Role) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: user_id,
            role,
            iat: now,
            exp: now + self.access_token_duration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.access_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Generate a refresh token carrying only the user id
    ///
    /// Returns the signed token together with its expiry so the caller can
    /// persist the hash with a matching timestamp.
    pub fn generate_refresh_token(
        &self,
        user_id: i32,
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        let now = Utc::now().timestamp();
        let exp = now + self.refresh_token_duration;
        let claims = RefreshClaims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat: now,
            exp,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.refresh_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGenerationError(e.to_string()))?;

        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or_else(|| AuthError::TokenGenerationError("expiry out of range".to_string()))?;

        Ok((token, expires_at))
    }

    /// Validate an access token
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, AuthError> {
        decode_access_token(token, &self.access_secret)
    }

    /// Validate a refresh token's signature and expiry (stateless check;
    /// the store lookup for revocation happens separately)
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.refresh_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidRefreshToken)
    }

    /// Generate both access and refresh tokens
    pub fn generate_token_pair(&self, user_id: i32, role: Role) -> Result<TokenPair, AuthError> {
        let access_token = self.generate_access_token(user_id, role)?;
        let (refresh_token, refresh_expires_at) = self.generate_refresh_token(user_id)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            refresh_expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_token_service() -> TokenService {
        TokenService::new(
            "test_access_secret_for_testing".to_string(),
            "test_refresh_secret_for_testing".to_string(),
        )
    }

    #[test]
    fn test_access_token_expiration_is_15_minutes() {
        let service = test_token_service();
        let token = service.generate_access_token(1, Role::Jobseeker).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_refresh_token_expiration_is_7_days() {
        let service = test_token_service();
        let (token, expires_at) = service.generate_refresh_token(1).unwrap();
        let claims = service.validate_refresh_token(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 604800);
        assert_eq!(expires_at.timestamp(), claims.exp);
    }

    #[test]
    fn test_access_claims_contain_identity_and_role() {
        let service = test_token_service();
        let token = service.generate_access_token(42, Role::Recruiter).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Recruiter);
    }

    #[test]
    fn test_refresh_claims_carry_user_id_only() {
        let service = test_token_service();
        let (token, _) = service.generate_refresh_token(42).unwrap();
        let claims = service.validate_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, 42);
    }

    // Key separation: neither token type validates against the other secret
    #[test]
    fn test_access_token_rejected_as_refresh_token() {
        let service = test_token_service();
        let token = service.generate_access_token(1, Role::Jobseeker).unwrap();
        assert!(service.validate_refresh_token(&token).is_err());
    }

    #[test]
    fn test_refresh_token_rejected_as_access_token() {
        let service = test_token_service();
        let (token, _) = service.generate_refresh_token(1).unwrap();
        assert!(service.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_token_signature_verification() {
        let service1 = TokenService::new("secret1".to_string(), "rsecret1".to_string());
        let service2 = TokenService::new("secret2".to_string(), "rsecret2".to_string());

        let token = service1.generate_access_token(1, Role::Jobseeker).unwrap();
        assert!(service1.validate_access_token(&token).is_ok());
        assert!(service2.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_successive_refresh_tokens_are_distinct() {
        // jti must make same-second mints unique
        let service = test_token_service();
        let (t1, _) = service.generate_refresh_token(1).unwrap();
        let (t2, _) = service.generate_refresh_token(1).unwrap();
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_expired_access_token_reports_expiry() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let claims = AccessClaims {
            sub: 1,
            role: Role::Jobseeker,
            iat: Utc::now().timestamp() - 1000,
            exp: Utc::now().timestamp() - 500,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_access_secret_for_testing".as_bytes()),
        )
        .unwrap();

        let service = test_token_service();
        assert!(matches!(
            service.validate_access_token(&token),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = test_token_service();

        assert!(service.validate_access_token("").is_err());
        assert!(service.validate_access_token("not.a.token").is_err());
        assert!(service.validate_refresh_token("invalid_token_format").is_err());
    }

    #[test]
    fn test_verification_token_shape() {
        let token = generate_verification_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_alphanumeric()));
    }

    proptest! {
        #[test]
        fn prop_access_token_expiration(user_id in 1i32..1000000) {
            let service = test_token_service();
            let token = service.generate_access_token(user_id, Role::Jobseeker)?;
            let claims = service.validate_access_token(&token)?;

            prop_assert_eq!(claims.exp - claims.iat, 900);
        }

        #[test]
        fn prop_refresh_token_round_trips_identity(user_id in 1i32..1000000) {
            let service = test_token_service();
            let (token, _) = service.generate_refresh_token(user_id)?;
            let claims = service.validate_refresh_token(&token)?;

            prop_assert_eq!(claims.sub, user_id);
        }

        #[test]
        fn prop_malformed_tokens_rejected(malformed in "[a-zA-Z0-9]{10,50}") {
            let service = test_token_service();

            prop_assert!(service.validate_access_token(&malformed).is_err());
            prop_assert!(service.validate_refresh_token(&malformed).is_err());
        }
    }
}
