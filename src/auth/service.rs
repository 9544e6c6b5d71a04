// Authentication service - business logic layer

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::auth::{
    error::AuthError,
    models::{RegisterRequest, Role, UserResponse},
    password::PasswordService,
    repository::{hash_token, TokenRepository, UserRepository},
    token::{generate_verification_token, TokenPair, TokenService},
};
use crate::email::EmailClient;

/// Verification links expire after 24 hours
const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;

/// Authentication service coordinating credential checks, token issuance,
/// and the refresh-token rotation state machine
pub struct AuthService {
    user_repo: UserRepository,
    token_repo: TokenRepository,
    token_service: TokenService,
    email_client: EmailClient,
    client_url: String,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        token_repo: TokenRepository,
        token_service: TokenService,
        email_client: EmailClient,
        client_url: String,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            token_service,
            email_client,
            client_url,
        }
    }

    /// Register a new user
    ///
    /// Creates the account unverified and sends the verification link
    /// fire-and-forget: the send is spawned, failures are logged only, and
    /// registration succeeds regardless. No tokens are issued here.
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserResponse, AuthError> {
        let password_hash = PasswordService::hash_password(&request.password)?;
        let role = request.role.unwrap_or(Role::Jobseeker);

        let raw_verification_token = generate_verification_token();
        let verification_expires_at = Utc::now() + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS);

        let user = self
            .user_repo
            .create_user(
                &request.name,
                &request.email,
                &password_hash,
                role,
                &hash_token(&raw_verification_token),
                verification_expires_at,
            )
            .await?;

        let verification_link = format!(
            "{}/verify-email?token={}",
            self.client_url, raw_verification_token
        );
        let email_client = self.email_client.clone();
        let recipient = user.email.clone();
        tokio::spawn(async move {
            if let Err(e) = email_client
                .send_verification_email(&recipient, &verification_link)
                .await
            {
                warn!("Verification email delivery failed for {}: {}", recipient, e);
            }
        });

        info!("Registered user {} as {}", user.id, user.role);
        Ok(UserResponse::from(user))
    }

    /// Login a user
    ///
    /// Unknown email and wrong password return the same error. The
    /// email-verification gate is checked only after the password matches,
    /// so the 403 never leaks whether an email exists to a caller who does
    /// not hold the password.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(TokenPair, UserResponse), AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !PasswordService::verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_email_verified {
            return Err(AuthError::EmailNotVerified);
        }

        let tokens = self.token_service.generate_token_pair(user.id, user.role)?;
        self.token_repo
            .store_refresh_token(user.id, &tokens.refresh_token, tokens.refresh_expires_at)
            .await?;

        info!("User {} logged in", user.id);
        Ok((tokens, UserResponse::from(user)))
    }

    /// Rotate a refresh token
    ///
    /// The lineage state machine: a presented token must be the current
    /// live token of its family. A token that verifies cryptographically
    /// but is unknown to the store, or known-but-revoked, is treated as
    /// replayed; a revoked match triggers family-wide revocation, on the
    /// theory that reuse means theft. Revocation of the matched row is an
    /// atomic conditional update so two concurrent rotations of one token
    /// produce at most one successor.
    pub async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.token_service.validate_refresh_token(refresh_token)?;

        let row = match self.token_repo.find_by_token(refresh_token).await? {
            None => {
                // Signed with our secret but absent from the store: never
                // issued by this deployment, or from before a data reset.
                warn!("Refresh token for user {} not found in store", claims.sub);
                return Err(AuthError::RefreshTokenReused);
            }
            Some(row) if row.revoked => {
                let revoked = self.token_repo.revoke_all_for_user(row.user_id).await?;
                warn!(
                    "Revoked refresh token replayed for user {}; cascaded revocation of {} active tokens",
                    row.user_id, revoked
                );
                return Err(AuthError::RefreshTokenReused);
            }
            Some(row) => row,
        };

        if !self.token_repo.revoke_if_active(row.id).await? {
            // Lost the rotation race: a concurrent request already consumed
            // this token, which is indistinguishable from replay.
            let revoked = self.token_repo.revoke_all_for_user(row.user_id).await?;
            warn!(
                "Concurrent reuse of refresh token for user {}; cascaded revocation of {} active tokens",
                row.user_id, revoked
            );
            return Err(AuthError::RefreshTokenReused);
        }

        let user = self
            .user_repo
            .find_by_id(row.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let tokens = self.token_service.generate_token_pair(user.id, user.role)?;
        self.token_repo
            .store_refresh_token(user.id, &tokens.refresh_token, tokens.refresh_expires_at)
            .await?;

        debug!("Rotated refresh token for user {}", user.id);
        Ok(tokens)
    }

    /// Logout: revoke only the presented token's row
    ///
    /// Other sessions of the same user stay valid. A missing cookie is a
    /// no-op success so logout is idempotent.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AuthError> {
        if let Some(token) = refresh_token {
            if self.token_repo.revoke_by_token(token).await? {
                debug!("Refresh token revoked on logout");
            }
        }
        Ok(())
    }

    /// Consume an email-verification token
    pub async fn verify_email(&self, raw_token: &str) -> Result<(), AuthError> {
        let user_id = self
            .user_repo
            .confirm_email(&hash_token(raw_token))
            .await?
            .ok_or(AuthError::InvalidVerificationToken)?;

        info!("Email verified for user {}", user_id);
        Ok(())
    }

    /// Get current user information
    pub async fn current_user(&self, user_id: i32) -> Result<UserResponse, AuthError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserResponse::from(user))
    }
}
