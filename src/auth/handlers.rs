// HTTP handlers for authentication endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{
        LoginRequest, LoginResponse, MessageResponse, RefreshResponse, RegisterRequest,
        RegisterResponse, UserResponse, VerifyEmailParams,
    },
};
use crate::error::ErrorResponse;
use crate::AppState;

/// Cookie carrying the refresh token between client and server
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Build the refresh-token cookie: HTTP-only, SameSite=Strict, 7-day
/// max-age, Secure outside development
fn build_refresh_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::days(7))
        .build()
}

fn clearing_cookie() -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE_NAME).path("/").build()
}

/// Register a new user
/// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered; verification email queued", body = RegisterResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    request.validate()?;

    let user = state.auth.register(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful. Please check your email to verify your account."
                .to_string(),
            user,
        }),
    ))
}

/// Login with email and password
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; refresh token set as HTTP-only cookie", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 403, description = "Email not verified", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AuthError> {
    let email = request.email.as_deref().unwrap_or_default();
    let password = request.password.as_deref().unwrap_or_default();
    let (tokens, user) = state.auth.login(email, password).await?;

    let jar = jar.add(build_refresh_cookie(
        tokens.refresh_token,
        state.cookie_secure,
    ));

    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            access_token: tokens.access_token,
            user,
        }),
    ))
}

/// Rotate the refresh token and mint a new access token
/// POST /api/auth/refresh
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Tokens rotated; new refresh cookie set", body = RefreshResponse),
        (status = 401, description = "No refresh token provided", body = ErrorResponse),
        (status = 403, description = "Invalid, expired, or reused refresh token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<RefreshResponse>), AuthError> {
    let refresh_token = jar
        .get(REFRESH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .ok_or(AuthError::MissingRefreshToken)?;

    let tokens = state.auth.rotate(&refresh_token).await?;

    let jar = jar.add(build_refresh_cookie(
        tokens.refresh_token,
        state.cookie_secure,
    ));

    Ok((
        jar,
        Json(RefreshResponse {
            access_token: tokens.access_token,
        }),
    ))
}

/// Revoke the presented refresh token and clear the cookie
/// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out (idempotent)", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AuthError> {
    let refresh_token = jar.get(REFRESH_COOKIE_NAME).map(|c| c.value().to_string());

    state.auth.logout(refresh_token.as_deref()).await?;

    let jar = jar.remove(clearing_cookie());

    Ok((
        jar,
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

/// Confirm an email address with the raw verification token
/// GET /api/auth/verify-email?token=...
#[utoipa::path(
    get,
    path = "/api/auth/verify-email",
    params(("token" = String, Query, description = "Raw verification token from the emailed link")),
    responses(
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 400, description = "Invalid or expired verification token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn verify_email_handler(
    State(state): State<AppState>,
    Query(params): Query<VerifyEmailParams>,
) -> Result<Json<MessageResponse>, AuthError> {
    state.auth.verify_email(&params.token).await?;

    Ok(Json(MessageResponse {
        message: "Email verified successfully".to_string(),
    }))
}

/// Current user profile (requires Bearer access token)
/// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated user's profile", body = UserResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, AuthError> {
    let profile = state.auth.current_user(user.user_id).await?;
    Ok(Json(profile))
}
