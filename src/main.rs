mod auth;
mod db;
mod email;
mod error;
mod validation;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{AuthService, TokenRepository, TokenService, UserRepository};
use email::EmailClient;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::refresh_handler,
        auth::handlers::logout_handler,
        auth::handlers::verify_email_handler,
        auth::handlers::me_handler,
    ),
    components(
        schemas(
            auth::models::Role,
            auth::models::UserResponse,
            auth::models::RegisterRequest,
            auth::models::RegisterResponse,
            auth::models::LoginRequest,
            auth::models::LoginResponse,
            auth::models::RefreshResponse,
            auth::models::MessageResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "auth", description = "Authentication and session-renewal endpoints")
    ),
    info(
        title = "Workzup Auth API",
        version = "1.0.0",
        description = "Authentication token service for the Workzup job board: \
            short-lived access tokens, rotating refresh tokens with reuse detection, \
            and email verification"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: Arc<AuthService>,
    /// Secure cookie flag; set only when APP_ENV=production
    pub cookie_secure: bool,
}

/// Liveness probe with a database round-trip
async fn health_check(State(state): State<AppState>) -> Result<Json<serde_json::Value>, StatusCode> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

/// Creates and configures the application router
///
/// Credential endpoints (register, login) sit behind a per-IP rate limiter;
/// refresh, logout, verify-email, and me do not, matching the coarse
/// route-layer limiting of the auth surface.
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let governor_conf = Box::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(10)
            .finish()
            .expect("invalid rate limiter configuration"),
    );

    let credential_routes = Router::new()
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .layer(GovernorLayer {
            config: Box::leak(governor_conf),
        });

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // API routes
        .merge(credential_routes)
        .route("/api/auth/refresh", post(auth::refresh_handler))
        .route("/api/auth/logout", post(auth::logout_handler))
        .route("/api/auth/verify-email", get(auth::verify_email_handler))
        .route("/api/auth/me", get(auth::me_handler))
        .route("/health", get(health_check))
        .layer(cors)
        .with_state(state)
}

/// Assemble the auth service from its parts
pub fn build_auth_service(
    pool: PgPool,
    access_secret: String,
    refresh_secret: String,
    email_client: EmailClient,
    client_url: String,
) -> AuthService {
    AuthService::new(
        UserRepository::new(pool.clone()),
        TokenRepository::new(pool),
        TokenService::new(access_secret, refresh_secret),
        email_client,
        client_url,
    )
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workzup_auth=info,tower_http=info".into()),
        )
        .with_target(false)
        .init();

    tracing::info!("Workzup Auth API - Starting...");

    // Required configuration
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let access_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let refresh_secret = std::env::var("JWT_REFRESH_SECRET").expect("JWT_REFRESH_SECRET must be set");
    let client_url = std::env::var("CLIENT_URL").expect("CLIENT_URL must be set");

    // Optional configuration with defaults
    let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
    let email_base_url =
        std::env::var("EMAIL_BASE_URL").unwrap_or_else(|_| "http://localhost:8025".to_string());
    let email_sender = std::env::var("EMAIL_SENDER")
        .unwrap_or_else(|_| "no-reply@workzup.example".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let email_client = EmailClient::new(email_base_url, email_sender);
    let auth_service = build_auth_service(
        db_pool.clone(),
        access_secret,
        refresh_secret,
        email_client,
        client_url,
    );

    let state = AppState {
        db: db_pool,
        auth: Arc::new(auth_service),
        cookie_secure: app_env == "production",
    };

    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Workzup Auth API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
mod tests;
