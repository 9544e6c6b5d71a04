// Authentication module
// Issues short-lived access tokens and long-lived rotating refresh tokens,
// detects refresh-token reuse, and cascade-revokes compromised families

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{
    login_handler, logout_handler, me_handler, refresh_handler, register_handler,
    verify_email_handler, REFRESH_COOKIE_NAME,
};
pub use middleware::AuthenticatedUser;
pub use models::{
    LoginRequest, LoginResponse, MessageResponse, RefreshResponse, RefreshToken, RegisterRequest,
    RegisterResponse, Role, User, UserResponse, VerifyEmailParams,
};
pub use repository::{TokenRepository, UserRepository};
pub use service::AuthService;
pub use token::TokenService;
