//! Authentication — resolves bearer tokens to users and re-checks sessions
//! before long-running work.

pub mod postgres;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::errors::AppError;
use crate::models::user::AuthUser;
use crate::state::AppState;

pub use postgres::PgSessionAuth;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolves a bearer token. Unknown or expired tokens yield `AppError::Unauthorized`.
    async fn authenticate(&self, token: &str) -> Result<AuthUser, AppError>;

    /// Whether the user's session is still valid right now.
    async fn ensure_valid_session(&self, user: &AuthUser) -> Result<bool, AppError>;
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        state.auth.authenticate(token).await
    }
}
