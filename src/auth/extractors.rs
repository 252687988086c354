use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::services::verify_session;
use crate::error::AppError;
use crate::state::AppState;
use crate::users::repo_types::User;

pub const AUTH_COOKIE: &str = "auth_token";

/// The caller's user record and the exact token they presented.
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

fn presented_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(AUTH_COOKIE) {
        return Some(cookie.value().to_string());
    }

    // Fall back to "Bearer <token>"
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(|t| t.trim().to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = presented_token(parts)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthenticated)?;
        let user = verify_session(state, &token).await?;
        Ok(AuthUser { user, token })
    }
}
