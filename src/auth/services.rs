use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{jwt::JwtKeys, password};
use crate::error::AppError;
use crate::state::AppState;
use crate::users::repo_types::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Unknown email and wrong password fail identically.
pub async fn authenticate(state: &AppState, email: &str, plain: &str) -> Result<User, AppError> {
    let user = state.users.find_by_email(email).await?;
    let stored = user.as_ref().map(|u| u.password_hash.as_str());
    let matched = password::verify_login(plain, stored)?;
    match user {
        Some(user) if matched => Ok(user),
        Some(user) => {
            warn!(email = %email, user_id = %user.id, "login invalid password");
            Err(AppError::InvalidCredentials)
        }
        None => {
            warn!(email = %email, "login unknown email");
            Err(AppError::InvalidCredentials)
        }
    }
}

/// Mints a token and appends it to the user's valid-token list.
pub async fn issue_session(state: &AppState, user_id: Uuid) -> Result<String, AppError> {
    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(user_id)?;
    state.users.add_token(user_id, &token).await?;
    debug!(user_id = %user_id, "session issued");
    Ok(token)
}

/// Resolves a presented token to its user. Any failure is `Unauthenticated`.
pub async fn verify_session(state: &AppState, token: &str) -> Result<User, AppError> {
    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify(token).map_err(|e| {
        debug!(error = %e, "token rejected");
        AppError::Unauthenticated
    })?;
    if !state.users.has_token(claims.sub, token).await? {
        debug!(user_id = %claims.sub, "token revoked");
        return Err(AppError::Unauthenticated);
    }
    state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or(AppError::Unauthenticated)
}

pub async fn revoke_session(state: &AppState, user_id: Uuid, token: &str) -> Result<(), AppError> {
    state.users.remove_token(user_id, token).await?;
    debug!(user_id = %user_id, "session revoked");
    Ok(())
}

pub async fn revoke_all_sessions(state: &AppState, user_id: Uuid) -> Result<(), AppError> {
    state.users.clear_tokens(user_id).await?;
    debug!(user_id = %user_id, "all sessions revoked");
    Ok(())
}
