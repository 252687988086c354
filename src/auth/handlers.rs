use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterRequest},
        extractors::{AuthUser, AUTH_COOKIE},
        password::{check_password, hash_password},
        services::{
            authenticate, is_valid_email, issue_session, revoke_all_sessions, revoke_session,
        },
    },
    error::{AppError, FieldError, JsonBody},
    state::AppState,
    users::repo_types::NewUser,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route("/users/logoutAll", post(logout_all))
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    if let Some(domain) = state.config.cookie_domain.clone() {
        cookie.set_domain(domain);
    }
    cookie
}

// Browsers only drop a cookie when path and domain match the one they hold.
fn expired_cookie(state: &AppState) -> Cookie<'static> {
    session_cookie(state, String::new())
}

fn require(field: &str, value: &str, errors: &mut Vec<FieldError>) {
    if value.is_empty() {
        errors.push(FieldError::new(field, "is required"));
    }
}

/// Normalizes a registration payload, reporting every broken rule at once.
fn prepare_new_user(payload: RegisterRequest) -> Result<(NewUser, String), AppError> {
    let first_name = payload.first_name.trim().to_string();
    let last_name = payload.last_name.trim().to_string();
    let email = payload.email.trim().to_lowercase();
    let plain = payload.password.trim().to_string();

    let mut errors = Vec::new();
    require("firstName", &first_name, &mut errors);
    require("lastName", &last_name, &mut errors);
    if !is_valid_email(&email) {
        errors.push(FieldError::new("email", "Invalid email"));
    }
    if let Err(e) = check_password(&plain) {
        errors.push(e);
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let user = NewUser {
        first_name,
        last_name,
        email,
        password_hash: String::new(),
        gender: payload.gender,
    };
    Ok((user, plain))
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    let (mut new_user, plain) = prepare_new_user(payload)?;

    if state.users.find_by_email(&new_user.email).await?.is_some() {
        return Err(AppError::DuplicateEmail);
    }
    new_user.password_hash = hash_password(&plain)?;

    let user = state.users.create(new_user).await?;
    let token = issue_session(&state, user.id).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(&state, token.clone())),
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let email = payload.email.trim().to_lowercase();
    let user = authenticate(&state, &email, payload.password.trim()).await?;
    let token = issue_session(&state, user.id).await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        jar.add(session_cookie(&state, token.clone())),
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: AuthUser,
) -> Result<CookieJar, AppError> {
    revoke_session(&state, auth.user.id, &auth.token).await?;
    info!("user logged out");
    Ok(jar.remove(expired_cookie(&state)))
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn logout_all(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: AuthUser,
) -> Result<CookieJar, AppError> {
    revoke_all_sessions(&state, auth.user.id).await?;
    info!("user logged out of all sessions");
    Ok(jar.remove(expired_cookie(&state)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::AppConfig;
    use crate::users::repo_types::Gender;

    fn state_with_domain(domain: Option<&str>) -> AppState {
        let mut config = AppConfig::for_tests();
        config.cookie_domain = domain.map(str::to_string);
        AppState::in_memory(Arc::new(config))
    }

    #[test]
    fn removal_cookie_matches_session_cookie_scope() {
        let state = state_with_domain(Some("example.com"));
        let set = session_cookie(&state, "tok".into());
        let cleared = expired_cookie(&state);
        assert_eq!(set.domain(), Some("example.com"));
        assert_eq!(cleared.domain(), set.domain());
        assert_eq!(cleared.path(), set.path());

        let state = state_with_domain(None);
        assert_eq!(expired_cookie(&state).domain(), None);
    }

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "  Ada ".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            password: password.into(),
            gender: Gender::Female,
        }
    }

    #[test]
    fn prepare_lowercases_and_trims() {
        let (user, plain) = prepare_new_user(request("  Ada@Example.COM ", " tutor123 ")).unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.first_name, "Ada");
        assert_eq!(plain, "tutor123");
    }

    #[test]
    fn prepare_reports_every_problem() {
        let err = prepare_new_user(RegisterRequest {
            first_name: " ".into(),
            ..request("not-an-email", "Password1")
        })
        .unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["firstName", "email", "password"]);
    }
}
