use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{extractors::AuthUser, password::hash_new_password},
    error::{AppError, FieldError, JsonBody},
    images::services::{check_avatar_filename, check_avatar_size, render_avatar, MAX_AVATAR_BYTES},
    state::AppState,
    users::{
        dto::{PublicUser, UpdateUserRequest, ALLOWED_UPDATES},
        repo_types::UserChanges,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me).patch(update_me).delete(delete_me))
        .route("/users/:id", get(get_user))
        .route("/users/:id/avatar", get(get_avatar))
}

pub fn avatar_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me/avatar", post(upload_avatar).delete(delete_avatar))
        // leave room for multipart framing so oversized files reach our own check
        .layer(DefaultBodyLimit::max(4 * MAX_AVATAR_BYTES))
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found("User does not exist"))
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn get_me(auth: AuthUser) -> Json<PublicUser> {
    Json(auth.user.into())
}

#[instrument(skip(state, _auth))]
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, AppError> {
    let id = parse_id(&id)?;
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User does not exist"))?;
    Ok(Json(user.into()))
}

/// Turns a whitelisted PATCH body into store changes. The whole body is
/// rejected if any key falls outside `ALLOWED_UPDATES`.
fn prepare_changes(body: Map<String, Value>) -> Result<UserChanges, AppError> {
    if !body.keys().all(|k| ALLOWED_UPDATES.contains(&k.as_str())) {
        return Err(AppError::InvalidUpdate);
    }
    let req: UpdateUserRequest = serde_json::from_value(Value::Object(body))
        .map_err(|e| AppError::invalid("body", e.to_string()))?;

    let mut errors = Vec::new();
    let mut changes = UserChanges {
        gender: req.gender,
        ..UserChanges::default()
    };
    for (field, value, slot) in [
        ("firstName", req.first_name, &mut changes.first_name),
        ("lastName", req.last_name, &mut changes.last_name),
    ] {
        if let Some(v) = value {
            let v = v.trim().to_string();
            if v.is_empty() {
                errors.push(FieldError::new(field, "is required"));
            } else {
                *slot = Some(v);
            }
        }
    }
    if let Some(plain) = req.password {
        match hash_new_password(plain.trim()) {
            Ok(hash) => changes.password_hash = Some(hash),
            Err(AppError::Validation(mut rejected)) => errors.append(&mut rejected),
            Err(e) => return Err(e),
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    Ok(changes)
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Json<PublicUser>, AppError> {
    let changes = prepare_changes(body).map_err(|e| {
        warn!(error = %e, "update rejected");
        e
    })?;
    if changes.is_empty() {
        return Ok(Json(auth.user.into()));
    }
    let user = state
        .users
        .update(auth.user.id, changes)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    info!("user updated");
    Ok(Json(user.into()))
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn delete_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = state
        .users
        .delete(auth.user.id)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    info!("user deleted with their tutor profiles");
    Ok(Json(user.into()))
}

/// Reads the `avatar` part, enforcing the extension and size limits while
/// streaming so oversized files are never fully buffered.
async fn read_avatar_field(mp: &mut Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(mut field) = mp.next_field().await? {
        if field.name() != Some("avatar") {
            continue;
        }
        check_avatar_filename(field.file_name().unwrap_or_default())?;

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            data.extend_from_slice(&chunk);
            check_avatar_size(data.len())?;
        }
        return Ok(data);
    }
    Err(AppError::invalid("avatar", "is required"))
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
    mut mp: Multipart,
) -> Result<(), AppError> {
    let raw = read_avatar_field(&mut mp).await.map_err(|e| {
        warn!(error = %e, "avatar upload rejected");
        e
    })?;
    let png = tokio::task::spawn_blocking(move || render_avatar(&raw))
        .await
        .map_err(|e| anyhow::anyhow!(e).context("avatar resize task"))??;

    state.users.set_avatar(auth.user.id, Some(png)).await?;
    info!("avatar uploaded");
    Ok(())
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn delete_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<(), AppError> {
    state.users.set_avatar(auth.user.id, None).await?;
    info!("avatar removed");
    Ok(())
}

#[instrument(skip(state))]
pub async fn get_avatar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let missing = || AppError::not_found("Either user or the profile picture does not exist");
    let id = Uuid::parse_str(&id).map_err(|_| missing())?;
    let avatar = state
        .users
        .find_by_id(id)
        .await?
        .and_then(|u| u.avatar)
        .ok_or_else(missing)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], avatar))
}
