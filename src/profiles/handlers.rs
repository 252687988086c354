use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::{AppError, JsonBody},
    profiles::{
        dto::TutorProfileRequest,
        repo_types::{TutorProfile, TutorProfileDocument},
        validation::prepare,
    },
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/tutor-profiles", post(create_profile))
        .route("/tutor-profiles/me", get(list_my_profiles))
        .route(
            "/tutor-profiles/:id",
            get(get_profile).put(replace_profile).delete(delete_profile),
        )
}

fn not_found() -> AppError {
    AppError::not_found("Tutor profile does not exist")
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| not_found())
}

fn validated(payload: TutorProfileRequest) -> Result<TutorProfileDocument, AppError> {
    prepare(payload).map_err(|e| {
        warn!(error = %e, "tutor profile rejected");
        e
    })
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn create_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<TutorProfileRequest>,
) -> Result<(StatusCode, Json<TutorProfile>), AppError> {
    let document = validated(payload)?;
    let profile = state.profiles.create(auth.user.id, document).await?;
    info!(profile_id = %profile.id, "tutor profile created");
    Ok((StatusCode::CREATED, Json(profile)))
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn list_my_profiles(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<TutorProfile>>, AppError> {
    Ok(Json(state.profiles.list_by_owner(auth.user.id).await?))
}

#[instrument(skip(state, _auth))]
pub async fn get_profile(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TutorProfile>, AppError> {
    let id = parse_id(&id)?;
    let profile = state.profiles.find_by_id(id).await?.ok_or_else(not_found)?;
    Ok(Json(profile))
}

/// Owner-only. Someone else's profile looks the same as a missing one.
#[instrument(skip(state, auth, payload), fields(user_id = %auth.user.id))]
pub async fn replace_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<TutorProfileRequest>,
) -> Result<Json<TutorProfile>, AppError> {
    let id = parse_id(&id)?;
    let document = validated(payload)?;
    let profile = state
        .profiles
        .replace(id, auth.user.id, document)
        .await?
        .ok_or_else(not_found)?;
    info!(profile_id = %profile.id, "tutor profile replaced");
    Ok(Json(profile))
}

#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn delete_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    if !state.profiles.delete(id, auth.user.id).await? {
        return Err(not_found());
    }
    info!(profile_id = %id, "tutor profile deleted");
    Ok(StatusCode::NO_CONTENT)
}
