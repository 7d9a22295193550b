use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Result},
    middleware::AuthUser,
    state::AppState,
};

use super::{
    profile_dto::UpsertProfileRequest,
    profile_models::{Profile, ProfileResponse},
};

/// Get the authenticated caller's own profile
#[utoipa::path(
    get,
    path = "/api/profiles/me",
    tag = "profiles",
    responses(
        (status = 200, description = "Caller's profile", body = Profile),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Profile>> {
    let profile = state
        .profile_repository
        .find_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(profile))
}

/// Create or update the caller's profile
#[utoipa::path(
    put,
    path = "/api/profiles/me",
    tag = "profiles",
    request_body = UpsertProfileRequest,
    responses(
        (status = 200, description = "Profile saved", body = Profile),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpsertProfileRequest>,
) -> Result<Json<Profile>> {
    payload.validate()?;

    let profile = state
        .profile_repository
        .upsert(
            user_id,
            &payload.display_name,
            payload.avatar_url.as_deref(),
            payload.bio.as_deref(),
        )
        .await?;

    Ok(Json(profile))
}

/// Public view of a profile
#[utoipa::path(
    get,
    path = "/api/profiles/{id}",
    tag = "profiles",
    params(("id" = Uuid, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileResponse>> {
    let profile = state
        .profile_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(ProfileResponse::from(profile)))
}
