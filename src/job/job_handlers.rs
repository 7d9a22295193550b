use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::{
    dto::SuccessResponse,
    error::{AppError, Result},
    listing::page_meta,
    middleware::AuthUser,
    state::AppState,
};

use super::{
    job_dto::{
        CreateJobRequest, DeleteJobQuery, JobListQuery, JobListResponse, UpdateJobRequest,
        JOB_PAGE_SIZE,
    },
    job_models::Job,
    job_repository::JobSearch,
};

/// Search open jobs
#[utoipa::path(
    get,
    path = "/api/jobs",
    params(JobListQuery),
    responses(
        (status = 200, description = "Page of matching jobs", body = JobListResponse),
        (status = 500, description = "Database error")
    ),
    tag = "jobs"
)]
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<JobListResponse>> {
    let search = JobSearch::from_query(&query);
    let (jobs, total) = state.job_repository.search(&search).await?;
    let (total_pages, has_more) = page_meta(total, search.page, JOB_PAGE_SIZE);

    Ok(Json(JobListResponse {
        jobs,
        total,
        page: search.page,
        total_pages,
        has_more,
    }))
}

/// Post a new job
#[utoipa::path(
    post,
    path = "/api/jobs",
    tag = "jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 200, description = "Created job", body = Job),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateJobRequest>,
) -> Result<Json<Job>> {
    let profile = state
        .profile_repository
        .find_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    payload.validate()?;

    let job = state
        .job_repository
        .create(
            profile.id,
            &payload.title,
            &payload.description,
            &payload.category,
            &payload.skills,
            payload.budget,
            payload.timeframe,
        )
        .await?;

    Ok(Json(job))
}

/// Update a job the caller owns
#[utoipa::path(
    put,
    path = "/api/jobs",
    tag = "jobs",
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Updated job", body = Job),
        (status = 400, description = "Missing jobId"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateJobRequest>,
) -> Result<Json<Job>> {
    let profile = state
        .profile_repository
        .find_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    payload.validate()?;

    let job_id = payload
        .job_id
        .ok_or_else(|| AppError::BadRequest("jobId is required".to_string()))?;

    // One ownership-scoped statement; a miss never says whether the job
    // exists at all.
    let job = state
        .job_repository
        .update(
            job_id,
            profile.id,
            payload.title.as_deref(),
            payload.description.as_deref(),
            payload.category.as_deref(),
            payload.skills.as_deref(),
            payload.budget,
            payload.timeframe,
            payload.status.as_deref(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    Ok(Json(job))
}

/// Delete a job the caller owns
#[utoipa::path(
    delete,
    path = "/api/jobs",
    tag = "jobs",
    params(DeleteJobQuery),
    responses(
        (status = 200, description = "Job deleted", body = SuccessResponse),
        (status = 400, description = "Missing jobId"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<DeleteJobQuery>,
) -> Result<Json<SuccessResponse>> {
    let profile = state
        .profile_repository
        .find_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let job_id = query
        .job_id
        .ok_or_else(|| AppError::BadRequest("jobId is required".to_string()))?;

    let rows_affected = state.job_repository.delete(job_id, profile.id).await?;
    if rows_affected == 0 {
        return Err(AppError::NotFound("Job not found".to_string()));
    }

    Ok(Json(SuccessResponse::ok()))
}
