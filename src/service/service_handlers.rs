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
    service_dto::{
        CreateServiceRequest, DeleteServiceQuery, ServiceListQuery, ServiceListResponse,
        ServiceResponse, UpdateServiceRequest, SERVICE_PAGE_SIZE,
    },
    service_repository::ServiceSearch,
};

/// Search available services
#[utoipa::path(
    get,
    path = "/api/services",
    params(ServiceListQuery),
    responses(
        (status = 200, description = "Page of matching services", body = ServiceListResponse),
        (status = 500, description = "Database error")
    ),
    tag = "services"
)]
pub async fn search_services(
    State(state): State<AppState>,
    Query(query): Query<ServiceListQuery>,
) -> Result<Json<ServiceListResponse>> {
    let search = ServiceSearch::from_query(&query);
    let (records, total) = state.service_repository.search(&search).await?;
    let (total_pages, has_more) = page_meta(total, search.page, SERVICE_PAGE_SIZE);

    Ok(Json(ServiceListResponse {
        services: records.into_iter().map(ServiceResponse::from).collect(),
        total,
        page: search.page,
        total_pages,
        has_more,
    }))
}

/// Offer a new service
#[utoipa::path(
    post,
    path = "/api/services",
    tag = "services",
    request_body = CreateServiceRequest,
    responses(
        (status = 200, description = "Created service", body = ServiceResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_service(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<Json<ServiceResponse>> {
    let profile = state
        .profile_repository
        .find_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    payload.validate()?;

    let (service, pricing) = state.service_repository.create(profile.id, &payload).await?;

    Ok(Json(ServiceResponse::from_parts(service, pricing)))
}

/// Update a service the caller owns
#[utoipa::path(
    put,
    path = "/api/services",
    tag = "services",
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Updated service", body = ServiceResponse),
        (status = 400, description = "Missing serviceId"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Service not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_service(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateServiceRequest>,
) -> Result<Json<ServiceResponse>> {
    let profile = state
        .profile_repository
        .find_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    payload.validate()?;

    let service_id = payload
        .service_id
        .ok_or_else(|| AppError::BadRequest("serviceId is required".to_string()))?;

    let (service, pricing) = state
        .service_repository
        .update(
            service_id,
            profile.id,
            payload.title.as_deref(),
            payload.description.as_deref(),
            payload.category.as_deref(),
            payload.skills.as_deref(),
            payload.status.as_deref(),
            payload.pricing.as_ref(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    Ok(Json(ServiceResponse::from_parts(service, pricing)))
}

/// Delete a service the caller owns
#[utoipa::path(
    delete,
    path = "/api/services",
    tag = "services",
    params(DeleteServiceQuery),
    responses(
        (status = 200, description = "Service deleted", body = SuccessResponse),
        (status = 400, description = "Missing serviceId"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Service not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_service(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<DeleteServiceQuery>,
) -> Result<Json<SuccessResponse>> {
    let profile = state
        .profile_repository
        .find_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let service_id = query
        .service_id
        .ok_or_else(|| AppError::BadRequest("serviceId is required".to_string()))?;

    let rows_affected = state
        .service_repository
        .delete(service_id, profile.id)
        .await?;
    if rows_affected == 0 {
        return Err(AppError::NotFound("Service not found".to_string()));
    }

    Ok(Json(SuccessResponse::ok()))
}
