use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::job_models::Job;

pub const JOB_PAGE_SIZE: u32 = 10;

/// Raw query string for `GET /api/jobs`. Numeric fields arrive as strings on
/// purpose: a malformed `page` or budget bound must degrade to its default
/// instead of failing the request.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    /// Comma-separated skill names, matched as an overlap.
    pub skills: Option<String>,
    pub min_budget: Option<String>,
    pub max_budget: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(range(min = 0.0))]
    pub budget: f64,
    pub timeframe: Option<NaiveDate>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub job_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    pub timeframe: Option<NaiveDate>,
    pub skills: Option<Vec<String>>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DeleteJobQuery {
    pub job_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
    pub total: i64,
    pub page: u32,
    pub total_pages: u32,
    pub has_more: bool,
}
