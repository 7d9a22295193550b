use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle states a job moves through. Stored as plain text; search only
/// ever surfaces `open` jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Open => write!(f, "open"),
            JobStatus::InProgress => write!(f, "in_progress"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Sort keys accepted by the job search. Deliberately a separate enum from
/// the service sort: the two listings expose different keys and an unknown
/// value clamps to `Newest` instead of being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSort {
    Newest,
    BudgetHigh,
    BudgetLow,
    MostProposals,
}

impl JobSort {
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some("budget_high") => JobSort::BudgetHigh,
            Some("budget_low") => JobSort::BudgetLow,
            Some("most_proposals") => JobSort::MostProposals,
            _ => JobSort::Newest,
        }
    }

    /// ORDER BY clause for this key. Every variant ends with `id ASC` so
    /// pagination stays stable when the primary key ties.
    pub fn order_by(&self) -> &'static str {
        match self {
            JobSort::Newest => "created_at DESC, id ASC",
            JobSort::BudgetHigh => "budget DESC, id ASC",
            JobSort::BudgetLow => "budget ASC, id ASC",
            JobSort::MostProposals => "proposals_count DESC, id ASC",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub skills: Vec<String>,
    pub budget: f64,
    pub timeframe: Option<NaiveDate>,
    pub status: String,
    pub proposals_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_status_display() {
        assert_eq!(JobStatus::Open.to_string(), "open");
        assert_eq!(JobStatus::InProgress.to_string(), "in_progress");
        assert_eq!(JobStatus::Completed.to_string(), "completed");
        assert_eq!(JobStatus::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn sort_param_clamps_unknown_values_to_newest() {
        assert_eq!(JobSort::from_param(None), JobSort::Newest);
        assert_eq!(JobSort::from_param(Some("newest")), JobSort::Newest);
        assert_eq!(JobSort::from_param(Some("budget_high")), JobSort::BudgetHigh);
        assert_eq!(JobSort::from_param(Some("budget_low")), JobSort::BudgetLow);
        assert_eq!(
            JobSort::from_param(Some("most_proposals")),
            JobSort::MostProposals
        );
        // A service-side key means nothing here and falls back to newest.
        assert_eq!(JobSort::from_param(Some("best_rated")), JobSort::Newest);
        assert_eq!(JobSort::from_param(Some("price_high")), JobSort::Newest);
    }

    #[test]
    fn every_order_by_carries_the_id_tie_break() {
        for sort in [
            JobSort::Newest,
            JobSort::BudgetHigh,
            JobSort::BudgetLow,
            JobSort::MostProposals,
        ] {
            assert!(sort.order_by().ends_with("id ASC"), "{:?}", sort);
        }
    }
}
