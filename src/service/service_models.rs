use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Availability states of a service offering. Stored as plain text; search
/// only ever surfaces `available` services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Available,
    Paused,
    Closed,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStatus::Available => write!(f, "available"),
            ServiceStatus::Paused => write!(f, "paused"),
            ServiceStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Sort keys accepted by the service search. Kept separate from `JobSort`
/// so a job-side key sent here is just an unknown value and clamps to
/// `Newest` like any other garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceSort {
    Newest,
    PriceHigh,
    PriceLow,
    MostLiked,
    BestRated,
}

impl ServiceSort {
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some("price_high") => ServiceSort::PriceHigh,
            Some("price_low") => ServiceSort::PriceLow,
            Some("most_liked") => ServiceSort::MostLiked,
            Some("best_rated") => ServiceSort::BestRated,
            _ => ServiceSort::Newest,
        }
    }

    /// ORDER BY clause for the joined search query (`s` = services,
    /// `p` = service_pricing). Every variant ends with `s.id ASC` so
    /// pagination stays stable when the primary key ties.
    pub fn order_by(&self) -> &'static str {
        match self {
            ServiceSort::Newest => "s.created_at DESC, s.id ASC",
            ServiceSort::PriceHigh => "p.min_price DESC, s.id ASC",
            ServiceSort::PriceLow => "p.min_price ASC, s.id ASC",
            ServiceSort::MostLiked => "s.likes_count DESC, s.id ASC",
            ServiceSort::BestRated => "s.rating_avg DESC, s.id ASC",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub freelancer_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub skills: Vec<String>,
    pub status: String,
    pub likes_count: i32,
    pub rating_avg: f64,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The one pricing row each service owns; removed with the service by the
/// store's cascade.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePricing {
    pub id: Uuid,
    pub service_id: Uuid,
    pub min_price: f64,
    pub max_price: f64,
    pub delivery_days: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat shape of the search query's `services JOIN service_pricing` row.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRecord {
    pub id: Uuid,
    pub freelancer_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub skills: Vec<String>,
    pub status: String,
    pub likes_count: i32,
    pub rating_avg: f64,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub min_price: f64,
    pub max_price: f64,
    pub delivery_days: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_status_display() {
        assert_eq!(ServiceStatus::Available.to_string(), "available");
        assert_eq!(ServiceStatus::Paused.to_string(), "paused");
        assert_eq!(ServiceStatus::Closed.to_string(), "closed");
    }

    #[test]
    fn sort_param_clamps_unknown_values_to_newest() {
        assert_eq!(ServiceSort::from_param(None), ServiceSort::Newest);
        assert_eq!(ServiceSort::from_param(Some("newest")), ServiceSort::Newest);
        assert_eq!(
            ServiceSort::from_param(Some("price_high")),
            ServiceSort::PriceHigh
        );
        assert_eq!(
            ServiceSort::from_param(Some("price_low")),
            ServiceSort::PriceLow
        );
        assert_eq!(
            ServiceSort::from_param(Some("most_liked")),
            ServiceSort::MostLiked
        );
        assert_eq!(
            ServiceSort::from_param(Some("best_rated")),
            ServiceSort::BestRated
        );
        // Job-side keys mean nothing here and fall back to newest.
        assert_eq!(
            ServiceSort::from_param(Some("budget_high")),
            ServiceSort::Newest
        );
        assert_eq!(
            ServiceSort::from_param(Some("most_proposals")),
            ServiceSort::Newest
        );
    }

    #[test]
    fn every_order_by_carries_the_id_tie_break() {
        for sort in [
            ServiceSort::Newest,
            ServiceSort::PriceHigh,
            ServiceSort::PriceLow,
            ServiceSort::MostLiked,
            ServiceSort::BestRated,
        ] {
            assert!(sort.order_by().ends_with("s.id ASC"), "{:?}", sort);
        }
    }
}
