use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::service_models::{Service, ServicePricing, ServiceRecord};

pub const SERVICE_PAGE_SIZE: u32 = 12;

/// Raw query string for `GET /api/services`. Numeric fields arrive as
/// strings on purpose: a malformed `page` or price bound must degrade to its
/// default instead of failing the request.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    /// Comma-separated skill names, matched as an overlap.
    pub skills: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
    #[validate(range(min = 0.0))]
    pub min_price: f64,
    #[validate(range(min = 0.0))]
    pub max_price: f64,
    #[validate(range(min = 1))]
    pub delivery_days: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePricingRequest {
    #[validate(range(min = 0.0))]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_price: Option<f64>,
    #[validate(range(min = 1))]
    pub delivery_days: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[validate(nested)]
    pub pricing: PricingRequest,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    pub service_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub skills: Option<Vec<String>>,
    pub status: Option<String>,
    #[validate(nested)]
    pub pricing: Option<UpdatePricingRequest>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DeleteServiceQuery {
    pub service_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingResponse {
    pub min_price: f64,
    pub max_price: f64,
    pub delivery_days: Option<i32>,
}

/// A service with its pricing nested, the shape every service endpoint
/// returns.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
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
    pub pricing: PricingResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ServiceRecord> for ServiceResponse {
    fn from(record: ServiceRecord) -> Self {
        Self {
            id: record.id,
            freelancer_id: record.freelancer_id,
            title: record.title,
            description: record.description,
            category: record.category,
            skills: record.skills,
            status: record.status,
            likes_count: record.likes_count,
            rating_avg: record.rating_avg,
            rating_count: record.rating_count,
            pricing: PricingResponse {
                min_price: record.min_price,
                max_price: record.max_price,
                delivery_days: record.delivery_days,
            },
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl ServiceResponse {
    pub fn from_parts(service: Service, pricing: ServicePricing) -> Self {
        Self {
            id: service.id,
            freelancer_id: service.freelancer_id,
            title: service.title,
            description: service.description,
            category: service.category,
            skills: service.skills,
            status: service.status,
            likes_count: service.likes_count,
            rating_avg: service.rating_avg,
            rating_count: service.rating_count,
            pricing: PricingResponse {
                min_price: pricing.min_price,
                max_price: pricing.max_price,
                delivery_days: pricing.delivery_days,
            },
            created_at: service.created_at,
            updated_at: service.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListResponse {
    pub services: Vec<ServiceResponse>,
    pub total: i64,
    pub page: u32,
    pub total_pages: u32,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ServiceRecord {
        ServiceRecord {
            id: Uuid::new_v4(),
            freelancer_id: Uuid::new_v4(),
            title: "Brand kit".into(),
            description: "Logo, colors, type".into(),
            category: "Design".into(),
            skills: vec!["Illustrator".into()],
            status: "available".into(),
            likes_count: 3,
            rating_avg: 4.5,
            rating_count: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            min_price: 50.0,
            max_price: 200.0,
            delivery_days: Some(7),
        }
    }

    #[test]
    fn record_flattens_into_nested_pricing() {
        let record = sample_record();
        let response = ServiceResponse::from(record.clone());
        assert_eq!(response.id, record.id);
        assert_eq!(response.pricing.min_price, 50.0);
        assert_eq!(response.pricing.max_price, 200.0);
        assert_eq!(response.pricing.delivery_days, Some(7));
    }

    #[test]
    fn list_response_uses_camel_case_keys() {
        let response = ServiceListResponse {
            services: vec![sample_record().into()],
            total: 1,
            page: 1,
            total_pages: 1,
            has_more: false,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("totalPages").is_some());
        assert!(json.get("hasMore").is_some());
        let first = &json["services"][0];
        assert!(first.get("freelancerId").is_some());
        assert!(first["pricing"].get("minPrice").is_some());
        assert!(first["pricing"].get("deliveryDays").is_some());
    }

    #[test]
    fn create_request_ignores_a_caller_supplied_status() {
        // Status is forced server-side; an extra field in the body is
        // dropped at the door rather than rejected.
        let body = serde_json::json!({
            "title": "Brand kit",
            "description": "Logo, colors, type",
            "category": "Design",
            "status": "closed",
            "pricing": { "minPrice": 50.0, "maxPrice": 200.0 }
        });
        let parsed: CreateServiceRequest = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.title, "Brand kit");
        assert!(parsed.skills.is_empty());
    }
}
