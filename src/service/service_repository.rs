use crate::error::Result;
use crate::listing::{coerce_page, coerce_price, escape_like, page_offset, split_skills};
use sqlx::PgPool;
use uuid::Uuid;

use super::service_dto::{
    CreateServiceRequest, ServiceListQuery, UpdatePricingRequest, SERVICE_PAGE_SIZE,
};
use super::service_models::{Service, ServicePricing, ServiceRecord, ServiceSort, ServiceStatus};

/// Normalized search filters for the service catalog. Price bounds are
/// matched as a range overlap against the pricing sub-record.
pub struct ServiceSearch {
    pub q: Option<String>,
    pub category: Option<String>,
    pub skills: Vec<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: ServiceSort,
    pub page: u32,
}

impl ServiceSearch {
    pub fn from_query(query: &ServiceListQuery) -> Self {
        Self {
            q: query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
            category: query.category.clone().filter(|c| !c.is_empty()),
            skills: split_skills(query.skills.as_deref()),
            min_price: coerce_price(query.min_price.as_deref()),
            max_price: coerce_price(query.max_price.as_deref()),
            sort: ServiceSort::from_param(query.sort_by.as_deref()),
            page: coerce_page(query.page.as_deref()),
        }
    }

    /// The ILIKE bind for the free-text filter: metacharacters escaped so
    /// `100%` matches the literal text, wrapped for substring matching.
    fn like_pattern(&self) -> Option<String> {
        self.q.as_deref().map(|q| format!("%{}%", escape_like(q)))
    }

    /// WHERE clause over the `services s JOIN service_pricing p` pair, plus
    /// the number of placeholders it consumes. A requested bound overlaps
    /// when the service's range reaches it from the other side.
    fn filter_sql(&self) -> (String, usize) {
        let mut clause = format!("WHERE s.status = '{}'", ServiceStatus::Available);
        let mut params = 0;

        if self.q.is_some() {
            params += 1;
            clause.push_str(&format!(
                " AND (s.title ILIKE ${0} OR s.description ILIKE ${0})",
                params
            ));
        }
        if self.category.is_some() {
            params += 1;
            clause.push_str(&format!(" AND s.category = ${}", params));
        }
        if !self.skills.is_empty() {
            params += 1;
            clause.push_str(&format!(" AND s.skills && ${}", params));
        }
        if self.min_price.is_some() {
            params += 1;
            clause.push_str(&format!(" AND p.max_price >= ${}", params));
        }
        if self.max_price.is_some() {
            params += 1;
            clause.push_str(&format!(" AND p.min_price <= ${}", params));
        }

        (clause, params)
    }
}

const SEARCH_COLUMNS: &str = "s.id, s.freelancer_id, s.title, s.description, s.category, \
     s.skills, s.status, s.likes_count, s.rating_avg, s.rating_count, \
     s.created_at, s.updated_at, p.min_price, p.max_price, p.delivery_days";

#[derive(Clone)]
pub struct ServiceRepository {
    pool: PgPool,
}

impl ServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn search(&self, search: &ServiceSearch) -> Result<(Vec<ServiceRecord>, i64)> {
        let (where_clause, params) = search.filter_sql();

        let count_sql = format!(
            "SELECT COUNT(*) FROM services s \
             JOIN service_pricing p ON p.service_id = s.id {}",
            where_clause
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(pattern) = search.like_pattern() {
            count_query = count_query.bind(pattern);
        }
        if let Some(ref category) = search.category {
            count_query = count_query.bind(category);
        }
        if !search.skills.is_empty() {
            count_query = count_query.bind(&search.skills);
        }
        if let Some(min) = search.min_price {
            count_query = count_query.bind(min);
        }
        if let Some(max) = search.max_price {
            count_query = count_query.bind(max);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let page_sql = format!(
            "SELECT {} FROM services s \
             JOIN service_pricing p ON p.service_id = s.id {} \
             ORDER BY {} LIMIT ${} OFFSET ${}",
            SEARCH_COLUMNS,
            where_clause,
            search.sort.order_by(),
            params + 1,
            params + 2,
        );
        let mut page_query = sqlx::query_as::<_, ServiceRecord>(&page_sql);
        if let Some(pattern) = search.like_pattern() {
            page_query = page_query.bind(pattern);
        }
        if let Some(ref category) = search.category {
            page_query = page_query.bind(category);
        }
        if !search.skills.is_empty() {
            page_query = page_query.bind(&search.skills);
        }
        if let Some(min) = search.min_price {
            page_query = page_query.bind(min);
        }
        if let Some(max) = search.max_price {
            page_query = page_query.bind(max);
        }
        let services = page_query
            .bind(SERVICE_PAGE_SIZE as i64)
            .bind(page_offset(search.page, SERVICE_PAGE_SIZE))
            .fetch_all(&self.pool)
            .await?;

        Ok((services, total))
    }

    /// Insert the service and its pricing row in one transaction. New
    /// services always start `available`; status is never taken from the
    /// caller.
    pub async fn create(
        &self,
        freelancer_id: Uuid,
        payload: &CreateServiceRequest,
    ) -> Result<(Service, ServicePricing)> {
        let mut tx = self.pool.begin().await?;

        let service = sqlx::query_as::<_, Service>(
            "INSERT INTO services (freelancer_id, title, description, category, skills)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(freelancer_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.category)
        .bind(&payload.skills)
        .fetch_one(&mut *tx)
        .await?;

        let pricing = sqlx::query_as::<_, ServicePricing>(
            "INSERT INTO service_pricing (service_id, min_price, max_price, delivery_days)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(service.id)
        .bind(payload.pricing.min_price)
        .bind(payload.pricing.max_price)
        .bind(payload.pricing.delivery_days)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((service, pricing))
    }

    /// Ownership-scoped partial update of the service and, when given, its
    /// pricing row, in one transaction. `None` means the row vanished or the
    /// caller does not own it.
    pub async fn update(
        &self,
        id: Uuid,
        freelancer_id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        category: Option<&str>,
        skills: Option<&[String]>,
        status: Option<&str>,
        pricing: Option<&UpdatePricingRequest>,
    ) -> Result<Option<(Service, ServicePricing)>> {
        let mut tx = self.pool.begin().await?;

        let service = sqlx::query_as::<_, Service>(
            "UPDATE services SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                category = COALESCE($3, category),
                skills = COALESCE($4, skills),
                status = COALESCE($5, status),
                updated_at = NOW()
             WHERE id = $6 AND freelancer_id = $7
             RETURNING *",
        )
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(skills)
        .bind(status)
        .bind(id)
        .bind(freelancer_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(service) = service else {
            return Ok(None);
        };

        let pricing = match pricing {
            Some(p) => {
                sqlx::query_as::<_, ServicePricing>(
                    "UPDATE service_pricing SET
                        min_price = COALESCE($1, min_price),
                        max_price = COALESCE($2, max_price),
                        delivery_days = COALESCE($3, delivery_days),
                        updated_at = NOW()
                     WHERE service_id = $4
                     RETURNING *",
                )
                .bind(p.min_price)
                .bind(p.max_price)
                .bind(p.delivery_days)
                .bind(service.id)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, ServicePricing>(
                    "SELECT * FROM service_pricing WHERE service_id = $1",
                )
                .bind(service.id)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        Ok(Some((service, pricing)))
    }

    /// Hard delete; the pricing row goes with it via the store's cascade.
    pub async fn delete(&self, id: Uuid, freelancer_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1 AND freelancer_id = $2")
            .bind(id)
            .bind(freelancer_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_search() -> ServiceSearch {
        ServiceSearch {
            q: None,
            category: None,
            skills: vec![],
            min_price: None,
            max_price: None,
            sort: ServiceSort::Newest,
            page: 1,
        }
    }

    #[test]
    fn bare_search_only_constrains_status() {
        let (clause, params) = empty_search().filter_sql();
        assert_eq!(clause, "WHERE s.status = 'available'");
        assert_eq!(params, 0);
    }

    #[test]
    fn price_bounds_test_range_overlap_not_equality() {
        let search = ServiceSearch {
            min_price: Some(10.0),
            max_price: Some(100.0),
            ..empty_search()
        };
        let (clause, params) = search.filter_sql();
        // The service's maximum must reach the requested minimum and vice
        // versa; that is what makes a range overlap.
        assert_eq!(
            clause,
            "WHERE s.status = 'available' AND p.max_price >= $1 AND p.min_price <= $2"
        );
        assert_eq!(params, 2);
    }

    #[test]
    fn text_pattern_matches_wildcards_literally() {
        let search = ServiceSearch {
            q: Some("5% off_logos".into()),
            ..empty_search()
        };
        assert_eq!(search.like_pattern().as_deref(), Some("%5\\% off\\_logos%"));
    }

    #[test]
    fn placeholders_number_in_filter_order() {
        let search = ServiceSearch {
            q: Some("logo".into()),
            category: Some("Design".into()),
            skills: vec!["Figma".into()],
            min_price: Some(10.0),
            max_price: Some(100.0),
            sort: ServiceSort::Newest,
            page: 1,
        };
        let (clause, params) = search.filter_sql();
        assert_eq!(
            clause,
            "WHERE s.status = 'available' AND (s.title ILIKE $1 OR s.description ILIKE $1) \
             AND s.category = $2 AND s.skills && $3 AND p.max_price >= $4 AND p.min_price <= $5"
        );
        assert_eq!(params, 5);
    }

    #[test]
    fn from_query_applies_the_lenient_coercions() {
        let query = ServiceListQuery {
            q: None,
            category: Some("Design".into()),
            skills: Some("".into()),
            min_price: Some("9.5".into()),
            max_price: Some("oops".into()),
            sort_by: Some("most_proposals".into()),
            page: Some("3".into()),
        };
        let search = ServiceSearch::from_query(&query);
        assert_eq!(search.category.as_deref(), Some("Design"));
        assert!(search.skills.is_empty());
        assert_eq!(search.min_price, Some(9.5));
        assert_eq!(search.max_price, None);
        // `most_proposals` belongs to the jobs catalog; services clamp it.
        assert_eq!(search.sort, ServiceSort::Newest);
        assert_eq!(search.page, 3);
    }
}
