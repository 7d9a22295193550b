use crate::error::Result;
use crate::listing::{coerce_page, coerce_price, escape_like, page_offset, split_skills};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::job_dto::{JobListQuery, JOB_PAGE_SIZE};
use super::job_models::{Job, JobSort, JobStatus};

/// Normalized search filters, produced from the raw query string by the
/// lenient coercions in `listing`.
pub struct JobSearch {
    pub q: Option<String>,
    pub category: Option<String>,
    pub skills: Vec<String>,
    pub min_budget: Option<f64>,
    pub max_budget: Option<f64>,
    pub sort: JobSort,
    pub page: u32,
}

impl JobSearch {
    pub fn from_query(query: &JobListQuery) -> Self {
        Self {
            q: query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
            category: query.category.clone().filter(|c| !c.is_empty()),
            skills: split_skills(query.skills.as_deref()),
            min_budget: coerce_price(query.min_budget.as_deref()),
            max_budget: coerce_price(query.max_budget.as_deref()),
            sort: JobSort::from_param(query.sort_by.as_deref()),
            page: coerce_page(query.page.as_deref()),
        }
    }

    /// The ILIKE bind for the free-text filter: metacharacters escaped so
    /// `100%` matches the literal text, wrapped for substring matching.
    fn like_pattern(&self) -> Option<String> {
        self.q.as_deref().map(|q| format!("%{}%", escape_like(q)))
    }

    /// Conjunctive WHERE clause over the present filters, plus the number of
    /// placeholders it consumes. Only open jobs are ever searchable; a
    /// `min_budget > max_budget` pair is passed through as-is and simply
    /// matches nothing.
    fn filter_sql(&self) -> (String, usize) {
        let mut clause = format!("WHERE status = '{}'", JobStatus::Open);
        let mut params = 0;

        if self.q.is_some() {
            params += 1;
            clause.push_str(&format!(
                " AND (title ILIKE ${0} OR description ILIKE ${0})",
                params
            ));
        }
        if self.category.is_some() {
            params += 1;
            clause.push_str(&format!(" AND category = ${}", params));
        }
        if !self.skills.is_empty() {
            params += 1;
            clause.push_str(&format!(" AND skills && ${}", params));
        }
        if self.min_budget.is_some() {
            params += 1;
            clause.push_str(&format!(" AND budget >= ${}", params));
        }
        if self.max_budget.is_some() {
            params += 1;
            clause.push_str(&format!(" AND budget <= ${}", params));
        }

        (clause, params)
    }
}

#[derive(Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One count query plus one page query, both over the same filter.
    pub async fn search(&self, search: &JobSearch) -> Result<(Vec<Job>, i64)> {
        let (where_clause, params) = search.filter_sql();

        let count_sql = format!("SELECT COUNT(*) FROM jobs {}", where_clause);
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
        if let Some(min) = search.min_budget {
            count_query = count_query.bind(min);
        }
        if let Some(max) = search.max_budget {
            count_query = count_query.bind(max);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let page_sql = format!(
            "SELECT * FROM jobs {} ORDER BY {} LIMIT ${} OFFSET ${}",
            where_clause,
            search.sort.order_by(),
            params + 1,
            params + 2,
        );
        let mut page_query = sqlx::query_as::<_, Job>(&page_sql);
        if let Some(pattern) = search.like_pattern() {
            page_query = page_query.bind(pattern);
        }
        if let Some(ref category) = search.category {
            page_query = page_query.bind(category);
        }
        if !search.skills.is_empty() {
            page_query = page_query.bind(&search.skills);
        }
        if let Some(min) = search.min_budget {
            page_query = page_query.bind(min);
        }
        if let Some(max) = search.max_budget {
            page_query = page_query.bind(max);
        }
        let jobs = page_query
            .bind(JOB_PAGE_SIZE as i64)
            .bind(page_offset(search.page, JOB_PAGE_SIZE))
            .fetch_all(&self.pool)
            .await?;

        Ok((jobs, total))
    }

    pub async fn create(
        &self,
        client_id: Uuid,
        title: &str,
        description: &str,
        category: &str,
        skills: &[String],
        budget: f64,
        timeframe: Option<NaiveDate>,
    ) -> Result<Job> {
        // Status is never taken from the caller; new jobs always open.
        let job = sqlx::query_as::<_, Job>(
            "INSERT INTO jobs (client_id, title, description, category, skills, budget, timeframe)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(client_id)
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(skills)
        .bind(budget)
        .bind(timeframe)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    /// Ownership-scoped partial update. `None` means the row vanished or the
    /// caller does not own it; the two cases are indistinguishable on purpose.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        client_id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        category: Option<&str>,
        skills: Option<&[String]>,
        budget: Option<f64>,
        timeframe: Option<NaiveDate>,
        status: Option<&str>,
    ) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(
            "UPDATE jobs SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                category = COALESCE($3, category),
                skills = COALESCE($4, skills),
                budget = COALESCE($5, budget),
                timeframe = COALESCE($6, timeframe),
                status = COALESCE($7, status),
                updated_at = NOW()
             WHERE id = $8 AND client_id = $9
             RETURNING *",
        )
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(skills)
        .bind(budget)
        .bind(timeframe)
        .bind(status)
        .bind(id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn delete(&self, id: Uuid, client_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND client_id = $2")
            .bind(id)
            .bind(client_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_search() -> JobSearch {
        JobSearch {
            q: None,
            category: None,
            skills: vec![],
            min_budget: None,
            max_budget: None,
            sort: JobSort::Newest,
            page: 1,
        }
    }

    #[test]
    fn bare_search_only_constrains_status() {
        let (clause, params) = empty_search().filter_sql();
        assert_eq!(clause, "WHERE status = 'open'");
        assert_eq!(params, 0);
    }

    #[test]
    fn text_filter_reuses_one_placeholder_for_both_columns() {
        let search = JobSearch {
            q: Some("logo".into()),
            ..empty_search()
        };
        let (clause, params) = search.filter_sql();
        assert_eq!(
            clause,
            "WHERE status = 'open' AND (title ILIKE $1 OR description ILIKE $1)"
        );
        assert_eq!(params, 1);
    }

    #[test]
    fn text_pattern_matches_wildcards_literally() {
        let search = JobSearch {
            q: Some("100% remote".into()),
            ..empty_search()
        };
        assert_eq!(search.like_pattern().as_deref(), Some("%100\\% remote%"));

        let search = JobSearch {
            q: Some("snake_case".into()),
            ..empty_search()
        };
        assert_eq!(search.like_pattern().as_deref(), Some("%snake\\_case%"));

        assert_eq!(empty_search().like_pattern(), None);
    }

    #[test]
    fn placeholders_number_in_filter_order() {
        let search = JobSearch {
            q: Some("logo".into()),
            category: Some("Design".into()),
            skills: vec!["Illustrator".into()],
            min_budget: Some(5.0),
            max_budget: Some(500.0),
            sort: JobSort::Newest,
            page: 1,
        };
        let (clause, params) = search.filter_sql();
        assert_eq!(
            clause,
            "WHERE status = 'open' AND (title ILIKE $1 OR description ILIKE $1) \
             AND category = $2 AND skills && $3 AND budget >= $4 AND budget <= $5"
        );
        assert_eq!(params, 5);
    }

    #[test]
    fn skipped_filters_do_not_leave_placeholder_gaps() {
        let search = JobSearch {
            skills: vec!["Rust".into()],
            max_budget: Some(100.0),
            ..empty_search()
        };
        let (clause, params) = search.filter_sql();
        assert_eq!(
            clause,
            "WHERE status = 'open' AND skills && $1 AND budget <= $2"
        );
        assert_eq!(params, 2);
    }

    #[test]
    fn inverted_budget_bounds_pass_through_unrejected() {
        let search = JobSearch {
            min_budget: Some(10.0),
            max_budget: Some(5.0),
            ..empty_search()
        };
        let (clause, _) = search.filter_sql();
        assert!(clause.contains("budget >= $1"));
        assert!(clause.contains("budget <= $2"));
    }

    #[test]
    fn from_query_applies_the_lenient_coercions() {
        let query = JobListQuery {
            q: Some("  ".into()),
            category: Some(String::new()),
            skills: Some("Figma, ,Rust".into()),
            min_budget: Some("abc".into()),
            max_budget: Some("250".into()),
            sort_by: Some("price_high".into()),
            page: Some("-2".into()),
        };
        let search = JobSearch::from_query(&query);
        assert_eq!(search.q, None);
        assert_eq!(search.category, None);
        assert_eq!(search.skills, vec!["Figma", "Rust"]);
        assert_eq!(search.min_budget, None);
        assert_eq!(search.max_budget, Some(250.0));
        // `price_high` belongs to the services catalog; jobs clamp it.
        assert_eq!(search.sort, JobSort::Newest);
        assert_eq!(search.page, 1);
    }
}
