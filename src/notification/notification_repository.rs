use super::notification_models::Notification;
use crate::error::Result;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        profile_id: Uuid,
        title: &str,
        body: &str,
        conversation_id: Option<Uuid>,
    ) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (profile_id, title, body, conversation_id)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(profile_id)
        .bind(title)
        .bind(body)
        .bind(conversation_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn find_all_for(&self, profile_id: Uuid) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE profile_id = $1 ORDER BY created_at DESC",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// `None` when the notification is absent or belongs to someone else;
    /// callers turn both into the same 404.
    pub async fn mark_as_read(&self, id: Uuid, profile_id: Uuid) -> Result<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = true
             WHERE id = $1 AND profile_id = $2
             RETURNING *",
        )
        .bind(id)
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }
}
