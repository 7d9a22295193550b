use crate::{
    error::Result,
    message::{
        message_dto::{
            ConversationSummary, JobSummary, LastMessageSummary, ParticipantSummary,
            ReadReceiptEntry,
        },
        message_models::{Message, MessageRead},
    },
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Flat row of the inbox query; counterparts are joined in afterwards.
#[derive(Debug, FromRow)]
struct ConversationRow {
    id: Uuid,
    updated_at: DateTime<Utc>,
    job_id: Option<Uuid>,
    job_title: Option<String>,
    last_message_id: Option<Uuid>,
    last_sender_id: Option<Uuid>,
    last_content: Option<String>,
    last_created_at: Option<DateTime<Utc>>,
    unread_count: i64,
}

#[derive(Debug, FromRow)]
struct ParticipantRow {
    conversation_id: Uuid,
    id: Uuid,
    display_name: String,
    avatar_url: Option<String>,
}

#[derive(Debug, FromRow)]
struct SenderRow {
    id: Uuid,
    display_name: String,
    avatar_url: Option<String>,
}

// Both CTEs are narrowed to the caller's conversations up front so the
// query scales with the caller's inbox, not the whole messages table.
const INBOX_SQL: &str = "WITH mine AS (
        SELECT conversation_id FROM conversation_participants
        WHERE profile_id = $1
    ),
    latest AS (
        SELECT DISTINCT ON (conversation_id)
            conversation_id, id, sender_id, content, created_at
        FROM messages
        WHERE conversation_id IN (SELECT conversation_id FROM mine)
        ORDER BY conversation_id, created_at DESC, id DESC
    ),
    unread AS (
        SELECT m.conversation_id, COUNT(*) AS unread_count
        FROM messages m
        WHERE m.conversation_id IN (SELECT conversation_id FROM mine)
          AND m.sender_id <> $1
          AND NOT EXISTS (
              SELECT 1 FROM message_reads r
              WHERE r.message_id = m.id AND r.profile_id = $1
          )
        GROUP BY m.conversation_id
    )
    SELECT
        c.id,
        c.updated_at,
        j.id AS job_id,
        j.title AS job_title,
        l.id AS last_message_id,
        l.sender_id AS last_sender_id,
        l.content AS last_content,
        l.created_at AS last_created_at,
        COALESCE(u.unread_count, 0) AS unread_count
    FROM conversations c
    JOIN mine ON mine.conversation_id = c.id
    LEFT JOIN jobs j ON j.id = c.job_id
    LEFT JOIN latest l ON l.conversation_id = c.id
    LEFT JOIN unread u ON u.conversation_id = c.id
    ORDER BY c.updated_at DESC";

#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every conversation the profile participates in, annotated with the
    /// counterparts' display data, the latest message, the attached job and
    /// the unread count: messages by others lacking this profile's receipt.
    /// Newest activity first.
    pub async fn find_conversations_for(
        &self,
        profile_id: Uuid,
    ) -> Result<Vec<ConversationSummary>> {
        let rows = sqlx::query_as::<_, ConversationRow>(INBOX_SQL)
            .bind(profile_id)
            .fetch_all(&self.pool)
            .await?;

        let conversation_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let participants = sqlx::query_as::<_, ParticipantRow>(
            "SELECT cp.conversation_id, p.id, p.display_name, p.avatar_url
             FROM conversation_participants cp
             JOIN profiles p ON p.id = cp.profile_id
             WHERE cp.conversation_id = ANY($1) AND cp.profile_id <> $2",
        )
        .bind(&conversation_ids)
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        let summaries = rows
            .into_iter()
            .map(|row| {
                let others = participants
                    .iter()
                    .filter(|p| p.conversation_id == row.id)
                    .map(|p| ParticipantSummary {
                        id: p.id,
                        display_name: p.display_name.clone(),
                        avatar_url: p.avatar_url.clone(),
                    })
                    .collect();

                let last_message = match (
                    row.last_message_id,
                    row.last_sender_id,
                    row.last_content,
                    row.last_created_at,
                ) {
                    (Some(id), Some(sender_id), Some(content), Some(created_at)) => {
                        Some(LastMessageSummary {
                            id,
                            sender_id,
                            content,
                            created_at,
                        })
                    }
                    _ => None,
                };

                let job = match (row.job_id, row.job_title) {
                    (Some(id), Some(title)) => Some(JobSummary { id, title }),
                    _ => None,
                };

                ConversationSummary {
                    id: row.id,
                    participants: others,
                    last_message,
                    job,
                    unread_count: row.unread_count,
                    updated_at: row.updated_at,
                }
            })
            .collect();

        Ok(summaries)
    }

    pub async fn is_participant(&self, conversation_id: Uuid, profile_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM conversation_participants
                WHERE conversation_id = $1 AND profile_id = $2
            )",
        )
        .bind(conversation_id)
        .bind(profile_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// The counterpart to notify: first participant whose id differs from
    /// the given one.
    pub async fn other_participant(
        &self,
        conversation_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Uuid>> {
        let other: Option<Uuid> = sqlx::query_scalar(
            "SELECT profile_id FROM conversation_participants
             WHERE conversation_id = $1 AND profile_id <> $2
             LIMIT 1",
        )
        .bind(conversation_id)
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(other)
    }

    /// New conversation with exactly {creator, recipient}, optionally hung
    /// off a job. The participant set never changes afterwards.
    pub async fn create_conversation(
        &self,
        creator_id: Uuid,
        recipient_id: Uuid,
        job_id: Option<Uuid>,
    ) -> Result<Uuid> {
        let mut tx = self.pool.begin().await?;

        let conversation_id: Uuid =
            sqlx::query_scalar("INSERT INTO conversations (job_id) VALUES ($1) RETURNING id")
                .bind(job_id)
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query(
            "INSERT INTO conversation_participants (conversation_id, profile_id)
             VALUES ($1, $2), ($1, $3)",
        )
        .bind(conversation_id)
        .bind(creator_id)
        .bind(recipient_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(conversation_id)
    }

    /// Insert the message, the sender's own read receipt and the bump of the
    /// conversation's `updated_at` in one transaction, so a sender never sees
    /// their own message as unread.
    pub async fn create_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
        attachments: &[String],
    ) -> Result<(Message, MessageRead)> {
        let mut tx = self.pool.begin().await?;

        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (conversation_id, sender_id, content, attachments)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .bind(attachments)
        .fetch_one(&mut *tx)
        .await?;

        let self_receipt = sqlx::query_as::<_, MessageRead>(
            "INSERT INTO message_reads (message_id, profile_id)
             VALUES ($1, $2)
             RETURNING *",
        )
        .bind(message.id)
        .bind(sender_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE conversations SET updated_at = NOW() WHERE id = $1")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok((message, self_receipt))
    }

    /// Receipt every message by others that the profile has not read yet,
    /// returning the now-read ids. Re-running on a fully read conversation
    /// writes nothing and returns an empty list, which is what makes the
    /// operation idempotent.
    pub async fn mark_conversation_read(
        &self,
        conversation_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Vec<Uuid>> {
        let message_ids: Vec<Uuid> = sqlx::query_scalar(
            "INSERT INTO message_reads (message_id, profile_id)
             SELECT m.id, $2 FROM messages m
             WHERE m.conversation_id = $1
               AND m.sender_id <> $2
               AND NOT EXISTS (
                   SELECT 1 FROM message_reads r
                   WHERE r.message_id = m.id AND r.profile_id = $2
               )
             ON CONFLICT DO NOTHING
             RETURNING message_id",
        )
        .bind(conversation_id)
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(message_ids)
    }

    /// One page of a conversation's history, newest first, plus the total.
    pub async fn find_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Message>, i64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
                .bind(conversation_id)
                .fetch_one(&self.pool)
                .await?;

        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages
             WHERE conversation_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(conversation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((messages, total))
    }

    pub async fn find_receipts(&self, message_ids: &[Uuid]) -> Result<Vec<MessageRead>> {
        let receipts = sqlx::query_as::<_, MessageRead>(
            "SELECT * FROM message_reads WHERE message_id = ANY($1) ORDER BY read_at",
        )
        .bind(message_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(receipts)
    }

    /// Display summaries for a set of senders, for shaping history pages.
    pub async fn find_sender_summaries(
        &self,
        profile_ids: &[Uuid],
    ) -> Result<Vec<ParticipantSummary>> {
        let rows = sqlx::query_as::<_, SenderRow>(
            "SELECT id, display_name, avatar_url FROM profiles WHERE id = ANY($1)",
        )
        .bind(profile_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|p| ParticipantSummary {
                id: p.id,
                display_name: p.display_name,
                avatar_url: p.avatar_url,
            })
            .collect())
    }
}

impl From<&MessageRead> for ReadReceiptEntry {
    fn from(receipt: &MessageRead) -> Self {
        Self {
            profile_id: receipt.profile_id,
            read_at: receipt.read_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbox_ctes_are_scoped_to_the_callers_conversations() {
        let latest = INBOX_SQL
            .split("latest AS")
            .nth(1)
            .and_then(|s| s.split("unread AS").next())
            .unwrap();
        let unread = INBOX_SQL.split("unread AS").nth(1).unwrap();

        for cte in [latest, unread] {
            assert!(
                cte.contains("conversation_id IN (SELECT conversation_id FROM mine)"),
                "CTE scans messages outside the caller's conversations: {cte}"
            );
        }
    }
}
