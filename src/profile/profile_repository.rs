use crate::error::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::profile_models::Profile;

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    pub async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    pub async fn upsert(
        &self,
        user_id: Uuid,
        display_name: &str,
        avatar_url: Option<&str>,
        bio: Option<&str>,
    ) -> Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (user_id, display_name, avatar_url, bio)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                avatar_url = EXCLUDED.avatar_url,
                bio = EXCLUDED.bio,
                updated_at = NOW()
             RETURNING *",
        )
        .bind(user_id)
        .bind(display_name)
        .bind(avatar_url)
        .bind(bio)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }
}
