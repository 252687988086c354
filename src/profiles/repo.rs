use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::profiles::repo_types::{TutorProfile, TutorProfileDocument, TutorProfileRow};

/// Tutor profile documents keyed by owner. Rows disappear with their owner.
#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn create(
        &self,
        owner_id: Uuid,
        document: TutorProfileDocument,
    ) -> Result<TutorProfile, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TutorProfile>, AppError>;
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<TutorProfile>, AppError>;
    /// `None` when no profile with that id belongs to `owner_id`.
    async fn replace(
        &self,
        id: Uuid,
        owner_id: Uuid,
        document: TutorProfileDocument,
    ) -> Result<Option<TutorProfile>, AppError>;
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgProfileRepo {
    db: PgPool,
}

impl PgProfileRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileRepo for PgProfileRepo {
    async fn create(
        &self,
        owner_id: Uuid,
        document: TutorProfileDocument,
    ) -> Result<TutorProfile, AppError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, TutorProfileRow>(
            r#"
            INSERT INTO tutor_profiles (id, owner_id, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, owner_id, document, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(Json(document))
        .bind(now)
        .fetch_one(&self.db)
        .await
        .context("insert tutor profile")?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TutorProfile>, AppError> {
        let row = sqlx::query_as::<_, TutorProfileRow>(
            r#"
            SELECT id, owner_id, document, created_at, updated_at
              FROM tutor_profiles
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find tutor profile")?;
        Ok(row.map(Into::into))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<TutorProfile>, AppError> {
        let rows = sqlx::query_as::<_, TutorProfileRow>(
            r#"
            SELECT id, owner_id, document, created_at, updated_at
              FROM tutor_profiles
             WHERE owner_id = $1
             ORDER BY created_at ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await
        .context("list tutor profiles by owner")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn replace(
        &self,
        id: Uuid,
        owner_id: Uuid,
        document: TutorProfileDocument,
    ) -> Result<Option<TutorProfile>, AppError> {
        let row = sqlx::query_as::<_, TutorProfileRow>(
            r#"
            UPDATE tutor_profiles
               SET document = $3, updated_at = now()
             WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, document, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(Json(document))
        .fetch_optional(&self.db)
        .await
        .context("replace tutor profile")?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM tutor_profiles WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.db)
            .await
            .context("delete tutor profile")?;
        Ok(res.rows_affected() == 1)
    }
}
