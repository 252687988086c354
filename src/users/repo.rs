use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::users::repo_types::{NewUser, User, UserChanges};

/// Credential store: user records plus each user's list of valid session tokens.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `DuplicateEmail` when the email is taken.
    async fn create(&self, new: NewUser) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError>;
    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<bool, AppError>;
    /// Removes the user together with their tutor profiles and tokens.
    async fn delete(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn add_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError>;
    async fn has_token(&self, user_id: Uuid, token: &str) -> Result<bool, AppError>;
    async fn remove_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError>;
    async fn clear_tokens(&self, user_id: Uuid) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, gender, avatar, created_at, updated_at";

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn create(&self, new: NewUser) -> Result<User, AppError> {
        let now = OffsetDateTime::now_utc();
        let res = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash, gender, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.gender)
        .bind(now)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AppError::DuplicateEmail)
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert user").into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET first_name    = COALESCE($2, first_name),
                   last_name     = COALESCE($3, last_name),
                   password_hash = COALESCE($4, password_hash),
                   gender        = COALESCE($5, gender),
                   updated_at    = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.password_hash)
        .bind(changes.gender)
        .fetch_optional(&self.db)
        .await
        .context("update user")?;
        Ok(user)
    }

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<bool, AppError> {
        let res = sqlx::query("UPDATE users SET avatar = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(avatar)
            .execute(&self.db)
            .await
            .context("set avatar")?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<User>, AppError> {
        // tutor_profiles and user_tokens rows go with it (ON DELETE CASCADE)
        let user = sqlx::query_as::<_, User>(&format!(
            "DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("delete user")?;
        Ok(user)
    }

    async fn add_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO user_tokens (user_id, token) VALUES ($1, $2)")
            .bind(user_id)
            .bind(token)
            .execute(&self.db)
            .await
            .context("insert session token")?;
        Ok(())
    }

    async fn has_token(&self, user_id: Uuid, token: &str) -> Result<bool, AppError> {
        let found: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM user_tokens WHERE user_id = $1 AND token = $2")
                .bind(user_id)
                .bind(token)
                .fetch_optional(&self.db)
                .await
                .context("lookup session token")?;
        Ok(found.is_some())
    }

    async fn remove_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_tokens WHERE user_id = $1 AND token = $2")
            .bind(user_id)
            .bind(token)
            .execute(&self.db)
            .await
            .context("delete session token")?;
        Ok(())
    }

    async fn clear_tokens(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("clear session tokens")?;
        Ok(())
    }
}
