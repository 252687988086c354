use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender")]
pub enum Gender {
    Male,
    Female,
    #[serde(rename = "Non-Binary")]
    #[sqlx(rename = "Non-Binary")]
    NonBinary,
}

/// User record in the database. Never serialized directly, see `PublicUser`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,             // lowercase, unique
    pub password_hash: String,     // Argon2 PHC string
    pub gender: Gender,
    pub avatar: Option<Vec<u8>>,   // 250x250 PNG
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields needed to insert a user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub gender: Gender,
}

/// Partial update of the self-editable user fields.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: Option<String>,
    pub gender: Option<Gender>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.password_hash.is_none()
            && self.gender.is_none()
    }
}
