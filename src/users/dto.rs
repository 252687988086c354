use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::{Gender, User};

/// Keys a caller may change through `PATCH /users/me`.
pub const ALLOWED_UPDATES: [&str; 4] = ["firstName", "lastName", "password", "gender"];

/// Public part of the user returned to the client. Has no password hash,
/// token list or avatar bytes by construction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Gender,
    pub has_avatar: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            gender: u.gender,
            has_avatar: u.avatar.is_some(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        PublicUser::from(&u)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub gender: Option<Gender>,
}
