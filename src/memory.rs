//! In-process store used when no `DATABASE_URL` is configured and by tests.
//!
//! Users, session tokens and tutor profiles live behind one lock so that
//! deleting a user removes their profiles and tokens in the same step, the
//! way `ON DELETE CASCADE` does in Postgres.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::profiles::repo::ProfileRepo;
use crate::profiles::repo_types::{TutorProfile, TutorProfileDocument};
use crate::users::repo::UserRepo;
use crate::users::repo_types::{NewUser, User, UserChanges};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    tokens: HashMap<Uuid, Vec<String>>,
    profiles: HashMap<Uuid, TutorProfile>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create(&self, new: NewUser) -> Result<User, AppError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == new.email) {
            return Err(AppError::DuplicateEmail);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            password_hash: new.password_hash,
            gender: new.gender,
            avatar: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = changes.first_name {
            user.first_name = v;
        }
        if let Some(v) = changes.last_name {
            user.last_name = v;
        }
        if let Some(v) = changes.password_hash {
            user.password_hash = v;
        }
        if let Some(v) = changes.gender {
            user.gender = v;
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        match inner.users.get_mut(&id) {
            Some(user) => {
                user.avatar = avatar;
                user.updated_at = OffsetDateTime::now_utc();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let mut inner = self.inner.write().await;
        let removed = inner.users.remove(&id);
        if removed.is_some() {
            inner.tokens.remove(&id);
            inner.profiles.retain(|_, p| p.owner_id != id);
        }
        Ok(removed)
    }

    async fn add_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&user_id) {
            return Err(anyhow::anyhow!("add token for unknown user {user_id}").into());
        }
        inner
            .tokens
            .entry(user_id)
            .or_default()
            .push(token.to_string());
        Ok(())
    }

    async fn has_token(&self, user_id: Uuid, token: &str) -> Result<bool, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tokens
            .get(&user_id)
            .is_some_and(|list| list.iter().any(|t| t == token)))
    }

    async fn remove_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if let Some(list) = inner.tokens.get_mut(&user_id) {
            list.retain(|t| t != token);
        }
        Ok(())
    }

    async fn clear_tokens(&self, user_id: Uuid) -> Result<(), AppError> {
        self.inner.write().await.tokens.remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl ProfileRepo for MemoryStore {
    async fn create(
        &self,
        owner_id: Uuid,
        document: TutorProfileDocument,
    ) -> Result<TutorProfile, AppError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&owner_id) {
            return Err(anyhow::anyhow!("tutor profile owner {owner_id} does not exist").into());
        }
        let now = OffsetDateTime::now_utc();
        let profile = TutorProfile {
            id: Uuid::new_v4(),
            owner_id,
            document,
            created_at: now,
            updated_at: now,
        };
        inner.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TutorProfile>, AppError> {
        Ok(self.inner.read().await.profiles.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<TutorProfile>, AppError> {
        let inner = self.inner.read().await;
        let mut out: Vec<TutorProfile> = inner
            .profiles
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        out.sort_by_key(|p| p.created_at);
        Ok(out)
    }

    async fn replace(
        &self,
        id: Uuid,
        owner_id: Uuid,
        document: TutorProfileDocument,
    ) -> Result<Option<TutorProfile>, AppError> {
        let mut inner = self.inner.write().await;
        match inner.profiles.get_mut(&id) {
            Some(p) if p.owner_id == owner_id => {
                p.document = document;
                p.updated_at = OffsetDateTime::now_utc();
                Ok(Some(p.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        let owned = inner
            .profiles
            .get(&id)
            .is_some_and(|p| p.owner_id == owner_id);
        if owned {
            inner.profiles.remove(&id);
        }
        Ok(owned)
    }
}
