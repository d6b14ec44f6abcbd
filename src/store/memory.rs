use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::{RefreshTokenRecord, UserId};
use crate::error::StoreError;
use crate::store::{CredentialStore, RefreshTokenStore, UserCredential};

/// In-process store for tests and local runs.
///
/// Each operation holds the write lock for its whole critical section.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    users: Arc<RwLock<HashMap<String, UserCredential>>>,
    refresh_tokens: Arc<RwLock<HashMap<String, RefreshTokenRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of refresh token records, revoked ones included
    pub async fn refresh_token_count(&self) -> usize {
        self.refresh_tokens.read().await.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn create_user(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserCredential, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(StoreError::Conflict);
        }

        let now = Utc::now();
        let user = UserCredential {
            id: UserId::new(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            created_at: now,
            updated_at: now,
        };
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<UserCredential, StoreError> {
        self.users
            .read()
            .await
            .get(email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_user(
        &self,
        id: UserId,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserCredential, StoreError> {
        let mut users = self.users.write().await;
        let current_email = users
            .values()
            .find(|user| user.id == id)
            .map(|user| user.email.clone())
            .ok_or(StoreError::NotFound)?;
        if current_email != email && users.contains_key(email) {
            return Err(StoreError::Conflict);
        }

        let mut user = users.remove(&current_email).ok_or(StoreError::NotFound)?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    async fn create(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, StoreError> {
        let mut tokens = self.refresh_tokens.write().await;
        if tokens.contains_key(token) {
            return Err(StoreError::Conflict);
        }

        let record = RefreshTokenRecord {
            token: token.to_string(),
            user_id,
            created_at: Utc::now(),
            expires_at,
            revoked_at: None,
        };
        tokens.insert(token.to_string(), record.clone());
        Ok(record)
    }

    async fn lookup(&self, token: &str) -> Result<RefreshTokenRecord, StoreError> {
        self.refresh_tokens
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut tokens = self.refresh_tokens.write().await;
        let record = tokens.get_mut(token).ok_or(StoreError::NotFound)?;
        record.revoked_at.get_or_insert(at);
        Ok(())
    }
}
