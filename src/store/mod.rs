/// Persistence seams
///
/// The session layer talks to storage only through these traits. Each call
/// must be atomic on its own: a dropped future leaves either no change or the
/// whole change.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::{RefreshTokenRecord, UserId};
use crate::error::StoreError;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// A user's stored login credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCredential {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `Conflict` if the email is taken
    async fn create_user(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserCredential, StoreError>;

    /// `NotFound` if no user has this email
    async fn find_by_email(&self, email: &str) -> Result<UserCredential, StoreError>;

    /// Replace a user's email and password hash. `NotFound` if the id is
    /// unknown, `Conflict` if another user already has the email.
    async fn update_user(
        &self,
        id: UserId,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserCredential, StoreError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persist an active token. `Conflict` if the value already exists.
    async fn create(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, StoreError>;

    /// `NotFound` if no record matches
    async fn lookup(&self, token: &str) -> Result<RefreshTokenRecord, StoreError>;

    /// Mark a token revoked at `at`. An already revoked token keeps its
    /// first timestamp. `NotFound` if no record matches.
    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<(), StoreError>;
}
