use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{RefreshTokenRecord, UserId};
use crate::error::StoreError;
use crate::store::{CredentialStore, RefreshTokenStore, UserCredential};

/// Postgres-backed store. Every operation is a single statement.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    hashed_password: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserCredential {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id.into(),
            email: row.email,
            hashed_password: row.hashed_password,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    token: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<RefreshTokenRow> for RefreshTokenRecord {
    fn from(row: RefreshTokenRow) -> Self {
        Self {
            token: row.token,
            user_id: row.user_id.into(),
            created_at: row.created_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        }
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserCredential, StoreError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, hashed_password, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, email, hashed_password, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<UserCredential, StoreError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, email, hashed_password, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(UserCredential::from)
        .ok_or(StoreError::NotFound)
    }

    async fn update_user(
        &self,
        id: UserId,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserCredential, StoreError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET email = $1, hashed_password = $2, updated_at = $3
            WHERE id = $4
            RETURNING id, email, hashed_password, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(hashed_password)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .map(UserCredential::from)
        .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl RefreshTokenStore for PgStore {
    async fn create(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, StoreError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $3, $4, NULL)
            RETURNING token, user_id, created_at, expires_at, revoked_at
            "#,
        )
        .bind(token)
        .bind(user_id.as_uuid())
        .bind(now)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn lookup(&self, token: &str) -> Result<RefreshTokenRecord, StoreError> {
        sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT token, user_id, created_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .map(RefreshTokenRecord::from)
        .ok_or(StoreError::NotFound)
    }

    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, $1), updated_at = $1
            WHERE token = $2
            "#,
        )
        .bind(at)
        .bind(token)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
