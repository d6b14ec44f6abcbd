//! `PgStore` against a real Postgres
//!
//! Each test creates its own database from `configuration.yaml` (or `APP__DATABASE__*`)
//! and runs the migrations into it. Tests are skipped when no server answers.

mod common;

use std::sync::Arc;

use chirpy::auth::{mint_refresh_token, UserId};
use chirpy::configuration::{get_configuration, DatabaseSettings};
use chirpy::error::{AppError, AuthError, StoreError};
use chirpy::session::SessionService;
use chirpy::store::{CredentialStore, PgStore, RefreshTokenStore};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

async fn configure_database(config: &DatabaseSettings) -> Option<PgPool> {
    let mut connection = match PgConnection::connect(&config.connection_string_without_db()).await {
        Ok(connection) => connection,
        Err(e) => {
            eprintln!("Postgres unavailable, skipping: {}", e);
            return None;
        }
    };
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");

    let pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate the database");

    Some(pool)
}

async fn spawn_store() -> Option<PgStore> {
    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = Uuid::new_v4().to_string();

    let pool = configure_database(&configuration.database).await?;
    Some(PgStore::new(pool))
}

/// Postgres keeps microseconds; sqlx truncates on the way in.
fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[tokio::test]
async fn create_user_returns_stored_columns() {
    let Some(store) = spawn_store().await else { return };

    let created = store
        .create_user("walt@breakingbad.com", "hash")
        .await
        .expect("Failed to create user");
    let found = store
        .find_by_email("walt@breakingbad.com")
        .await
        .expect("Failed to find user");

    assert_eq!(created, found);
    assert_eq!(found.email, "walt@breakingbad.com");
    assert_eq!(found.hashed_password, "hash");
    assert_eq!(found.created_at, found.updated_at);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let Some(store) = spawn_store().await else { return };

    store.create_user("walt@breakingbad.com", "hash").await.unwrap();
    let second = store.create_user("walt@breakingbad.com", "other").await;

    assert_eq!(second, Err(StoreError::Conflict));
}

#[tokio::test]
async fn find_unknown_email_is_not_found() {
    let Some(store) = spawn_store().await else { return };

    let missing = store.find_by_email("jesse@breakingbad.com").await;

    assert_eq!(missing, Err(StoreError::NotFound));
}

#[tokio::test]
async fn update_user_replaces_email_and_hash() {
    let Some(store) = spawn_store().await else { return };
    let user = store.create_user("walt@breakingbad.com", "old").await.unwrap();

    let updated = store
        .update_user(user.id, "heisenberg@breakingbad.com", "new")
        .await
        .expect("Failed to update user");

    assert_eq!(updated.id, user.id);
    assert_eq!(updated.created_at, user.created_at);
    assert!(updated.updated_at >= user.updated_at);
    assert_eq!(
        store.find_by_email("heisenberg@breakingbad.com").await,
        Ok(updated)
    );
    assert_eq!(
        store.find_by_email("walt@breakingbad.com").await,
        Err(StoreError::NotFound)
    );
}

#[tokio::test]
async fn update_user_conflicts_and_missing() {
    let Some(store) = spawn_store().await else { return };
    let walt = store.create_user("walt@breakingbad.com", "hash").await.unwrap();
    store.create_user("jesse@breakingbad.com", "hash").await.unwrap();

    let taken = store.update_user(walt.id, "jesse@breakingbad.com", "hash").await;
    assert_eq!(taken, Err(StoreError::Conflict));

    let missing = store
        .update_user(UserId::new(), "skyler@breakingbad.com", "hash")
        .await;
    assert_eq!(missing, Err(StoreError::NotFound));
}

#[tokio::test]
async fn refresh_token_create_and_lookup() {
    let Some(store) = spawn_store().await else { return };
    let user = store.create_user("walt@breakingbad.com", "hash").await.unwrap();
    let token = mint_refresh_token().unwrap();
    let expires_at = now_micros() + Duration::days(60);

    let created = store
        .create(&token, user.id, expires_at)
        .await
        .expect("Failed to create refresh token");
    let found = store.lookup(&token).await.expect("Failed to look up token");

    assert_eq!(created, found);
    assert_eq!(found.token, token);
    assert_eq!(found.user_id, user.id);
    assert_eq!(found.expires_at, expires_at);
    assert!(found.revoked_at.is_none());
    assert!(found.is_valid(Utc::now()));
}

#[tokio::test]
async fn duplicate_refresh_token_is_a_conflict() {
    let Some(store) = spawn_store().await else { return };
    let user = store.create_user("walt@breakingbad.com", "hash").await.unwrap();
    let expires_at = Utc::now() + Duration::days(60);

    store.create("abc", user.id, expires_at).await.unwrap();
    let second = store.create("abc", user.id, expires_at).await;

    assert_eq!(second, Err(StoreError::Conflict));
}

#[tokio::test]
async fn refresh_token_for_unknown_user_is_rejected() {
    let Some(store) = spawn_store().await else { return };

    let orphan = store
        .create("abc", UserId::new(), Utc::now() + Duration::days(60))
        .await;

    assert!(matches!(orphan, Err(StoreError::Backend(_))));
}

#[tokio::test]
async fn lookup_unknown_token_is_not_found() {
    let Some(store) = spawn_store().await else { return };

    assert_eq!(store.lookup("missing").await, Err(StoreError::NotFound));
}

#[tokio::test]
async fn revoke_keeps_first_revocation_time() {
    let Some(store) = spawn_store().await else { return };
    let user = store.create_user("walt@breakingbad.com", "hash").await.unwrap();
    store
        .create("abc", user.id, Utc::now() + Duration::days(60))
        .await
        .unwrap();

    let first = now_micros();
    store.revoke("abc", first).await.expect("Failed to revoke");
    store
        .revoke("abc", first + Duration::seconds(30))
        .await
        .expect("Failed to revoke again");

    let record = store.lookup("abc").await.unwrap();
    assert_eq!(record.revoked_at, Some(first));
    assert!(!record.is_valid(Utc::now()));
}

#[tokio::test]
async fn revoke_unknown_token_is_not_found() {
    let Some(store) = spawn_store().await else { return };

    let missing = store.revoke("missing", Utc::now()).await;

    assert_eq!(missing, Err(StoreError::NotFound));
}

#[tokio::test]
async fn session_lifecycle_on_postgres() {
    let Some(store) = spawn_store().await else { return };
    let store = Arc::new(store);
    let sessions =
        SessionService::new(store.clone(), store.clone(), common::test_settings()).unwrap();

    sessions.register("walt@breakingbad.com", "04234").await.unwrap();
    let outcome = sessions.login("walt@breakingbad.com", "04234").await.unwrap();
    assert!(sessions.refresh(&outcome.refresh_token).await.is_ok());

    sessions.revoke(&outcome.refresh_token).await.unwrap();
    sessions.revoke(&outcome.refresh_token).await.unwrap();

    let err = sessions.refresh(&outcome.refresh_token).await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::RefreshTokenRevoked)));
}
