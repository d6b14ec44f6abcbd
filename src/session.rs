/// Session orchestration
///
/// Composes password checks, access tokens and the refresh token store into
/// login, refresh, revoke and the per-request authorization gate.
///
/// Refresh tokens are not rotated on use: a token stays valid until it
/// expires or is revoked.

use chrono::{TimeDelta, Utc};
use std::future::Future;
use std::sync::Arc;

use crate::auth::{
    check_password_hash, extract_bearer_token, hash_password_with_cost, issue_access_token,
    mint_refresh_token, validate_access_token, UserId,
};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, PasswordError, StoreError};
use crate::store::{CredentialStore, RefreshTokenStore, UserCredential};

/// Tokens handed back after a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserCredential,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct SessionService {
    credentials: Arc<dyn CredentialStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    settings: AuthSettings,
    access_ttl: TimeDelta,
    refresh_ttl: TimeDelta,
    /// Compared against when the email is unknown, so both login failures cost
    /// one bcrypt verification.
    dummy_hash: String,
}

impl SessionService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        settings: AuthSettings,
    ) -> Result<Self, AppError> {
        if settings.secret.is_empty() {
            return Err(AppError::Config("auth.secret must not be empty".to_string()));
        }
        let access_ttl = lifetime(
            "auth.access_token_ttl_seconds",
            settings.access_token_ttl_seconds,
            settings.access_token_ttl(),
        )?;
        let refresh_ttl = lifetime(
            "auth.refresh_token_ttl_days",
            settings.refresh_token_ttl_days,
            settings.refresh_token_ttl(),
        )?;
        let dummy_hash = hash_password_with_cost("chirpy-timing-equaliser", settings.bcrypt_cost)?;

        Ok(Self {
            credentials,
            refresh_tokens,
            settings,
            access_ttl,
            refresh_ttl,
            dummy_hash,
        })
    }

    /// Create a user with a freshly hashed password
    pub async fn register(&self, email: &str, password: &str) -> Result<UserCredential, AppError> {
        let hashed = self.hash(password).await?;
        let user = self
            .bounded(self.credentials.create_user(email, &hashed))
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Replace the authenticated user's email and password
    pub async fn update_credentials(
        &self,
        user_id: UserId,
        email: &str,
        password: &str,
    ) -> Result<UserCredential, AppError> {
        let hashed = self.hash(password).await?;
        let user = self
            .bounded(self.credentials.update_user(user_id, email, &hashed))
            .await?;

        tracing::info!(user_id = %user.id, "User credentials updated");
        Ok(user)
    }

    /// Verify credentials and issue an access token plus a persisted refresh token
    ///
    /// Unknown email and wrong password fail identically with `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let user = match self.bounded(self.credentials.find_by_email(email)).await {
            Ok(user) => Some(user),
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        let hash = user
            .as_ref()
            .map_or(self.dummy_hash.clone(), |u| u.hashed_password.clone());
        let verified = self.verify(hash, password).await?;

        let user = match (user, verified) {
            (Some(user), Ok(())) => user,
            (None, _) => {
                tracing::info!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            (Some(user), Err(e)) => {
                tracing::info!(user_id = %user.id, reason = %e, "Login attempt with wrong password");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let access_token = issue_access_token(user.id, &self.settings.secret, self.access_ttl)?;
        let refresh_token = mint_refresh_token()?;
        let expires_at = Utc::now()
            .checked_add_signed(self.refresh_ttl)
            .ok_or_else(|| AppError::Config("refresh token expiry is out of range".to_string()))?;
        self.bounded(self.refresh_tokens.create(&refresh_token, user.id, expires_at))
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a valid refresh token for a new access token
    pub async fn refresh(&self, presented: &str) -> Result<String, AppError> {
        let record = match self.bounded(self.refresh_tokens.lookup(presented)).await {
            Ok(record) => record,
            Err(StoreError::NotFound) => return Err(AuthError::RefreshTokenNotFound.into()),
            Err(e) => return Err(e.into()),
        };

        if !record.is_valid(Utc::now()) {
            let cause = if record.is_revoked() {
                AuthError::RefreshTokenRevoked
            } else {
                AuthError::RefreshTokenExpired
            };
            tracing::info!(user_id = %record.user_id, reason = %cause, "Refresh rejected");
            return Err(cause.into());
        }

        let access_token = issue_access_token(record.user_id, &self.settings.secret, self.access_ttl)?;

        tracing::debug!(user_id = %record.user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke a refresh token. Unknown and already revoked tokens succeed.
    pub async fn revoke(&self, presented: &str) -> Result<(), AppError> {
        match self
            .bounded(self.refresh_tokens.revoke(presented, Utc::now()))
            .await
        {
            Ok(()) => {
                tracing::info!("Refresh token revoked");
                Ok(())
            }
            Err(StoreError::NotFound) => {
                tracing::debug!("Revoke requested for unknown refresh token");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve the caller's identity from an `Authorization` header value
    pub fn authorize(&self, header: Option<&str>) -> Result<UserId, AppError> {
        let token = extract_bearer_token(header)?;
        let user_id = validate_access_token(token, &self.settings.secret)?;
        Ok(user_id)
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.settings.store_timeout(), call)
            .await
            .map_err(|_| {
                tracing::error!(
                    timeout_ms = self.settings.store_timeout_ms,
                    "Storage call timed out"
                );
                StoreError::Timeout
            })?
    }

    async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_string();
        let cost = self.settings.bcrypt_cost;
        tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost))
            .await
            .map_err(|e| AppError::Fatal(format!("Hashing task failed: {}", e)))?
            .map_err(AppError::from)
    }

    async fn verify(
        &self,
        hash: String,
        password: &str,
    ) -> Result<Result<(), PasswordError>, AppError> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || check_password_hash(&hash, &password))
            .await
            .map_err(|e| AppError::Fatal(format!("Verification task failed: {}", e)))
    }
}

/// A token lifetime must be positive and put the expiry of a token issued now
/// within the representable range.
fn lifetime(key: &str, raw: i64, ttl: Option<TimeDelta>) -> Result<TimeDelta, AppError> {
    ttl.filter(|ttl| *ttl > TimeDelta::zero())
        .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
        .ok_or_else(|| AppError::Config(format!("{} must be a positive lifetime, got {}", key, raw)))
}
