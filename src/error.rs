/// Error Handling Module
///
/// Internal errors stay fine-grained so they can be logged and tested;
/// `AppError::external` is the one place that decides what a client sees.
/// It covers:
/// 1. Domain-specific error types (auth, password, store)
/// 2. The unified application error
/// 3. The centralized external status mapping
/// 4. HTTP response integration, which logs each failure once

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Authentication failures.
///
/// Every variant maps to the same `Unauthorized` outcome for clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("authorization header is missing")]
    MissingHeader,
    #[error("authorization header is malformed")]
    MalformedHeader,
    #[error("token is not a well-formed compact JWS")]
    MalformedToken,
    #[error("token is not signed with HS256")]
    UnexpectedAlgorithm,
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token issuer is not recognised")]
    UnexpectedIssuer,
    #[error("token has expired")]
    Expired,
    #[error("token subject is missing or not a user id")]
    MalformedSubject,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("refresh token does not exist")]
    RefreshTokenNotFound,
    #[error("refresh token has been revoked")]
    RefreshTokenRevoked,
    #[error("refresh token has expired")]
    RefreshTokenExpired,
}

/// Password hashing and verification failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("password is {len} bytes, maximum is {max}")]
    InputTooLong { len: usize, max: usize },
    #[error("password does not match")]
    Mismatch,
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Storage layer signals
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("storage call timed out")]
    Timeout,
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                StoreError::Conflict
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("configuration error: {0}")]
    Config(String),
    /// Randomness exhaustion, signing failure, a panicked blocking task.
    #[error("fatal error: {0}")]
    Fatal(String),
}

/// ============================================================================
/// 3. EXTERNAL STATUS MAPPING
/// ============================================================================

/// What a client is allowed to learn about a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalStatus {
    Unauthorized,
    BadRequest,
    Conflict,
    Unavailable,
    Internal,
}

impl ExternalStatus {
    pub fn status_code(self) -> StatusCode {
        match self {
            ExternalStatus::Unauthorized => StatusCode::UNAUTHORIZED,
            ExternalStatus::BadRequest => StatusCode::BAD_REQUEST,
            ExternalStatus::Conflict => StatusCode::CONFLICT,
            ExternalStatus::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ExternalStatus::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(self) -> &'static str {
        match self {
            ExternalStatus::Unauthorized => "UNAUTHORIZED",
            ExternalStatus::BadRequest => "BAD_REQUEST",
            ExternalStatus::Conflict => "CONFLICT",
            ExternalStatus::Unavailable => "SERVICE_UNAVAILABLE",
            ExternalStatus::Internal => "INTERNAL_ERROR",
        }
    }

    fn message(self) -> &'static str {
        match self {
            ExternalStatus::Unauthorized => "",
            ExternalStatus::BadRequest => "Password is too long",
            ExternalStatus::Conflict => "Resource already exists",
            ExternalStatus::Unavailable => "Service temporarily unavailable",
            ExternalStatus::Internal => "Internal server error",
        }
    }
}

impl AppError {
    /// The single mapping from internal causes to client-visible outcomes.
    ///
    /// Call sites never pick a status themselves.
    pub fn external(&self) -> ExternalStatus {
        match self {
            AppError::Auth(_) => ExternalStatus::Unauthorized,
            AppError::Password(PasswordError::Mismatch) => ExternalStatus::Unauthorized,
            AppError::Password(PasswordError::InputTooLong { .. }) => ExternalStatus::BadRequest,
            AppError::Password(PasswordError::Hashing(_)) => ExternalStatus::Internal,
            AppError::Store(StoreError::Conflict) => ExternalStatus::Conflict,
            AppError::Store(StoreError::Timeout) => ExternalStatus::Unavailable,
            AppError::Store(_) => ExternalStatus::Internal,
            AppError::Config(_) | AppError::Fatal(_) => ExternalStatus::Internal,
        }
    }

    fn log(&self, error_id: &str) {
        match self.external() {
            ExternalStatus::Unauthorized => {
                tracing::warn!(error_id = error_id, error = %self, "Authorization failure");
            }
            ExternalStatus::BadRequest | ExternalStatus::Conflict => {
                tracing::info!(error_id = error_id, error = %self, "Rejected request");
            }
            ExternalStatus::Unavailable | ExternalStatus::Internal => {
                tracing::error!(error_id = error_id, error = %self, "Request failed");
            }
        }
    }
}

/// ============================================================================
/// 4. HTTP RESPONSE MAPPING
/// ============================================================================

/// Error body for non-authorization failures
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error_id: String,
    pub message: String,
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, status: ExternalStatus) -> Self {
        Self {
            error_id,
            message: status.message().to_string(),
            code: status.code().to_string(),
            status: status.status_code().as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.external().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log(&error_id);

        let external = self.external();
        match external {
            // Authorization failures never carry a body.
            ExternalStatus::Unauthorized => HttpResponse::Unauthorized().finish(),
            _ => HttpResponse::build(external.status_code())
                .json(ErrorResponse::new(error_id, external)),
        }
    }
}
