/// Refresh Token Management
///
/// Refresh tokens are opaque: 32 bytes from the OS RNG, hex-encoded. The
/// server keeps a record per token; revocation is a timestamp, never a delete.

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::error::AppError;

const REFRESH_TOKEN_BYTES: usize = 32;

/// Mint a new refresh token value
///
/// # Errors
/// Returns `Fatal` if the OS randomness source fails
pub fn mint_refresh_token() -> Result<String, AppError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::Fatal(format!("Randomness source failed: {}", e)))?;
    Ok(hex::encode(bytes))
}

/// Persisted refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// `None` while the token is active
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Valid iff never revoked and `now` is strictly before expiry
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && now < self.expires_at
    }
}
