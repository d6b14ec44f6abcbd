/// JWT Claims structure
///
/// Registered claims only (RFC 7519): issuer, subject, expiry, issued-at.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::error::AuthError;

/// Issuer stamped into, and required from, every access token
pub const ISSUER: &str = "chirpy";

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub iss: String,
    /// User id as a UUID string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiration time (Unix seconds)
    pub exp: i64,
    /// Issued at (Unix seconds)
    pub iat: i64,
}

impl Claims {
    /// Claims for `user_id`, valid from `issued_at` for `ttl`.
    ///
    /// Timestamps are whole seconds; the fractional part of `issued_at + ttl`
    /// is dropped, so a token never outlives its ttl. `None` if the expiry is
    /// past the representable range.
    pub fn new(user_id: UserId, issued_at: DateTime<Utc>, ttl: Duration) -> Option<Self> {
        let expires_at = issued_at.checked_add_signed(ttl)?;
        Some(Self {
            iss: ISSUER.to_string(),
            sub: Some(user_id.to_string()),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        })
    }

    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub
            .as_deref()
            .ok_or(AuthError::MalformedSubject)?
            .parse()
            .map_err(|_| AuthError::MalformedSubject)
    }

    /// Expired once `now` reaches `exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let user_id = UserId::new();
        let now = Utc::now();
        let claims = Claims::new(user_id, now, Duration::hours(1)).unwrap();

        assert_eq!(claims.sub, Some(user_id.to_string()));
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.is_expired_at(now));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let claims = Claims::new(UserId::new(), now, Duration::seconds(10)).unwrap();

        assert!(!claims.is_expired_at(now + Duration::seconds(9)));
        assert!(claims.is_expired_at(now + Duration::seconds(10)));
    }

    #[test]
    fn test_user_id_extraction() {
        let user_id = UserId::new();
        let claims = Claims::new(user_id, Utc::now(), Duration::hours(1)).unwrap();

        assert_eq!(claims.user_id(), Ok(user_id));
    }

    #[test]
    fn test_invalid_user_id() {
        let mut claims = Claims::new(UserId::new(), Utc::now(), Duration::hours(1)).unwrap();

        claims.sub = Some("invalid-uuid".to_string());
        assert_eq!(claims.user_id(), Err(AuthError::MalformedSubject));

        claims.sub = None;
        assert_eq!(claims.user_id(), Err(AuthError::MalformedSubject));
    }

    #[test]
    fn test_unrepresentable_expiry() {
        assert!(Claims::new(UserId::new(), Utc::now(), Duration::MAX).is_none());
    }

    #[test]
    fn test_wire_field_order() {
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: Some("00000000-0000-0000-0000-000000000000".to_string()),
            exp: 20,
            iat: 10,
        };
        let json = serde_json::to_string(&claims).unwrap();

        assert_eq!(
            json,
            r#"{"iss":"chirpy","sub":"00000000-0000-0000-0000-000000000000","exp":20,"iat":10}"#
        );
    }
}
