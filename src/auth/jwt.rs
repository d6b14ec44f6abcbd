/// JWT Token Generation and Validation
///
/// HS256 compact JWS access tokens. Validation distinguishes each failure
/// cause internally; the HTTP layer collapses them into one 401.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;

use crate::auth::claims::{Claims, ISSUER};
use crate::auth::UserId;
use crate::error::{AppError, AuthError};

/// Issue an access token for `user_id` that expires `ttl` from now
///
/// # Errors
/// Returns `Config` if `ttl` puts the expiry out of range, `Fatal` if signing fails
pub fn issue_access_token(user_id: UserId, secret: &str, ttl: Duration) -> Result<String, AppError> {
    let claims = Claims::new(user_id, Utc::now(), ttl)
        .ok_or_else(|| AppError::Config(format!("access token ttl {} is out of range", ttl)))?;

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Fatal(format!("Token signing failed: {}", e)))
}

/// Validate an access token and return the user it names
///
/// Checks, in order: shape, algorithm, signature, issuer, expiry, subject.
pub fn validate_access_token(token: &str, secret: &str) -> Result<UserId, AuthError> {
    // Reject anything but HS256 before touching the key, `none` included.
    if header_algorithm(token)? != "HS256" {
        return Err(AuthError::UnexpectedAlgorithm);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss"]);
    // Expiry is checked below with zero leeway and an inclusive bound.
    validation.validate_exp = false;
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => AuthError::UnexpectedAlgorithm,
        ErrorKind::InvalidIssuer => AuthError::UnexpectedIssuer,
        _ => {
            tracing::debug!(error = %e, "Access token could not be decoded");
            AuthError::MalformedToken
        }
    })?;

    if claims.is_expired_at(Utc::now()) {
        return Err(AuthError::Expired);
    }

    claims.user_id()
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

fn header_algorithm(token: &str) -> Result<String, AuthError> {
    let mut segments = token.split('.');
    let (Some(header), Some(_), Some(_), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(AuthError::MalformedToken);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| AuthError::MalformedToken)?;
    let raw: RawHeader = serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)?;
    Ok(raw.alg)
}
