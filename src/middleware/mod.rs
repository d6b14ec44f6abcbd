/// Middleware module
///
/// Access-token authentication for protected scopes.

mod jwt_middleware;

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

pub use jwt_middleware::JwtMiddleware;

/// Raw `Authorization` header value. A value that is not visible ASCII is
/// returned as an empty string so it fails bearer parsing as malformed.
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default())
}
