/// Authorization header parsing
///
/// Accepts exactly `Bearer <token>` with a single space.

use crate::error::AuthError;

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingHeader)?;

    match value.split(' ').collect::<Vec<_>>().as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(*token),
        _ => Err(AuthError::MalformedHeader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_bearer_token() {
        assert_eq!(extract_bearer_token(Some("Bearer 12345")), Ok("12345"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(extract_bearer_token(None), Err(AuthError::MissingHeader));
    }

    #[test]
    fn test_malformed_headers() {
        let cases = [
            "",
            "Bearer",
            "Bearer ",
            "12345",
            "Basic 12345",
            "ApiKey 12345",
            "bearer 12345",
            "Bearer  12345",
            "Bearer 123 45",
        ];

        for case in cases {
            assert_eq!(
                extract_bearer_token(Some(case)),
                Err(AuthError::MalformedHeader),
                "header {:?} should be rejected",
                case
            );
        }
    }
}
