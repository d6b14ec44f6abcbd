/// Authentication module
///
/// Password hashing, access token issuance/validation, bearer header
/// parsing and refresh token minting.

mod bearer;
mod claims;
mod identity;
mod jwt;
mod password;
mod refresh_token;

pub use bearer::extract_bearer_token;
pub use claims::Claims;
pub use claims::ISSUER;
pub use identity::UserId;
pub use jwt::issue_access_token;
pub use jwt::validate_access_token;
pub use password::check_password_hash;
pub use password::hash_password;
pub use password::hash_password_with_cost;
pub use password::MAX_PASSWORD_BYTES;
pub use refresh_token::mint_refresh_token;
pub use refresh_token::RefreshTokenRecord;
