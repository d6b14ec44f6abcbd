/// Password Hashing and Verification
///
/// bcrypt with a tunable cost. Length policy lives with the caller; this layer
/// only refuses input bcrypt would silently truncate.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::PasswordError;

/// bcrypt reads at most this many bytes of input
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password at the default bcrypt cost
///
/// # Errors
/// - `InputTooLong` if the password exceeds 72 bytes
/// - `Hashing` if bcrypt itself fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Hash a password at an explicit bcrypt cost (4..=31)
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, PasswordError> {
    ensure_within_limit(password)?;

    hash(password, cost).map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Check a plaintext password against a stored hash
///
/// The comparison is bcrypt's own. An unparseable stored hash is reported as
/// a mismatch so callers cannot tell the two apart.
pub fn check_password_hash(hash: &str, password: &str) -> Result<(), PasswordError> {
    // bcrypt would truncate and could match a hash of the 72-byte prefix.
    if ensure_within_limit(password).is_err() {
        return Err(PasswordError::Mismatch);
    }

    match verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(PasswordError::Mismatch),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be parsed");
            Err(PasswordError::Mismatch)
        }
    }
}

fn ensure_within_limit(password: &str) -> Result<(), PasswordError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::InputTooLong {
            len: password.len(),
            max: MAX_PASSWORD_BYTES,
        });
    }
    Ok(())
}
