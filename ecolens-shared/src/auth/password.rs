/// Password hashing using Argon2id
///
/// Stored credentials are PHC strings; plaintext passwords are never
/// persisted or logged.
///
/// # Parameters
///
/// - **Algorithm**: Argon2id
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
///
/// # Example
///
/// ```
/// use ecolens_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("carrots42")?;
///
/// assert!(verify_password("carrots42", &hash)?);
/// assert!(!verify_password("parsnips", &hash)?);
/// # Ok(())
/// # }
/// ```

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Shortest password accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hashes a password using Argon2id with a random 16-byte salt
///
/// Output looks like:
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
/// ```
///
/// Hashing is CPU and memory heavy; async callers should run it on a
/// blocking thread.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// Parameters are read from the PHC string, so hashes made with older
/// settings keep verifying.
///
/// # Returns
///
/// `Ok(true)` if the password matches, `Ok(false)` if it doesn't
///
/// # Errors
///
/// `PasswordError::InvalidHash` if the stored hash can't be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Runs a full verification against a throwaway hash
///
/// For logins whose email has no account, so they cost the same Argon2
/// work as a wrong password. Always returns `false`. The throwaway hash is
/// built on first use with the same parameters as [`hash_password`].
pub fn verify_without_account(password: &str) -> bool {
    static PLACEHOLDER_HASH: OnceLock<Option<String>> = OnceLock::new();

    let hash = PLACEHOLDER_HASH.get_or_init(|| hash_password("ecolens-no-account").ok());
    if let Some(hash) = hash {
        let _ = verify_password(password, hash);
    }
    false
}

/// Checks the registration length rule
///
/// Length is counted in characters, not bytes.
pub fn validate_password_length(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("carrots42").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=65536,t=3,p=4"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("same_password", &hash1).unwrap());
        assert!(verify_password("same_password", &hash2).unwrap());
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("carrots42").unwrap();
        assert!(!verify_password("parsnips42", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_malformed_hash() {
        let result = verify_password("anything", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::InvalidHash(_))));
    }

    #[test]
    fn test_verify_without_account_never_matches() {
        assert!(!verify_without_account("carrots42"));
        assert!(!verify_without_account("ecolens-no-account"));
        assert!(!verify_without_account(""));
    }

    #[test]
    fn test_verify_without_account_costs_a_real_verification() {
        // warm the placeholder so only verification is timed
        verify_without_account("warmup");

        let hash = hash_password("carrots42").unwrap();
        let start = std::time::Instant::now();
        let _ = verify_password("parsnips", &hash);
        let real = start.elapsed();

        let start = std::time::Instant::now();
        verify_without_account("parsnips");
        let placeholder = start.elapsed();

        assert!(
            placeholder * 4 >= real,
            "placeholder verification took {:?}, real took {:?}",
            placeholder,
            real
        );
    }

    #[test]
    fn test_password_length_rule() {
        assert!(validate_password_length("abcdef").is_ok());
        assert!(validate_password_length("abcde").is_err());
        assert!(validate_password_length("").is_err());
        // multi-byte characters count once
        assert!(validate_password_length("ééééé").is_err());
    }
}
