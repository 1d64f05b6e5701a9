/// Request authentication context
///
/// Turns the value of an `Authorization` header into an [`AuthContext`].
/// This is transport-agnostic; the API crate wraps it in an extractor so
/// protected handlers receive the authenticated user as a parameter.
///
/// # Failure kinds
///
/// | Input                          | Error                |
/// |--------------------------------|----------------------|
/// | no header, empty or non-Bearer | `MissingCredentials` |
/// | Bearer token that isn't a JWT  | `InvalidToken`       |
/// | bad signature / issuer         | `InvalidToken`       |
/// | past expiration                | `ExpiredToken`       |
///
/// # Example
///
/// ```
/// use ecolens_shared::auth::context::authenticate_bearer;
/// use ecolens_shared::auth::jwt::{create_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let token = create_token(&Claims::new(Uuid::new_v4(), "ada@example.com"), secret)?;
///
/// let header = format!("Bearer {}", token);
/// let ctx = authenticate_bearer(Some(&header), secret)?;
/// assert_eq!(ctx.email, "ada@example.com");
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use uuid::Uuid;

use super::jwt::{validate_token, Claims, JwtError};

/// Identity bound to a request by a verified credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

/// Error type for request authentication
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No bearer credential was supplied
    #[error("Access token required")]
    MissingCredentials,

    /// Credential was supplied but could not be verified
    #[error("Invalid token")]
    InvalidToken(String),

    /// Credential was valid once but has expired
    #[error("Token expired")]
    ExpiredToken,
}

/// Authenticates an `Authorization` header value
///
/// # Errors
///
/// See the module table.
pub fn authenticate_bearer(header: Option<&str>, secret: &str) -> Result<AuthContext, AuthError> {
    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingCredentials)?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::ExpiredToken,
        other => AuthError::InvalidToken(other.to_string()),
    })?;

    Ok(claims.into())
}
