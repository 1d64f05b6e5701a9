/// Session/identity primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: 7-day HS256 credentials binding user ID and email
/// - [`context`]: Bearer header verification into an [`context::AuthContext`]
///
/// # Example
///
/// ```no_run
/// use ecolens_shared::auth::password::{hash_password, verify_password};
/// use ecolens_shared::auth::jwt::{create_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("carrots42")?;
/// assert!(verify_password("carrots42", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), "ada@example.com");
/// let token = create_token(&claims, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod context;
pub mod jwt;
pub mod password;
