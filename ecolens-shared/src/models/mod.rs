/// Database models for EcoLens
///
/// # Models
///
/// - `user`: accounts, preferences and running stats
/// - `emission`: recorded scans, owned by a user
/// - `category`: closed set of emission categories
///
/// # Example
///
/// ```no_run
/// use ecolens_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let user = User::create(&pool, CreateUser {
///     email: "ada@example.com".to_string(),
///     name: "Ada".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// })
/// .await?;
///
/// assert_eq!(user.stats().total_scans, 0);
/// # Ok(())
/// # }
/// ```

pub mod category;
pub mod emission;
pub mod user;
