/// Record store plumbing
///
/// # Modules
///
/// - `pool`: [`pool::RecordStore`] handle with bounded timeouts and health checks
/// - `migrations`: embedded schema migrations
/// - Models and their queries are in the `models` module at crate root level
///
/// # Example
///
/// ```no_run
/// use ecolens_shared::db::pool::{DatabaseConfig, RecordStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let store = RecordStore::connect(config).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
