/// User model and database operations
///
/// A user owns its emissions and carries running totals (`total_scans`,
/// `total_co2`) that are adjusted in the same transaction as every emission
/// insert or delete. See [`crate::models::emission`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL,           -- unique on LOWER(email)
///     name VARCHAR(100) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     daily_goal DOUBLE PRECISION NOT NULL DEFAULT 8000,
///     units VARCHAR(16) NOT NULL DEFAULT 'metric',
///     notifications BOOLEAN NOT NULL DEFAULT TRUE,
///     theme VARCHAR(16) NOT NULL DEFAULT 'system',
///     total_scans BIGINT NOT NULL DEFAULT 0,
///     total_co2 DOUBLE PRECISION NOT NULL DEFAULT 0,
///     streak_days INTEGER NOT NULL DEFAULT 0,
///     last_login_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use ecolens_shared::models::user::{User, CreateUser};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     email: "ada@example.com".to_string(),
///     name: "Ada".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = User::find_by_email(&pool, "ADA@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Default daily CO2e budget in grams (8 kg)
pub const DEFAULT_DAILY_GOAL: f64 = 8000.0;

/// Error returned when a stored preference is outside its closed set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown preference value: {0}")]
pub struct UnknownPreference(pub String);

/// Unit system used when presenting values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Converts units to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

impl TryFrom<String> for Units {
    type Error = UnknownPreference;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(UnknownPreference(value)),
        }
    }
}

/// UI theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    /// Converts theme to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl TryFrom<String> for Theme {
    type Error = UnknownPreference;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err(UnknownPreference(value)),
        }
    }
}

/// User model representing an account
///
/// The password hash is never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID (UUID v4), immutable
    pub id: Uuid,

    /// Email address, stored lowercase
    pub email: String,

    /// Display name
    pub name: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Daily CO2e budget in grams
    pub daily_goal: f64,

    /// Preferred unit system
    #[sqlx(try_from = "String")]
    pub units: Units,

    /// Whether notifications are enabled
    pub notifications: bool,

    /// Preferred theme
    #[sqlx(try_from = "String")]
    pub theme: Theme,

    /// Number of live emissions
    pub total_scans: i64,

    /// Sum of `carbon_value * quantity` over live emissions, in grams
    pub total_co2: f64,

    /// Consecutive days with at least one scan
    pub streak_days: i32,

    /// When the user last logged in (None if never logged in)
    pub last_login_at: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Presentation preferences grouped for responses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub units: Units,
    pub notifications: bool,
    pub theme: Theme,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            units: Units::default(),
            notifications: true,
            theme: Theme::default(),
        }
    }
}

/// Running totals grouped for responses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_scans: i64,
    #[serde(rename = "totalCO2")]
    pub total_co2: f64,
    pub streak_days: i32,
}

impl User {
    /// Gets the user's preferences
    pub fn preferences(&self) -> Preferences {
        Preferences {
            units: self.units,
            notifications: self.notifications,
            theme: self.theme,
        }
    }

    /// Gets the user's running totals
    pub fn stats(&self) -> UserStats {
        UserStats {
            total_scans: self.total_scans,
            total_co2: self.total_co2,
            streak_days: self.streak_days,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address (normalized to lowercase before insert)
    pub email: String,

    /// Display name
    pub name: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

/// Input for updating a user's profile
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub daily_goal: Option<f64>,
    pub units: Option<Units>,
    pub notifications: Option<bool>,
    pub theme: Option<Theme>,
}

/// Normalizes an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Creates a new user with zeroed stats and default preferences
    ///
    /// # Errors
    ///
    /// Returns a database error on a duplicate email (constraint
    /// `users_email_key`) or if the connection fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash, daily_goal)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, password_hash, daily_goal, units, notifications,
                      theme, total_scans, total_co2, streak_days, last_login_at,
                      created_at, updated_at
            "#,
        )
        .bind(normalize_email(&data.email))
        .bind(data.name.trim())
        .bind(data.password_hash)
        .bind(DEFAULT_DAILY_GOAL)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, daily_goal, units, notifications,
                   theme, total_scans, total_co2, streak_days, last_login_at,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, daily_goal, units, notifications,
                   theme, total_scans, total_co2, streak_days, last_login_at,
                   created_at, updated_at
            FROM users
            WHERE LOWER(email) = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates the last login timestamp
    ///
    /// Returns true if the user was found.
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Updates profile fields, leaving `None` fields untouched
    ///
    /// Returns the updated user, or None if it doesn't exist.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                daily_goal = COALESCE($3, daily_goal),
                units = COALESCE($4, units),
                notifications = COALESCE($5, notifications),
                theme = COALESCE($6, theme),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, name, password_hash, daily_goal, units, notifications,
                      theme, total_scans, total_co2, streak_days, last_login_at,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name.as_deref().map(str::trim))
        .bind(data.daily_goal)
        .bind(data.units.map(|u| u.as_str()))
        .bind(data.notifications)
        .bind(data.theme.map(|t| t.as_str()))
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Atomically shifts the running totals by the given deltas
    ///
    /// Uses in-place increments so concurrent writers for the same user are
    /// never lost. Totals are floored at zero. Returns false when the user
    /// does not exist.
    ///
    /// Accepts any executor so it can join an open transaction.
    pub async fn apply_stats_delta<'e, E>(
        executor: E,
        id: Uuid,
        scans_delta: i64,
        co2_delta: f64,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET total_scans = GREATEST(total_scans + $2, 0),
                total_co2 = GREATEST(total_co2 + $3, 0),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(scans_delta)
        .bind(co2_delta)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
