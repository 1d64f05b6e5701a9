/// Emission model and database operations
///
/// An emission is one recorded scan of an object with its estimated carbon
/// impact, owned by exactly one user. Inserting or deleting an emission
/// adjusts the owner's running totals inside the same transaction, so
/// `users.total_co2` always equals the sum of `carbon_value * quantity` over
/// that user's live emissions.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE emissions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     object_name VARCHAR(200) NOT NULL,
///     category VARCHAR(32) NOT NULL DEFAULT 'other',
///     carbon_value DOUBLE PRECISION NOT NULL,   -- grams CO2e, >= 0
///     carbon_footprint VARCHAR(64) NOT NULL,
///     lifecycle TEXT[] NOT NULL DEFAULT '{}',
///     explanation TEXT NOT NULL DEFAULT '',
///     alternatives JSONB NOT NULL DEFAULT '[]',
///     quantity INTEGER NOT NULL DEFAULT 1,      -- >= 1
///     image_url TEXT,
///     notes VARCHAR(500),
///     scanned_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     date DATE NOT NULL,                       -- UTC date of scanned_at
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE INDEX ON emissions (user_id, scanned_at DESC);
/// CREATE INDEX ON emissions (user_id, date);
/// CREATE INDEX ON emissions (user_id, category);
/// CREATE INDEX ON emissions (scanned_at DESC);
/// ```
///
/// # Example
///
/// ```no_run
/// use ecolens_shared::models::emission::{Emission, NewEmission};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let emission = Emission::create(&pool, user_id, NewEmission {
///     object_name: "Oat milk".to_string(),
///     carbon_value: 82.8,
///     ..Default::default()
/// }).await?;
///
/// Emission::delete(&pool, user_id, emission.id).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use super::category::{Category, UnknownCategory};
use super::user::User;
use crate::impact::format_carbon_footprint;

/// Maximum length of an object name
pub const MAX_OBJECT_NAME_LEN: usize = 200;

/// Maximum length of free-form notes
pub const MAX_NOTES_LEN: usize = 500;

/// Largest accepted per-item carbon value in grams (1000 tonnes)
pub const MAX_CARBON_VALUE: f64 = 1e9;

/// Error type for emission operations
#[derive(Debug, thiserror::Error)]
pub enum EmissionError {
    /// Input failed validation before reaching storage
    #[error("Invalid emission: {0}")]
    Invalid(String),

    /// Owning user does not exist
    #[error("User not found")]
    UserNotFound,

    /// Emission does not exist (or belongs to another user)
    #[error("Emission not found")]
    NotFound,

    /// Storage failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A lower-impact alternative suggested for a scanned object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub name: String,
    pub benefit: String,
    pub carbon_savings: String,
}

/// Emission model
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Emission {
    /// Unique emission ID (UUID v4)
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Name of the scanned object
    pub object_name: String,

    /// Object category
    #[sqlx(try_from = "String")]
    pub category: Category,

    /// Estimated footprint of one unit in grams CO2e
    pub carbon_value: f64,

    /// Human-readable footprint derived from `carbon_value`
    pub carbon_footprint: String,

    /// Ordered lifecycle stage descriptions
    pub lifecycle: Vec<String>,

    /// Free-text explanation of the estimate
    pub explanation: String,

    /// Ordered lower-impact alternatives
    pub alternatives: Json<Vec<Alternative>>,

    /// Number of units scanned
    pub quantity: i32,

    /// Optional image reference
    pub image_url: Option<String>,

    /// Optional user notes
    pub notes: Option<String>,

    /// When the object was scanned
    pub scanned_at: DateTime<Utc>,

    /// UTC calendar date of `scanned_at`, used for daily grouping
    pub date: NaiveDate,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Emission {
    /// Total impact of this record in grams (`carbon_value * quantity`)
    pub fn total_carbon(&self) -> f64 {
        self.carbon_value * f64::from(self.quantity)
    }
}

/// Input for recording a new emission
#[derive(Debug, Clone)]
pub struct NewEmission {
    pub object_name: String,
    pub category: Category,
    pub carbon_value: f64,
    pub lifecycle: Vec<String>,
    pub explanation: String,
    pub alternatives: Vec<Alternative>,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub notes: Option<String>,

    /// Scan time; defaults to now when absent
    pub scanned_at: Option<DateTime<Utc>>,
}

impl Default for NewEmission {
    fn default() -> Self {
        Self {
            object_name: String::new(),
            category: Category::Other,
            carbon_value: 0.0,
            lifecycle: Vec::new(),
            explanation: String::new(),
            alternatives: Vec::new(),
            quantity: 1,
            image_url: None,
            notes: None,
            scanned_at: None,
        }
    }
}

impl NewEmission {
    /// Checks required fields and bounds
    pub fn validate(&self) -> Result<(), EmissionError> {
        let name = self.object_name.trim();
        if name.is_empty() {
            return Err(EmissionError::Invalid("objectName is required".to_string()));
        }
        if name.chars().count() > MAX_OBJECT_NAME_LEN {
            return Err(EmissionError::Invalid(format!(
                "objectName cannot exceed {} characters",
                MAX_OBJECT_NAME_LEN
            )));
        }
        if !self.carbon_value.is_finite() || self.carbon_value < 0.0 {
            return Err(EmissionError::Invalid(
                "carbonValue must be a non-negative number".to_string(),
            ));
        }
        if self.carbon_value > MAX_CARBON_VALUE {
            return Err(EmissionError::Invalid(format!(
                "carbonValue cannot exceed {}",
                MAX_CARBON_VALUE
            )));
        }
        if self.quantity < 1 {
            return Err(EmissionError::Invalid("quantity must be at least 1".to_string()));
        }
        if !self.total_carbon().is_finite() {
            return Err(EmissionError::Invalid(
                "carbonValue times quantity is out of range".to_string(),
            ));
        }
        if let Some(notes) = &self.notes {
            if notes.chars().count() > MAX_NOTES_LEN {
                return Err(EmissionError::Invalid(format!(
                    "notes cannot exceed {} characters",
                    MAX_NOTES_LEN
                )));
            }
        }
        Ok(())
    }

    /// Impact this record adds to the owner's totals
    pub fn total_carbon(&self) -> f64 {
        self.carbon_value * f64::from(self.quantity)
    }
}

/// Derives the daily grouping key from a scan time
pub fn derive_date(scanned_at: DateTime<Utc>) -> NaiveDate {
    scanned_at.date_naive()
}

const LIST_EMISSIONS: &str = r#"
    SELECT id, user_id, object_name, category, carbon_value, carbon_footprint,
           lifecycle, explanation, alternatives, quantity, image_url, notes,
           scanned_at, date, created_at, updated_at
    FROM emissions
    WHERE user_id = $1
      AND ($2::DATE IS NULL OR date = $2)
      AND ($3::TIMESTAMPTZ IS NULL OR scanned_at >= $3)
      AND ($4::TIMESTAMPTZ IS NULL OR scanned_at < $4)
    ORDER BY scanned_at DESC
    LIMIT $5
"#;

/// Row selection for [`Emission::query`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmissionFilter {
    /// Every emission of the user
    #[default]
    All,

    /// Emissions whose `date` equals the given day
    OnDate(NaiveDate),

    /// Emissions with `from <= scanned_at < to`; open bounds are unbounded
    ScannedBetween {
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
}

/// Query parameters for listing a user's emissions, newest first
#[derive(Debug, Clone, Copy, Default)]
pub struct EmissionQuery {
    pub filter: EmissionFilter,
    pub limit: Option<i64>,
}

impl EmissionQuery {
    /// Emissions recorded on one day, newest first
    pub fn on_date(date: NaiveDate) -> Self {
        Self {
            filter: EmissionFilter::OnDate(date),
            ..Default::default()
        }
    }

    /// Emissions scanned in `[from, to)`, newest first
    pub fn between(from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> Self {
        Self {
            filter: EmissionFilter::ScannedBetween { from: Some(from), to },
            ..Default::default()
        }
    }

    /// The `limit` most recent emissions
    pub fn recent(limit: i64) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }
}

/// Per-category sum produced by a grouping query
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CategoryTotal {
    #[sqlx(try_from = "String")]
    pub category: Category,

    /// Sum of `carbon_value * quantity` in grams
    pub total_co2: f64,

    /// Number of emissions in the category
    pub count: i64,
}

impl Emission {
    /// Records a new emission and adds it to the owner's totals
    ///
    /// Validates the input, defaults `scanned_at` to now, derives `date` and
    /// `carbon_footprint`, then applies the stats increment and the insert in
    /// one transaction. If either statement fails nothing is persisted.
    ///
    /// # Errors
    ///
    /// - `EmissionError::Invalid` if validation fails (storage untouched)
    /// - `EmissionError::UserNotFound` if the owner doesn't exist
    /// - `EmissionError::Database` on storage failure
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: NewEmission,
    ) -> Result<Self, EmissionError> {
        data.validate()?;

        let scanned_at = data.scanned_at.unwrap_or_else(Utc::now);
        let date = derive_date(scanned_at);
        let carbon_footprint = format_carbon_footprint(data.carbon_value);
        let total = data.total_carbon();

        let mut tx = pool.begin().await?;

        // Increment first: the row lock it takes also guards against the
        // owner being deleted before the insert lands.
        if !User::apply_stats_delta(&mut *tx, user_id, 1, total).await? {
            tx.rollback().await?;
            return Err(EmissionError::UserNotFound);
        }

        let emission = sqlx::query_as::<_, Emission>(
            r#"
            INSERT INTO emissions (user_id, object_name, category, carbon_value,
                                   carbon_footprint, lifecycle, explanation, alternatives,
                                   quantity, image_url, notes, scanned_at, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, user_id, object_name, category, carbon_value, carbon_footprint,
                      lifecycle, explanation, alternatives, quantity, image_url, notes,
                      scanned_at, date, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.object_name.trim())
        .bind(data.category.as_str())
        .bind(data.carbon_value)
        .bind(carbon_footprint)
        .bind(data.lifecycle)
        .bind(data.explanation)
        .bind(Json(data.alternatives))
        .bind(data.quantity)
        .bind(data.image_url)
        .bind(data.notes)
        .bind(scanned_at)
        .bind(date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            emission_id = %emission.id,
            %user_id,
            object_name = %emission.object_name,
            total_co2 = total,
            "Emission recorded"
        );

        Ok(emission)
    }

    /// Deletes an emission owned by `user_id` and reverses its contribution
    ///
    /// The decrement mirrors the increment applied by [`Emission::create`],
    /// so create followed by delete leaves the owner's totals unchanged.
    ///
    /// Returns the deleted record.
    ///
    /// # Errors
    ///
    /// `EmissionError::NotFound` if no such emission exists for the user.
    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Self, EmissionError> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query_as::<_, Emission>(
            r#"
            DELETE FROM emissions
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, object_name, category, carbon_value, carbon_footprint,
                      lifecycle, explanation, alternatives, quantity, image_url, notes,
                      scanned_at, date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(emission) = deleted else {
            tx.rollback().await?;
            return Err(EmissionError::NotFound);
        };

        User::apply_stats_delta(&mut *tx, user_id, -1, -emission.total_carbon()).await?;
        tx.commit().await?;

        info!(emission_id = %id, %user_id, "Emission deleted");

        Ok(emission)
    }

    /// Finds one of a user's emissions by ID
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let emission = sqlx::query_as::<_, Emission>(
            r#"
            SELECT id, user_id, object_name, category, carbon_value, carbon_footprint,
                   lifecycle, explanation, alternatives, quantity, image_url, notes,
                   scanned_at, date, created_at, updated_at
            FROM emissions
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(emission)
    }

    /// Lists a user's emissions matching a filter
    ///
    /// Unused filter parameters are bound as NULL. Every variant is served
    /// by one of the `(user_id, ...)` indexes.
    pub async fn query(
        pool: &PgPool,
        user_id: Uuid,
        query: &EmissionQuery,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let (on_date, from, to) = match query.filter {
            EmissionFilter::All => (None, None, None),
            EmissionFilter::OnDate(date) => (Some(date), None, None),
            EmissionFilter::ScannedBetween { from, to } => (None, from, to),
        };

        debug!(%user_id, ?query, "Querying emissions");

        sqlx::query_as::<_, Emission>(LIST_EMISSIONS)
            .bind(user_id)
            .bind(on_date)
            .bind(from)
            .bind(to)
            .bind(query.limit)
            .fetch_all(pool)
            .await
    }

    /// Sums a user's emissions per category since `since`
    ///
    /// Sorted by total descending.
    pub async fn category_totals(
        pool: &PgPool,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<CategoryTotal>, sqlx::Error> {
        let totals = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT category,
                   COALESCE(SUM(carbon_value * quantity), 0)::DOUBLE PRECISION AS total_co2,
                   COUNT(*) AS count
            FROM emissions
            WHERE user_id = $1 AND scanned_at >= $2
            GROUP BY category
            ORDER BY total_co2 DESC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(pool)
        .await?;

        Ok(totals)
    }
}

impl From<UnknownCategory> for EmissionError {
    fn from(err: UnknownCategory) -> Self {
        EmissionError::Invalid(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid() -> NewEmission {
        NewEmission {
            object_name: "Oat milk".to_string(),
            carbon_value: 82.8,
            ..Default::default()
        }
    }

    #[test]
    fn test_date_derived_from_scanned_at() {
        let scanned_at = Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap();
        let date = derive_date(scanned_at);
        assert_eq!(date.to_string(), "2024-03-15");
    }

    #[test]
    fn test_date_uses_utc_day_boundary() {
        let late = Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 59).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 3, 16, 0, 0, 0).unwrap();
        assert_eq!(derive_date(late).to_string(), "2024-03-15");
        assert_eq!(derive_date(early).to_string(), "2024-03-16");
    }

    #[test]
    fn test_new_emission_defaults() {
        let data = NewEmission::default();
        assert_eq!(data.category, Category::Other);
        assert_eq!(data.quantity, 1);
        assert!(data.scanned_at.is_none());
    }

    #[test]
    fn test_validate_accepts_valid_input() {
        assert!(valid().validate().is_ok());

        let zero = NewEmission {
            carbon_value: 0.0,
            ..valid()
        };
        assert!(zero.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let data = NewEmission {
            object_name: "   ".to_string(),
            ..valid()
        };
        assert!(matches!(data.validate(), Err(EmissionError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_long_name() {
        let data = NewEmission {
            object_name: "x".repeat(MAX_OBJECT_NAME_LEN + 1),
            ..valid()
        };
        assert!(matches!(data.validate(), Err(EmissionError::Invalid(_))));

        let at_limit = NewEmission {
            object_name: "x".repeat(MAX_OBJECT_NAME_LEN),
            ..valid()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_or_nan_carbon() {
        for value in [-0.1, f64::NAN, f64::INFINITY] {
            let data = NewEmission {
                carbon_value: value,
                ..valid()
            };
            assert!(
                matches!(data.validate(), Err(EmissionError::Invalid(_))),
                "carbon value {} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_validate_rejects_carbon_above_max() {
        let data = NewEmission {
            carbon_value: 1e60,
            ..valid()
        };
        assert!(matches!(data.validate(), Err(EmissionError::Invalid(_))));

        let at_limit = NewEmission {
            carbon_value: MAX_CARBON_VALUE,
            ..valid()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overflowing_total() {
        let data = NewEmission {
            carbon_value: 1e308,
            quantity: 2,
            ..valid()
        };
        assert!(matches!(data.validate(), Err(EmissionError::Invalid(_))));
    }

    #[test]
    fn test_footprint_at_limits_fits_column() {
        // carbon_footprint is VARCHAR(64)
        let max = NewEmission {
            carbon_value: MAX_CARBON_VALUE,
            quantity: i32::MAX,
            ..valid()
        };
        assert!(max.validate().is_ok());
        assert!(format_carbon_footprint(max.carbon_value).chars().count() <= 64);
        assert!(max.total_carbon().is_finite());
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let data = NewEmission {
            quantity: 0,
            ..valid()
        };
        assert!(matches!(data.validate(), Err(EmissionError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_long_notes() {
        let data = NewEmission {
            notes: Some("n".repeat(MAX_NOTES_LEN + 1)),
            ..valid()
        };
        assert!(matches!(data.validate(), Err(EmissionError::Invalid(_))));
    }

    #[test]
    fn test_total_carbon_multiplies_quantity() {
        let data = NewEmission {
            carbon_value: 120.5,
            quantity: 3,
            ..valid()
        };
        assert_eq!(data.total_carbon(), 361.5);
    }

    #[test]
    fn test_emission_query_constructors() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let q = EmissionQuery::on_date(day);
        assert_eq!(q.filter, EmissionFilter::OnDate(day));
        assert!(q.limit.is_none());

        let q = EmissionQuery::recent(10);
        assert_eq!(q.filter, EmissionFilter::All);
        assert_eq!(q.limit, Some(10));
    }
}
