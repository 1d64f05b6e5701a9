/// Emission endpoints
///
/// # Endpoints
///
/// - `POST /v1/emissions` - Record a scanned object
/// - `GET /v1/emissions/today` - Today's emissions and goal progress
/// - `GET /v1/emissions/history?days=7` - Emissions grouped by day
/// - `GET /v1/emissions/recent?limit=10` - Most recent scans
/// - `GET /v1/emissions/breakdown?days=30` - Per-category split
/// - `DELETE /v1/emissions/:id` - Delete an emission
///
/// All endpoints act on the caller's own emissions. Malformed `days` and
/// `limit` values fall back to their defaults.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, CurrentUser},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use ecolens_shared::{
    models::{
        category::Category,
        emission::{Alternative, Emission, EmissionQuery, NewEmission},
        user::User,
    },
    stats::{
        self,
        breakdown::{category_breakdown, CategorySlice},
        period::{parse_days, parse_limit},
        DailyHistory,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

const DEFAULT_HISTORY_DAYS: i64 = 7;
const DEFAULT_BREAKDOWN_DAYS: i64 = 30;
const DEFAULT_RECENT_LIMIT: i64 = 10;

fn default_quantity() -> i32 {
    1
}

/// Create emission request
///
/// Mirrors the analysis payload; `carbonFootprint` is always derived from
/// `carbonValue` and is not accepted here.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmissionRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "objectName is required"))]
    pub object_name: String,

    /// Unknown categories are rejected during deserialization
    #[serde(default)]
    pub category: Category,

    /// Grams CO2e per item
    #[validate(required(message = "carbonValue is required"))]
    pub carbon_value: Option<f64>,

    #[serde(default)]
    pub lifecycle: Vec<String>,

    #[serde(default)]
    pub explanation: String,

    #[serde(default)]
    pub alternatives: Vec<Alternative>,

    #[serde(default = "default_quantity")]
    pub quantity: i32,

    pub image_url: Option<String>,

    pub notes: Option<String>,

    pub scanned_at: Option<DateTime<Utc>>,
}

impl From<CreateEmissionRequest> for NewEmission {
    fn from(req: CreateEmissionRequest) -> Self {
        NewEmission {
            object_name: req.object_name,
            category: req.category,
            carbon_value: req.carbon_value.unwrap_or_default(),
            lifecycle: req.lifecycle,
            explanation: req.explanation,
            alternatives: req.alternatives,
            quantity: req.quantity,
            image_url: req.image_url,
            notes: req.notes,
            scanned_at: req.scanned_at,
        }
    }
}

/// `days` query parameter
#[derive(Debug, Default, Deserialize)]
pub struct DaysQuery {
    pub days: Option<String>,
}

/// `limit` query parameter
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

/// Today's emissions
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub emissions: Vec<Emission>,
    #[serde(rename = "totalCO2")]
    pub total_co2: f64,
    pub count: usize,
    pub daily_goal: f64,
    pub percent_of_goal: i64,
}

/// Compact view of a recent scan
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentScan {
    pub id: Uuid,
    pub item_name: String,
    pub category: Category,
    pub impact_kg: f64,
    pub quantity: i32,
    pub scanned_at: DateTime<Utc>,
    pub image_url: Option<String>,
}

impl From<Emission> for RecentScan {
    fn from(e: Emission) -> Self {
        Self {
            impact_kg: stats::kilograms(e.total_carbon()),
            id: e.id,
            item_name: e.object_name,
            category: e.category,
            quantity: e.quantity,
            scanned_at: e.scanned_at,
            image_url: e.image_url,
        }
    }
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub emission: Emission,
}

/// Record an emission
///
/// # Endpoint
///
/// ```text
/// POST /v1/emissions
/// Authorization: Bearer <token>
///
/// {
///   "objectName": "Plastic Water Bottle",
///   "category": "beverage",
///   "carbonValue": 82.8,
///   "lifecycle": ["Extraction", "Manufacturing"],
///   "explanation": "...",
///   "alternatives": [{ "name": "Steel bottle", "benefit": "...", "carbonSavings": "..." }]
/// }
/// ```
///
/// Returns `201` with the stored record. The caller's totals are updated in
/// the same transaction.
///
/// # Errors
///
/// - `400 Bad Request`: Missing `objectName`/`carbonValue`, negative value,
///   unknown category or out-of-range quantity
/// - `404 Not Found`: The token's user no longer exists
pub async fn create_emission(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    ApiJson(req): ApiJson<CreateEmissionRequest>,
) -> ApiResult<(StatusCode, Json<Emission>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let emission = Emission::create(state.db(), auth.user_id, req.into()).await?;

    Ok((StatusCode::CREATED, Json(emission)))
}

/// Today's emissions with goal progress
///
/// "Today" is the current UTC calendar day.
pub async fn today(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
) -> ApiResult<Json<TodayResponse>> {
    let user = User::find_by_id(state.db(), auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let date = Utc::now().date_naive();
    let emissions =
        Emission::query(state.db(), auth.user_id, &EmissionQuery::on_date(date)).await?;
    let total = stats::daily_total(&emissions, date);

    Ok(Json(TodayResponse {
        date,
        count: total.item_count,
        total_co2: total.total_co2,
        daily_goal: user.daily_goal,
        percent_of_goal: stats::percent_of_goal(total.total_co2, user.daily_goal),
        emissions,
    }))
}

/// Emissions of the last `days` days, grouped by day (newest first)
pub async fn history(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Query(params): Query<DaysQuery>,
) -> ApiResult<Json<Vec<DailyHistory>>> {
    let days = parse_days(params.days.as_deref(), DEFAULT_HISTORY_DAYS);
    let since = Utc::now() - Duration::days(days);

    let emissions =
        Emission::query(state.db(), auth.user_id, &EmissionQuery::between(since, None)).await?;

    Ok(Json(stats::group_by_date(emissions)))
}

/// Most recent scans, newest first
pub async fn recent(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Query(params): Query<LimitQuery>,
) -> ApiResult<Json<Vec<RecentScan>>> {
    let limit = parse_limit(params.limit.as_deref(), DEFAULT_RECENT_LIMIT);

    let emissions = Emission::query(state.db(), auth.user_id, &EmissionQuery::recent(limit)).await?;

    Ok(Json(emissions.into_iter().map(RecentScan::from).collect()))
}

/// Category breakdown over the last `days` days
///
/// ```json
/// [
///   { "category": "Food", "key": "food", "percentage": 75, "impactKg": 0.15,
///     "totalCO2": 150.0, "count": 2, "color": "#10b981" }
/// ]
/// ```
pub async fn breakdown(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Query(params): Query<DaysQuery>,
) -> ApiResult<Json<Vec<CategorySlice>>> {
    let days = parse_days(params.days.as_deref(), DEFAULT_BREAKDOWN_DAYS);
    let since = Utc::now() - Duration::days(days);

    let totals = Emission::category_totals(state.db(), auth.user_id, since).await?;

    Ok(Json(category_breakdown(&totals)))
}

/// Delete one of the caller's emissions
///
/// The emission's contribution is removed from the caller's totals in the
/// same transaction. Emissions of other users are reported as not found.
pub async fn delete_emission(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest("Invalid emission id".to_string()))?;

    let emission = Emission::delete(state.db(), auth.user_id, id).await?;

    Ok(Json(DeleteResponse {
        message: "Emission deleted".to_string(),
        emission,
    }))
}
