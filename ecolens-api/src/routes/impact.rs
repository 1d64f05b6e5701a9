/// Carbon impact equivalents
///
/// ```text
/// GET /v1/impact?carbonValue=82.8
/// ```
///
/// Public; performs no storage access.

use crate::error::{ApiError, ApiResult};
use axum::{extract::Query, Json};
use ecolens_shared::impact::CarbonImpact;
use serde::Deserialize;

/// `carbonValue` query parameter
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactQuery {
    pub carbon_value: Option<String>,
}

/// Converts a gram value into equivalents of an ideal footprint
///
/// # Errors
///
/// - `400 Bad Request`: `carbonValue` missing, not a number or negative
pub async fn carbon_impact(Query(params): Query<ImpactQuery>) -> ApiResult<Json<CarbonImpact>> {
    let grams = params
        .carbon_value
        .as_deref()
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|g| g.is_finite() && *g >= 0.0)
        .ok_or_else(|| {
            ApiError::BadRequest("carbonValue must be a non-negative number".to_string())
        })?;

    Ok(Json(CarbonImpact::from_grams(grams)))
}
