/// Dashboard endpoint
///
/// ```text
/// GET /v1/dashboard/stats?period=weekly|monthly|yearly
/// Authorization: Bearer <token>
/// ```
///
/// An unknown or missing `period` is treated as `weekly`.
///
/// # Response
///
/// ```json
/// {
///   "metrics": {
///     "period": "Weekly",
///     "totalScans": 4,
///     "footprintKg": 1.2,
///     "previousScans": 6,
///     "previousFootprintKg": 2.4,
///     "improvementPercent": 50,
///     "topCategory": "Food",
///     "topItem": "Apple",
///     "comparisonText": "You're 50% better than last week!"
///   },
///   "trendData": [{ "label": "Sat", "value": 0.3 }]
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::CurrentUser,
};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use ecolens_shared::{
    models::{
        emission::{Emission, EmissionQuery},
        user::User,
    },
    stats::{
        dashboard::{compute_dashboard, DashboardStats},
        period::Period,
    },
};
use serde::Deserialize;

/// `period` query parameter
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

/// Period-scoped dashboard stats for the caller
pub async fn dashboard_stats(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Query(params): Query<PeriodQuery>,
) -> ApiResult<Json<DashboardStats>> {
    if User::find_by_id(state.db(), auth.user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let period = Period::parse_lenient(params.period.as_deref());
    let now = Utc::now();
    let current_window = period.current_window(now);
    let previous_window = period.previous_window(now);

    // The current window is open-ended so scans stamped a moment after `now`
    // still count.
    let current = Emission::query(
        state.db(),
        auth.user_id,
        &EmissionQuery::between(current_window.start, None),
    )
    .await?;
    let previous = Emission::query(
        state.db(),
        auth.user_id,
        &EmissionQuery::between(previous_window.start, Some(previous_window.end)),
    )
    .await?;

    tracing::debug!(
        user_id = %auth.user_id,
        period = period.label(),
        current = current.len(),
        previous = previous.len(),
        "Computing dashboard"
    );

    Ok(Json(compute_dashboard(period, now, &current, &previous)))
}
