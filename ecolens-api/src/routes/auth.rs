/// Authentication and profile endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get a token
/// - `GET /v1/auth/me` - Current user
/// - `PATCH /v1/auth/me` - Update name, daily goal and preferences
///
/// Tokens are valid for 7 days and are sent back as `Authorization: Bearer`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    extract::{ApiJson, CurrentUser},
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use ecolens_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, Preferences, Theme, UpdateProfile, Units, User, UserStats},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Message shared by every failed login, whatever the cause
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Register request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name is required (at most 100 characters)"))]
    pub name: String,

    /// Email address; the column holds 255 characters
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email cannot exceed 255 characters")
    )]
    pub email: String,

    /// Password (at least 6 characters)
    pub password: String,
}

/// Login request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    /// Email address
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub password: String,
}

/// Preference changes; absent fields are kept
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PreferencesPatch {
    pub units: Option<Units>,
    pub notifications: Option<bool>,
    pub theme: Option<Theme>,
}

/// Profile update request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    /// Daily CO2e budget in grams
    pub daily_goal: Option<f64>,

    pub preferences: Option<PreferencesPatch>,
}

/// Public view of a user
///
/// Never carries the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub daily_goal: f64,
    pub preferences: Preferences,
    pub stats: UserStats,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            preferences: user.preferences(),
            stats: user.stats(),
            id: user.id,
            email: user.email,
            name: user.name,
            daily_goal: user.daily_goal,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Register and login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Bearer token (7 days)
    pub token: String,

    /// The authenticated user
    pub user: UserResponse,
}

fn issue_token(state: &AppState, user: &User) -> ApiResult<String> {
    let claims = jwt::Claims::new(user.id, user.email.as_str());
    Ok(jwt::create_token(&claims, state.jwt_secret())?)
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Ada",
///   "email": "ada@example.com",
///   "password": "secret1"
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user": { "id": "uuid", "email": "ada@example.com", "name": "Ada", ... }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing field, bad email or short password
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate().map_err(ApiError::from_validation)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "name".to_string(),
            message: "Name is required".to_string(),
        }]));
    }

    password::validate_password_length(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    if User::find_by_email(state.db(), &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let plaintext = req.password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plaintext))
        .await
        .map_err(|e| ApiError::InternalError(format!("Hashing task failed: {}", e)))??;

    // A concurrent registration can still win the race; the unique index
    // turns that into a conflict.
    let user = User::create(
        state.db(),
        CreateUser {
            email: req.email,
            name: req.name,
            password_hash,
        },
    )
    .await?;

    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "ada@example.com",
///   "password": "secret1"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing email or password
/// - `401 Unauthorized`: Unknown email or wrong password (same message)
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let Some(mut user) = User::find_by_email(state.db(), &req.email).await? else {
        // Spend the same Argon2 work as a wrong password would
        let plaintext = req.password;
        tokio::task::spawn_blocking(move || password::verify_without_account(&plaintext))
            .await
            .map_err(|e| ApiError::InternalError(format!("Verification task failed: {}", e)))?;
        tracing::debug!("Login for unknown email");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let plaintext = req.password;
    let stored_hash = user.password_hash.clone();
    let valid =
        tokio::task::spawn_blocking(move || password::verify_password(&plaintext, &stored_hash))
            .await
            .map_err(|e| ApiError::InternalError(format!("Verification task failed: {}", e)))??;

    if !valid {
        tracing::debug!(user_id = %user.id, "Password mismatch");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    User::update_last_login(state.db(), user.id).await?;
    user.last_login_at = Some(Utc::now());

    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Current user
///
/// # Endpoint
///
/// ```text
/// GET /v1/auth/me
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// - `404 Not Found`: The token's user no longer exists
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(state.db(), auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Update profile
///
/// # Endpoint
///
/// ```text
/// PATCH /v1/auth/me
/// Authorization: Bearer <token>
///
/// {
///   "name": "Ada L.",
///   "dailyGoal": 6000,
///   "preferences": { "units": "imperial", "theme": "dark" }
/// }
/// ```
///
/// Unknown preference values are rejected with `400`.
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    if let Some(goal) = req.daily_goal {
        if !goal.is_finite() || goal <= 0.0 {
            return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "dailyGoal".to_string(),
                message: "Daily goal must be a positive number".to_string(),
            }]));
        }
    }

    let prefs = req.preferences.unwrap_or_default();
    let user = User::update_profile(
        state.db(),
        auth.user_id,
        UpdateProfile {
            name: req.name,
            daily_goal: req.daily_goal,
            units: prefs.units,
            notifications: prefs.notifications,
            theme: prefs.theme,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_missing_fields_fail_validation() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"ada@example.com"}"#).unwrap();
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("name"));
    }

    #[test]
    fn test_register_request_rejects_bad_email() {
        let req = RegisterRequest {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
        };
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("email"));
    }

    #[test]
    fn test_register_request_rejects_email_longer_than_column() {
        let label = "d".repeat(60);
        let email = format!("{}@{}.{}.{}.{}.com", "a".repeat(64), label, label, label, label);
        assert_eq!(email.len(), 312);

        let req = RegisterRequest {
            name: "Ada".to_string(),
            email,
            password: "secret1".to_string(),
        };
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("email"));

        let short = RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(short.validate().is_ok());
    }

    #[test]
    fn test_update_request_rejects_unknown_theme() {
        let result =
            serde_json::from_str::<UpdateProfileRequest>(r#"{"preferences":{"theme":"sepia"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_request_accepts_partial_preferences() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"dailyGoal":6000,"preferences":{"units":"imperial"}}"#)
                .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.daily_goal, Some(6000.0));
        let prefs = req.preferences.unwrap();
        assert_eq!(prefs.units, Some(Units::Imperial));
        assert_eq!(prefs.theme, None);
    }

    #[test]
    fn test_user_response_nests_preferences_and_stats() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            daily_goal: 8000.0,
            units: Units::Metric,
            notifications: true,
            theme: Theme::Dark,
            total_scans: 2,
            total_co2: 120.5,
            streak_days: 0,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(json["preferences"]["theme"], "dark");
        assert_eq!(json["stats"]["totalCO2"], 120.5);
        assert_eq!(json["dailyGoal"], 8000.0);
        assert!(!json.to_string().contains("argon2id"));
    }
}
