/// Request extractors
///
/// - [`CurrentUser`]: the identity bound to the request by a verified
///   bearer credential. Protected handlers take it as a parameter; there
///   is no middleware-injected state.
/// - [`ApiJson`]: `Json<T>` whose rejections become JSON `bad_request`
///   errors instead of axum's plain-text responses.
///
/// # Example
///
/// ```no_run
/// use ecolens_api::extract::CurrentUser;
///
/// async fn whoami(CurrentUser(auth): CurrentUser) -> String {
///     auth.email
/// }
/// ```

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    Json,
};
use ecolens_shared::auth::context::{authenticate_bearer, AuthContext};

use crate::{app::AppState, error::ApiError};

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthContext);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let auth = authenticate_bearer(header, state.jwt_secret())?;
        Ok(CurrentUser(auth))
    }
}

/// JSON body extractor with API-style rejections
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}
