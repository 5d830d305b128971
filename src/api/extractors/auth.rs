use axum::{
    extract::{FromRequestParts, FromRef},
    http::request::Parts,
};
use crate::state::AppState;
use crate::domain::models::user::Identity;
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::Span;

pub const SESSION_COOKIE: &str = "session_token";

/// The identity behind the request's session cookie. Requests without a cookie,
/// or with one that doesn't match the open session, are rejected with 401.
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = parts.extensions.get::<Cookies>()
            .ok_or(AppError::Internal)?;

        let token = cookies.get(SESSION_COOKIE)
            .ok_or(AppError::Unauthorized)?
            .value()
            .to_string();

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let identity = app_state.auth_service.get_session(&token).await?
            .ok_or(AppError::Unauthorized)?;

        Span::current().record("user_id", identity.id.as_str());

        Ok(CurrentUser(identity))
    }
}
