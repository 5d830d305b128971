use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::auth::{CurrentUser, SESSION_COOKIE};
use crate::api::dtos::requests::{ChangePasswordRequest, CredentialsRequest};
use crate::api::dtos::responses::SessionResponse;
use crate::domain::models::session::Session;
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use tracing::info;

pub async fn register(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.auth_service.register(&payload.username, &payload.password).await?;
    state.clear_workspace().await;
    set_session_cookie(&cookies, &session);
    Ok((StatusCode::CREATED, Json(session.identity())))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.auth_service.login(&payload.username, &payload.password).await?;
    state.clear_workspace().await;
    set_session_cookie(&cookies, &session);
    Ok(Json(session.identity()))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    let token = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string());
    state.auth_service.logout(token.as_deref()).await?;
    state.clear_workspace().await;
    clear_session_cookie(&cookies);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn session(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    let user = match cookies.get(SESSION_COOKIE) {
        Some(cookie) => state.auth_service.get_session(cookie.value()).await?,
        None => None,
    };
    Ok(Json(SessionResponse { user }))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service
        .change_password(&identity.username, &payload.current_password, &payload.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    CurrentUser(identity): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    state.clear_workspace().await;
    state.auth_service.delete_account(&identity.id).await?;
    clear_session_cookie(&cookies);
    info!("Account closed: {}", identity.username);
    Ok(StatusCode::NO_CONTENT)
}

fn set_session_cookie(cookies: &Cookies, session: &Session) {
    let mut c = Cookie::new(SESSION_COOKIE, session.token.clone());
    c.set_http_only(true);
    c.set_secure(true);
    c.set_same_site(SameSite::Strict);
    c.set_path("/");
    cookies.add(c);
}

fn clear_session_cookie(cookies: &Cookies) {
    cookies.remove(Cookie::build((SESSION_COOKIE, "")).path("/").into());
}
