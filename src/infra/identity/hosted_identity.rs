use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{error, warn};
use crate::domain::models::{
    session::{generate_session_token, Session},
    user::Identity,
};
use crate::domain::ports::IdentityProvider;
use crate::domain::services::auth_service::ensure_password_len;
use crate::error::AppError;

pub const HOSTED_MIN_PASSWORD_LEN: usize = 6;
const FALLBACK_USERNAME: &str = "user";

#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Value,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: RemoteUser,
}

struct HostedSession {
    access_token: String,
    session: Session,
}

/// Accounts held by a GoTrue-compatible identity service. Usernames travel as
/// `<username><email_domain>` because the service keys users by e-mail.
pub struct HostedIdentityProvider {
    client: Client,
    base_url: String,
    api_key: String,
    service_key: Option<String>,
    email_domain: String,
    session: RwLock<Option<HostedSession>>,
}

impl HostedIdentityProvider {
    pub fn new(base_url: String, api_key: String, service_key: Option<String>, email_domain: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            service_key,
            email_domain,
            session: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    async fn password_grant(&self, username: &str, password: &str) -> Result<TokenResponse, AppError> {
        let res = self.client.post(self.url("/token?grant_type=password"))
            .header("apikey", &self.api_key)
            .json(&json!({
                "email": synthetic_email(username, &self.email_domain),
                "password": password,
            }))
            .send()
            .await
            .map_err(connection_error)?;

        if !res.status().is_success() {
            let (status, message) = read_failure(res).await;
            return Err(sign_in_failure(status, message));
        }

        res.json::<TokenResponse>().await.map_err(decode_error)
    }

    async fn remember(&self, token: TokenResponse) -> Session {
        let identity = to_identity(&token.user, &self.email_domain);
        let session = Session::new(&identity, generate_session_token());
        *self.session.write().await = Some(HostedSession {
            access_token: token.access_token,
            session: session.clone(),
        });
        session
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentityProvider {
    fn min_password_len(&self) -> usize {
        HOSTED_MIN_PASSWORD_LEN
    }

    async fn sign_up(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let res = self.client.post(self.url("/signup"))
            .header("apikey", &self.api_key)
            .json(&json!({
                "email": synthetic_email(username, &self.email_domain),
                "password": password,
                "data": { "display_username": username },
            }))
            .send()
            .await
            .map_err(connection_error)?;

        if !res.status().is_success() {
            let (status, message) = read_failure(res).await;
            if message.contains("already registered") {
                return Err(AppError::DuplicateUser);
            }
            return Err(remote_failure(status, message));
        }

        let body: Value = res.json().await.map_err(decode_error)?;

        // With auto-confirm the service answers with a full session; otherwise with the
        // bare user, and a password grant opens the session (or fails until confirmed).
        if body.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(body).map_err(|e| decode_error(e.to_string()))?;
            return Ok(self.remember(token).await);
        }
        let token = self.password_grant(username, password).await?;
        Ok(self.remember(token).await)
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let token = self.password_grant(username, password).await?;
        Ok(self.remember(token).await)
    }

    async fn current_session(&self) -> Result<Option<Session>, AppError> {
        Ok(self.session.read().await.as_ref().map(|s| s.session.clone()))
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        let Some(session) = self.session.write().await.take() else {
            return Ok(());
        };

        let res = self.client.post(self.url("/logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await;

        match res {
            Ok(r) if r.status().is_success() => {}
            Ok(r) => warn!("Remote sign-out answered {}, local session cleared anyway", r.status()),
            Err(e) => warn!("Remote sign-out failed, local session cleared anyway: {}", e),
        }
        Ok(())
    }

    async fn change_password(&self, username: &str, current_password: &str, new_password: &str) -> Result<(), AppError> {
        let token = self.password_grant(username, current_password).await
            .map_err(|e| match e {
                AppError::Auth(_) => AppError::Auth("Current password is incorrect".into()),
                other => other,
            })?;
        ensure_password_len(new_password, HOSTED_MIN_PASSWORD_LEN)?;

        let res = self.client.put(self.url("/user"))
            .header("apikey", &self.api_key)
            .bearer_auth(&token.access_token)
            .json(&json!({ "password": new_password }))
            .send()
            .await
            .map_err(connection_error)?;

        if !res.status().is_success() {
            let (status, message) = read_failure(res).await;
            return Err(remote_failure(status, message));
        }

        // Keep the caller's session token; only the upstream access token rotates.
        if let Some(current) = self.session.write().await.as_mut()
            && current.session.id == token.user.id
        {
            current.access_token = token.access_token;
        }
        Ok(())
    }

    async fn remove_user(&self, user_id: &str) -> Result<(), AppError> {
        let service_key = self.service_key.as_ref()
            .ok_or_else(|| AppError::Storage("removing hosted accounts needs IDENTITY_SERVICE_KEY".into()))?;

        let res = self.client.delete(self.url(&format!("/admin/users/{}", user_id)))
            .header("apikey", service_key)
            .bearer_auth(service_key)
            .send()
            .await
            .map_err(connection_error)?;

        if !res.status().is_success() {
            let (status, message) = read_failure(res).await;
            return Err(remote_failure(status, message));
        }
        Ok(())
    }
}

pub fn synthetic_email(username: &str, domain: &str) -> String {
    format!("{}{}", username.trim().to_lowercase(), domain)
}

fn to_identity(user: &RemoteUser, domain: &str) -> Identity {
    let username = user.user_metadata.get("display_username")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| user.email.as_deref().map(|e| e.trim_end_matches(domain).to_string()))
        .unwrap_or_else(|| FALLBACK_USERNAME.to_string());

    Identity { id: user.id.clone(), username }
}

/// GoTrue puts the human-readable reason in one of several fields depending on version.
fn error_message(body: &Value) -> String {
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .unwrap_or("identity service request failed")
        .to_string()
}

async fn read_failure(res: Response) -> (StatusCode, String) {
    let status = res.status();
    let body: Value = res.json().await.unwrap_or(Value::Null);
    (status, error_message(&body))
}

/// A refused password grant. GoTrue answers 400 for both unknown e-mail and wrong
/// password; both become the generic bad-credentials error.
fn sign_in_failure(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::BAD_REQUEST || message.contains("Invalid login") {
        return AppError::bad_credentials();
    }
    remote_failure(status, message)
}

fn remote_failure(status: StatusCode, message: String) -> AppError {
    if status.is_server_error() {
        error!("Identity service failed. Status: {}, Message: {}", status, message);
        return AppError::Storage(message);
    }
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        return AppError::Validation(message);
    }
    AppError::Auth(message)
}

fn connection_error(e: reqwest::Error) -> AppError {
    let msg = format!("Identity service connection error: {}", e);
    error!("{}", msg);
    AppError::Storage(msg)
}

fn decode_error(e: impl ToString) -> AppError {
    let msg = format!("Unexpected identity service response: {}", e.to_string());
    error!("{}", msg);
    AppError::Storage(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: &str = "@trainer.app";

    #[test]
    fn test_synthetic_email_normalizes_username() {
        assert_eq!(synthetic_email("  Trainer1 ", DOMAIN), "trainer1@trainer.app");
    }

    #[test]
    fn test_identity_prefers_display_username() {
        let user: RemoteUser = serde_json::from_value(json!({
            "id": "abc",
            "email": "someone@trainer.app",
            "user_metadata": { "display_username": "trainer1" }
        })).unwrap();
        assert_eq!(to_identity(&user, DOMAIN), Identity { id: "abc".into(), username: "trainer1".into() });
    }

    #[test]
    fn test_identity_falls_back_to_email_then_placeholder() {
        let from_email: RemoteUser = serde_json::from_value(json!({
            "id": "1", "email": "bob@trainer.app"
        })).unwrap();
        assert_eq!(to_identity(&from_email, DOMAIN).username, "bob");

        let bare: RemoteUser = serde_json::from_value(json!({ "id": "2" })).unwrap();
        assert_eq!(to_identity(&bare, DOMAIN).username, "user");
    }

    #[test]
    fn test_error_message_field_precedence() {
        assert_eq!(error_message(&json!({"error": "x", "error_description": "Invalid login credentials"})), "Invalid login credentials");
        assert_eq!(error_message(&json!({"msg": "User already registered"})), "User already registered");
        assert_eq!(error_message(&Value::Null), "identity service request failed");
    }

    #[test]
    fn test_sign_in_failures_collapse_to_bad_credentials() {
        let wrong_password = sign_in_failure(StatusCode::BAD_REQUEST, "Invalid login credentials".into());
        let unknown_user = sign_in_failure(StatusCode::BAD_REQUEST, "invalid_grant".into());
        let odd_status = sign_in_failure(StatusCode::UNAUTHORIZED, "Invalid login credentials".into());

        for err in [&wrong_password, &unknown_user, &odd_status] {
            assert_eq!(err.to_string(), AppError::bad_credentials().to_string());
        }
    }

    #[test]
    fn test_sign_in_outages_are_not_reported_as_bad_credentials() {
        assert!(matches!(sign_in_failure(StatusCode::SERVICE_UNAVAILABLE, "down".into()), AppError::Storage(_)));
        assert!(matches!(sign_in_failure(StatusCode::TOO_MANY_REQUESTS, "slow down".into()), AppError::Auth(m) if m == "slow down"));
    }

    #[test]
    fn test_remote_failure_classification() {
        assert!(matches!(remote_failure(StatusCode::BAD_GATEWAY, "down".into()), AppError::Storage(_)));
        assert!(matches!(remote_failure(StatusCode::UNPROCESSABLE_ENTITY, "weak".into()), AppError::Validation(_)));
        assert!(matches!(remote_failure(StatusCode::UNAUTHORIZED, "nope".into()), AppError::Auth(_)));
    }
}
