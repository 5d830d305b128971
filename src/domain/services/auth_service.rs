use std::sync::Arc;
use tracing::{info, warn};
use crate::domain::models::session::Session;
use crate::domain::models::user::{normalize_username, Identity};
use crate::domain::ports::IdentityProvider;
use crate::domain::services::record_store::RecordStore;
use crate::error::AppError;

pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    records: RecordStore,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>, records: RecordStore) -> Self {
        Self { provider, records }
    }

    pub fn min_password_len(&self) -> usize {
        self.provider.min_password_len()
    }

    /// Creates the account and opens a session. The returned session carries the client's token.
    pub async fn register(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let username = normalize_username(username);
        require_credentials(&username, password)?;
        ensure_password_len(password, self.provider.min_password_len())?;

        let session = self.provider.sign_up(&username, password).await?;
        info!("Registered user: {}", session.id);
        Ok(session)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let username = normalize_username(username);
        require_credentials(&username, password)?;

        let session = self.provider.sign_in(&username, password).await?;
        info!("User logged in: {}", session.id);
        Ok(session)
    }

    /// Ends the session only when `token` is the one it was issued with. Idempotent.
    pub async fn logout(&self, token: Option<&str>) -> Result<(), AppError> {
        let Some(token) = token else {
            return Ok(());
        };
        if self.session_for(token).await?.is_none() {
            warn!("Logout with a stale or foreign session token ignored");
            return Ok(());
        }
        self.provider.sign_out().await?;
        info!("User logged out");
        Ok(())
    }

    /// The signed-in identity, if `token` belongs to the current session.
    pub async fn get_session(&self, token: &str) -> Result<Option<Identity>, AppError> {
        Ok(self.session_for(token).await?.map(|s| s.identity()))
    }

    async fn session_for(&self, token: &str) -> Result<Option<Session>, AppError> {
        Ok(self.provider.current_session().await?.filter(|s| s.is_held_by(token)))
    }

    pub async fn change_password(&self, username: &str, current_password: &str, new_password: &str) -> Result<(), AppError> {
        let username = normalize_username(username);
        self.provider.change_password(&username, current_password, new_password).await?;
        info!("Password changed for {}", username);
        Ok(())
    }

    /// Removes the user's customers (with their dependents), then the user, then the session.
    pub async fn delete_account(&self, user_id: &str) -> Result<(), AppError> {
        let removed = self.records.delete_customers_of(user_id).await?;
        self.provider.remove_user(user_id).await?;
        self.provider.sign_out().await?;
        info!("Deleted account {} and {} customer(s)", user_id, removed);
        Ok(())
    }
}

fn require_credentials(username: &str, password: &str) -> Result<(), AppError> {
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation("Username and password are required".into()));
    }
    Ok(())
}

/// Length is counted in UTF-16 code units, the way browser clients count it,
/// so an emoji counts as two.
pub(crate) fn ensure_password_len(password: &str, min: usize) -> Result<(), AppError> {
    if password.encode_utf16().count() < min {
        return Err(AppError::Validation(format!("Password must be at least {} characters", min)));
    }
    Ok(())
}
