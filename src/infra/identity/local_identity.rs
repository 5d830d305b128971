use std::sync::Arc;
use async_trait::async_trait;
use crate::domain::models::{
    session::{generate_session_token, Session},
    user::{Identity, User},
};
use crate::domain::ports::{CredentialRepository, IdentityProvider};
use crate::domain::services::{auth_service::ensure_password_len, password::CredentialHasher};
use crate::error::AppError;
use crate::infra::local::ids::generate_user_id;

pub const LOCAL_MIN_PASSWORD_LEN: usize = 4;

/// Username/password accounts kept in the local credential store.
pub struct LocalIdentityProvider {
    credentials: Arc<dyn CredentialRepository>,
    hasher: CredentialHasher,
}

impl LocalIdentityProvider {
    pub fn new(credentials: Arc<dyn CredentialRepository>, hasher: CredentialHasher) -> Self {
        Self { credentials, hasher }
    }

    async fn start_session(&self, identity: &Identity) -> Result<Session, AppError> {
        let session = Session::new(identity, generate_session_token());
        self.credentials.save_session(Some(&session)).await?;
        Ok(session)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    fn min_password_len(&self) -> usize {
        LOCAL_MIN_PASSWORD_LEN
    }

    async fn sign_up(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let user = User {
            id: generate_user_id(),
            username: username.to_string(),
            password_hash: self.hasher.hash(username, password)?,
        };
        let created = self.credentials.create(&user).await?;

        self.start_session(&Identity::from(&created)).await
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let user = self.credentials.find_by_username(username).await?
            .ok_or_else(AppError::bad_credentials)?;

        if !self.hasher.verify(&user.username, password, &user.password_hash) {
            return Err(AppError::bad_credentials());
        }

        self.start_session(&Identity::from(&user)).await
    }

    async fn current_session(&self) -> Result<Option<Session>, AppError> {
        self.credentials.load_session().await
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        self.credentials.save_session(None).await
    }

    async fn change_password(&self, username: &str, current_password: &str, new_password: &str) -> Result<(), AppError> {
        let user = self.credentials.find_by_username(username).await?
            .ok_or_else(|| AppError::Auth("Current password is incorrect".into()))?;

        if !self.hasher.verify(&user.username, current_password, &user.password_hash) {
            return Err(AppError::Auth("Current password is incorrect".into()));
        }
        ensure_password_len(new_password, LOCAL_MIN_PASSWORD_LEN)?;

        let new_hash = self.hasher.hash(&user.username, new_password)?;
        self.credentials.update_password_hash(&user.id, &new_hash).await
    }

    async fn remove_user(&self, user_id: &str) -> Result<(), AppError> {
        self.credentials.delete(user_id).await
    }
}
