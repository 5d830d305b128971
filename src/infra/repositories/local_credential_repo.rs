use std::sync::Arc;
use async_trait::async_trait;
use crate::domain::{
    models::{session::Session, user::User},
    ports::CredentialRepository,
};
use crate::error::AppError;
use crate::infra::local::document_store::{keys, LocalDocumentStore};

pub struct LocalCredentialRepo {
    store: Arc<LocalDocumentStore>,
}

impl LocalCredentialRepo {
    pub fn new(store: Arc<LocalDocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialRepository for LocalCredentialRepo {
    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.store.load_list(keys::USERS).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let wanted = username.to_lowercase();
        let users: Vec<User> = self.store.load_list(keys::USERS).await?;
        Ok(users.into_iter().find(|u| u.username.to_lowercase() == wanted))
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let stored = user.clone();
        self.store.update_list(keys::USERS, move |users: &mut Vec<User>| {
            let wanted = stored.username.to_lowercase();
            if users.iter().any(|u| u.username.to_lowercase() == wanted) {
                return Err(AppError::DuplicateUser);
            }
            users.push(stored);
            Ok(())
        }).await?;
        Ok(user.clone())
    }

    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> Result<(), AppError> {
        self.store.update_list(keys::USERS, |users: &mut Vec<User>| {
            let user = users.iter_mut().find(|u| u.id == user_id)
                .ok_or_else(|| AppError::NotFound("User not found".into()))?;
            user.password_hash = password_hash.to_string();
            Ok(())
        }).await
    }

    async fn delete(&self, user_id: &str) -> Result<(), AppError> {
        self.store.update_list(keys::USERS, |users: &mut Vec<User>| {
            users.retain(|u| u.id != user_id);
            Ok(())
        }).await
    }

    async fn load_session(&self) -> Result<Option<Session>, AppError> {
        self.store.load_value(keys::SESSION).await
    }

    async fn save_session(&self, session: Option<&Session>) -> Result<(), AppError> {
        match session {
            Some(s) => self.store.save(keys::SESSION, s).await,
            None => self.store.remove(keys::SESSION).await,
        }
    }
}
