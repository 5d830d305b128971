use std::sync::Arc;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use crate::config::Config;
use crate::domain::models::user::Identity;
use crate::domain::services::{auth_service::AuthService, facade::AppFacade, record_store::RecordStore};
use crate::error::AppError;

pub struct AppState {
    pub config: Config,
    pub auth_service: Arc<AuthService>,
    pub records: RecordStore,
    /// The signed-in user's view. Holding the guard serializes mutations.
    workspace: Mutex<Option<AppFacade>>,
}

impl AppState {
    pub fn new(config: Config, auth_service: Arc<AuthService>, records: RecordStore) -> Self {
        Self {
            config,
            auth_service,
            records,
            workspace: Mutex::new(None),
        }
    }

    /// The facade for `identity`, loading it on first use or when the user changed.
    pub async fn workspace(&self, identity: &Identity) -> Result<MappedMutexGuard<'_, AppFacade>, AppError> {
        let mut slot = self.workspace.lock().await;
        if slot.as_ref().is_none_or(|f| f.identity() != identity) {
            *slot = Some(AppFacade::load(self.records.clone(), identity.clone()).await);
        }
        MutexGuard::try_map(slot, |s| s.as_mut()).map_err(|_| AppError::Internal)
    }

    pub async fn clear_workspace(&self) {
        *self.workspace.lock().await = None;
    }
}
