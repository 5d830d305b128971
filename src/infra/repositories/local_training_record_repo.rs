use std::sync::Arc;
use async_trait::async_trait;
use crate::domain::{
    models::training_record::{NewTrainingRecord, TrainingRecord, TrainingRecordChanges},
    ports::TrainingRecordRepository,
};
use crate::error::AppError;
use crate::infra::local::{document_store::{keys, LocalDocumentStore}, ids::generate_id};

pub struct LocalTrainingRecordRepo {
    store: Arc<LocalDocumentStore>,
}

impl LocalTrainingRecordRepo {
    pub fn new(store: Arc<LocalDocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TrainingRecordRepository for LocalTrainingRecordRepo {
    async fn list(&self) -> Result<Vec<TrainingRecord>, AppError> {
        self.store.load_list(keys::TRAINING_RECORDS).await
    }

    async fn insert(&self, record: &NewTrainingRecord) -> Result<TrainingRecord, AppError> {
        let created = TrainingRecord {
            id: generate_id(),
            customer_id: record.customer_id.clone(),
            date: record.date,
            content: record.content.clone(),
        };
        let stored = created.clone();
        self.store.update_list(keys::TRAINING_RECORDS, move |items: &mut Vec<TrainingRecord>| {
            items.push(stored);
            Ok(())
        }).await?;
        Ok(created)
    }

    async fn update(&self, id: &str, changes: &TrainingRecordChanges) -> Result<(), AppError> {
        if changes.is_empty() {
            return Ok(());
        }
        self.store.update_list(keys::TRAINING_RECORDS, |items: &mut Vec<TrainingRecord>| {
            let record = items.iter_mut().find(|t| t.id == id)
                .ok_or_else(|| AppError::NotFound("Training record not found".into()))?;
            changes.apply_to(record);
            Ok(())
        }).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store.update_list(keys::TRAINING_RECORDS, |items: &mut Vec<TrainingRecord>| {
            let before = items.len();
            items.retain(|t| t.id != id);
            if items.len() == before {
                return Err(AppError::NotFound("Training record not found".into()));
            }
            Ok(())
        }).await
    }

    async fn delete_by_customer(&self, customer_id: &str) -> Result<(), AppError> {
        self.store.update_list(keys::TRAINING_RECORDS, |items: &mut Vec<TrainingRecord>| {
            items.retain(|t| t.customer_id != customer_id);
            Ok(())
        }).await
    }
}
