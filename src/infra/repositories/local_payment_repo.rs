use std::sync::Arc;
use async_trait::async_trait;
use crate::domain::{
    models::payment::{NewPayment, Payment, PaymentChanges},
    ports::PaymentRepository,
};
use crate::error::AppError;
use crate::infra::local::{document_store::{keys, LocalDocumentStore}, ids::generate_id};

pub struct LocalPaymentRepo {
    store: Arc<LocalDocumentStore>,
}

impl LocalPaymentRepo {
    pub fn new(store: Arc<LocalDocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PaymentRepository for LocalPaymentRepo {
    async fn list(&self) -> Result<Vec<Payment>, AppError> {
        self.store.load_list(keys::PAYMENTS).await
    }

    async fn insert(&self, payment: &NewPayment) -> Result<Payment, AppError> {
        let created = Payment {
            id: generate_id(),
            customer_id: payment.customer_id.clone(),
            sets: Some(payment.sets),
            unit_price: Some(payment.unit_price),
            amount: payment.amount(),
            date: payment.date,
            for_period: payment.for_period.clone(),
            note: payment.note.clone(),
        };
        let stored = created.clone();
        self.store.update_list(keys::PAYMENTS, move |items: &mut Vec<Payment>| {
            items.push(stored);
            Ok(())
        }).await?;
        Ok(created)
    }

    async fn update(&self, id: &str, changes: &PaymentChanges) -> Result<(), AppError> {
        if changes.is_empty() {
            return Ok(());
        }
        self.store.update_list(keys::PAYMENTS, |items: &mut Vec<Payment>| {
            let payment = items.iter_mut().find(|p| p.id == id)
                .ok_or_else(|| AppError::NotFound("Payment not found".into()))?;
            changes.apply_to(payment);
            Ok(())
        }).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store.update_list(keys::PAYMENTS, |items: &mut Vec<Payment>| {
            let before = items.len();
            items.retain(|p| p.id != id);
            if items.len() == before {
                return Err(AppError::NotFound("Payment not found".into()));
            }
            Ok(())
        }).await
    }

    async fn delete_by_customer(&self, customer_id: &str) -> Result<(), AppError> {
        self.store.update_list(keys::PAYMENTS, |items: &mut Vec<Payment>| {
            items.retain(|p| p.customer_id != customer_id);
            Ok(())
        }).await
    }
}
