use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use crate::domain::{
    models::customer::{Customer, CustomerChanges, NewCustomer},
    ports::CustomerRepository,
};
use crate::error::AppError;
use crate::infra::local::{document_store::{keys, LocalDocumentStore}, ids::generate_id};

pub struct LocalCustomerRepo {
    store: Arc<LocalDocumentStore>,
}

impl LocalCustomerRepo {
    pub fn new(store: Arc<LocalDocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CustomerRepository for LocalCustomerRepo {
    async fn list(&self) -> Result<Vec<Customer>, AppError> {
        self.store.load_list(keys::CUSTOMERS).await
    }

    async fn insert(&self, customer: &NewCustomer) -> Result<Customer, AppError> {
        let created = Customer {
            id: generate_id(),
            name: customer.name.clone(),
            owner_user_id: Some(customer.owner_user_id.clone()),
            price_per_4_sessions: customer.price_per_4_sessions,
            created_at: Utc::now(),
        };
        let stored = created.clone();
        self.store.update_list(keys::CUSTOMERS, move |items: &mut Vec<Customer>| {
            items.push(stored);
            Ok(())
        }).await?;
        Ok(created)
    }

    async fn update(&self, id: &str, changes: &CustomerChanges) -> Result<(), AppError> {
        if changes.is_empty() {
            return Ok(());
        }
        self.store.update_list(keys::CUSTOMERS, |items: &mut Vec<Customer>| {
            let customer = items.iter_mut().find(|c| c.id == id)
                .ok_or_else(|| AppError::NotFound("Customer not found".into()))?;
            changes.apply_to(customer);
            Ok(())
        }).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store.update_list(keys::CUSTOMERS, |items: &mut Vec<Customer>| {
            let before = items.len();
            items.retain(|c| c.id != id);
            if items.len() == before {
                return Err(AppError::NotFound("Customer not found".into()));
            }
            Ok(())
        }).await
    }

    async fn claim_unowned(&self, owner_id: &str) -> Result<usize, AppError> {
        let stored: Vec<Customer> = self.store.load_list(keys::CUSTOMERS).await?;
        if stored.iter().all(|c| c.owner_user_id.is_some()) {
            return Ok(0);
        }
        self.store.update_list(keys::CUSTOMERS, |items: &mut Vec<Customer>| {
            let mut claimed = 0;
            for c in items.iter_mut().filter(|c| c.owner_user_id.is_none()) {
                c.owner_user_id = Some(owner_id.to_string());
                claimed += 1;
            }
            Ok(claimed)
        }).await
    }
}
