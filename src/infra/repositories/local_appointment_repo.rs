use std::sync::Arc;
use async_trait::async_trait;
use crate::domain::{
    models::appointment::{Appointment, AppointmentChanges, NewAppointment},
    ports::AppointmentRepository,
};
use crate::error::AppError;
use crate::infra::local::{document_store::{keys, LocalDocumentStore}, ids::generate_id};

pub struct LocalAppointmentRepo {
    store: Arc<LocalDocumentStore>,
}

impl LocalAppointmentRepo {
    pub fn new(store: Arc<LocalDocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AppointmentRepository for LocalAppointmentRepo {
    async fn list(&self) -> Result<Vec<Appointment>, AppError> {
        self.store.load_list(keys::APPOINTMENTS).await
    }

    async fn list_for_customers(&self, customer_ids: &[String]) -> Result<Vec<Appointment>, AppError> {
        let all: Vec<Appointment> = self.store.load_list(keys::APPOINTMENTS).await?;
        Ok(all.into_iter().filter(|a| customer_ids.contains(&a.customer_id)).collect())
    }

    async fn insert(&self, appointment: &NewAppointment) -> Result<Appointment, AppError> {
        let created = Appointment {
            id: generate_id(),
            customer_id: appointment.customer_id.clone(),
            datetime: appointment.datetime,
            session_number: appointment.session_number,
            notes: appointment.notes.clone(),
        };
        let stored = created.clone();
        self.store.update_list(keys::APPOINTMENTS, move |items: &mut Vec<Appointment>| {
            items.push(stored);
            Ok(())
        }).await?;
        Ok(created)
    }

    async fn update(&self, id: &str, changes: &AppointmentChanges) -> Result<(), AppError> {
        if changes.is_empty() {
            return Ok(());
        }
        self.store.update_list(keys::APPOINTMENTS, |items: &mut Vec<Appointment>| {
            let appointment = items.iter_mut().find(|a| a.id == id)
                .ok_or_else(|| AppError::NotFound("Appointment not found".into()))?;
            changes.apply_to(appointment);
            Ok(())
        }).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store.update_list(keys::APPOINTMENTS, |items: &mut Vec<Appointment>| {
            let before = items.len();
            items.retain(|a| a.id != id);
            if items.len() == before {
                return Err(AppError::NotFound("Appointment not found".into()));
            }
            Ok(())
        }).await
    }

    async fn delete_by_customer(&self, customer_id: &str) -> Result<(), AppError> {
        self.store.update_list(keys::APPOINTMENTS, |items: &mut Vec<Appointment>| {
            items.retain(|a| a.customer_id != customer_id);
            Ok(())
        }).await
    }
}
