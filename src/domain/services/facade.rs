//! Per-user view over the record store.
//!
//! Loads the four collections, keeps only what belongs to the signed-in
//! user's customers, and routes every mutation through the store. After a
//! write the view is either patched in place or reloaded, depending on the
//! store's [`SyncStrategy`].

use std::collections::HashSet;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};
use crate::domain::models::{
    appointment::{Appointment, AppointmentChanges, ConflictingAppointment, NewAppointment, MAX_SESSION_NUMBER},
    customer::{normalize_price, Customer, CustomerChanges, NewCustomer},
    payment::{sum_totals, NewPayment, Payment, PaymentChanges, PaymentDraft},
    training_record::{NewTrainingRecord, TrainingRecord, TrainingRecordChanges},
    user::Identity,
};
use crate::domain::services::conflicts;
use crate::domain::services::record_store::{RecordStore, SyncStrategy};
use crate::error::AppError;

const UNKNOWN_CUSTOMER: &str = "Unknown";

pub struct AppFacade {
    store: RecordStore,
    identity: Identity,
    customers: Vec<Customer>,
    appointments: Vec<Appointment>,
    payments: Vec<Payment>,
    training_records: Vec<TrainingRecord>,
}

impl AppFacade {
    /// Never fails: unreadable collections come back empty.
    pub async fn load(store: RecordStore, identity: Identity) -> Self {
        match store.customers.claim_unowned(&identity.id).await {
            Ok(0) => {}
            Ok(n) => info!("Assigned {} ownerless customer(s) to {}", n, identity.id),
            Err(e) => warn!("Could not assign ownerless customers: {}", e),
        }

        let customers = store.customers.list().await.unwrap_or_else(|e| {
            warn!("Loading customers failed, starting empty: {}", e);
            Vec::new()
        });
        let appointments = store.appointments.list().await.unwrap_or_else(|e| {
            warn!("Loading appointments failed, starting empty: {}", e);
            Vec::new()
        });
        let payments = store.payments.list().await.unwrap_or_else(|e| {
            warn!("Loading payments failed, starting empty: {}", e);
            Vec::new()
        });
        let training_records = store.training_records.list().await.unwrap_or_else(|e| {
            warn!("Loading training records failed, starting empty: {}", e);
            Vec::new()
        });

        let mut facade = Self {
            store,
            identity,
            customers: Vec::new(),
            appointments: Vec::new(),
            payments: Vec::new(),
            training_records: Vec::new(),
        };
        facade.replace_scoped(customers, appointments, payments, training_records);
        facade
    }

    /// Re-reads everything. On failure the current view is kept.
    pub async fn reload(&mut self) -> Result<(), AppError> {
        let customers = self.store.customers.list().await?;
        let appointments = self.store.appointments.list().await?;
        let payments = self.store.payments.list().await?;
        let training_records = self.store.training_records.list().await?;
        self.replace_scoped(customers, appointments, payments, training_records);
        Ok(())
    }

    fn replace_scoped(
        &mut self,
        customers: Vec<Customer>,
        appointments: Vec<Appointment>,
        payments: Vec<Payment>,
        training_records: Vec<TrainingRecord>,
    ) {
        let user_id = self.identity.id.as_str();
        self.customers = customers.into_iter().filter(|c| c.is_visible_to(user_id)).collect();

        let ids = self.customer_ids();
        self.appointments = appointments.into_iter().filter(|a| ids.contains(&a.customer_id)).collect();
        self.payments = payments.into_iter().filter(|p| ids.contains(&p.customer_id)).collect();
        self.training_records = training_records.into_iter().filter(|t| ids.contains(&t.customer_id)).collect();
    }

    async fn sync_after_write(&mut self, apply: impl FnOnce(&mut Self)) {
        match self.store.sync {
            SyncStrategy::InPlace => apply(self),
            SyncStrategy::Reload => {
                if let Err(e) = self.reload().await {
                    warn!("Reload after write failed, view may be stale: {}", e);
                }
            }
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn training_records(&self) -> &[TrainingRecord] {
        &self.training_records
    }

    pub fn customer_ids(&self) -> HashSet<String> {
        self.customers.iter().map(|c| c.id.clone()).collect()
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn appointments_for(&self, customer_id: &str) -> Vec<&Appointment> {
        self.appointments.iter().filter(|a| a.customer_id == customer_id).collect()
    }

    pub fn payments_for(&self, customer_id: &str) -> Vec<&Payment> {
        self.payments.iter().filter(|p| p.customer_id == customer_id).collect()
    }

    pub fn training_records_for(&self, customer_id: &str) -> Vec<&TrainingRecord> {
        self.training_records.iter().filter(|t| t.customer_id == customer_id).collect()
    }

    pub fn payment_total_for(&self, customer_id: &str) -> i64 {
        sum_totals(self.payments_for(customer_id))
    }

    pub fn payment_total(&self) -> i64 {
        sum_totals(&self.payments)
    }

    fn require_customer(&self, id: &str) -> Result<&Customer, AppError> {
        self.customer(id).ok_or_else(|| AppError::NotFound("Customer not found".into()))
    }

    fn require_appointment(&self, id: &str) -> Result<&Appointment, AppError> {
        self.appointments.iter().find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound("Appointment not found".into()))
    }

    fn require_payment(&self, id: &str) -> Result<&Payment, AppError> {
        self.payments.iter().find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound("Payment not found".into()))
    }

    /// Rejects a write whose amount would push the visible payment total past `i64`.
    fn ensure_totals_fit(&self, replaced: i64, amount: i64) -> Result<(), AppError> {
        self.payments.iter()
            .try_fold(0i64, |sum, p| sum.checked_add(p.total()))
            .and_then(|sum| sum.checked_sub(replaced))
            .and_then(|sum| sum.checked_add(amount))
            .map(|_| ())
            .ok_or_else(amount_too_large)
    }

    fn require_training_record(&self, id: &str) -> Result<&TrainingRecord, AppError> {
        self.training_records.iter().find(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound("Training record not found".into()))
    }

    pub async fn add_customer(&mut self, name: &str, price_per_4_sessions: Option<i64>) -> Result<Customer, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Customer name is required".into()));
        }

        let draft = NewCustomer {
            owner_user_id: self.identity.id.clone(),
            name: name.to_string(),
            price_per_4_sessions: normalize_price(price_per_4_sessions),
        };
        let created = self.store.customers.insert(&draft).await?;
        info!("Created customer: {}", created.id);

        let added = created.clone();
        self.sync_after_write(move |f| f.customers.push(added)).await;
        Ok(created)
    }

    pub async fn update_customer(&mut self, id: &str, changes: CustomerChanges) -> Result<(), AppError> {
        self.require_customer(id)?;
        if changes.is_empty() {
            return Ok(());
        }

        let changes = CustomerChanges {
            name: match changes.name {
                Some(n) if n.trim().is_empty() => {
                    return Err(AppError::Validation("Customer name is required".into()));
                }
                Some(n) => Some(n.trim().to_string()),
                None => None,
            },
            price_per_4_sessions: changes.price_per_4_sessions.map(|p| normalize_price(Some(p))),
        };

        self.store.customers.update(id, &changes).await?;
        info!("Updated customer: {}", id);

        self.sync_after_write(|f| {
            if let Some(c) = f.customers.iter_mut().find(|c| c.id == id) {
                changes.apply_to(c);
            }
        }).await;
        Ok(())
    }

    pub async fn delete_customer(&mut self, id: &str) -> Result<(), AppError> {
        self.require_customer(id)?;

        if let Err(e) = self.store.delete_customer_cascade(id).await {
            if matches!(e, AppError::PartialCascade { .. })
                && let Err(reload_err) = self.reload().await
            {
                warn!("Reload after partial cascade failed: {}", reload_err);
            }
            return Err(e);
        }

        self.sync_after_write(|f| {
            f.customers.retain(|c| c.id != id);
            f.appointments.retain(|a| a.customer_id != id);
            f.payments.retain(|p| p.customer_id != id);
            f.training_records.retain(|t| t.customer_id != id);
        }).await;
        Ok(())
    }

    /// Advisory check: existing appointments of this user's customers within the hour.
    pub async fn find_conflicts(&self, datetime: DateTime<Utc>, exclude_id: Option<&str>) -> Result<Vec<ConflictingAppointment>, AppError> {
        let scope = self.customer_ids();
        if scope.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = scope.iter().cloned().collect();
        let candidates = self.store.appointments.list_for_customers(&ids).await?;

        let found = conflicts::find_conflicts(datetime, &candidates, exclude_id, Some(&scope))
            .into_iter()
            .map(|a| ConflictingAppointment {
                appointment: a.clone(),
                customer_name: self.customer(&a.customer_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
            })
            .collect();
        Ok(found)
    }

    /// Refuses with `ScheduleConflict` when the slot collides, unless `force` is set.
    pub async fn schedule_appointment(&mut self, draft: NewAppointment, force: bool) -> Result<Appointment, AppError> {
        self.require_customer(&draft.customer_id)?;
        validate_session_number(draft.session_number)?;

        if !force {
            let found = self.find_conflicts(draft.datetime, None).await?;
            if !found.is_empty() {
                return Err(AppError::ScheduleConflict(found));
            }
        }

        let created = self.store.appointments.insert(&draft).await?;
        info!("Scheduled appointment {} for customer {}", created.id, created.customer_id);

        let added = created.clone();
        self.sync_after_write(move |f| f.appointments.push(added)).await;
        Ok(created)
    }

    pub async fn update_appointment(&mut self, id: &str, changes: AppointmentChanges, force: bool) -> Result<(), AppError> {
        self.require_appointment(id)?;
        if changes.is_empty() {
            return Ok(());
        }
        if let Some(n) = changes.session_number {
            validate_session_number(n)?;
        }

        if let Some(datetime) = changes.datetime
            && !force
        {
            let found = self.find_conflicts(datetime, Some(id)).await?;
            if !found.is_empty() {
                return Err(AppError::ScheduleConflict(found));
            }
        }

        let changes = AppointmentChanges {
            notes: changes.notes.map(|n| n.trim().to_string()),
            ..changes
        };
        self.store.appointments.update(id, &changes).await?;
        info!("Updated appointment: {}", id);

        self.sync_after_write(|f| {
            if let Some(a) = f.appointments.iter_mut().find(|a| a.id == id) {
                changes.apply_to(a);
            }
        }).await;
        Ok(())
    }

    pub async fn delete_appointment(&mut self, id: &str) -> Result<(), AppError> {
        self.require_appointment(id)?;
        self.store.appointments.delete(id).await?;
        info!("Deleted appointment: {}", id);

        self.sync_after_write(|f| f.appointments.retain(|a| a.id != id)).await;
        Ok(())
    }

    pub async fn add_payment(&mut self, draft: PaymentDraft) -> Result<Payment, AppError> {
        let customer = self.require_customer(&draft.customer_id)?;
        let unit_price = draft.unit_price.unwrap_or_else(|| customer.bundle_price());

        if draft.sets < 1 {
            return Err(AppError::Validation("At least one set is required".into()));
        }
        if unit_price <= 0 {
            return Err(AppError::Validation("Unit price must be positive".into()));
        }
        let amount = checked_amount(draft.sets, unit_price)?;
        self.ensure_totals_fit(0, amount)?;

        let payment = NewPayment {
            customer_id: draft.customer_id,
            sets: draft.sets,
            unit_price,
            date: draft.date,
            for_period: draft.for_period.unwrap_or_default().trim().to_string(),
            note: draft.note.unwrap_or_default().trim().to_string(),
        };
        let created = self.store.payments.insert(&payment).await?;
        info!("Recorded payment {} of {} for customer {}", created.id, created.total(), created.customer_id);

        let added = created.clone();
        self.sync_after_write(move |f| f.payments.push(added)).await;
        Ok(created)
    }

    pub async fn update_payment(&mut self, id: &str, changes: PaymentChanges) -> Result<(), AppError> {
        let current = self.require_payment(id)?.clone();
        if changes.is_empty() {
            return Ok(());
        }
        if changes.sets.is_some_and(|s| s < 1) {
            return Err(AppError::Validation("At least one set is required".into()));
        }
        if changes.unit_price.is_some_and(|u| u <= 0) {
            return Err(AppError::Validation("Unit price must be positive".into()));
        }
        if (changes.sets.is_some() || changes.unit_price.is_some())
            && let (Some(sets), Some(unit_price)) = (changes.sets.or(current.sets), changes.unit_price.or(current.unit_price))
        {
            let amount = checked_amount(sets, unit_price)?;
            self.ensure_totals_fit(current.total(), amount)?;
        }

        let changes = PaymentChanges {
            for_period: changes.for_period.map(|s| s.trim().to_string()),
            note: changes.note.map(|s| s.trim().to_string()),
            ..changes
        };
        self.store.payments.update(id, &changes).await?;
        info!("Updated payment: {}", id);

        self.sync_after_write(|f| {
            if let Some(p) = f.payments.iter_mut().find(|p| p.id == id) {
                changes.apply_to(p);
            }
        }).await;
        Ok(())
    }

    pub async fn delete_payment(&mut self, id: &str) -> Result<(), AppError> {
        self.require_payment(id)?;
        self.store.payments.delete(id).await?;
        info!("Deleted payment: {}", id);

        self.sync_after_write(|f| f.payments.retain(|p| p.id != id)).await;
        Ok(())
    }

    pub async fn add_training_record(&mut self, customer_id: &str, date: NaiveDate, content: &str) -> Result<TrainingRecord, AppError> {
        self.require_customer(customer_id)?;

        let record = NewTrainingRecord {
            customer_id: customer_id.to_string(),
            date,
            content: content.trim().to_string(),
        };
        let created = self.store.training_records.insert(&record).await?;
        info!("Added training record {} for customer {}", created.id, created.customer_id);

        let added = created.clone();
        self.sync_after_write(move |f| f.training_records.push(added)).await;
        Ok(created)
    }

    pub async fn update_training_record(&mut self, id: &str, changes: TrainingRecordChanges) -> Result<(), AppError> {
        self.require_training_record(id)?;
        if changes.is_empty() {
            return Ok(());
        }

        let changes = TrainingRecordChanges {
            content: changes.content.map(|c| c.trim().to_string()),
            ..changes
        };
        self.store.training_records.update(id, &changes).await?;
        info!("Updated training record: {}", id);

        self.sync_after_write(|f| {
            if let Some(t) = f.training_records.iter_mut().find(|t| t.id == id) {
                changes.apply_to(t);
            }
        }).await;
        Ok(())
    }

    pub async fn delete_training_record(&mut self, id: &str) -> Result<(), AppError> {
        self.require_training_record(id)?;
        self.store.training_records.delete(id).await?;
        info!("Deleted training record: {}", id);

        self.sync_after_write(|f| f.training_records.retain(|t| t.id != id)).await;
        Ok(())
    }
}

fn validate_session_number(n: i32) -> Result<(), AppError> {
    if !(1..=MAX_SESSION_NUMBER).contains(&n) {
        return Err(AppError::Validation(format!("Session number must be between 1 and {}", MAX_SESSION_NUMBER)));
    }
    Ok(())
}

fn checked_amount(sets: i64, unit_price: i64) -> Result<i64, AppError> {
    sets.checked_mul(unit_price).ok_or_else(amount_too_large)
}

fn amount_too_large() -> AppError {
    AppError::Validation("Payment amount is too large".into())
}
