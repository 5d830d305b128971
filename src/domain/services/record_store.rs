use std::sync::Arc;
use tracing::{info, warn};
use crate::domain::models::customer::Customer;
use crate::domain::ports::{
    AppointmentRepository, CustomerRepository, PaymentRepository, TrainingRecordRepository,
};
use crate::error::AppError;

/// How the facade keeps its in-memory view current after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Apply the change to memory directly; the store holds nothing the facade doesn't.
    InPlace,
    /// Re-read every collection; the backend is authoritative.
    Reload,
}

/// The four domain collections behind one handle.
#[derive(Clone)]
pub struct RecordStore {
    pub customers: Arc<dyn CustomerRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub training_records: Arc<dyn TrainingRecordRepository>,
    pub sync: SyncStrategy,
}

impl RecordStore {
    /// Deletes a customer and everything hanging off it, one collection at a time.
    /// A failure after the first step is reported as `PartialCascade`.
    pub async fn delete_customer_cascade(&self, customer_id: &str) -> Result<(), AppError> {
        let mut completed: Vec<&'static str> = Vec::new();

        if let Err(e) = self.appointments.delete_by_customer(customer_id).await {
            return Err(cascade_failure(&completed, "appointments", e));
        }
        completed.push("appointments");

        if let Err(e) = self.payments.delete_by_customer(customer_id).await {
            return Err(cascade_failure(&completed, "payments", e));
        }
        completed.push("payments");

        if let Err(e) = self.training_records.delete_by_customer(customer_id).await {
            return Err(cascade_failure(&completed, "training records", e));
        }
        completed.push("training records");

        if let Err(e) = self.customers.delete(customer_id).await {
            return Err(cascade_failure(&completed, "customer", e));
        }

        info!("Deleted customer {} with dependent records", customer_id);
        Ok(())
    }

    /// Removes every customer owned by `user_id`, cascading each.
    pub async fn delete_customers_of(&self, user_id: &str) -> Result<usize, AppError> {
        let owned: Vec<Customer> = self.customers.list().await?
            .into_iter()
            .filter(|c| c.owner_user_id.as_deref() == Some(user_id))
            .collect();

        for (done, customer) in owned.iter().enumerate() {
            if let Err(e) = self.delete_customer_cascade(&customer.id).await {
                if done == 0 {
                    return Err(e);
                }
                return Err(match e {
                    AppError::PartialCascade { .. } => e,
                    other => AppError::PartialCascade {
                        completed: format!("{} customer(s)", done),
                        failed: format!("customer {}", customer.id),
                        reason: other.to_string(),
                    },
                });
            }
        }
        Ok(owned.len())
    }
}

fn cascade_failure(completed: &[&'static str], failed: &'static str, source: AppError) -> AppError {
    if completed.is_empty() {
        return source;
    }
    warn!("Cascade stopped at {} after removing {}", failed, completed.join(", "));
    AppError::PartialCascade {
        completed: completed.join(", "),
        failed: failed.to_string(),
        reason: source.to_string(),
    }
}
