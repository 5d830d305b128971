use crate::domain::models::{
    appointment::{Appointment, AppointmentChanges, NewAppointment},
    customer::{Customer, CustomerChanges, NewCustomer},
    payment::{NewPayment, Payment, PaymentChanges},
    session::Session,
    training_record::{NewTrainingRecord, TrainingRecord, TrainingRecordChanges},
    user::User,
};
use crate::error::AppError;
use async_trait::async_trait;

/// Local user records plus the persisted current session.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> Result<(), AppError>;
    async fn delete(&self, user_id: &str) -> Result<(), AppError>;
    async fn load_session(&self) -> Result<Option<Session>, AppError>;
    async fn save_session(&self, session: Option<&Session>) -> Result<(), AppError>;
}

/// Whoever owns usernames and passwords: the local credential store or a hosted provider.
/// `username` arguments are already normalized. Sign-up and sign-in open a session
/// carrying a fresh token.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn min_password_len(&self) -> usize;
    async fn sign_up(&self, username: &str, password: &str) -> Result<Session, AppError>;
    async fn sign_in(&self, username: &str, password: &str) -> Result<Session, AppError>;
    async fn current_session(&self) -> Result<Option<Session>, AppError>;
    async fn sign_out(&self) -> Result<(), AppError>;
    /// Re-verifies `current_password` before replacing it.
    async fn change_password(&self, username: &str, current_password: &str, new_password: &str) -> Result<(), AppError>;
    async fn remove_user(&self, user_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Customer>, AppError>;
    async fn insert(&self, customer: &NewCustomer) -> Result<Customer, AppError>;
    async fn update(&self, id: &str, changes: &CustomerChanges) -> Result<(), AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    /// Tags ownerless legacy customers with `owner_id`. Returns how many were claimed.
    async fn claim_unowned(&self, owner_id: &str) -> Result<usize, AppError>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Appointment>, AppError>;
    async fn list_for_customers(&self, customer_ids: &[String]) -> Result<Vec<Appointment>, AppError>;
    async fn insert(&self, appointment: &NewAppointment) -> Result<Appointment, AppError>;
    async fn update(&self, id: &str, changes: &AppointmentChanges) -> Result<(), AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn delete_by_customer(&self, customer_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Payment>, AppError>;
    async fn insert(&self, payment: &NewPayment) -> Result<Payment, AppError>;
    async fn update(&self, id: &str, changes: &PaymentChanges) -> Result<(), AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn delete_by_customer(&self, customer_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait TrainingRecordRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<TrainingRecord>, AppError>;
    async fn insert(&self, record: &NewTrainingRecord) -> Result<TrainingRecord, AppError>;
    async fn update(&self, id: &str, changes: &TrainingRecordChanges) -> Result<(), AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn delete_by_customer(&self, customer_id: &str) -> Result<(), AppError>;
}
