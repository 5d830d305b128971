pub mod local_appointment_repo;
pub mod local_credential_repo;
pub mod local_customer_repo;
pub mod local_payment_repo;
pub mod local_training_record_repo;

pub mod postgres_appointment_repo;
pub mod postgres_customer_repo;
pub mod postgres_payment_repo;
pub mod postgres_training_record_repo;
