pub mod appointment;
pub mod auth;
pub mod customer;
pub mod health;
pub mod payment;
pub mod training_record;
