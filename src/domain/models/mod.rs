pub mod appointment;
pub mod customer;
pub mod payment;
pub mod session;
pub mod training_record;
pub mod user;
