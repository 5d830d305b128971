pub mod auth_service;
pub mod conflicts;
pub mod facade;
pub mod password;
pub mod record_store;
