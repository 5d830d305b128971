pub mod factory;
pub mod identity;
pub mod local;
pub mod repositories;
