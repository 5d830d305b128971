pub mod hosted_identity;
pub mod local_identity;
