pub mod document_store;
pub mod ids;
