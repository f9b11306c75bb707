pub mod admin_store;
pub mod catalog_store;
