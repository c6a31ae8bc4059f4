pub mod data_access;
pub use data_access::{MutationService, TenantDataAccess};
pub mod table_registry;
pub mod sql_builder;
pub mod tenant_store;
pub use tenant_store::PgTenantStore;

#[cfg(test)]
pub mod memory_store;
