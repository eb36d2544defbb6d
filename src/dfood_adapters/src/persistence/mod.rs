pub mod dashmap_revocation_store;
pub mod hashmap_user_store;
pub mod postgres_user_store;
pub mod redis_revocation_store;
