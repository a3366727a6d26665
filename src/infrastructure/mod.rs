//! Adapters behind the domain ports: card/token stores and the sandbox gateway.

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod sandbox;
