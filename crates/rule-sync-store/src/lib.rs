//! Rule Sync Config Store Layer
//!
//! This crate provides the configuration store abstraction used by Rule Sync,
//! with a Nacos Open API client and an in-memory store.

pub mod client;
pub mod error;
pub mod memory;
pub mod nacos;

pub use client::ConfigStoreClient;
pub use error::StoreError;
pub use memory::MemoryConfigStore;
pub use nacos::{NacosClient, NacosClientConfig};
