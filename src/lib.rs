pub mod cache;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod logger;
pub mod models;
pub mod service;
pub mod storage;

pub use cache::in_memory::InMemoryCache;
pub use engine::split_calculator::{RemainderPolicy, SplitCalculator};
pub use error::DivvyError;
pub use logger::in_memory::InMemoryAuditLog;
pub use service::{DivvyService, GroupBalances};
pub use storage::in_memory::InMemoryStorage;

#[cfg(test)]
mod tests;
