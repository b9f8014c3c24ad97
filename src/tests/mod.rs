mod service_tests;

use crate::{DivvyService, InMemoryAuditLog, InMemoryCache, InMemoryStorage};

pub fn create_test_service() -> DivvyService<InMemoryAuditLog, InMemoryStorage, InMemoryCache> {
    let storage = InMemoryStorage::new();
    let audit = InMemoryAuditLog::new();
    let cache = InMemoryCache::new();
    DivvyService::new(storage, audit, cache)
}
