use crate::cache::Cache;
use crate::error::DivvyError;
use crate::service::GroupBalances;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone)]
pub struct InMemoryCache {
    cache: Arc<RwLock<HashMap<Uuid, (GroupBalances, DateTime<Utc>)>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        InMemoryCache {
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_group_balances(
        &self,
        group_id: Uuid,
    ) -> Result<Option<GroupBalances>, DivvyError> {
        let cache = self.cache.read().await;
        Ok(cache
            .get(&group_id)
            .filter(|(_, expiry)| *expiry > Utc::now())
            .map(|(balances, _)| balances.clone()))
    }

    async fn save_group_balances(
        &self,
        group_id: Uuid,
        balances: &GroupBalances,
        ttl: std::time::Duration,
    ) -> Result<(), DivvyError> {
        let expiry = Utc::now()
            + chrono::Duration::from_std(ttl)
                .map_err(|e| DivvyError::CacheError(format!("Failed to convert TTL: {}", e)))?;
        let mut cache = self.cache.write().await;
        cache.insert(group_id, (balances.clone(), expiry));
        Ok(())
    }

    async fn invalidate_group(&self, group_id: Uuid) -> Result<(), DivvyError> {
        let mut cache = self.cache.write().await;
        cache.remove(&group_id);
        cache.retain(|_, (_, expiry)| *expiry > Utc::now());
        Ok(())
    }
}
