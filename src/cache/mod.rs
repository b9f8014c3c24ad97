use crate::error::DivvyError;
use crate::service::GroupBalances;
use async_trait::async_trait;
use uuid::Uuid;

/// Derived balance views are recomputed on every query; the cache only
/// short-circuits repeated reads between writes.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get_group_balances(
        &self,
        group_id: Uuid,
    ) -> Result<Option<GroupBalances>, DivvyError>;
    async fn save_group_balances(
        &self,
        group_id: Uuid,
        balances: &GroupBalances,
        ttl: std::time::Duration,
    ) -> Result<(), DivvyError>;
    async fn invalidate_group(&self, group_id: Uuid) -> Result<(), DivvyError>;
}

pub mod in_memory;
