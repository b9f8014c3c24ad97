use crate::error::DivvyError;
use crate::models::AppLog;
use async_trait::async_trait;
use uuid::Uuid;

/// Domain audit trail, separate from diagnostic `log` output.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<Uuid>,
    ) -> Result<(), DivvyError>;

    async fn entries(&self) -> Result<Vec<AppLog>, DivvyError>;
}

pub mod in_memory;
