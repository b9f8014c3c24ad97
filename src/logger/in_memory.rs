use crate::error::DivvyError;
use crate::logger::AuditLog;
use crate::models::AppLog;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

pub struct InMemoryAuditLog {
    logs: tokio::sync::Mutex<Vec<AppLog>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        InMemoryAuditLog {
            logs: tokio::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<Uuid>,
    ) -> Result<(), DivvyError> {
        // For production: use a logging queue or batch writes
        let mut logs = self.logs.lock().await;
        logs.push(AppLog {
            id: Uuid::new_v4(),
            action: action.to_string(),
            user_id,
            details,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<AppLog>, DivvyError> {
        Ok(self.logs.lock().await.clone())
    }
}
