//! Persistence for workflow sessions between HTTP requests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::errors::AppError;
use crate::workflow::session::WorkflowSession;

#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<WorkflowSession>, AppError>;
    async fn save(&self, session: &WorkflowSession) -> Result<(), AppError>;
}

/// Sessions stored as JSON under `workflow:{id}`, expiring after `ttl_secs`.
pub struct RedisWorkflowStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisWorkflowStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    fn key(id: Uuid) -> String {
        format!("workflow:{id}")
    }
}

#[async_trait]
impl WorkflowStore for RedisWorkflowStore {
    async fn load(&self, id: Uuid) -> Result<Option<WorkflowSession>, AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(Self::key(id)).await?;
        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Corrupt workflow session {id}: {e}"))
            })
        })
        .transpose()
    }

    async fn save(&self, session: &WorkflowSession) -> Result<(), AppError> {
        let json = serde_json::to_string(session).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to serialize workflow session: {e}"))
        })?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(Self::key(session.id), json, self.ttl_secs)
            .await?;
        Ok(())
    }
}

/// Workflows with a step currently executing in this process.
#[derive(Clone, Default)]
pub struct InFlight {
    ids: Arc<Mutex<HashSet<Uuid>>>,
}

impl InFlight {
    /// Marks `id` busy until the returned guard drops. Fails if it is already busy.
    pub fn acquire(&self, id: Uuid) -> Result<InFlightGuard, AppError> {
        let mut ids = self.ids.lock().unwrap_or_else(|e| e.into_inner());
        if !ids.insert(id) {
            return Err(AppError::Conflict(
                "A step is already running for this optimization".to_string(),
            ));
        }
        Ok(InFlightGuard {
            ids: Arc::clone(&self.ids),
            id,
        })
    }
}

pub struct InFlightGuard {
    ids: Arc<Mutex<HashSet<Uuid>>>,
    id: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_rejects_second_acquire() {
        let in_flight = InFlight::default();
        let id = Uuid::new_v4();
        let guard = in_flight.acquire(id).unwrap();
        assert!(matches!(in_flight.acquire(id), Err(AppError::Conflict(_))));
        assert!(in_flight.acquire(Uuid::new_v4()).is_ok());

        drop(guard);
        assert!(in_flight.acquire(id).is_ok());
    }

    #[test]
    fn test_key_format() {
        let id = Uuid::nil();
        assert_eq!(
            RedisWorkflowStore::key(id),
            "workflow:00000000-0000-0000-0000-000000000000"
        );
    }
}
