//! In-memory WebhookEventRepository with the same claim semantics as the
//! database table.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{
    SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookOutcome, STALE_CLAIM_SECS,
};

#[derive(Default)]
pub struct InMemoryWebhookEventRepository {
    records: RwLock<HashMap<String, WebhookEventRecord>>,
}

impl InMemoryWebhookEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl WebhookEventRepository for InMemoryWebhookEventRepository {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        Ok(self.records.read().await.get(event_id).cloned())
    }

    async fn try_claim(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let mut records = self.records.write().await;
        if let Some(existing) = records.get(&record.event_id) {
            let stale_before = record.processed_at.add_secs(-STALE_CLAIM_SECS);
            let abandoned = existing.result == WebhookOutcome::Processing
                && existing.processed_at.is_before(&stale_before);
            if !abandoned {
                return Ok(SaveResult::AlreadyExists);
            }
        }
        records.insert(record.event_id.clone(), record);
        Ok(SaveResult::Inserted)
    }

    async fn complete(
        &self,
        event_id: &str,
        result: WebhookOutcome,
        error_message: Option<String>,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        if let Some(record) = self.records.write().await.get_mut(event_id) {
            record.result = result;
            record.error_message = error_message;
            record.processed_at = now;
        }
        Ok(())
    }

    async fn release(&self, event_id: &str) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        if records
            .get(event_id)
            .map_or(false, |r| r.result == WebhookOutcome::Processing)
        {
            records.remove(event_id);
        }
        Ok(())
    }

    async fn delete_before(&self, timestamp: Timestamp) -> Result<u64, DomainError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| {
            r.result == WebhookOutcome::Processing || !r.processed_at.is_before(&timestamp)
        });
        Ok((before - records.len()) as u64)
    }
}
