//! Record store trait and in-memory implementation.

use crate::record::{ActivationRecord, NewActivationRequest, RecordId, RecordPatch};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Storage for activation request records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stores a new pending record and returns it.
    async fn create(&self, request: NewActivationRequest) -> ActivationRecord;

    /// Applies `patch` to the record with `id`. Returns the updated record,
    /// or `None` if no such record exists.
    async fn update(&self, id: RecordId, patch: RecordPatch) -> Option<ActivationRecord>;

    /// Fetches a record by id.
    async fn get(&self, id: RecordId) -> Option<ActivationRecord>;
}

/// Process-local record store. Records live until the process exits.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<RecordId, ActivationRecord>>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, request: NewActivationRequest) -> ActivationRecord {
        let record = ActivationRecord::pending(request);
        self.records.write().await.insert(record.id, record.clone());
        record
    }

    async fn update(&self, id: RecordId, patch: RecordPatch) -> Option<ActivationRecord> {
        // Read-modify-write under one write guard.
        let mut records = self.records.write().await;
        let record = records.get_mut(&id)?;
        record.apply(patch);
        Some(record.clone())
    }

    async fn get(&self, id: RecordId) -> Option<ActivationRecord> {
        self.records.read().await.get(&id).cloned()
    }
}
