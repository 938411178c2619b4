use std::sync::Arc;

use async_trait::async_trait;
use ns_core::storage::to_document;
use ns_core::{ComparativeReport, ReportStorage, Result};
use tokio::sync::RwLock;

use crate::StorageBackend;

#[derive(Debug, Default)]
struct MemoryStore {
    report: Option<Vec<u8>>,
    audio: Option<Vec<u8>>,
}

/// In-process storage for tests and dry runs.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
    audio_location: String,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::default())),
            audio_location: "memory://hindi_summary.mp3".to_string(),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for MemoryStorage {
    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[async_trait]
impl ReportStorage for MemoryStorage {
    fn audio_location(&self) -> String {
        self.audio_location.clone()
    }

    async fn store_report(&self, report: &ComparativeReport) -> Result<()> {
        let document = to_document(report)?;
        self.store.write().await.report = Some(document);
        Ok(())
    }

    async fn load_report(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.store.read().await.report.clone())
    }

    async fn store_audio(&self, audio: &[u8]) -> Result<()> {
        self.store.write().await.audio = Some(audio.to_vec());
        Ok(())
    }

    async fn load_audio(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.store.read().await.audio.clone())
    }

    async fn clear_audio(&self) -> Result<()> {
        self.store.write().await.audio = None;
        Ok(())
    }
}
