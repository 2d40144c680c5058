use async_trait::async_trait;
use parking_lot::Mutex;

use super::StorageBackend;
use crate::{StorageError, db::document::Document};

/// Keeps the document in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    document: Mutex<Document>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing document.
    pub fn with_document(document: Document) -> Self {
        Self {
            document: Mutex::new(document),
        }
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read(&self) -> Result<Document, StorageError> {
        Ok(self.document.lock().clone())
    }

    async fn write(&self, document: &Document) -> Result<(), StorageError> {
        *self.document.lock() = document.clone();
        Ok(())
    }
}
