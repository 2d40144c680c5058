use async_trait::async_trait;

use crate::{StorageError, db::document::Document};

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;

/// Persistence for the whole database document.
///
/// Both operations are atomic from the engine's point of view: a read never
/// observes a partially written document.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Loads the current document, or an empty one if nothing was persisted.
    async fn read(&self) -> Result<Document, StorageError>;

    /// Replaces the persisted document.
    async fn write(&self, document: &Document) -> Result<(), StorageError>;
}
