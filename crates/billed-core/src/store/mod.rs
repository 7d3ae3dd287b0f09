//! Store abstraction: listing and creating bills, uploading receipts
//!
//! - memory: in-process store with fixture bills and failure injection
//! - remote: REST API client

pub mod memory;
pub mod remote;

use async_trait::async_trait;
use billed_config::{StoreBackend, StoreConfig};
use std::sync::Arc;
use thiserror::Error;

use crate::models::{Bill, FileUpload, NewBill, UploadedFile};

pub use memory::MemoryStore;
pub use remote::RemoteStore;

/// Rejection from the store. The message is meant to be shown to the user as is.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
    /// HTTP status, when the store is remote
    pub status: Option<u16>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Rejection for a non-success HTTP answer
    pub fn from_status(status: u16) -> Self {
        Self {
            message: format!("Erreur {}", status),
            status: Some(status),
        }
    }
}

/// Persistence collaborator for bills and receipts
#[async_trait]
pub trait BillStore: Send + Sync {
    /// All bills visible to the caller
    async fn list(&self) -> Result<Vec<Bill>, StoreError>;

    /// Create a bill record
    async fn create(&self, bill: NewBill) -> Result<Bill, StoreError>;

    /// Store a receipt file
    async fn upload_file(&self, upload: FileUpload) -> Result<UploadedFile, StoreError>;

    /// Receipt previously issued by `upload_file` under `key`, `None` when unknown
    async fn find_file(&self, key: &str) -> Result<Option<UploadedFile>, StoreError>;
}

/// Shared store reference
pub type StoreRef = Arc<dyn BillStore>;

/// Build the store selected by the configuration
pub fn build_store(config: &StoreConfig) -> StoreRef {
    match config.backend {
        StoreBackend::Memory => {
            let store = if config.seed_fixtures {
                MemoryStore::with_fixtures(&config.file_base_url)
            } else {
                MemoryStore::new(&config.file_base_url)
            };
            Arc::new(store)
        }
        StoreBackend::Remote => {
            let api_url = config.api_url.clone().unwrap_or_default();
            Arc::new(RemoteStore::new(api_url, config.api_token.clone()))
        }
    }
}
