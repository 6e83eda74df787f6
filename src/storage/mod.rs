//! storage layer for FlexiMart
//!
//! this module provides a file-backed document store. The upper layers
//! (query executor, database API) use this API and never touch the
//! filesystem directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      DocumentStore                          │
//! │      (High-level API: collections, documents, counts)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                ┌─────────────┴─────────────┐
//!                │                           │
//!                ▼                           ▼
//!         ┌─────────────┐             ┌─────────────┐
//!         │ collection  │             │  document   │
//!         │ (directory) │             │ (JSON file) │
//!         └─────────────┘             └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use fleximart::storage::{DocumentStore, CollectionName, DocumentId};
//!
//! // Initialize or open
//! let store = DocumentStore::open_or_init("./fleximart_data")?;
//!
//! // Insert a document
//! let products = CollectionName::new("products")?;
//! let id = DocumentId::new("ELEC001")?;
//! let doc = Document::from_value(id, json!({"name": "Laptop", "price": 55000}))?;
//! store.insert(&products, doc)?;
//!
//! // Read back
//! let docs = store.scan(&products)?;
//! ```

mod document;
mod error;
mod store;
mod types;

// Re-export public API
pub use document::Document;
pub use error::{StorageError, StorageResult};
pub use store::DocumentStore;
pub use types::{CollectionName, DocumentId, InvalidNameError};
