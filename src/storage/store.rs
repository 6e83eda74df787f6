//! The file-backed document store.
//!
//! A store is a directory containing one subdirectory per collection, with
//! one JSON file per document (named `<id>.json`). Collections are created
//! lazily on first insert; scanning a collection that was never written
//! yields an empty result rather than an error.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::storage::document::{deserialize_document, serialize_document, Document};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{CollectionName, DocumentId};

/// marker file that identifies a directory as a fleximart store
const STORE_MARKER: &str = ".fleximart";

/// Handle to a document store on disk.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Initialize a new store at the given path, creating the directory.
    pub fn init(path: impl AsRef<Path>) -> StorageResult<Self> {
        let root = path.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        fs::write(root.join(STORE_MARKER), b"fleximart store v1\n")?;
        debug!(path = %root.display(), "initialized store");
        Ok(Self { root })
    }

    /// Open an existing store.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.join(STORE_MARKER).exists() {
            return Err(StorageError::NotInitialized(root));
        }
        Ok(Self { root })
    }

    /// Open a store, initializing it if the marker is missing.
    pub fn open_or_init(path: impl AsRef<Path>) -> StorageResult<Self> {
        let root = path.as_ref().to_path_buf();
        if root.join(STORE_MARKER).exists() {
            Ok(Self { root })
        } else {
            Self::init(root)
        }
    }

    /// Path of the store root directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &CollectionName) -> PathBuf {
        self.root.join(collection.as_str())
    }

    fn document_path(&self, collection: &CollectionName, id: &DocumentId) -> PathBuf {
        self.collection_dir(collection).join(format!("{}.json", id))
    }

    /// List all collections present in the store.
    pub fn list_collections(&self) -> StorageResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Check if a collection exists (has been written at least once).
    pub fn collection_exists(&self, collection: &CollectionName) -> bool {
        self.collection_dir(collection).is_dir()
    }

    /// Read all documents in a collection, ordered by document id.
    ///
    /// A missing collection yields an empty vec.
    pub fn scan(&self, collection: &CollectionName) -> StorageResult<Vec<Document>> {
        let dir = self.collection_dir(collection);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(stem) = name.strip_suffix(".json") {
                ids.push(DocumentId::new(stem)?);
            }
        }
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        let mut docs = Vec::with_capacity(ids.len());
        for id in ids {
            docs.push(self.read(collection, &id)?);
        }
        debug!(collection = %collection, count = docs.len(), "scanned collection");
        Ok(docs)
    }

    /// Read a single document by id.
    pub fn read(&self, collection: &CollectionName, id: &DocumentId) -> StorageResult<Document> {
        let path = self.document_path(collection, id);
        let bytes = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::DocumentNotFound {
                    collection: collection.clone(),
                    id: id.clone(),
                }
            } else {
                StorageError::Io(e)
            }
        })?;
        deserialize_document(&bytes, id)
    }

    /// Insert a new document. Fails if a document with the same id exists.
    pub fn insert(&self, collection: &CollectionName, doc: Document) -> StorageResult<()> {
        let path = self.document_path(collection, &doc.id);
        if path.exists() {
            return Err(StorageError::DocumentAlreadyExists {
                collection: collection.clone(),
                id: doc.id,
            });
        }

        fs::create_dir_all(self.collection_dir(collection))?;
        let bytes = serialize_document(&doc)?;
        fs::write(&path, bytes)?;
        debug!(collection = %collection, id = %doc.id, "inserted document");
        Ok(())
    }

    /// Replace an existing document. Fails if the document is missing.
    pub fn replace(&self, collection: &CollectionName, doc: Document) -> StorageResult<()> {
        let path = self.document_path(collection, &doc.id);
        if !path.exists() {
            return Err(StorageError::DocumentNotFound {
                collection: collection.clone(),
                id: doc.id,
            });
        }

        let bytes = serialize_document(&doc)?;
        fs::write(&path, bytes)?;
        debug!(collection = %collection, id = %doc.id, version = doc.version, "replaced document");
        Ok(())
    }

    /// Count documents in a collection. A missing collection counts as zero.
    pub fn count(&self, collection: &CollectionName) -> StorageResult<usize> {
        let dir = self.collection_dir(collection);
        if !dir.is_dir() {
            return Ok(0);
        }

        let mut count = 0;
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry
                .file_name()
                .to_str()
                .is_some_and(|n| n.ends_with(".json"))
            {
                count += 1;
            }
        }
        Ok(count)
    }
}
