//! Main query executor.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use super::error::{ExecuteError, ExecuteResult};
use super::result::{QueryResult, ResultSet};
use super::update::Update;
use crate::pipeline::{self, Row, Stage};
use crate::query::{Filter, Projection};
use crate::storage::{CollectionName, Document, DocumentId, DocumentStore};

/// The query executor.
///
/// Each operation is an independent, synchronous request/response against
/// the store. There is no cross-operation coordination.
pub struct QueryExecutor {
    store: Arc<RwLock<DocumentStore>>,
}

impl QueryExecutor {
    /// Create a new executor owning its store handle.
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Create an executor over a shared store handle.
    pub fn from_shared(store: Arc<RwLock<DocumentStore>>) -> Self {
        Self { store }
    }

    /// Find documents matching an optional filter, with optional projection.
    ///
    /// No filter returns the full collection; a missing collection yields
    /// an empty result set.
    pub fn find(
        &self,
        collection: &CollectionName,
        filter: Option<&Filter>,
        projection: Option<&Projection>,
    ) -> ExecuteResult<ResultSet> {
        let rows = self.scan_rows(collection)?;

        let mut result_rows = Vec::new();
        for row in rows {
            let matched = filter.map(|f| f.matches(&row)).unwrap_or(true);
            if !matched {
                continue;
            }
            result_rows.push(match projection {
                Some(p) => p.apply(&row),
                None => row,
            });
        }

        debug!(collection = %collection, rows = result_rows.len(), "find");

        let columns = match projection {
            Some(p) => p
                .fields()
                .iter()
                .map(|f| f.rsplit('.').next().unwrap_or(f).to_string())
                .collect(),
            None => result_rows
                .first()
                .map(|r: &Row| r.keys().cloned().collect())
                .unwrap_or_default(),
        };

        Ok(ResultSet {
            columns,
            rows: result_rows,
        })
    }

    /// Count all documents in a collection.
    pub fn count(&self, collection: &CollectionName) -> ExecuteResult<usize> {
        let count = self.store.read().count(collection)?;
        debug!(collection = %collection, count, "count");
        Ok(count)
    }

    /// Run an aggregation pipeline over a collection.
    pub fn aggregate(
        &self,
        collection: &CollectionName,
        stages: &[Stage],
    ) -> ExecuteResult<ResultSet> {
        let rows = self.scan_rows(collection)?;
        let out = pipeline::run(rows, stages)?;
        debug!(collection = %collection, stages = stages.len(), rows = out.len(), "aggregate");
        Ok(ResultSet::from_rows(out))
    }

    /// Insert a document.
    ///
    /// When `key_field` is given, the document id is taken from that field
    /// of the payload (e.g. `product_id`); otherwise a ULID is generated.
    pub fn insert(
        &self,
        collection: &CollectionName,
        key_field: Option<&str>,
        body: Value,
    ) -> ExecuteResult<QueryResult> {
        let id = match key_field {
            Some(field) => {
                let key = body
                    .get(field)
                    .and_then(Value::as_str)
                    .ok_or_else(|| ExecuteError::MissingKeyField(field.to_string()))?;
                DocumentId::new(key)?
            }
            None => DocumentId::generate(),
        };

        let doc = Document::from_value(id, body)?;
        self.store.write().insert(collection, doc)?;
        Ok(QueryResult::modified(1))
    }

    /// Apply updates to the first document matching the filter.
    ///
    /// Matching no document is a no-op reported as zero rows affected.
    /// Holds the write lock across the scan and the replace, so concurrent
    /// updates through a shared store are serialized.
    pub fn update_one(
        &self,
        collection: &CollectionName,
        filter: &Filter,
        updates: &[Update],
    ) -> ExecuteResult<QueryResult> {
        let store = self.store.write();
        let docs = store.scan(collection)?;

        for doc in docs {
            if !filter.matches(&doc.data) {
                continue;
            }

            let mut new_data = doc.data.clone();
            for update in updates {
                update.apply(&mut new_data)?;
            }

            let id = doc.id.clone();
            store.replace(collection, doc.with_update(new_data))?;
            debug!(collection = %collection, id = %id, "updated document");
            return Ok(QueryResult::modified(1));
        }

        debug!(collection = %collection, "update matched no document");
        Ok(QueryResult::modified(0))
    }

    fn scan_rows(&self, collection: &CollectionName) -> ExecuteResult<Vec<Row>> {
        let store = self.store.read();
        let docs = store.scan(collection)?;
        Ok(docs.into_iter().map(|d| d.data).collect())
    }

    /// Shared store handle.
    pub fn store(&self) -> Arc<RwLock<DocumentStore>> {
        self.store.clone()
    }
}
