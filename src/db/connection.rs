//! Connection pooling for database access.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::api::{DatabaseConfig, DatabaseError, DatabaseResult};
use crate::executor::{QueryExecutor, ResultSet};
use crate::pipeline::Stage;
use crate::query::{Filter, Projection};
use crate::storage::{CollectionName, DocumentStore};

/// A database connection from the pool.
pub struct Connection {
    id: usize,
    executor: QueryExecutor,
    pool: Option<Arc<ConnectionPoolInner>>,
}

impl Connection {
    /// Create a standalone connection (not from a pool).
    pub fn new(store: DocumentStore) -> Self {
        Self {
            id: 0,
            executor: QueryExecutor::new(store),
            pool: None,
        }
    }

    /// Find documents matching an optional filter and projection.
    pub fn find(
        &self,
        collection: &CollectionName,
        filter: Option<&Filter>,
        projection: Option<&Projection>,
    ) -> DatabaseResult<ResultSet> {
        Ok(self.executor.find(collection, filter, projection)?)
    }

    /// Count documents in a collection.
    pub fn count(&self, collection: &CollectionName) -> DatabaseResult<usize> {
        Ok(self.executor.count(collection)?)
    }

    /// Run an aggregation pipeline.
    pub fn aggregate(
        &self,
        collection: &CollectionName,
        stages: &[Stage],
    ) -> DatabaseResult<ResultSet> {
        Ok(self.executor.aggregate(collection, stages)?)
    }

    /// The underlying executor, for inserts and updates.
    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // Return connection to pool if pooled.
        if let Some(ref pool) = self.pool {
            let mut available = pool.available.lock();
            available.push_back(self.id);
        }
    }
}

struct ConnectionPoolInner {
    config: DatabaseConfig,
    store: Arc<RwLock<DocumentStore>>,
    available: Mutex<VecDeque<usize>>,
    max_connections: usize,
    created: Mutex<usize>,
}

/// Connection pool for database access.
pub struct ConnectionPool {
    inner: Arc<ConnectionPoolInner>,
}

impl ConnectionPool {
    /// Create a new connection pool.
    pub fn new(config: DatabaseConfig, max_connections: usize) -> DatabaseResult<Self> {
        let store = if config.create_if_missing {
            DocumentStore::open_or_init(&config.path)?
        } else {
            DocumentStore::open(&config.path)?
        };

        let inner = Arc::new(ConnectionPoolInner {
            config,
            store: Arc::new(RwLock::new(store)),
            available: Mutex::new(VecDeque::new()),
            max_connections,
            created: Mutex::new(0),
        });

        Ok(Self { inner })
    }

    /// Get a connection from the pool.
    pub fn get(&self) -> DatabaseResult<Connection> {
        // Try to get an available connection.
        {
            let mut available = self.inner.available.lock();
            if let Some(id) = available.pop_front() {
                return Ok(Connection {
                    id,
                    executor: QueryExecutor::from_shared(self.inner.store.clone()),
                    pool: Some(self.inner.clone()),
                });
            }
        }

        // Create a new connection if under limit.
        {
            let mut created = self.inner.created.lock();
            if *created < self.inner.max_connections {
                *created += 1;
                let id = *created;
                return Ok(Connection {
                    id,
                    executor: QueryExecutor::from_shared(self.inner.store.clone()),
                    pool: Some(self.inner.clone()),
                });
            }
        }

        // Pool exhausted - in production we'd wait, but for now error.
        Err(DatabaseError::InvalidConfig(
            "connection pool exhausted".into(),
        ))
    }

    /// Get the number of available connections.
    pub fn available(&self) -> usize {
        self.inner.available.lock().len()
    }

    /// Get the total number of connections created.
    pub fn created(&self) -> usize {
        *self.inner.created.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connection_pool() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = DatabaseConfig::new(dir.path());
        let pool = ConnectionPool::new(config, 5).unwrap();

        let conn = pool.get().unwrap();
        let products = CollectionName::new("products").unwrap();
        conn.executor()
            .insert(&products, Some("product_id"), json!({"product_id": "ELEC001"}))
            .unwrap();
        assert_eq!(conn.count(&products).unwrap(), 1);

        assert_eq!(pool.created(), 1);
    }

    #[test]
    fn test_pool_reuse() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = DatabaseConfig::new(dir.path());
        let pool = ConnectionPool::new(config, 5).unwrap();

        {
            let _conn1 = pool.get().unwrap();
            let _conn2 = pool.get().unwrap();
            assert_eq!(pool.created(), 2);
        }

        // Connections returned to pool.
        assert_eq!(pool.available(), 2);

        // Reuse existing connection.
        let _conn3 = pool.get().unwrap();
        assert_eq!(pool.created(), 2); // No new connection created.
    }

    #[test]
    fn test_pool_exhausted() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = DatabaseConfig::new(dir.path());
        let pool = ConnectionPool::new(config, 1).unwrap();

        let _held = pool.get().unwrap();
        assert!(pool.get().is_err());
    }

    #[test]
    fn test_connections_share_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = ConnectionPool::new(DatabaseConfig::new(dir.path()), 5).unwrap();
        let products = CollectionName::new("products").unwrap();

        let writer = pool.get().unwrap();
        writer
            .executor()
            .insert(&products, Some("product_id"), json!({"product_id": "A1"}))
            .unwrap();

        let reader = pool.get().unwrap();
        assert_eq!(reader.count(&products).unwrap(), 1);
    }
}
