//! Database API - high-level interface for the FlexiMart store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::executor::{ExecuteError, QueryExecutor, QueryResult, ResultSet, Update};
use crate::model::{NewReview, Product};
use crate::pipeline::{Accumulator, ProjectField, Stage};
use crate::query::{Filter, Projection};
use crate::storage::{CollectionName, DocumentStore, InvalidNameError, StorageError};

/// URI scheme accepted by [`DatabaseConfig::from_uri`].
const URI_SCHEME: &str = "fleximart://";

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("execution error: {0}")]
    Execute(#[from] ExecuteError),

    #[error("invalid name: {0}")]
    InvalidName(#[from] InvalidNameError),

    #[error("database not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database configuration options.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the store directory.
    pub path: PathBuf,
    /// Create if doesn't exist.
    pub create_if_missing: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".fleximart"),
            create_if_missing: true,
        }
    }
}

impl DatabaseConfig {
    /// Create a new configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Parse a connection URI of the form `fleximart://<path>`.
    pub fn from_uri(uri: &str) -> DatabaseResult<Self> {
        let path = uri.strip_prefix(URI_SCHEME).ok_or_else(|| {
            DatabaseError::InvalidConfig(format!(
                "connection URI must start with '{}': {}",
                URI_SCHEME, uri
            ))
        })?;
        if path.is_empty() {
            return Err(DatabaseError::InvalidConfig(
                "connection URI has an empty path".into(),
            ));
        }
        Ok(Self::new(path))
    }

    /// Set create_if_missing flag.
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }
}

/// The main database handle for the FlexiMart catalog.
pub struct Database {
    config: DatabaseConfig,
    store: Arc<RwLock<DocumentStore>>,
    executor: QueryExecutor,
    products: CollectionName,
    // Keeps the backing directory alive for in-memory databases.
    _temp: Option<tempfile::TempDir>,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> DatabaseResult<Self> {
        Self::open_with_config(DatabaseConfig::new(path.as_ref()))
    }

    /// Open a database via a `fleximart://<path>` connection URI.
    pub fn connect(uri: &str) -> DatabaseResult<Self> {
        Self::open_with_config(DatabaseConfig::from_uri(uri)?)
    }

    /// Open or create a database with custom configuration.
    pub fn open_with_config(config: DatabaseConfig) -> DatabaseResult<Self> {
        let store = if config.create_if_missing {
            DocumentStore::open_or_init(&config.path)?
        } else if config.path.exists() {
            DocumentStore::open(&config.path)?
        } else {
            return Err(DatabaseError::NotFound(config.path.clone()));
        };

        let shared = Arc::new(RwLock::new(store));
        let executor = QueryExecutor::from_shared(shared.clone());
        let products = CollectionName::new("products")?;

        Ok(Self {
            config,
            store: shared,
            executor,
            products,
            _temp: None,
        })
    }

    /// Create a database backed by a temporary directory (for testing).
    pub fn in_memory() -> DatabaseResult<Self> {
        let dir = tempfile::TempDir::new()?;
        let mut db = Self::open(dir.path())?;
        db._temp = Some(dir);
        Ok(db)
    }

    /// Bulk-load products into the `products` collection.
    ///
    /// Each product's `product_id` becomes its document id, so duplicates
    /// are rejected by the store.
    pub fn import_products(&self, products: &[Product]) -> DatabaseResult<usize> {
        for product in products {
            let body = serde_json::to_value(product)?;
            self.executor
                .insert(&self.products, Some("product_id"), body)?;
        }
        info!(count = products.len(), "imported products");
        Ok(products.len())
    }

    /// Bulk-load products from a JSON file holding an array of products.
    pub fn import_products_from_json(&self, path: impl AsRef<Path>) -> DatabaseResult<usize> {
        let bytes = fs::read(path.as_ref())?;
        let products: Vec<Product> = serde_json::from_slice(&bytes)?;
        self.import_products(&products)
    }

    /// All products in the collection.
    pub fn products(&self) -> DatabaseResult<ResultSet> {
        Ok(self.executor.find(&self.products, None, None)?)
    }

    /// Products with `price` strictly greater than the threshold.
    pub fn products_above_price(&self, threshold: f64) -> DatabaseResult<ResultSet> {
        let filter = Filter::Gt("price".into(), json!(threshold));
        Ok(self.executor.find(&self.products, Some(&filter), None)?)
    }

    /// Products with `stock` strictly below the threshold.
    pub fn low_stock_products(&self, threshold: i64) -> DatabaseResult<ResultSet> {
        let filter = Filter::Lt("stock".into(), json!(threshold));
        Ok(self.executor.find(&self.products, Some(&filter), None)?)
    }

    /// Products in a category priced strictly under a maximum, projected to
    /// `{name, price, stock}`.
    pub fn category_under_price(
        &self,
        category: &str,
        max_price: f64,
    ) -> DatabaseResult<ResultSet> {
        let filter = Filter::Eq("category".into(), json!(category))
            .and(Filter::Lt("price".into(), json!(max_price)));
        let projection = Projection::new(["name", "price", "stock"]);
        Ok(self
            .executor
            .find(&self.products, Some(&filter), Some(&projection))?)
    }

    /// Total number of products.
    pub fn product_count(&self) -> DatabaseResult<usize> {
        Ok(self.executor.count(&self.products)?)
    }

    /// Mean price per category, as `{category, avg_price}` rows.
    pub fn average_price_by_category(&self) -> DatabaseResult<ResultSet> {
        let stages = [
            Stage::group("category", [("avg_price", Accumulator::avg("price"))]),
            Stage::project([
                ProjectField::renamed("_id", "category"),
                ProjectField::keep("avg_price"),
            ]),
        ];
        Ok(self.executor.aggregate(&self.products, &stages)?)
    }

    /// Products whose mean review rating is at least `min_rating`, as
    /// `{name, avg_rating}` rows. Products without reviews are excluded.
    pub fn top_rated_products(&self, min_rating: f64) -> DatabaseResult<ResultSet> {
        let stages = [
            Stage::unwind("reviews"),
            Stage::group("name", [("avg_rating", Accumulator::avg("reviews.rating"))]),
            Stage::matching(Filter::Gte("avg_rating".into(), json!(min_rating))),
            Stage::project([
                ProjectField::renamed("_id", "name"),
                ProjectField::keep("avg_rating"),
            ]),
        ];
        Ok(self.executor.aggregate(&self.products, &stages)?)
    }

    /// Append a review to the product with the given id.
    ///
    /// Returns the number of products updated: zero when the id does not
    /// exist. Repeated calls append duplicate reviews; nothing here is
    /// validated or deduplicated.
    pub fn append_review(&self, product_id: &str, review: NewReview) -> DatabaseResult<usize> {
        let filter = Filter::Eq("product_id".into(), json!(product_id));
        let review = serde_json::to_value(review.into_review())?;
        let result = self.executor.update_one(
            &self.products,
            &filter,
            &[Update::Push("reviews".into(), review)],
        )?;
        match result {
            QueryResult::Modified { rows_affected } => Ok(rows_affected),
            _ => Ok(0),
        }
    }

    /// Per-category summary `{category, avg_price, product_count}`, sorted
    /// descending by `avg_price`. Tie order between equal averages is
    /// unspecified.
    pub fn category_summary(&self) -> DatabaseResult<ResultSet> {
        let stages = [
            Stage::group(
                "category",
                [
                    ("avg_price", Accumulator::avg("price")),
                    ("product_count", Accumulator::Count),
                ],
            ),
            Stage::project([
                ProjectField::renamed("_id", "category"),
                ProjectField::keep("avg_price"),
                ProjectField::keep("product_count"),
            ]),
            Stage::sort_desc("avg_price"),
        ];
        Ok(self.executor.aggregate(&self.products, &stages)?)
    }

    /// List all collections in the store.
    pub fn collections(&self) -> DatabaseResult<Vec<String>> {
        Ok(self.store.read().list_collections()?)
    }

    /// The underlying query executor, for ad-hoc filters and pipelines.
    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// Get the database path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get the configuration.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub(crate) fn shared_store(&self) -> Arc<RwLock<DocumentStore>> {
        self.store.clone()
    }
}
