//! Query execution engine for FlexiMart.
//!
//! The executor exposes the generic primitives the canned catalog
//! operations are built from: find (filter + projection), count,
//! aggregate, insert, and update-one with an array append.

mod error;
mod executor;
mod result;
mod update;

pub use error::{ExecuteError, ExecuteResult};
pub use executor::QueryExecutor;
pub use result::{QueryResult, ResultSet, RowIter};
pub use update::Update;
