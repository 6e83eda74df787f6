//! High-level Database API.
//!
//! This module provides a clean, user-facing API for the FlexiMart store:
//! opening by path or connection URI, bulk import, and the canned catalog
//! operations.

mod api;
mod connection;

pub use api::{Database, DatabaseConfig, DatabaseError, DatabaseResult};
pub use connection::{Connection, ConnectionPool};
