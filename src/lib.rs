//! FlexiMart - an embedded document store for the sample e-commerce catalog.
//!
//! This crate provides a file-backed document database holding a `products`
//! collection, a declarative filter/projection layer, an aggregation pipeline
//! (unwind, group, match, project, sort), and a high-level [`db::Database`]
//! handle exposing the canned FlexiMart catalog operations.
//!
//! # Example
//!
//! ```no_run
//! use fleximart::db::Database;
//!
//! let db = Database::open("./fleximart_data").unwrap();
//! let all = db.products().unwrap();
//! let pricey = db.products_above_price(1000.0).unwrap();
//! println!("{} products, {} above 1000", all.len(), pricey.len());
//! ```

#![allow(dead_code)] // Many methods are for public API extensibility

pub mod db;
pub mod executor;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod storage;
