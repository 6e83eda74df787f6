//! Declarative filters and field projection.
//!
//! Queries are typed values rather than a text language: a [`Filter`] is a
//! predicate tree evaluated against a document's fields, and a
//! [`Projection`] selects the fields to return.

mod filter;
mod projection;

pub use filter::{compare_values, resolve_path, values_equal, Filter};
pub use projection::Projection;
