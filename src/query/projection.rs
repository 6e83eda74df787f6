//! Field projection for query results.

use std::collections::BTreeMap;

use serde_json::Value;

use super::filter::resolve_path;

/// Selects a subset of fields to return from a query.
///
/// Fields may be dotted paths; a projected path keeps its final segment as
/// the output field name. Missing fields are silently omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    /// Project the given field names.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Field names in projection order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Apply the projection to a document's fields.
    pub fn apply(&self, fields: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
        let mut projected = BTreeMap::new();
        for path in &self.fields {
            if let Some(value) = resolve_path(fields, path) {
                let name = path.rsplit('.').next().unwrap_or(path);
                projected.insert(name.to_string(), value.clone());
            }
        }
        projected
    }
}
