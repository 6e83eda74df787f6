//! Query result types.

use crate::pipeline::Row;

/// Result of a query execution.
#[derive(Debug)]
pub enum QueryResult {
    /// Documents returned from a find or aggregate.
    Documents(ResultSet),
    /// Document count.
    Count(usize),
    /// Number of documents affected by an insert/update.
    Modified { rows_affected: usize },
}

impl QueryResult {
    /// Create a modified result.
    pub fn modified(rows: usize) -> Self {
        QueryResult::Modified { rows_affected: rows }
    }
}

/// A set of rows returned by a find or aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Field names in output order.
    pub columns: Vec<String>,
    /// Rows as maps of field name to value.
    pub rows: Vec<Row>,
}

impl ResultSet {
    /// Create a new empty result set.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create from rows, inferring columns from the first row.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns = rows
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        Self { columns, rows }
    }

    /// Add a row.
    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row by index.
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Iterate over rows.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Iterator over query result rows.
pub struct RowIter {
    rows: std::vec::IntoIter<Row>,
}

impl RowIter {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl Iterator for RowIter {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

impl ExactSizeIterator for RowIter {
    fn len(&self) -> usize {
        self.rows.len()
    }
}
