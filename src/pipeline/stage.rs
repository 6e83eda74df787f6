//! Pipeline stage definitions.

use crate::query::Filter;

/// One stage of an aggregation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Flatten an array field into one output row per element.
    Unwind { path: String },
    /// Group rows by a key field, computing accumulators per group.
    ///
    /// The key value lands in the `_id` output field; each accumulator
    /// lands in its named output field.
    Group {
        key: String,
        accumulators: Vec<(String, Accumulator)>,
    },
    /// Keep only rows matching the filter.
    Match(Filter),
    /// Reshape rows to the given output fields.
    Project(Vec<ProjectField>),
    /// Order rows by a field.
    Sort { field: String, descending: bool },
}

impl Stage {
    /// Unwind stage over an array field.
    pub fn unwind(path: impl Into<String>) -> Self {
        Stage::Unwind { path: path.into() }
    }

    /// Group stage keyed by a field.
    pub fn group<I, S>(key: impl Into<String>, accumulators: I) -> Self
    where
        I: IntoIterator<Item = (S, Accumulator)>,
        S: Into<String>,
    {
        Stage::Group {
            key: key.into(),
            accumulators: accumulators
                .into_iter()
                .map(|(name, acc)| (name.into(), acc))
                .collect(),
        }
    }

    /// Match stage.
    pub fn matching(filter: Filter) -> Self {
        Stage::Match(filter)
    }

    /// Project stage.
    pub fn project<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = ProjectField>,
    {
        Stage::Project(fields.into_iter().collect())
    }

    /// Sort ascending by a field.
    pub fn sort_asc(field: impl Into<String>) -> Self {
        Stage::Sort {
            field: field.into(),
            descending: false,
        }
    }

    /// Sort descending by a field.
    pub fn sort_desc(field: impl Into<String>) -> Self {
        Stage::Sort {
            field: field.into(),
            descending: true,
        }
    }
}

/// Per-group accumulator.
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    /// Mean of a numeric field. Non-numeric and missing values are skipped;
    /// an empty group yields null.
    Avg(String),
    /// Sum of a numeric field.
    Sum(String),
    /// Number of rows in the group.
    Count,
}

impl Accumulator {
    pub fn avg(field: impl Into<String>) -> Self {
        Accumulator::Avg(field.into())
    }

    pub fn sum(field: impl Into<String>) -> Self {
        Accumulator::Sum(field.into())
    }
}

/// One output field of a project stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectField {
    /// Source field path in the input row.
    pub source: String,
    /// Output field name.
    pub name: String,
}

impl ProjectField {
    /// Keep a field under its own name.
    pub fn keep(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source: name.clone(),
            name,
        }
    }

    /// Rename a field (e.g. `_id` to `category`).
    pub fn renamed(source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
        }
    }
}
