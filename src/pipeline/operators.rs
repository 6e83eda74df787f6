//! Volcano-style operators for pipeline execution.
//!
//! Each operator implements the iterator model where rows are pulled
//! one at a time through the tree. Group and sort materialize their
//! input before emitting.

use std::collections::BTreeMap;

use serde_json::Value;

use super::error::{PipelineError, PipelineResult};
use super::stage::{Accumulator, ProjectField};
use crate::query::{compare_values, resolve_path, Filter};

/// A row in the pipeline.
pub type Row = BTreeMap<String, Value>;

/// Trait for all pipeline operators.
pub trait Operator: Send {
    /// Get the next row, or None if exhausted.
    fn next_row(&mut self) -> PipelineResult<Option<Row>>;

    /// Reset the operator to start over.
    fn reset(&mut self) -> PipelineResult<()>;
}

/// Scan operator - emits the input rows.
pub struct ScanOperator {
    rows: Vec<Row>,
    position: usize,
}

impl ScanOperator {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows, position: 0 }
    }
}

impl Operator for ScanOperator {
    fn next_row(&mut self) -> PipelineResult<Option<Row>> {
        if self.position < self.rows.len() {
            let row = self.rows[self.position].clone();
            self.position += 1;
            Ok(Some(row))
        } else {
            Ok(None)
        }
    }

    fn reset(&mut self) -> PipelineResult<()> {
        self.position = 0;
        Ok(())
    }
}

/// Unwind operator - flattens an array field into one row per element.
///
/// A missing or null field, or an empty array, drops the row. A non-array
/// value is an error.
pub struct UnwindOperator {
    source: Box<dyn Operator>,
    path: String,
    pending: Vec<Row>,
}

impl UnwindOperator {
    pub fn new(source: Box<dyn Operator>, path: String) -> Self {
        Self {
            source,
            path,
            pending: Vec::new(),
        }
    }
}

impl Operator for UnwindOperator {
    fn next_row(&mut self) -> PipelineResult<Option<Row>> {
        loop {
            if let Some(row) = self.pending.pop() {
                return Ok(Some(row));
            }

            let Some(row) = self.source.next_row()? else {
                return Ok(None);
            };

            match row.get(&self.path) {
                None | Some(Value::Null) => continue,
                Some(Value::Array(elements)) => {
                    // Reverse so pop() yields elements in array order.
                    for element in elements.iter().rev() {
                        let mut unwound = row.clone();
                        unwound.insert(self.path.clone(), element.clone());
                        self.pending.push(unwound);
                    }
                    // Empty array drops the row; loop to pull the next one.
                }
                Some(other) => {
                    return Err(PipelineError::UnwindNonArray {
                        path: self.path.clone(),
                        actual: value_type_name(other),
                    })
                }
            }
        }
    }

    fn reset(&mut self) -> PipelineResult<()> {
        self.source.reset()?;
        self.pending.clear();
        Ok(())
    }
}

/// Group operator - groups rows by a key field and computes accumulators.
///
/// The group key lands in `_id`. Groups are emitted in key order.
pub struct GroupOperator {
    source: Box<dyn Operator>,
    key: String,
    accumulators: Vec<(String, Accumulator)>,
    grouped: Option<Vec<Row>>,
    position: usize,
}

/// Running state for one accumulator within one group.
#[derive(Debug, Clone, Default)]
struct AccState {
    sum: f64,
    count: usize,
}

struct GroupState {
    key: Value,
    accs: Vec<AccState>,
}

impl GroupOperator {
    pub fn new(
        source: Box<dyn Operator>,
        key: String,
        accumulators: Vec<(String, Accumulator)>,
    ) -> Self {
        Self {
            source,
            key,
            accumulators,
            grouped: None,
            position: 0,
        }
    }

    fn materialize(&mut self) -> PipelineResult<()> {
        if self.grouped.is_some() {
            return Ok(());
        }

        // BTreeMap keyed by the canonical JSON of the key value, so group
        // output order is deterministic.
        let mut groups: BTreeMap<String, GroupState> = BTreeMap::new();

        while let Some(row) = self.source.next_row()? {
            let key_value = resolve_path(&row, &self.key).cloned().unwrap_or(Value::Null);
            let map_key = group_key_string(&key_value);

            let state = groups.entry(map_key).or_insert_with(|| GroupState {
                key: key_value,
                accs: vec![AccState::default(); self.accumulators.len()],
            });

            for ((_, acc), acc_state) in self.accumulators.iter().zip(state.accs.iter_mut()) {
                match acc {
                    Accumulator::Avg(field) | Accumulator::Sum(field) => {
                        if let Some(n) = resolve_path(&row, field).and_then(Value::as_f64) {
                            acc_state.sum += n;
                            acc_state.count += 1;
                        }
                    }
                    Accumulator::Count => acc_state.count += 1,
                }
            }
        }

        let rows = groups
            .into_values()
            .map(|state| {
                let mut row = Row::new();
                row.insert("_id".into(), state.key);
                for ((name, acc), acc_state) in self.accumulators.iter().zip(state.accs.iter()) {
                    row.insert(name.clone(), finish_accumulator(acc, acc_state));
                }
                row
            })
            .collect();

        self.grouped = Some(rows);
        Ok(())
    }
}

impl Operator for GroupOperator {
    fn next_row(&mut self) -> PipelineResult<Option<Row>> {
        self.materialize()?;

        if let Some(ref rows) = self.grouped {
            if self.position < rows.len() {
                let row = rows[self.position].clone();
                self.position += 1;
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    fn reset(&mut self) -> PipelineResult<()> {
        self.source.reset()?;
        self.grouped = None;
        self.position = 0;
        Ok(())
    }
}

/// Canonical map key for a group key value. Numeric keys compare by value,
/// so `1` and `1.0` land in the same group.
fn group_key_string(v: &Value) -> String {
    match v {
        Value::Number(n) => n
            .as_f64()
            .map(|f| f.to_string())
            .unwrap_or_else(|| n.to_string()),
        _ => v.to_string(),
    }
}

fn finish_accumulator(acc: &Accumulator, state: &AccState) -> Value {
    match acc {
        Accumulator::Avg(_) => {
            if state.count == 0 {
                Value::Null
            } else {
                number_value(state.sum / state.count as f64)
            }
        }
        Accumulator::Sum(_) => number_value(state.sum),
        Accumulator::Count => Value::Number(state.count.into()),
    }
}

/// Emit whole results as integers, matching how counts and whole averages
/// read in output.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number((n as i64).into())
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Match operator - keeps rows satisfying the filter.
pub struct MatchOperator {
    source: Box<dyn Operator>,
    filter: Filter,
}

impl MatchOperator {
    pub fn new(source: Box<dyn Operator>, filter: Filter) -> Self {
        Self { source, filter }
    }
}

impl Operator for MatchOperator {
    fn next_row(&mut self) -> PipelineResult<Option<Row>> {
        loop {
            match self.source.next_row()? {
                Some(row) => {
                    if self.filter.matches(&row) {
                        return Ok(Some(row));
                    }
                    // Row doesn't match, continue to next
                }
                None => return Ok(None),
            }
        }
    }

    fn reset(&mut self) -> PipelineResult<()> {
        self.source.reset()
    }
}

/// Project operator - reshapes rows to the given output fields.
pub struct ProjectOperator {
    source: Box<dyn Operator>,
    fields: Vec<ProjectField>,
}

impl ProjectOperator {
    pub fn new(source: Box<dyn Operator>, fields: Vec<ProjectField>) -> Self {
        Self { source, fields }
    }
}

impl Operator for ProjectOperator {
    fn next_row(&mut self) -> PipelineResult<Option<Row>> {
        match self.source.next_row()? {
            Some(row) => {
                let mut projected = Row::new();
                for field in &self.fields {
                    if let Some(value) = resolve_path(&row, &field.source) {
                        projected.insert(field.name.clone(), value.clone());
                    }
                }
                Ok(Some(projected))
            }
            None => Ok(None),
        }
    }

    fn reset(&mut self) -> PipelineResult<()> {
        self.source.reset()
    }
}

/// Sort operator - orders rows by a field.
pub struct SortOperator {
    source: Box<dyn Operator>,
    field: String,
    descending: bool,
    sorted_rows: Option<Vec<Row>>,
    position: usize,
}

impl SortOperator {
    pub fn new(source: Box<dyn Operator>, field: String, descending: bool) -> Self {
        Self {
            source,
            field,
            descending,
            sorted_rows: None,
            position: 0,
        }
    }

    fn materialize(&mut self) -> PipelineResult<()> {
        if self.sorted_rows.is_some() {
            return Ok(());
        }

        let mut rows = Vec::new();
        while let Some(row) = self.source.next_row()? {
            rows.push(row);
        }

        // Stable sort, so ties keep input order.
        let field = self.field.clone();
        let descending = self.descending;
        rows.sort_by(|a, b| {
            let cmp = compare_json_values(a.get(&field), b.get(&field));
            if descending {
                cmp.reverse()
            } else {
                cmp
            }
        });

        self.sorted_rows = Some(rows);
        Ok(())
    }
}

impl Operator for SortOperator {
    fn next_row(&mut self) -> PipelineResult<Option<Row>> {
        self.materialize()?;

        if let Some(ref rows) = self.sorted_rows {
            if self.position < rows.len() {
                let row = rows[self.position].clone();
                self.position += 1;
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    fn reset(&mut self) -> PipelineResult<()> {
        self.source.reset()?;
        self.sorted_rows = None;
        self.position = 0;
        Ok(())
    }
}

/// Compare two optional JSON values for ordering. Missing sorts before null,
/// null before everything else.
fn compare_json_values(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    match (a, b) {
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Null, Value::Null) => std::cmp::Ordering::Equal,
            (Value::Null, _) => std::cmp::Ordering::Less,
            (_, Value::Null) => std::cmp::Ordering::Greater,
            _ => compare_values(a, b).unwrap_or(std::cmp::Ordering::Equal),
        },
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{run, Stage};
    use serde_json::json;

    fn row(v: serde_json::Value) -> Row {
        v.as_object().unwrap().clone().into_iter().collect()
    }

    fn products() -> Vec<Row> {
        vec![
            row(json!({"name": "Laptop", "category": "A", "price": 10})),
            row(json!({"name": "Mouse", "category": "A", "price": 20})),
            row(json!({"name": "Shirt", "category": "B", "price": 30})),
        ]
    }

    #[test]
    fn test_group_avg_by_category() {
        let stages = vec![Stage::group("category", [("avgPrice", Accumulator::avg("price"))])];
        let out = run(products(), &stages).unwrap();

        assert_eq!(out.len(), 2);
        let a = out.iter().find(|r| r["_id"] == json!("A")).unwrap();
        let b = out.iter().find(|r| r["_id"] == json!("B")).unwrap();
        assert_eq!(a["avgPrice"], json!(15));
        assert_eq!(b["avgPrice"], json!(30));
    }

    #[test]
    fn test_group_count() {
        let stages = vec![Stage::group(
            "category",
            [
                ("avg_price", Accumulator::avg("price")),
                ("product_count", Accumulator::Count),
            ],
        )];
        let out = run(products(), &stages).unwrap();
        let a = out.iter().find(|r| r["_id"] == json!("A")).unwrap();
        assert_eq!(a["product_count"], json!(2));
    }

    #[test]
    fn test_unwind_flattens_arrays() {
        let rows = vec![row(json!({"name": "Laptop", "reviews": [
            {"rating": 3}, {"rating": 5}
        ]}))];
        let out = run(rows, &[Stage::unwind("reviews")]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["reviews"], json!({"rating": 3}));
        assert_eq!(out[1]["reviews"], json!({"rating": 5}));
    }

    #[test]
    fn test_unwind_drops_missing_and_empty() {
        let rows = vec![
            row(json!({"name": "A", "reviews": []})),
            row(json!({"name": "B"})),
            row(json!({"name": "C", "reviews": null})),
            row(json!({"name": "D", "reviews": [{"rating": 4}]})),
        ];
        let out = run(rows, &[Stage::unwind("reviews")]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["name"], json!("D"));
    }

    #[test]
    fn test_unwind_non_array_errors() {
        let rows = vec![row(json!({"reviews": "oops"}))];
        let err = run(rows, &[Stage::unwind("reviews")]).unwrap_err();
        assert!(matches!(err, PipelineError::UnwindNonArray { .. }));
    }

    #[test]
    fn test_unwind_group_match() {
        let rows = vec![
            row(json!({"name": "Laptop", "reviews": [{"rating": 3}, {"rating": 5}]})),
            row(json!({"name": "Shirt", "reviews": [{"rating": 2}, {"rating": 3}]})),
        ];
        let stages = vec![
            Stage::unwind("reviews"),
            Stage::group("name", [("avg_rating", Accumulator::avg("reviews.rating"))]),
            Stage::matching(Filter::Gte("avg_rating".into(), json!(4.0))),
        ];
        let out = run(rows, &stages).unwrap();

        // Laptop averages exactly 4.0 and is kept; Shirt averages 2.5.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["_id"], json!("Laptop"));
        assert_eq!(out[0]["avg_rating"], json!(4));
    }

    #[test]
    fn test_project_renames_id() {
        let stages = vec![
            Stage::group("category", [("avg_price", Accumulator::avg("price"))]),
            Stage::project([
                ProjectField::renamed("_id", "category"),
                ProjectField::keep("avg_price"),
            ]),
        ];
        let out = run(products(), &stages).unwrap();
        assert!(out.iter().all(|r| r.contains_key("category")));
        assert!(out.iter().all(|r| !r.contains_key("_id")));
    }

    #[test]
    fn test_sort_descending() {
        let stages = vec![
            Stage::group(
                "category",
                [
                    ("avg_price", Accumulator::avg("price")),
                    ("product_count", Accumulator::Count),
                ],
            ),
            Stage::sort_desc("avg_price"),
        ];
        let out = run(products(), &stages).unwrap();
        assert_eq!(out[0]["_id"], json!("B")); // avg 30
        assert_eq!(out[1]["_id"], json!("A")); // avg 15
    }

    #[test]
    fn test_avg_skips_non_numeric() {
        let rows = vec![
            row(json!({"category": "A", "price": 10})),
            row(json!({"category": "A", "price": "n/a"})),
            row(json!({"category": "A", "price": 20})),
        ];
        let stages = vec![Stage::group("category", [("avg", Accumulator::avg("price"))])];
        let out = run(rows, &stages).unwrap();
        assert_eq!(out[0]["avg"], json!(15));
    }

    #[test]
    fn test_avg_of_nothing_is_null() {
        let rows = vec![row(json!({"category": "A"}))];
        let stages = vec![Stage::group("category", [("avg", Accumulator::avg("price"))])];
        let out = run(rows, &stages).unwrap();
        assert_eq!(out[0]["avg"], Value::Null);
    }

    #[test]
    fn test_numeric_group_keys_merge_across_flavors() {
        let rows = vec![
            row(json!({"stock": 1, "price": 10})),
            row(json!({"stock": 1.0, "price": 20})),
        ];
        let stages = vec![Stage::group("stock", [("avg", Accumulator::avg("price"))])];
        let out = run(rows, &stages).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["avg"], json!(15));
    }

    #[test]
    fn test_missing_group_key_is_null_group() {
        let rows = vec![
            row(json!({"category": "A", "price": 10})),
            row(json!({"price": 99})),
        ];
        let stages = vec![Stage::group("category", [("count", Accumulator::Count)])];
        let out = run(rows, &stages).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().any(|r| r["_id"] == Value::Null));
    }

    #[test]
    fn test_reset_replays() {
        let mut op = crate::pipeline::build(
            products(),
            &[Stage::group("category", [("count", Accumulator::Count)])],
        );
        let mut first = Vec::new();
        while let Some(r) = op.next_row().unwrap() {
            first.push(r);
        }
        op.reset().unwrap();
        let mut second = Vec::new();
        while let Some(r) = op.next_row().unwrap() {
            second.push(r);
        }
        assert_eq!(first, second);
    }
}
