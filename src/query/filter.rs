//! Filter predicate evaluation.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

/// A predicate over document fields.
///
/// Field names may be dotted paths (`"reviews.rating"`), resolved through
/// nested objects. A comparison against a missing field never matches.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals value.
    Eq(String, Value),
    /// Field strictly greater than value.
    Gt(String, Value),
    /// Field greater than or equal to value.
    Gte(String, Value),
    /// Field strictly less than value.
    Lt(String, Value),
    /// Field less than or equal to value.
    Lte(String, Value),
    /// All sub-filters match.
    And(Vec<Filter>),
}

impl Filter {
    /// Combine two filters with AND, flattening nested conjunctions.
    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::And(mut a), Filter::And(b)) => {
                a.extend(b);
                Filter::And(a)
            }
            (Filter::And(mut a), f) => {
                a.push(f);
                Filter::And(a)
            }
            (f, Filter::And(mut b)) => {
                b.insert(0, f);
                Filter::And(b)
            }
            (a, b) => Filter::And(vec![a, b]),
        }
    }

    /// Evaluate the filter against a document's fields.
    pub fn matches(&self, fields: &BTreeMap<String, Value>) -> bool {
        match self {
            Filter::Eq(path, expected) => resolve_path(fields, path)
                .map(|v| values_equal(v, expected))
                .unwrap_or(false),
            Filter::Gt(path, bound) => cmp_matches(fields, path, bound, |o| o == Ordering::Greater),
            Filter::Gte(path, bound) => cmp_matches(fields, path, bound, |o| o != Ordering::Less),
            Filter::Lt(path, bound) => cmp_matches(fields, path, bound, |o| o == Ordering::Less),
            Filter::Lte(path, bound) => cmp_matches(fields, path, bound, |o| o != Ordering::Greater),
            Filter::And(filters) => filters.iter().all(|f| f.matches(fields)),
        }
    }
}

fn cmp_matches<F>(fields: &BTreeMap<String, Value>, path: &str, bound: &Value, pred: F) -> bool
where
    F: Fn(Ordering) -> bool,
{
    resolve_path(fields, path)
        .and_then(|v| compare_values(v, bound))
        .map(pred)
        .unwrap_or(false)
}

/// Resolve a dotted field path through nested objects.
pub fn resolve_path<'a>(fields: &'a BTreeMap<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = fields.get(first)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Check if two JSON values are equal.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => {
            // Compare as f64 for numeric equality
            a.as_f64()
                .zip(b.as_f64())
                .map(|(x, y)| (x - y).abs() < f64::EPSILON)
                .unwrap_or(false)
        }
        (Value::String(a), Value::String(b)) => a == b,
        _ => false,
    }
}

/// Compare two JSON values, returning an ordering when comparable.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64()?;
            let b = b.as_f64()?;
            a.partial_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product() -> BTreeMap<String, Value> {
        let obj = json!({
            "product_id": "ELEC001",
            "name": "Laptop",
            "category": "Electronics",
            "price": 55000,
            "stock": 12
        });
        obj.as_object().unwrap().clone().into_iter().collect()
    }

    #[test]
    fn test_eq() {
        let p = product();
        assert!(Filter::Eq("category".into(), json!("Electronics")).matches(&p));
        assert!(!Filter::Eq("category".into(), json!("Clothing")).matches(&p));
    }

    #[test]
    fn test_gt_is_strict() {
        let p = product();
        assert!(Filter::Gt("price".into(), json!(1000)).matches(&p));
        assert!(!Filter::Gt("price".into(), json!(55000)).matches(&p));
        assert!(Filter::Gte("price".into(), json!(55000)).matches(&p));
    }

    #[test]
    fn test_lt() {
        let p = product();
        assert!(Filter::Lt("stock".into(), json!(20)).matches(&p));
        assert!(!Filter::Lt("stock".into(), json!(12)).matches(&p));
        assert!(Filter::Lte("stock".into(), json!(12)).matches(&p));
    }

    #[test]
    fn test_and() {
        let p = product();
        let f = Filter::Eq("category".into(), json!("Electronics"))
            .and(Filter::Lt("price".into(), json!(60000)));
        assert!(f.matches(&p));

        let f = Filter::Eq("category".into(), json!("Electronics"))
            .and(Filter::Lt("price".into(), json!(50000)));
        assert!(!f.matches(&p));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let p = product();
        assert!(!Filter::Gt("weight".into(), json!(0)).matches(&p));
        assert!(!Filter::Eq("weight".into(), json!(0)).matches(&p));
    }

    #[test]
    fn test_dotted_path() {
        let obj = json!({"reviews": {"rating": 4.5}});
        let fields: BTreeMap<String, Value> =
            obj.as_object().unwrap().clone().into_iter().collect();
        assert!(Filter::Gte("reviews.rating".into(), json!(4.0)).matches(&fields));
        assert_eq!(resolve_path(&fields, "reviews.rating"), Some(&json!(4.5)));
        assert_eq!(resolve_path(&fields, "reviews.missing"), None);
    }

    #[test]
    fn test_incomparable_types() {
        let p = product();
        // string field vs numeric bound has no ordering
        assert!(!Filter::Gt("name".into(), json!(5)).matches(&p));
    }
}
