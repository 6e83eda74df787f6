//! Update operations applied to a matched document.

use std::collections::BTreeMap;

use serde_json::Value;

use super::error::{ExecuteError, ExecuteResult};

/// One field mutation within an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Set a field to a value, creating it if absent.
    Set(String, Value),
    /// Append a value to an array field. A missing field becomes a
    /// one-element array; a non-array field is an error.
    Push(String, Value),
}

impl Update {
    /// Apply the mutation to a document's fields.
    pub(crate) fn apply(&self, fields: &mut BTreeMap<String, Value>) -> ExecuteResult<()> {
        match self {
            Update::Set(field, value) => {
                fields.insert(field.clone(), value.clone());
                Ok(())
            }
            Update::Push(field, value) => {
                match fields
                    .entry(field.clone())
                    .or_insert_with(|| Value::Array(Vec::new()))
                {
                    Value::Array(elements) => {
                        elements.push(value.clone());
                        Ok(())
                    }
                    _ => Err(ExecuteError::PushToNonArray(field.clone())),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: serde_json::Value) -> BTreeMap<String, Value> {
        v.as_object().unwrap().clone().into_iter().collect()
    }

    #[test]
    fn test_push_appends() {
        let mut f = fields(json!({"reviews": [{"rating": 5}]}));
        Update::Push("reviews".into(), json!({"rating": 4}))
            .apply(&mut f)
            .unwrap();
        assert_eq!(f["reviews"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_push_creates_missing_array() {
        let mut f = fields(json!({}));
        Update::Push("reviews".into(), json!({"rating": 4}))
            .apply(&mut f)
            .unwrap();
        assert_eq!(f["reviews"], json!([{"rating": 4}]));
    }

    #[test]
    fn test_push_to_scalar_fails() {
        let mut f = fields(json!({"reviews": "oops"}));
        let err = Update::Push("reviews".into(), json!(1)).apply(&mut f);
        assert!(matches!(err, Err(ExecuteError::PushToNonArray(_))));
    }

    #[test]
    fn test_set() {
        let mut f = fields(json!({"stock": 5}));
        Update::Set("stock".into(), json!(4)).apply(&mut f).unwrap();
        assert_eq!(f["stock"], json!(4));
    }
}
