//! Document representation and JSON (de)serialization.
//!
//! each document is stored as a separate JSON file, with a consistent format
//! that includes metadata for version tracking

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::DocumentId;

/// a stored document with metadata and user data
///
/// The on-disk format:
/// ```json
/// {
///   "_id": "ELEC001",
///   "_version": 1,
///   "_created_at": "xxxx-xx-xxT00:00:00Z",
///   "_updated_at": "xxxx-xx-xxT00:00:00Z",
///   "name": "Laptop",
///   "price": 55000
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// document id (must match filename without the .json extension)
    pub id: DocumentId,
    /// version number, incremented on every update
    pub version: u64,
    /// creation timestamp
    pub created_at: String,
    /// last update timestamp
    pub updated_at: String,
    /// user fields
    pub data: BTreeMap<String, Value>,
}

impl Document {
    /// creates a new document with id & data
    ///
    /// sets v1 and current time
    pub fn new(id: DocumentId, data: BTreeMap<String, Value>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id,
            version: 1,
            created_at: now.clone(),
            updated_at: now,
            data,
        }
    }

    /// create a new document from a JSON value (typically an insert payload)
    pub fn from_value(id: DocumentId, value: Value) -> StorageResult<Self> {
        let data = match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => {
                return Err(StorageError::InvalidDocument(
                    "document body must be a JSON object".to_string(),
                ))
            }
        };
        Ok(Self::new(id, data))
    }

    /// create an updated version of this document
    ///
    /// increments version and updates the timestamp
    pub fn with_update(self, new_data: BTreeMap<String, Value>) -> Self {
        Self {
            id: self.id,
            version: self.version + 1,
            created_at: self.created_at,
            updated_at: chrono::Utc::now().to_rfc3339(),
            data: new_data,
        }
    }

    /// get a field value by name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// check if the document has a field
    pub fn has_field(&self, field: &str) -> bool {
        self.data.contains_key(field)
    }
}

/// internal format for JSON serialization
///
/// uses `_` prefix for metadata fields to avoid conflicts with user fields
#[derive(Serialize, Deserialize)]
struct DocumentJson {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_version")]
    version: u64,
    #[serde(rename = "_created_at")]
    created_at: String,
    #[serde(rename = "_updated_at")]
    updated_at: String,
    #[serde(flatten)]
    data: BTreeMap<String, Value>,
}

/// serialize a document to JSON bytes
///
/// uses BTreeMap for consistent key ordering
pub(crate) fn serialize_document(doc: &Document) -> StorageResult<Vec<u8>> {
    let json = DocumentJson {
        id: doc.id.as_str().to_string(),
        version: doc.version,
        created_at: doc.created_at.clone(),
        updated_at: doc.updated_at.clone(),
        data: doc.data.clone(),
    };

    let bytes = serde_json::to_vec_pretty(&json)?;
    Ok(bytes)
}

/// deserialize a document from JSON bytes
///
/// validates that the id in the JSON matches the expected id
pub(crate) fn deserialize_document(bytes: &[u8], expected_id: &DocumentId) -> StorageResult<Document> {
    let json: DocumentJson = serde_json::from_slice(bytes)?;

    if json.id != expected_id.as_str() {
        return Err(StorageError::CorruptedData {
            id: expected_id.clone(),
            reason: format!("id mismatch: file says '{}'", json.id),
        });
    }

    Ok(Document {
        id: expected_id.clone(),
        version: json.version,
        created_at: json.created_at,
        updated_at: json.updated_at,
        data: json.data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        Document::from_value(
            DocumentId::new("ELEC001").unwrap(),
            json!({"name": "Laptop", "price": 55000, "reviews": []}),
        )
        .unwrap()
    }

    #[test]
    fn test_new_document_is_v1() {
        let doc = sample();
        assert_eq!(doc.version, 1);
        assert_eq!(doc.created_at, doc.updated_at);
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let err = Document::from_value(DocumentId::new("x").unwrap(), json!([1, 2, 3]));
        assert!(matches!(err, Err(StorageError::InvalidDocument(_))));
    }

    #[test]
    fn test_roundtrip() {
        let doc = sample();
        let bytes = serialize_document(&doc).unwrap();
        let back = deserialize_document(&bytes, &doc.id).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_id_mismatch_is_corruption() {
        let doc = sample();
        let bytes = serialize_document(&doc).unwrap();
        let other = DocumentId::new("ELEC002").unwrap();
        assert!(matches!(
            deserialize_document(&bytes, &other),
            Err(StorageError::CorruptedData { .. })
        ));
    }

    #[test]
    fn test_with_update_bumps_version() {
        let doc = sample();
        let mut data = doc.data.clone();
        data.insert("stock".into(), json!(10));
        let updated = doc.with_update(data);
        assert_eq!(updated.version, 2);
        assert_eq!(updated.get("stock"), Some(&json!(10)));
    }
}
