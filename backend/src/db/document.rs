//! Document primitives shared by every repository backend.
//!
//! A document is a JSON object. Each one belongs to a [`ResourceKind`]
//! (its collection) and is addressed by a [`DocumentId`]. Documents handed
//! out by a repository always carry their identifier under `_id` as a plain
//! string, whatever the backend stores natively.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::repository::{ErrorContext, RepositoryError, RepositoryResult};

/// Name of the identifier field in every stored document.
pub const ID_FIELD: &str = "_id";

/// A stored document body.
pub type Document = Map<String, Value>;

/// The collection a document belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Property,
    Offer,
    #[serde(rename = "adminsettings")]
    AdminSettings,
}

impl ResourceKind {
    /// Every kind, in declaration order.
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Property,
        ResourceKind::Offer,
        ResourceKind::AdminSettings,
    ];

    /// Collection name used by the store.
    pub fn collection_name(&self) -> &'static str {
        match self {
            ResourceKind::Property => "property",
            ResourceKind::Offer => "offer",
            ResourceKind::AdminSettings => "adminsettings",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.collection_name() == s)
            .ok_or_else(|| format!("Unknown resource kind: {}", s))
    }
}

/// A model that is persisted as a document of a fixed kind.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync {
    const KIND: ResourceKind;
}

/// Native document identifier.
///
/// Identifiers are UUIDs in every backend. At the API boundary they are
/// opaque strings; [`DocumentId::parse`] is the only way back in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier received from a caller.
    ///
    /// Surrounding whitespace is rejected. Any UUID spelling `uuid` accepts
    /// (upper case, no hyphens, braces) parses; [`Display`](fmt::Display)
    /// always gives the lower-case hyphenated form.
    ///
    /// # Errors
    /// Returns [`RepositoryError::InvalidIdentifier`] when `raw` is not a
    /// well-formed identifier.
    pub fn parse(raw: &str) -> RepositoryResult<Self> {
        Uuid::parse_str(raw).map(Self).map_err(|e| {
            RepositoryError::invalid_identifier_with_context(
                "Invalid id",
                ErrorContext::new("parse_id")
                    .with_entity_id(raw)
                    .with_details(e.to_string()),
            )
        })
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for DocumentId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for DocumentId {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Field filter with JSONB containment semantics.
///
/// Scalar conditions must equal the document's field exactly. Object
/// conditions match when every listed key matches; array conditions match
/// when every listed element appears in the field. An empty filter matches
/// every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    /// Require `field` to equal `value` when a value is given.
    pub fn eq_opt<V: Into<Value>>(self, field: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.eq(field, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// Check whether `document` satisfies every condition.
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            document
                .get(field)
                .is_some_and(|actual| contains(actual, expected))
        })
    }

    /// The filter as a JSON object (used for JSONB containment queries).
    pub fn to_json(&self) -> Value {
        Value::Object(self.conditions.iter().cloned().collect())
    }
}

fn contains(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(actual), Value::Object(expected)) => expected
            .iter()
            .all(|(key, value)| actual.get(key).is_some_and(|a| contains(a, value))),
        (Value::Array(actual), Value::Array(expected)) => expected
            .iter()
            .all(|value| actual.iter().any(|a| contains(a, value))),
        (actual, expected) => actual == expected,
    }
}

/// A model together with the identifier it was stored under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<M> {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub record: M,
}

/// Serialize a model into a document body.
pub fn to_document<M: Serialize + ?Sized>(record: &M) -> RepositoryResult<Document> {
    match serde_json::to_value(record) {
        Ok(Value::Object(mut map)) => {
            map.remove(ID_FIELD);
            Ok(map)
        }
        Ok(other) => Err(RepositoryError::internal_with_context(
            format!("Expected a JSON object, got {}", other),
            ErrorContext::new("to_document"),
        )),
        Err(e) => Err(RepositoryError::internal_with_context(
            e.to_string(),
            ErrorContext::new("to_document"),
        )),
    }
}

/// Deserialize a document (with `_id`) into a typed model.
pub fn from_document<M: Resource>(document: Document) -> RepositoryResult<Stored<M>> {
    let id = document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default();

    serde_json::from_value(Value::Object(document)).map_err(|e| {
        RepositoryError::internal_with_context(
            format!("Stored document does not match model: {}", e),
            ErrorContext::new("from_document")
                .with_entity(M::KIND.collection_name())
                .with_entity_id(id),
        )
    })
}

/// Attach the string form of `id` to a document body.
pub fn with_id(id: DocumentId, mut document: Document) -> Document {
    document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_resource_kind_names() {
        assert_eq!(ResourceKind::Property.collection_name(), "property");
        assert_eq!(ResourceKind::Offer.collection_name(), "offer");
        assert_eq!(ResourceKind::AdminSettings.collection_name(), "adminsettings");
        assert_eq!(
            "adminsettings".parse::<ResourceKind>().unwrap(),
            ResourceKind::AdminSettings
        );
        assert!("properties".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_document_id_parse_roundtrip() {
        let id = DocumentId::generate();
        let parsed = DocumentId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_document_id_parse_is_strict_about_padding() {
        let id = DocumentId::generate();
        let canonical = id.to_string();

        assert!(DocumentId::parse(&format!(" {} ", canonical)).is_err());
        assert_eq!(DocumentId::parse(&canonical.to_uppercase()).unwrap(), id);
        assert_eq!(
            DocumentId::parse(&canonical.replace('-', "")).unwrap().to_string(),
            canonical
        );
    }

    #[test]
    fn test_document_id_parse_rejects_garbage() {
        let err = DocumentId::parse("not-an-id").unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidIdentifier { .. }));
        assert_eq!(err.context().entity_id.as_deref(), Some("not-an-id"));
    }

    #[test]
    fn test_filter_matching() {
        let document = doc(json!({"city": "Austin", "status": "available", "price": 10}));

        assert!(Filter::new().matches(&document));
        assert!(Filter::new().eq("city", "Austin").matches(&document));
        assert!(Filter::new()
            .eq("city", "Austin")
            .eq("status", "available")
            .matches(&document));
        assert!(!Filter::new().eq("city", "Seattle").matches(&document));
        assert!(!Filter::new().eq("missing", "x").matches(&document));
        // exact match only, no coercion between types
        assert!(!Filter::new().eq("price", "10").matches(&document));
    }

    #[test]
    fn test_filter_containment_for_arrays_and_objects() {
        let document = doc(json!({
            "tags": ["loft", "downtown"],
            "owner": {"name": "Ana", "city": "Austin"}
        }));

        assert!(Filter::new().eq("tags", json!(["loft"])).matches(&document));
        assert!(Filter::new()
            .eq("tags", json!(["downtown", "loft"]))
            .matches(&document));
        assert!(!Filter::new().eq("tags", json!(["yard"])).matches(&document));
        // A scalar never matches an array field
        assert!(!Filter::new().eq("tags", "loft").matches(&document));

        assert!(Filter::new()
            .eq("owner", json!({"city": "Austin"}))
            .matches(&document));
        assert!(!Filter::new()
            .eq("owner", json!({"city": "Seattle"}))
            .matches(&document));
    }

    #[test]
    fn test_filter_eq_opt_skips_none() {
        let filter = Filter::new()
            .eq_opt("city", Some("Austin"))
            .eq_opt::<&str>("status", None);
        assert_eq!(filter.conditions().len(), 1);
        assert_eq!(filter.to_json(), json!({"city": "Austin"}));
    }

    #[test]
    fn test_to_document_strips_id() {
        let body = to_document(&json!({"_id": "x", "a": 1})).unwrap();
        assert!(!body.contains_key(ID_FIELD));
        assert_eq!(body.get("a"), Some(&json!(1)));

        assert!(to_document(&json!([1, 2])).is_err());
    }
}
