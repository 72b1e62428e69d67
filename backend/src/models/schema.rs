//! JSON schema introspection for the stored models.

use schemars::schema_for;
use serde_json::{json, Value};

use super::{AdminSettings, Offer, Property};
use crate::db::ResourceKind;

/// Collection names and a JSON schema per model.
///
/// ```
/// let schema = property_api::models::schema::describe();
/// assert_eq!(schema["collections"][0], "property");
/// assert!(schema["models"]["Offer"]["properties"]["email"].is_object());
/// ```
pub fn describe() -> Value {
    let collections: Vec<&str> = ResourceKind::ALL
        .iter()
        .map(|kind| kind.collection_name())
        .collect();

    json!({
        "collections": collections,
        "models": {
            "Property": schema_for!(Property),
            "Offer": schema_for!(Offer),
            "AdminSettings": schema_for!(AdminSettings),
        }
    })
}
