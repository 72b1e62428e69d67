//! Offers submitted against listings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::{Resource, ResourceKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// An offer made by a prospective buyer.
///
/// `property_id` is checked against stored listings when the offer is
/// submitted and never again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct Offer {
    pub property_id: String,
    #[validate(length(min = 1))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(range(min = 0))]
    pub amount: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: OfferStatus,
}

impl Resource for Offer {
    const KIND: ResourceKind = ResourceKind::Offer;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn offer() -> Offer {
        serde_json::from_value(json!({
            "property_id": "0f8fad5b-d9cb-469f-a165-70867728950e",
            "full_name": "Jane Buyer",
            "email": "jane@example.com",
            "amount": 500000
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let offer = offer();
        assert_eq!(offer.status, OfferStatus::Pending);
        assert!(offer.phone.is_none());
        assert!(offer.message.is_none());
        assert!(offer.validate().is_ok());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let mut offer = offer();
        offer.email = "not-an-email".to_string();
        let errors = offer.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_negative_amount_and_empty_name_rejected() {
        let mut offer = offer();
        offer.amount = -5;
        offer.full_name = String::new();
        let errors = offer.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("amount"));
        assert!(fields.contains_key("full_name"));
    }
}
