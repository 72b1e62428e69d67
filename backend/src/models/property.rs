//! Property listings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateUrl, ValidationError};

use crate::db::{Resource, ResourceKind};

/// Sale status of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    #[default]
    Available,
    UnderOffer,
    Sold,
}

/// A property listed for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct Property {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub state: String,
    /// Asking price in whole currency units.
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(range(min = 0))]
    pub bedrooms: i64,
    #[validate(range(min = 0.0))]
    pub bathrooms: f64,
    #[validate(range(min = 0))]
    pub area_sqft: i64,
    #[serde(default)]
    pub status: PropertyStatus,
    /// Image URLs, in display order.
    #[serde(default)]
    #[validate(custom(function = "validate_image_urls"))]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Resource for Property {
    const KIND: ResourceKind = ResourceKind::Property;
}

fn validate_image_urls(images: &[String]) -> Result<(), ValidationError> {
    for image in images {
        let is_http = image.starts_with("http://") || image.starts_with("https://");
        if !is_http || !image.validate_url() {
            let mut error = ValidationError::new("url");
            error.add_param("value".into(), image);
            return Err(error);
        }
    }
    Ok(())
}
