//! Offer submission and listing.

use log::info;
use serde::{Deserialize, Serialize};

use crate::db::{
    services, DocumentId, ErrorContext, Filter, FullRepository, RepositoryError,
    RepositoryResult, Stored,
};
use crate::models::{Offer, Property};

/// Acknowledgement returned for a submitted offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferReceipt {
    pub id: String,
    pub status: String,
}

/// Validate an offer, check its property exists, and store it.
///
/// The offer is stored with the property identifier in its canonical form,
/// so [`list_offers`] finds it whichever spelling the caller used.
///
/// The existence check and the insert are two separate store calls; a
/// property removed in between is not detected.
///
/// # Errors
/// - `ValidationError` if the offer fails field validation
/// - `InvalidIdentifier` if `property_id` is malformed
/// - `NotFound` if no property has that identifier
pub async fn submit_offer<R: FullRepository + ?Sized>(
    repo: &R,
    offer: &Offer,
) -> RepositoryResult<OfferReceipt> {
    let property_id = DocumentId::parse(&offer.property_id)?;

    if !services::exists::<Property, _>(repo, property_id).await? {
        return Err(RepositoryError::not_found_with_context(
            "Property not found for this offer",
            ErrorContext::new("submit_offer")
                .with_entity("property")
                .with_entity_id(property_id),
        ));
    }

    let offer = Offer {
        property_id: property_id.to_string(),
        ..offer.clone()
    };
    let id = services::create(repo, &offer).await?;
    info!("Offer {} submitted for property {}", id, property_id);

    Ok(OfferReceipt {
        id,
        status: "submitted".to_string(),
    })
}

/// Offers, optionally restricted to one property.
///
/// `property_id` is compared as a raw string and is not parsed, so a
/// malformed value simply matches nothing.
pub async fn list_offers<R: FullRepository + ?Sized>(
    repo: &R,
    property_id: Option<&str>,
) -> RepositoryResult<Vec<Stored<Offer>>> {
    let filter = Filter::new().eq_opt("property_id", property_id.filter(|p| !p.is_empty()));
    services::list::<Offer, _>(repo, &filter).await
}
