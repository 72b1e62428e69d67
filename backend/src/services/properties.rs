//! Listing queries.

use crate::db::{services, Filter, FullRepository, RepositoryResult, Stored};
use crate::models::Property;

/// Properties matching the given city and status, in insertion order.
///
/// Empty or missing values do not filter. Both values are compared exactly.
pub async fn list_properties<R: FullRepository + ?Sized>(
    repo: &R,
    city: Option<&str>,
    status: Option<&str>,
) -> RepositoryResult<Vec<Stored<Property>>> {
    let filter = Filter::new()
        .eq_opt("city", city.filter(|c| !c.is_empty()))
        .eq_opt("status", status.filter(|s| !s.is_empty()));

    services::list::<Property, _>(repo, &filter).await
}

/// A single property by its identifier string.
pub async fn get_property<R: FullRepository + ?Sized>(
    repo: &R,
    id: &str,
) -> RepositoryResult<Stored<Property>> {
    services::get_by_id::<Property, _>(repo, id).await
}

/// Validate and store a new listing, returning its identifier.
pub async fn create_property<R: FullRepository + ?Sized>(
    repo: &R,
    property: &Property,
) -> RepositoryResult<String> {
    services::create(repo, property).await
}
