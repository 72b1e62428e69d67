//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! resource services.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use super::dto::{
    HealthResponse, Offer, OfferQuery, OfferReceipt, Property, PropertyQuery, RootResponse,
    SettingsUpdate, SettingsView, StatusResponse, Stored,
};
use super::error::AppError;
use super::extract::ValidatedJson;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::schema;
use crate::services::{self, DiagnosticsReport};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health & Introspection
// =============================================================================

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Property Sale API is running".to_string(),
    })
}

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is
/// reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

/// GET /schema
pub async fn get_schema() -> Json<Value> {
    Json(schema::describe())
}

/// GET /test
///
/// Store diagnostics. Always 200; failures are described in the body.
pub async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsReport> {
    Json(services::run_diagnostics(state.repository.as_ref(), state.store_env).await)
}

/// POST /seed
pub async fn seed(State(state): State<AppState>) -> HandlerResult<StatusResponse> {
    let report = services::seed_demo_data(state.repository.as_ref()).await?;
    tracing::debug!(?report, "seed finished");

    Ok(Json(StatusResponse {
        status: "ok".to_string(),
    }))
}

// =============================================================================
// Properties
// =============================================================================

/// GET /properties?city=&status=
pub async fn list_properties(
    State(state): State<AppState>,
    Query(query): Query<PropertyQuery>,
) -> HandlerResult<Vec<Stored<Property>>> {
    let properties = services::list_properties(
        state.repository.as_ref(),
        query.city.as_deref(),
        query.status.as_deref(),
    )
    .await?;

    Ok(Json(properties))
}

/// GET /properties/{id}
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<Stored<Property>> {
    let property = services::get_property(state.repository.as_ref(), &id).await?;
    Ok(Json(property))
}

// =============================================================================
// Offers
// =============================================================================

/// POST /offers
pub async fn submit_offer(
    State(state): State<AppState>,
    ValidatedJson(offer): ValidatedJson<Offer>,
) -> HandlerResult<OfferReceipt> {
    let receipt = services::submit_offer(state.repository.as_ref(), &offer).await?;
    Ok(Json(receipt))
}

/// GET /offers?property_id=
pub async fn list_offers(
    State(state): State<AppState>,
    Query(query): Query<OfferQuery>,
) -> HandlerResult<Vec<Stored<Offer>>> {
    let offers =
        services::list_offers(state.repository.as_ref(), query.property_id.as_deref()).await?;
    Ok(Json(offers))
}

// =============================================================================
// Admin
// =============================================================================

/// GET /admin/settings
pub async fn read_settings(State(state): State<AppState>) -> HandlerResult<SettingsView> {
    let settings = services::read_settings(state.repository.as_ref()).await?;
    Ok(Json(settings))
}

/// PUT /admin/settings
pub async fn update_settings(
    State(state): State<AppState>,
    ValidatedJson(update): ValidatedJson<SettingsUpdate>,
) -> HandlerResult<SettingsView> {
    let settings = services::update_settings(state.repository.as_ref(), &update).await?;
    Ok(Json(settings))
}
