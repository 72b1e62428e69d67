//! Data Transfer Objects for the HTTP API.
//!
//! Resource bodies are the models themselves (wrapped in
//! [`Stored`](crate::db::Stored) when they carry an `_id`); this module only
//! holds query strings and small envelope types.

use serde::{Deserialize, Serialize};

pub use crate::db::Stored;
pub use crate::models::{AdminSettings, Offer, Property, SettingsUpdate};
pub use crate::services::{DiagnosticsReport, OfferReceipt, SettingsView};

/// Query string for `GET /properties`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyQuery {
    pub city: Option<String>,
    pub status: Option<String>,
}

/// Query string for `GET /offers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferQuery {
    pub property_id: Option<String>,
}

/// Response for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// API version
    pub version: String,
    /// Store connection status
    pub database: String,
}

/// Bare `{status}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}
