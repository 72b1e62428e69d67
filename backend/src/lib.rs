//! # Property Sale API
//!
//! A small property-listing service: listings, offers submitted against
//! them, and one site-wide settings document, exposed as a JSON API.
//!
//! ## Architecture
//!
//! - [`models`]: Property, Offer and AdminSettings with field validation
//! - [`db`]: Document repositories (in-memory, Postgres) and the typed gateway
//! - [`services`]: Resource operations independent of HTTP
//! - `http`: Axum router and handlers (feature `http-server`)

// RepositoryError carries rich context for debugging
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
