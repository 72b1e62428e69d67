//! Resource services.
//!
//! Each operation takes the repository explicitly and knows nothing about
//! HTTP; the `http` module is a thin layer on top.

pub mod diagnostics;
pub mod offers;
pub mod properties;
pub mod seed;
pub mod settings;

pub use diagnostics::{run_diagnostics, DiagnosticsReport, StoreEnvironment};
pub use offers::{list_offers, submit_offer, OfferReceipt};
pub use properties::{create_property, get_property, list_properties};
pub use seed::{seed_demo_data, SeedReport};
pub use settings::{read_settings, update_settings, SettingsView};
