//! Resource models.
//!
//! Every model validates its own fields (`validator`) and describes itself
//! as a JSON schema (`schemars`).

pub mod offer;
pub mod property;
pub mod schema;
pub mod settings;

pub use offer::{Offer, OfferStatus};
pub use property::{Property, PropertyStatus};
pub use settings::{AdminSettings, SettingsUpdate};
