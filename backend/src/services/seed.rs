//! Demo data for previews.

use log::info;
use serde::{Deserialize, Serialize};

use crate::db::{services, FullRepository, RepositoryResult};
use crate::models::{AdminSettings, Property, PropertyStatus, SettingsUpdate};

const DEMO_IMAGES: [&str; 3] = [
    "https://images.unsplash.com/photo-1505692794403-34d4982f88aa",
    "https://images.unsplash.com/photo-1568605114967-8130f3a36994",
    "https://images.unsplash.com/photo-1523217582562-09d0def993a6",
];

/// What a seeding run inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub settings_created: bool,
    pub properties_created: usize,
}

impl SeedReport {
    pub fn is_noop(&self) -> bool {
        !self.settings_created && self.properties_created == 0
    }
}

/// Branded settings installed on an empty store.
pub fn demo_settings() -> AdminSettings {
    AdminSettings {
        primary_color: "#f97316".to_string(),
        accent_color: "#111827".to_string(),
        hero_heading: "Discover vibrant homes".to_string(),
        hero_subheading: "Browse, make offers, and manage listings seamlessly.".to_string(),
        announcement: Some("Welcome! This site uses demo data for preview.".to_string()),
    }
}

#[allow(clippy::too_many_arguments)]
fn listing(
    title: &str,
    description: &str,
    address: &str,
    city: &str,
    state: &str,
    price: i64,
    (bedrooms, bathrooms, area_sqft): (i64, f64, i64),
    status: PropertyStatus,
    tags: &[&str],
) -> Property {
    Property {
        title: title.to_string(),
        description: description.to_string(),
        address: address.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        price,
        bedrooms,
        bathrooms,
        area_sqft,
        status,
        images: DEMO_IMAGES.iter().map(|s| s.to_string()).collect(),
        tags: tags.iter().map(|s| s.to_string()).collect(),
    }
}

/// The three demo listings.
pub fn demo_properties() -> Vec<Property> {
    vec![
        listing(
            "Sunny Modern Loft",
            "Open-plan loft with floor-to-ceiling windows and polished concrete floors.",
            "123 Orange Ave",
            "Los Angeles",
            "CA",
            975_000,
            (2, 1.5, 1200),
            PropertyStatus::Available,
            &["loft", "downtown"],
        ),
        listing(
            "Cozy Suburban Home",
            "Family-friendly neighborhood, renovated kitchen, large backyard.",
            "456 Grove St",
            "Austin",
            "TX",
            620_000,
            (3, 2.0, 1800),
            PropertyStatus::Available,
            &["suburbs", "yard"],
        ),
        listing(
            "Penthouse with Skyline View",
            "Top-floor penthouse featuring panoramic city views and a private terrace.",
            "789 Skyline Blvd",
            "Seattle",
            "WA",
            1_850_000,
            (4, 3.0, 2500),
            PropertyStatus::UnderOffer,
            &["luxury", "view"],
        ),
    ]
}

/// Insert demo data into every collection that is still empty.
///
/// Offers are never seeded. Running this twice inserts nothing the second
/// time.
pub async fn seed_demo_data<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<SeedReport> {
    let mut report = SeedReport::default();

    if services::count::<AdminSettings, _>(repo).await? == 0 {
        let settings = SettingsUpdate::from(demo_settings());
        services::upsert_singleton::<AdminSettings, _, _>(repo, &settings).await?;
        report.settings_created = true;
    }

    if services::count::<Property, _>(repo).await? == 0 {
        for property in demo_properties() {
            services::create(repo, &property).await?;
            report.properties_created += 1;
        }
    }

    if report.is_noop() {
        info!("Seed skipped: every collection already has data");
    } else {
        info!(
            "Seeded demo data (settings: {}, properties: {})",
            report.settings_created, report.properties_created
        );
    }

    Ok(report)
}
