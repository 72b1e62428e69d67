//! Site-wide branding and hero copy.
//!
//! There is a single settings document. Reads fall back to
//! [`AdminSettings::default`] for a missing document or missing fields, and
//! writes go through [`SettingsUpdate`], which only carries the fields a
//! caller actually set.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::{Resource, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AdminSettings {
    /// Hex color, e.g. `#f97316`.
    pub primary_color: String,
    /// Hex color, e.g. `#111827`.
    pub accent_color: String,
    pub hero_heading: String,
    pub hero_subheading: String,
    pub announcement: Option<String>,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            primary_color: "#f97316".to_string(),
            accent_color: "#111827".to_string(),
            hero_heading: "Find your next place".to_string(),
            hero_subheading: "Modern homes, transparent offers, secure management.".to_string(),
            announcement: Some(
                "New listings dropping weekly — submit an offer in minutes!".to_string(),
            ),
        }
    }
}

impl Resource for AdminSettings {
    const KIND: ResourceKind = ResourceKind::AdminSettings;
}

/// Partial settings payload.
///
/// Absent and `null` fields are both treated as "leave unchanged"; a field
/// cannot be cleared through an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_subheading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement: Option<String>,
}

impl SettingsUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.primary_color.is_none()
            && self.accent_color.is_none()
            && self.hero_heading.is_none()
            && self.hero_subheading.is_none()
            && self.announcement.is_none()
    }
}

impl From<AdminSettings> for SettingsUpdate {
    fn from(settings: AdminSettings) -> Self {
        Self {
            primary_color: Some(settings.primary_color),
            accent_color: Some(settings.accent_color),
            hero_heading: Some(settings.hero_heading),
            hero_subheading: Some(settings.hero_subheading),
            announcement: settings.announcement,
        }
    }
}
