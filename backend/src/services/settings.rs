//! Reading and updating the site settings document.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::db::{services, FullRepository, RepositoryResult};
use crate::models::{AdminSettings, SettingsUpdate};

/// Settings as returned to clients.
///
/// `_id` is present only once a settings document has been stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsView {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub settings: AdminSettings,
}

/// The stored settings, or the defaults when none are stored.
///
/// Never writes.
pub async fn read_settings<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<SettingsView> {
    Ok(match services::find_singleton::<AdminSettings, _>(repo).await? {
        Some(stored) => SettingsView {
            id: Some(stored.id),
            settings: stored.record,
        },
        None => SettingsView {
            id: None,
            settings: AdminSettings::default(),
        },
    })
}

/// Merge the set fields of `update` into the settings and return the result.
///
/// An update with no fields set is a plain read.
pub async fn update_settings<R: FullRepository + ?Sized>(
    repo: &R,
    update: &SettingsUpdate,
) -> RepositoryResult<SettingsView> {
    if update.is_empty() {
        debug!("Empty settings update; returning current settings");
        return read_settings(repo).await;
    }

    services::upsert_singleton::<AdminSettings, _, _>(repo, update).await?;
    read_settings(repo).await
}
