//! Store connectivity report.
//!
//! The report is built for humans looking at a deployment; it never fails.
//! Any store error ends up in the `database` field as text.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::db::{services, FullRepository};

const ERROR_DETAIL_LIMIT: usize = 80;
const COLLECTION_LIMIT: usize = 10;

/// Which connection settings are present in the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreEnvironment {
    pub database_url_set: bool,
    pub database_name_set: bool,
}

impl StoreEnvironment {
    /// Read `DATABASE_URL` and `DATABASE_NAME` presence.
    pub fn from_env() -> Self {
        let is_set = |name: &str| std::env::var(name).is_ok_and(|v| !v.is_empty());
        Self {
            database_url_set: is_set("DATABASE_URL"),
            database_name_set: is_set("DATABASE_NAME"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub backend: String,
    pub database: String,
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub connection_status: String,
    pub collections: Vec<String>,
}

impl Default for DiagnosticsReport {
    fn default() -> Self {
        Self {
            backend: "✅ Running".to_string(),
            database: "❌ Not Available".to_string(),
            database_url: None,
            database_name: None,
            connection_status: "Not Connected".to_string(),
            collections: Vec::new(),
        }
    }
}

fn set_marker(set: bool) -> String {
    if set { "✅ Set" } else { "❌ Not Set" }.to_string()
}

/// Format an error for the report, keeping at most 80 characters of detail.
fn error_status(detail: &str) -> String {
    let truncated: String = detail.chars().take(ERROR_DETAIL_LIMIT).collect();
    format!("❌ Error: {}", truncated)
}

/// Check the store and describe what was found.
pub async fn run_diagnostics<R: FullRepository + ?Sized>(
    repo: &R,
    env: StoreEnvironment,
) -> DiagnosticsReport {
    let mut report = DiagnosticsReport {
        database: "✅ Available".to_string(),
        database_url: Some(set_marker(env.database_url_set)),
        database_name: Some(set_marker(env.database_name_set)),
        ..Default::default()
    };

    match services::health_check(repo).await {
        Ok(true) => report.connection_status = "Connected".to_string(),
        Ok(false) => {
            warn!("Diagnostics: {} store reports unhealthy", repo.backend_name());
            report.database = error_status("store reported unhealthy");
            return report;
        }
        Err(e) => {
            warn!("Diagnostics: health check failed: {}", e);
            report.database = error_status(&e.to_string());
            return report;
        }
    }

    match services::list_collections(repo).await {
        Ok(collections) => {
            report.collections = collections.into_iter().take(COLLECTION_LIMIT).collect();
            report.database = "✅ Connected & Working".to_string();
        }
        Err(e) => {
            warn!("Diagnostics: listing collections failed: {}", e);
            report.database = error_status(&e.to_string());
        }
    }

    report
}
