//! Landing-page counters derived from the application list.

use serde::Serialize;

use super::Application;
use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub desktop: usize,
}

#[must_use]
pub fn summarize(apps: &[Application]) -> DashboardSummary {
    let active = apps.iter().filter(|app| app.is_active).count();
    DashboardSummary {
        total: apps.len(),
        active,
        inactive: apps.len() - active,
        desktop: apps.iter().filter(|app| app.desktop).count(),
    }
}

pub struct Dashboard<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard { client: self }
    }
}

impl Dashboard<'_> {
    /// # Errors
    ///
    /// Any error from listing applications.
    pub async fn summary(&self) -> Result<DashboardSummary, ApiError> {
        let apps = self.client.applications().list().await?;
        Ok(summarize(&apps))
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
