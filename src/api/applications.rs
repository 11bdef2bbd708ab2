//! Registered applications (`/applications`).

use serde::Serialize;
use serde_json::{Value, json};

use super::{Fields, item_path, status_label, unwrap_envelope, unwrap_list};
use crate::error::{ApiError, ValidationErrors};
use crate::http::ApiClient;

const COLLECTION: &str = "/applications";

/// One application as the console shows it, whatever naming scheme the
/// backend used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    pub app_id: String,
    pub app_name: String,
    pub redirect_uri: String,
    pub is_active: bool,
    pub store_token: bool,
    pub internal_legacy_user: bool,
    pub desktop: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Application {
    #[must_use]
    pub fn status(&self) -> &'static str {
        status_label(self.is_active)
    }
}

/// Normalize one raw application record.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] when `raw` is not an object.
pub fn normalize(raw: &Value) -> Result<Application, ApiError> {
    let f = Fields::of(raw)?;
    Ok(Application {
        app_id: f.text_or_empty(&["app_id", "appId", "id"]),
        app_name: f.text_or_empty(&["app_name", "appName", "name"]),
        redirect_uri: f.text_or_empty(&["redirect_uri", "redirectUri"]),
        is_active: f.flag(&["is_active", "isActive", "status"]),
        store_token: f.flag(&["store_token", "storeToken"]),
        internal_legacy_user: f.flag(&[
            "internal_legacy_user",
            "internalLegacyUserId",
            "internal_legacy_user_id",
            "internalLegacyUser",
        ]),
        desktop: f.flag(&["desktop", "isDesktop"]),
        created_at: f.date(&["created_at", "createdAt"]),
        updated_at: f.date(&["updated_at", "updatedAt"]),
    })
}

// =============================================================================
// DRAFT
// =============================================================================

/// Form state for creating or editing an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDraft {
    pub app_name: String,
    pub redirect_uri: String,
    pub is_active: bool,
    pub store_token: bool,
    pub internal_legacy_user: bool,
    pub desktop: bool,
}

impl ApplicationDraft {
    /// New applications start active with every option off.
    #[must_use]
    pub fn new(app_name: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            redirect_uri: redirect_uri.into(),
            is_active: true,
            store_token: false,
            internal_legacy_user: false,
            desktop: false,
        }
    }

    /// Pre-fill an edit form from an existing record.
    #[must_use]
    pub fn from_application(app: &Application) -> Self {
        Self {
            app_name: app.app_name.clone(),
            redirect_uri: app.redirect_uri.clone(),
            is_active: app.is_active,
            store_token: app.store_token,
            internal_legacy_user: app.internal_legacy_user,
            desktop: app.desktop,
        }
    }

    /// Required-field and URL checks.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] listing every failing field.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = ValidationErrors::new();
        errors.require("app_name", &self.app_name, "Application Name is required");
        if self.redirect_uri.trim().is_empty() {
            errors.add("redirect_uri", "Redirect URI is required");
        } else if reqwest::Url::parse(self.redirect_uri.trim()).is_err() {
            errors.add("redirect_uri", "Redirect URI must be a valid URL");
        }
        errors.into_result()
    }

    #[must_use]
    pub fn payload(&self) -> Value {
        json!({
            "app_name": self.app_name.trim(),
            "redirect_uri": self.redirect_uri.trim(),
            "status": status_label(self.is_active),
            "store_token": self.store_token,
            "internal_legacy_user": self.internal_legacy_user,
            "desktop": self.desktop,
        })
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct Applications<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub fn applications(&self) -> Applications<'_> {
        Applications { client: self }
    }
}

impl Applications<'_> {
    /// # Errors
    ///
    /// Pipeline errors, or [`ApiError::Rejected`] on `success: false`.
    pub async fn list(&self) -> Result<Vec<Application>, ApiError> {
        let body = self.client.get(COLLECTION, &[]).await?;
        unwrap_list(body, "Failed to fetch applications")?.iter().map(normalize).collect()
    }

    /// # Errors
    ///
    /// Pipeline errors, or [`ApiError::Rejected`] on `success: false`.
    pub async fn get(&self, id: &str) -> Result<Application, ApiError> {
        let body = self.client.get(&item_path(COLLECTION, id), &[]).await?;
        normalize(&unwrap_envelope(body, "Failed to fetch application data")?)
    }

    /// Validate and create; returns the stored record when the backend echoes
    /// one.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] before any request is made, otherwise
    /// pipeline or envelope errors.
    pub async fn create(&self, draft: &ApplicationDraft) -> Result<Option<Application>, ApiError> {
        draft.validate()?;
        let body = self.client.post(COLLECTION, draft.payload().into()).await?;
        let data = unwrap_envelope(body, "Failed to add application")?;
        tracing::info!(app_name = %draft.app_name, "application added");
        echoed(&data)
    }

    /// # Errors
    ///
    /// [`ApiError::Validation`] before any request is made, otherwise
    /// pipeline or envelope errors.
    pub async fn update(&self, id: &str, draft: &ApplicationDraft) -> Result<Option<Application>, ApiError> {
        draft.validate()?;
        let body = self.client.put(&item_path(COLLECTION, id), draft.payload().into()).await?;
        let data = unwrap_envelope(body, "Failed to update application")?;
        tracing::info!(app_id = %id, "application updated");
        echoed(&data)
    }

    /// # Errors
    ///
    /// Pipeline errors, or [`ApiError::Rejected`] on `success: false`.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let body = self.client.delete(&item_path(COLLECTION, id)).await?;
        unwrap_envelope(body, "Failed to delete application")?;
        tracing::info!(app_id = %id, "application deleted");
        Ok(())
    }
}

fn echoed(data: &Value) -> Result<Option<Application>, ApiError> {
    if data.is_object() { normalize(data).map(Some) } else { Ok(None) }
}

#[cfg(test)]
#[path = "applications_test.rs"]
mod tests;
