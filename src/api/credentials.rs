//! Azure AD credentials (`/credentials`).
//!
//! Secrets are carried in memory so an edit form can be pre-filled, but they
//! never leave the process through `Debug` or serialized output.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use super::{Fields, item_path, status_label, unwrap_envelope, unwrap_list};
use crate::error::{ApiError, ValidationErrors};
use crate::http::ApiClient;

const COLLECTION: &str = "/credentials";
const REDACTED: &str = "********";

#[allow(clippy::ref_option)]
fn redact<S: Serializer>(secret: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match secret {
        Some(_) => serializer.serialize_str(REDACTED),
        None => serializer.serialize_none(),
    }
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct AzureCredential {
    pub cred_id: String,
    pub client_id: String,
    pub tenant_id: String,
    #[serde(serialize_with = "redact")]
    pub client_secret: Option<String>,
    #[serde(serialize_with = "redact")]
    pub session_secret: Option<String>,
    pub azure_authority: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl AzureCredential {
    #[must_use]
    pub fn status(&self) -> &'static str {
        status_label(self.is_active)
    }
}

impl fmt::Debug for AzureCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |secret: &Option<String>| secret.as_ref().map(|_| REDACTED);
        f.debug_struct("AzureCredential")
            .field("cred_id", &self.cred_id)
            .field("client_id", &self.client_id)
            .field("tenant_id", &self.tenant_id)
            .field("client_secret", &mask(&self.client_secret))
            .field("session_secret", &mask(&self.session_secret))
            .field("azure_authority", &self.azure_authority)
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

/// Normalize one raw credential record.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] when `raw` is not an object.
pub fn normalize(raw: &Value) -> Result<AzureCredential, ApiError> {
    let f = Fields::of(raw)?;
    Ok(AzureCredential {
        cred_id: f.text_or_empty(&["cred_id", "credId", "id"]),
        client_id: f.text_or_empty(&["client_id", "clientId"]),
        tenant_id: f.text_or_empty(&["tenant_id", "tenantId"]),
        client_secret: f.text(&["client_secret", "clientSecret"]),
        session_secret: f.text(&["session_secret", "sessionSecret"]),
        azure_authority: f.text_or_empty(&["azure_authority", "azureAuthority"]),
        is_active: f.flag(&["is_active", "isActive", "status"]),
        created_at: f.date(&["created_at", "createdAt"]),
        updated_at: f.date(&["updated_at", "updatedAt"]),
    })
}

// =============================================================================
// DRAFT
// =============================================================================

#[derive(Clone, PartialEq, Eq)]
pub struct CredentialDraft {
    pub client_id: String,
    pub tenant_id: String,
    pub client_secret: String,
    pub session_secret: String,
    pub azure_authority: String,
    pub is_active: bool,
}

impl Default for CredentialDraft {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            tenant_id: String::new(),
            client_secret: String::new(),
            session_secret: String::new(),
            azure_authority: String::new(),
            is_active: true,
        }
    }
}

impl fmt::Debug for CredentialDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialDraft")
            .field("client_id", &self.client_id)
            .field("tenant_id", &self.tenant_id)
            .field("azure_authority", &self.azure_authority)
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

impl CredentialDraft {
    /// Pre-fill an edit form. Stored secrets are copied when the backend
    /// returned them.
    #[must_use]
    pub fn from_credential(cred: &AzureCredential) -> Self {
        Self {
            client_id: cred.client_id.clone(),
            tenant_id: cred.tenant_id.clone(),
            client_secret: cred.client_secret.clone().unwrap_or_default(),
            session_secret: cred.session_secret.clone().unwrap_or_default(),
            azure_authority: cred.azure_authority.clone(),
            is_active: cred.is_active,
        }
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] listing every failing field.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = ValidationErrors::new();
        errors.require("client_id", &self.client_id, "Client ID is required");
        errors.require("tenant_id", &self.tenant_id, "Tenant ID is required");
        errors.require("client_secret", &self.client_secret, "Client Secret is required");
        errors.require("session_secret", &self.session_secret, "Session Secret is required");
        errors.require("azure_authority", &self.azure_authority, "Azure Authority is required");
        errors.into_result()
    }

    #[must_use]
    pub fn payload(&self) -> Value {
        json!({
            "clientId": self.client_id.trim(),
            "tenantId": self.tenant_id.trim(),
            "clientSecret": self.client_secret.trim(),
            "session_secret": self.session_secret.trim(),
            "is_active": self.is_active,
            "azureAuthority": self.azure_authority.trim(),
        })
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct Credentials<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub fn credentials(&self) -> Credentials<'_> {
        Credentials { client: self }
    }
}

impl Credentials<'_> {
    /// # Errors
    ///
    /// Pipeline errors, or [`ApiError::Rejected`] on `success: false`.
    pub async fn list(&self) -> Result<Vec<AzureCredential>, ApiError> {
        let body = self.client.get(COLLECTION, &[]).await?;
        unwrap_list(body, "Failed to fetch credentials")?.iter().map(normalize).collect()
    }

    /// # Errors
    ///
    /// Pipeline errors, or [`ApiError::Rejected`] on `success: false`.
    pub async fn get(&self, id: &str) -> Result<AzureCredential, ApiError> {
        let body = self.client.get(&item_path(COLLECTION, id), &[]).await?;
        normalize(&unwrap_envelope(body, "Failed to fetch credential data")?)
    }

    /// # Errors
    ///
    /// [`ApiError::Validation`] before any request is made, otherwise
    /// pipeline or envelope errors.
    pub async fn create(&self, draft: &CredentialDraft) -> Result<(), ApiError> {
        draft.validate()?;
        let body = self.client.post(COLLECTION, draft.payload().into()).await?;
        unwrap_envelope(body, "Failed to add credential")?;
        tracing::info!(client_id = %draft.client_id, "credential added");
        Ok(())
    }

    /// # Errors
    ///
    /// [`ApiError::Validation`] before any request is made, otherwise
    /// pipeline or envelope errors.
    pub async fn update(&self, id: &str, draft: &CredentialDraft) -> Result<(), ApiError> {
        draft.validate()?;
        let body = self.client.put(&item_path(COLLECTION, id), draft.payload().into()).await?;
        unwrap_envelope(body, "Failed to update credential")?;
        tracing::info!(cred_id = %id, "credential updated");
        Ok(())
    }

    /// # Errors
    ///
    /// Pipeline errors, or [`ApiError::Rejected`] on `success: false`.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let body = self.client.delete(&item_path(COLLECTION, id)).await?;
        unwrap_envelope(body, "Failed to delete credential")?;
        tracing::info!(cred_id = %id, "credential deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;
