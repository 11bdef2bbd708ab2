//! Application users (`/users`) and their application mappings
//! (`/app-users`).

use serde::Serialize;
use serde_json::{Value, json};

use super::{Fields, id_value, item_path, unwrap_envelope, unwrap_list};
use crate::error::{ApiError, ValidationErrors};
use crate::http::ApiClient;

const COLLECTION: &str = "/users";
const MAPPINGS: &str = "/app-users";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppUser {
    pub app_user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub login_id: String,
    pub email_id: String,
    pub app_id: String,
    pub app_name: String,
    pub map_user_azure_id: Option<String>,
}

/// Normalize one raw user record.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] when `raw` is not an object.
pub fn normalize(raw: &Value) -> Result<AppUser, ApiError> {
    let f = Fields::of(raw)?;
    Ok(AppUser {
        app_user_id: f.text_or_empty(&["app_user_id", "appUserId", "user_id", "userId", "id"]),
        first_name: f.text_or_empty(&["first_name", "firstName"]),
        last_name: f.text_or_empty(&["last_name", "lastName"]),
        login_id: f.text_or_empty(&["login_id", "loginId"]),
        email_id: f.text_or_empty(&["email_id", "emailId", "email"]),
        app_id: f.text_or_empty(&["app_id", "appId"]),
        app_name: f.text_or_empty(&["app_name", "appName"]),
        map_user_azure_id: f.text(&["map_user_azure_id", "mapUserAzureId"]),
    })
}

/// Loose `\S+@\S+\.\S+` match: some `@` with a non-space on its left and a
/// dotted, non-space run on its right.
#[must_use]
pub fn looks_like_email(value: &str) -> bool {
    value.char_indices().filter(|(_, c)| *c == '@').any(|(at, _)| {
        let before = value[..at].chars().next_back();
        let after: &str = value[at + 1..].split(char::is_whitespace).next().unwrap_or_default();
        before.is_some_and(|c| !c.is_whitespace())
            && after.char_indices().any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < after.len())
    })
}

// =============================================================================
// DRAFT
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub login_id: String,
    pub email_id: String,
    pub app_id: String,
    pub map_user_azure_id: String,
}

impl UserDraft {
    #[must_use]
    pub fn from_user(user: &AppUser) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            login_id: user.login_id.clone(),
            email_id: user.email_id.clone(),
            app_id: user.app_id.clone(),
            map_user_azure_id: user.map_user_azure_id.clone().unwrap_or_default(),
        }
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] listing every failing field.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = ValidationErrors::new();
        errors.require("first_name", &self.first_name, "First Name is required");
        errors.require("last_name", &self.last_name, "Last Name is required");
        errors.require("login_id", &self.login_id, "Login ID is required");
        if self.email_id.trim().is_empty() {
            errors.add("email_id", "Email is required");
        } else if !looks_like_email(&self.email_id) {
            errors.add("email_id", "Email is invalid");
        }
        errors.require("app_id", &self.app_id, "Please select an application");
        errors.into_result()
    }

    #[must_use]
    pub fn payload(&self) -> Value {
        let azure_id = self.map_user_azure_id.trim();
        json!({
            "first_name": self.first_name.trim(),
            "last_name": self.last_name.trim(),
            "login_id": self.login_id.trim(),
            "email_id": self.email_id.trim(),
            "app_id": id_value(&self.app_id),
            "map_user_azure_id": if azure_id.is_empty() { Value::Null } else { Value::from(azure_id) },
        })
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct Users<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub fn users(&self) -> Users<'_> {
        Users { client: self }
    }
}

impl Users<'_> {
    /// # Errors
    ///
    /// Pipeline errors, or [`ApiError::Rejected`] on `success: false`.
    pub async fn list(&self) -> Result<Vec<AppUser>, ApiError> {
        let body = self.client.get(COLLECTION, &[]).await?;
        unwrap_list(body, "Failed to fetch users")?.iter().map(normalize).collect()
    }

    /// Users mapped to one application.
    ///
    /// # Errors
    ///
    /// Pipeline errors, or [`ApiError::Rejected`] on `success: false`.
    pub async fn by_application(&self, app_id: &str) -> Result<Vec<AppUser>, ApiError> {
        let body = self.client.get(&item_path(&format!("{MAPPINGS}/application"), app_id), &[]).await?;
        unwrap_list(body, "Failed to fetch user details")?.iter().map(normalize).collect()
    }

    /// # Errors
    ///
    /// [`ApiError::Validation`] before any request is made, otherwise
    /// pipeline or envelope errors.
    pub async fn create(&self, draft: &UserDraft) -> Result<(), ApiError> {
        draft.validate()?;
        let body = self.client.post(COLLECTION, draft.payload().into()).await?;
        unwrap_envelope(body, "Failed to save user")?;
        tracing::info!(login_id = %draft.login_id, "user added");
        Ok(())
    }

    /// # Errors
    ///
    /// [`ApiError::Validation`] before any request is made, otherwise
    /// pipeline or envelope errors.
    pub async fn update(&self, id: &str, draft: &UserDraft) -> Result<(), ApiError> {
        draft.validate()?;
        let body = self.client.put(&item_path(COLLECTION, id), draft.payload().into()).await?;
        unwrap_envelope(body, "Failed to save user")?;
        tracing::info!(user_id = %id, "user updated");
        Ok(())
    }

    /// # Errors
    ///
    /// Pipeline errors, or [`ApiError::Rejected`] on `success: false`.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let body = self.client.delete(&item_path(COLLECTION, id)).await?;
        unwrap_envelope(body, "Failed to delete user")?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Create a user and map it to `draft.app_id` in one call.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] before any request is made, otherwise
    /// pipeline or envelope errors.
    pub async fn map(&self, draft: &UserDraft) -> Result<(), ApiError> {
        draft.validate()?;
        let body = self.client.post(&format!("{MAPPINGS}/map"), draft.payload().into()).await?;
        unwrap_envelope(body, "Failed to save user")?;
        tracing::info!(login_id = %draft.login_id, app_id = %draft.app_id, "user mapped");
        Ok(())
    }

    /// Edit an existing application-user mapping.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] before any request is made, otherwise
    /// pipeline or envelope errors.
    pub async fn update_mapping(&self, app_user_id: &str, draft: &UserDraft) -> Result<(), ApiError> {
        draft.validate()?;
        let body = self.client.put(&item_path(MAPPINGS, app_user_id), draft.payload().into()).await?;
        unwrap_envelope(body, "Failed to save user")?;
        tracing::info!(app_user_id = %app_user_id, "user mapping updated");
        Ok(())
    }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
