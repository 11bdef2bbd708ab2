//! CSV bulk import and template download.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ValidationErrors};
use crate::http::{ApiClient, FilePart, RequestBody};

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Applications,
    Users,
}

impl UploadKind {
    #[must_use]
    pub fn upload_path(self) -> &'static str {
        match self {
            Self::Applications => "/applications/upload",
            Self::Users => "/app-users/upload",
        }
    }

    #[must_use]
    pub fn template_path(self) -> &'static str {
        match self {
            Self::Applications => "/applications/template",
            Self::Users => "/app-users/template",
        }
    }

    #[must_use]
    pub fn template_file_name(self) -> &'static str {
        match self {
            Self::Applications => "applications_template.csv",
            Self::Users => "application-user-template.csv",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Applications => "Applications",
            Self::Users => "Users",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Applications => "applications",
            Self::Users => "users",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown upload kind '{0}' (expected applications or users)")]
pub struct ParseUploadKindError(String);

impl FromStr for UploadKind {
    type Err = ParseUploadKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "applications" | "apps" | "application" => Ok(Self::Applications),
            "users" | "app-users" | "user" => Ok(Self::Users),
            _ => Err(ParseUploadKindError(s.to_owned())),
        }
    }
}

// =============================================================================
// REPORT
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FailedRow {
    #[serde(default)]
    pub row: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Per-file import result reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    #[serde(default)]
    pub inserted_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub failed_rows: Vec<FailedRow>,
}

impl UploadReport {
    /// Row errors joined for display, when any row failed with a reason.
    #[must_use]
    pub fn row_errors(&self) -> Option<String> {
        if self.failed_count == 0 {
            return None;
        }
        let errors: Vec<&str> =
            self.failed_rows.iter().filter_map(|row| row.error.as_deref()).filter(|e| !e.is_empty()).collect();
        if errors.is_empty() { None } else { Some(errors.join("; ")) }
    }

    #[must_use]
    pub fn summary(&self, kind: UploadKind) -> String {
        format!(
            "{} imported successfully. {} rows inserted and {} rows failed.",
            kind.label(),
            self.inserted_count,
            self.failed_count
        )
    }
}

/// Reject anything without a `.csv` extension.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for non-CSV names.
pub fn check_csv(file_name: &str) -> Result<(), ApiError> {
    let is_csv = Path::new(file_name).extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let mut errors = ValidationErrors::new();
    if !is_csv {
        errors.add("file", "Please upload a CSV file");
    }
    errors.into_result()
}

fn parse_report(body: Value) -> Result<UploadReport, ApiError> {
    let Value::Object(mut map) = body else {
        return Err(ApiError::Rejected("Upload failed".into()));
    };
    let Some(result) = map.remove("result") else {
        let message = map.get("error").or_else(|| map.get("message")).and_then(Value::as_str).unwrap_or("Upload failed");
        return Err(ApiError::Rejected(message.to_owned()));
    };
    serde_json::from_value(result).map_err(|e| ApiError::Decode(e.to_string()))
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct BulkUpload<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub fn bulk(&self) -> BulkUpload<'_> {
        BulkUpload { client: self }
    }
}

impl BulkUpload<'_> {
    /// Upload CSV `bytes` as `file_name`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a non-CSV name, [`ApiError::Rejected`]
    /// with the joined row errors when any row failed with a reason, or
    /// pipeline errors.
    pub async fn upload(&self, kind: UploadKind, file_name: &str, bytes: Vec<u8>) -> Result<UploadReport, ApiError> {
        check_csv(file_name)?;
        let part = FilePart::csv(UPLOAD_FIELD, file_name, bytes);
        let body = self.client.post(kind.upload_path(), RequestBody::Multipart(vec![part])).await?;
        let report = parse_report(body)?;
        if let Some(errors) = report.row_errors() {
            tracing::warn!(%kind, failed = report.failed_count, "bulk upload had failed rows");
            return Err(ApiError::Rejected(errors));
        }
        tracing::info!(%kind, inserted = report.inserted_count, failed = report.failed_count, "bulk upload complete");
        Ok(report)
    }

    /// Read `path` from disk and upload it.
    ///
    /// # Errors
    ///
    /// As [`BulkUpload::upload`], plus [`ApiError::Io`] if the file cannot be
    /// read.
    pub async fn upload_file(&self, kind: UploadKind, path: &Path) -> Result<UploadReport, ApiError> {
        let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default().to_owned();
        check_csv(&file_name)?;
        let bytes = tokio::fs::read(path).await?;
        self.upload(kind, &file_name, bytes).await
    }

    /// Raw CSV template bytes.
    ///
    /// # Errors
    ///
    /// Pipeline errors.
    pub async fn template(&self, kind: UploadKind) -> Result<Vec<u8>, ApiError> {
        self.client.get_bytes(kind.template_path()).await
    }

    /// Download the template into `dir` under its conventional file name.
    ///
    /// # Errors
    ///
    /// Pipeline errors or [`ApiError::Io`].
    pub async fn save_template(&self, kind: UploadKind, dir: &Path) -> Result<PathBuf, ApiError> {
        let bytes = self.template(kind).await?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(kind.template_file_name());
        tokio::fs::write(&path, bytes).await?;
        tracing::info!(path = %path.display(), "template saved");
        Ok(path)
    }
}

#[cfg(test)]
#[path = "bulk_test.rs"]
mod tests;
