use super::*;
use serde_json::json;

// =============================================================================
// unwrap_envelope
// =============================================================================

#[test]
fn envelope_success_returns_data() {
    let data = unwrap_envelope(json!({ "success": true, "data": { "id": 1 } }), "failed").unwrap();
    assert_eq!(data, json!({ "id": 1 }));
}

#[test]
fn envelope_success_without_data_is_null() {
    assert_eq!(unwrap_envelope(json!({ "success": true }), "failed").unwrap(), Value::Null);
}

#[test]
fn envelope_failure_uses_server_message() {
    let err = unwrap_envelope(json!({ "success": false, "message": "Duplicate app" }), "failed").unwrap_err();
    assert!(matches!(err, ApiError::Rejected(ref m) if m == "Duplicate app"));
}

#[test]
fn envelope_failure_without_message_uses_fallback() {
    let err = unwrap_envelope(json!({ "data": [] }), "Failed to fetch users").unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch users");
}

#[test]
fn envelope_accepts_bare_array() {
    assert_eq!(unwrap_envelope(json!([1, 2]), "failed").unwrap(), json!([1, 2]));
}

#[test]
fn envelope_rejects_scalar() {
    assert!(unwrap_envelope(json!("ok"), "Unexpected response format").is_err());
}

#[test]
fn unwrap_list_requires_array() {
    let err = unwrap_list(json!({ "success": true, "data": { "id": 1 } }), "failed").unwrap_err();
    assert!(matches!(err, ApiError::Decode(ref m) if m.contains("object")));
}

#[test]
fn unwrap_list_null_data_is_empty() {
    assert!(unwrap_list(json!({ "success": true, "data": null }), "failed").unwrap().is_empty());
}

// =============================================================================
// Fields
// =============================================================================

#[test]
fn fields_resolve_first_non_blank_alias() {
    let value = json!({ "app_id": "", "appId": 12 });
    let fields = Fields::of(&value).unwrap();
    assert_eq!(fields.text(&["app_id", "appId"]), Some("12".into()));
}

#[test]
fn fields_missing_alias_is_none() {
    let value = json!({ "other": 1 });
    let fields = Fields::of(&value).unwrap();
    assert_eq!(fields.text(&["app_id", "appId"]), None);
    assert_eq!(fields.text_or_empty(&["app_id"]), "");
}

#[test]
fn fields_flag_accepts_truthy_forms() {
    let value = json!({ "a": true, "b": 1, "c": "Active", "d": "false", "e": 0, "f": null });
    let fields = Fields::of(&value).unwrap();
    assert!(fields.flag(&["a"]));
    assert!(fields.flag(&["b"]));
    assert!(fields.flag(&["c"]));
    assert!(!fields.flag(&["d"]));
    assert!(!fields.flag(&["e"]));
    assert!(!fields.flag(&["f", "missing"]));
    assert!(fields.flag(&["e", "a"]));
}

#[test]
fn fields_date_keeps_day_prefix() {
    let value = json!({ "created_at": "2025-04-10T08:30:00.000Z", "updatedAt": "2025-04-11" });
    let fields = Fields::of(&value).unwrap();
    assert_eq!(fields.date(&["created_at", "createdAt"]), "2025-04-10");
    assert_eq!(fields.date(&["updated_at", "updatedAt"]), "2025-04-11");
    assert_eq!(fields.date(&["deleted_at"]), "");
}

#[test]
fn fields_of_rejects_non_object() {
    assert!(matches!(Fields::of(&json!([1])), Err(ApiError::Decode(_))));
}

// =============================================================================
// ids
// =============================================================================

#[test]
fn id_value_prefers_numbers() {
    assert_eq!(id_value("42"), json!(42));
    assert_eq!(id_value(" 7 "), json!(7));
    assert_eq!(id_value("app-9"), json!("app-9"));
}

#[test]
fn item_path_trims_id() {
    assert_eq!(item_path("/applications", " 5 "), "/applications/5");
}

#[test]
fn status_label_spelling() {
    assert_eq!(status_label(true), "Active");
    assert_eq!(status_label(false), "Inactive");
}
