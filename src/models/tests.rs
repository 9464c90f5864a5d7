use super::*;
use crate::error::ProvisionError;
use crate::identifier::ValidationError;
use crate::storage::{StoreError, StoreOp};

// ── Request parsing ─────────────────────────────────────────────

#[test]
fn create_default_files_defaults_to_true() {
    let req: ProvisionRequest = serde_json::from_str(r#"{"identifier":"tenant-42"}"#).unwrap();
    assert_eq!(
        req,
        ProvisionRequest {
            identifier: "tenant-42".into(),
            create_default_files: true,
        }
    );
}

#[test]
fn create_default_files_can_be_disabled() {
    let req: ProvisionRequest =
        serde_json::from_str(r#"{"identifier":"valid_id","create_default_files":false}"#).unwrap();
    assert!(!req.create_default_files);
}

#[test]
fn identifier_is_required() {
    assert!(serde_json::from_str::<ProvisionRequest>(r#"{"create_default_files":true}"#).is_err());
}

// ── Response shapes ─────────────────────────────────────────────

#[test]
fn success_shape() {
    let (status, body) = ProvisionResponse::from_outcome(Ok(CreationResult {
        identifier: "tenant-42".into(),
        message: "created".into(),
        files_created: vec!["tenants/tenant-42/tasks.json".into()],
        timestamp: "2026-01-01T00:00:00Z".into(),
    }));
    assert_eq!(status, 201);
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        serde_json::json!({
            "status": "success",
            "identifier": "tenant-42",
            "message": "created",
            "files_created": ["tenants/tenant-42/tasks.json"],
            "timestamp": "2026-01-01T00:00:00Z",
        })
    );
}

#[test]
fn validation_shape_omits_paths_remaining() {
    let (status, body) = ProvisionResponse::from_outcome(Err(ProvisionError::Validation(
        ValidationError { reason: "format" },
    )));
    assert_eq!(status, 400);
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"], "Invalid identifier format");
    assert!(json.get("paths_remaining").is_none());
}

#[test]
fn conflict_shape() {
    let (status, body) = ProvisionResponse::from_outcome(Err(ProvisionError::Conflict {
        identifier: "tenant-42".into(),
    }));
    assert_eq!(status, 409);
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["error"], "identifier already exists");
    assert_eq!(json["message"], "identifier 'tenant-42' is already provisioned");
}

#[test]
fn partial_failure_lists_remaining_paths() {
    let (status, body) = ProvisionResponse::from_outcome(Err(ProvisionError::PartialFailure {
        identifier: "tenant-42".into(),
        paths_remaining: vec!["tenants/tenant-42/.namespace".into()],
        source: StoreError::backend(StoreOp::Put, "tenants/tenant-42/ideas.json", "down"),
    }));
    assert_eq!(status, 500);
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["error"], "partial_failure");
    assert_eq!(
        json["paths_remaining"],
        serde_json::json!(["tenants/tenant-42/.namespace"])
    );
}

#[test]
fn error_body_round_trip() {
    let body = ProvisionResponse::bad_request("missing field `identifier`");
    let json = serde_json::to_string(&body).unwrap();
    let parsed: ProvisionResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(body, parsed);
}
